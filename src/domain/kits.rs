// Static kit registry: loadout identifier -> immutable numeric profile.

/// Movement/combat variant a kit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Special {
    /// Walk/strafe movement with ballistic fire.
    Standard,
    /// Gravity well: pulls nearby players and bullets, deals contact damage.
    AreaPull,
    /// Bouncy: acceleration physics with rebounds and ramming.
    Elastic,
    /// Mimic: detonates on proximity.
    ProximityMine,
}

impl Special {
    pub fn can_fire(self) -> bool {
        matches!(self, Special::Standard | Special::AreaPull)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KitId {
    Assault,
    Sniper,
    Tank,
    Shotgun,
    Gravity,
    Bouncy,
    Mimic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KitProfile {
    pub display_name: &'static str,
    pub hp: f32,
    pub max_hp: f32,
    /// Walk speed per tick; acceleration per tick for elastic kits.
    pub speed: f32,
    pub radius: f32,
    pub cooldown_ticks: u32,
    /// Per-bullet damage; per unit of speed for elastic ramming.
    pub damage: f32,
    pub projectile_speed: f32,
    pub range: f32,
    pub pellet_count: u32,
    /// Total cone width in radians.
    pub spread: f32,
    pub special: Special,
}

static ASSAULT: KitProfile = KitProfile {
    display_name: "Assault",
    hp: 100.0,
    max_hp: 100.0,
    speed: 5.0,
    radius: 22.0,
    cooldown_ticks: 10,
    damage: 8.0,
    projectile_speed: 14.0,
    range: 450.0,
    pellet_count: 1,
    spread: 0.1,
    special: Special::Standard,
};

static SNIPER: KitProfile = KitProfile {
    display_name: "Sniper",
    hp: 60.0,
    max_hp: 60.0,
    speed: 6.0,
    radius: 20.0,
    cooldown_ticks: 50,
    damage: 40.0,
    projectile_speed: 28.0,
    range: 1000.0,
    pellet_count: 1,
    spread: 0.01,
    special: Special::Standard,
};

static TANK: KitProfile = KitProfile {
    display_name: "Tank",
    hp: 200.0,
    max_hp: 200.0,
    speed: 3.5,
    radius: 30.0,
    cooldown_ticks: 25,
    damage: 18.0,
    projectile_speed: 10.0,
    range: 350.0,
    pellet_count: 1,
    spread: 0.05,
    special: Special::Standard,
};

static SHOTGUN: KitProfile = KitProfile {
    display_name: "Shotgun",
    hp: 120.0,
    max_hp: 120.0,
    speed: 5.0,
    radius: 24.0,
    cooldown_ticks: 40,
    damage: 8.0,
    projectile_speed: 12.0,
    range: 300.0,
    pellet_count: 5,
    spread: 0.2,
    special: Special::Standard,
};

static GRAVITY: KitProfile = KitProfile {
    display_name: "Gravity",
    hp: 150.0,
    max_hp: 150.0,
    speed: 3.0,
    radius: 28.0,
    cooldown_ticks: 30,
    damage: 10.0,
    projectile_speed: 9.0,
    range: 300.0,
    pellet_count: 1,
    spread: 0.05,
    special: Special::AreaPull,
};

static BOUNCY: KitProfile = KitProfile {
    display_name: "Bouncy",
    hp: 130.0,
    max_hp: 130.0,
    speed: 0.6,
    radius: 24.0,
    cooldown_ticks: 20,
    damage: 2.5,
    projectile_speed: 0.0,
    range: 0.0,
    pellet_count: 0,
    spread: 0.0,
    special: Special::Elastic,
};

static MIMIC: KitProfile = KitProfile {
    display_name: "Mimic",
    hp: 80.0,
    max_hp: 80.0,
    speed: 4.5,
    radius: 14.0,
    cooldown_ticks: 90,
    damage: 70.0,
    projectile_speed: 0.0,
    range: 0.0,
    pellet_count: 0,
    spread: 0.0,
    special: Special::ProximityMine,
};

impl KitId {
    pub const DEFAULT: KitId = KitId::Assault;

    pub const ALL: [KitId; 7] = [
        KitId::Assault,
        KitId::Sniper,
        KitId::Tank,
        KitId::Shotgun,
        KitId::Gravity,
        KitId::Bouncy,
        KitId::Mimic,
    ];

    /// Resolves a client-supplied kit name; unknown or missing names fall back to the default.
    pub fn resolve(name: Option<&str>) -> KitId {
        let Some(name) = name.map(str::trim) else {
            return KitId::DEFAULT;
        };
        KitId::ALL
            .into_iter()
            .find(|kit| kit.name().eq_ignore_ascii_case(name))
            .unwrap_or(KitId::DEFAULT)
    }

    pub fn name(self) -> &'static str {
        match self {
            KitId::Assault => "assault",
            KitId::Sniper => "sniper",
            KitId::Tank => "tank",
            KitId::Shotgun => "shotgun",
            KitId::Gravity => "gravity",
            KitId::Bouncy => "bouncy",
            KitId::Mimic => "mimic",
        }
    }

    pub fn profile(self) -> &'static KitProfile {
        match self {
            KitId::Assault => &ASSAULT,
            KitId::Sniper => &SNIPER,
            KitId::Tank => &TANK,
            KitId::Shotgun => &SHOTGUN,
            KitId::Gravity => &GRAVITY,
            KitId::Bouncy => &BOUNCY,
            KitId::Mimic => &MIMIC,
        }
    }
}
