// Domain-level simulation entities and input/snapshot types.

use crate::domain::geometry::Circle;
use crate::domain::kits::{KitId, KitProfile};
use std::time::Duration;

/// Directional intent as last reported by the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub sprint: bool,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: u64,
    pub name: String,
    pub kit: KitId,
    pub x: f32,
    pub y: f32,
    // Knockback for walking kits, full velocity for elastic kits.
    pub vx: f32,
    pub vy: f32,

    pub hp: f32,
    pub max_hp: f32,
    pub score: u32,
    pub angle: f32,
    pub cooldown: u32,
    pub stamina: f32,
    pub regen_suppress: u32,
    pub invincible_until: Duration,

    // Derived each tick; exposed in snapshots.
    pub invincible: bool,
    pub sprinting: bool,

    pub input: PlayerInput,
}

impl Player {
    pub fn new(id: u64, name: String, kit: KitId, x: f32, y: f32) -> Self {
        let profile = kit.profile();
        Self {
            id,
            name,
            kit,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            hp: profile.hp,
            max_hp: profile.max_hp,
            score: 0,
            angle: 0.0,
            cooldown: 0,
            stamina: 100.0,
            regen_suppress: 0,
            invincible_until: Duration::ZERO,
            invincible: false,
            sprinting: false,
            input: PlayerInput::default(),
        }
    }

    pub fn profile(&self) -> &'static KitProfile {
        self.kit.profile()
    }

    pub fn radius(&self) -> f32 {
        self.profile().radius
    }

    pub fn hitbox(&self) -> Circle {
        Circle {
            x: self.x,
            y: self.y,
            r: self.radius(),
        }
    }

    pub fn is_invincible(&self, now: Duration) -> bool {
        now < self.invincible_until
    }

    pub fn heal(&mut self, amount: f32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bullet {
    pub id: u64,
    pub owner_id: u64,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub range: f32,
    pub traveled: f32,
    pub damage: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Orb {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

/// Mechanism credited for a kill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    Bullet,
    Gravity,
    Mimic,
    Ram,
}

impl DeathCause {
    pub fn as_str(self) -> &'static str {
        match self {
            DeathCause::Bullet => "bullet",
            DeathCause::Gravity => "gravity",
            DeathCause::Mimic => "mimic",
            DeathCause::Ram => "ram",
        }
    }
}

/// Transient occurrences collected during a tick and drained by the world task.
#[derive(Debug, Clone, PartialEq)]
pub enum WorldEvent {
    Hit {
        x: f32,
        y: f32,
    },
    Kill {
        killer_id: Option<u64>,
        killer_name: Option<String>,
        victim_id: u64,
        victim_name: String,
        cause: DeathCause,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub id: u64,
    pub name: String,
    pub kit: KitId,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub score: u32,
    pub stamina: f32,
    pub invincible: bool,
    pub sprinting: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulletSnapshot {
    pub id: u64,
    pub owner_id: u64,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrbSnapshot {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub id: u64,
    pub name: String,
    pub score: u32,
}

impl From<&Player> for PlayerSnapshot {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            kit: p.kit,
            x: p.x,
            y: p.y,
            angle: p.angle,
            hp: p.hp,
            max_hp: p.max_hp,
            score: p.score,
            stamina: p.stamina,
            invincible: p.invincible,
            sprinting: p.sprinting,
        }
    }
}

impl From<&Bullet> for BulletSnapshot {
    fn from(b: &Bullet) -> Self {
        Self {
            id: b.id,
            owner_id: b.owner_id,
            x: b.x,
            y: b.y,
        }
    }
}

impl From<&Orb> for OrbSnapshot {
    fn from(o: &Orb) -> Self {
        Self {
            id: o.id,
            x: o.x,
            y: o.y,
            radius: o.radius,
        }
    }
}

impl From<&Player> for LeaderboardEntry {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            score: p.score,
        }
    }
}
