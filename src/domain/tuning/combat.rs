use crate::domain::state::DeathCause;

/// Tuning for the special kit mechanics and kill rewards.
#[derive(Debug, Clone, Copy)]
pub struct GravityTuning {
    /// Pull field radius around a gravity player.
    pub radius: f32,
    pub base_force: f32,
    /// Added on top of `base_force`, scaled linearly by closeness.
    pub falloff: f32,
    /// Damage per tick dealt to a player touching the well.
    pub contact_damage: f32,
    /// Fraction of the contact damage the well takes back.
    pub self_damage_scale: f32,
    /// Bullets are deflected by this fraction of the pull force.
    pub bullet_pull_scale: f32,
}

impl Default for GravityTuning {
    fn default() -> Self {
        Self {
            radius: 260.0,
            base_force: 0.5,
            falloff: 2.0,
            contact_damage: 1.5,
            self_damage_scale: 0.25,
            bullet_pull_scale: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BouncyTuning {
    pub max_speed: f32,
    /// Velocity multiplier applied every tick.
    pub damping: f32,
    /// Fraction of speed kept when rebounding off a wall.
    pub restitution: f32,
    /// Minimum speed at which contact counts as a ram.
    pub ram_threshold: f32,
    /// Fraction of velocity kept (reversed) after a ram.
    pub ram_deflection: f32,
}

impl Default for BouncyTuning {
    fn default() -> Self {
        Self {
            max_speed: 14.0,
            damping: 0.98,
            restitution: 0.8,
            ram_threshold: 6.0,
            ram_deflection: 0.6,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MimicTuning {
    /// Slack added to the summed hitbox radii when checking the trigger.
    pub trigger_margin: f32,
    pub self_damage: f32,
    pub knockback: f32,
}

impl Default for MimicTuning {
    fn default() -> Self {
        Self {
            trigger_margin: 6.0,
            self_damage: 15.0,
            knockback: 18.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct KillRewards {
    pub bullet: u32,
    pub gravity: u32,
    pub mimic: u32,
    pub ram: u32,
}

impl KillRewards {
    pub fn for_cause(&self, cause: DeathCause) -> u32 {
        match cause {
            DeathCause::Bullet => self.bullet,
            DeathCause::Gravity => self.gravity,
            DeathCause::Mimic => self.mimic,
            DeathCause::Ram => self.ram,
        }
    }
}

impl Default for KillRewards {
    fn default() -> Self {
        Self {
            bullet: 100,
            gravity: 100,
            mimic: 150,
            ram: 120,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CombatTuning {
    pub gravity: GravityTuning,
    pub bouncy: BouncyTuning,
    pub mimic: MimicTuning,
    pub rewards: KillRewards,
}
