use std::time::Duration;

/// Per-player tuning shared by every kit.
///
/// Rates are per tick; the tick period lives in runtime configuration.
#[derive(Debug, Clone, Copy)]
pub struct PlayerTuning {
    pub stamina_max: f32,
    pub sprint_multiplier: f32,
    pub sprint_drain: f32,
    pub stamina_regen: f32,

    /// Passive healing while regeneration is not suppressed.
    pub regen_per_tick: f32,
    pub regen_suppress_on_fire: u32,
    pub regen_suppress_on_hit: u32,

    /// Grace period granted on spawn; firing forfeits it.
    pub spawn_invincibility: Duration,

    /// Multiplicative knockback decay applied every tick.
    pub knockback_damping: f32,
    pub knockback_epsilon: f32,

    pub orb_score: u32,
    pub orb_heal: f32,
    pub kill_heal: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            stamina_max: 100.0,
            sprint_multiplier: 1.4,
            sprint_drain: 1.2,
            stamina_regen: 0.6,
            regen_per_tick: 0.15,
            regen_suppress_on_fire: 180,
            regen_suppress_on_hit: 300,
            spawn_invincibility: Duration::from_secs(3),
            knockback_damping: 0.85,
            knockback_epsilon: 0.05,
            orb_score: 5,
            orb_heal: 10.0,
            kill_heal: 30.0,
        }
    }
}
