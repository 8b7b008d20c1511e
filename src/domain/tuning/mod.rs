// Gameplay tuning, kept separate from runtime/server configuration.

pub mod combat;
pub mod player;
pub mod world;

pub use combat::{BouncyTuning, CombatTuning, GravityTuning, KillRewards, MimicTuning};
pub use player::PlayerTuning;
pub use world::WorldTuning;

#[derive(Debug, Clone, Copy, Default)]
pub struct Tuning {
    pub world: WorldTuning,
    pub player: PlayerTuning,
    pub combat: CombatTuning,
}
