// Domain layer: core simulation types and rules.

pub mod geometry;
pub mod kits;
pub mod state;
pub mod systems;
pub mod tuning;
pub mod world;
pub mod world_gen;

pub use geometry::Rect;
pub use kits::{KitId, Special};
pub use state::{
    BulletSnapshot, DeathCause, LeaderboardEntry, OrbSnapshot, Player, PlayerInput,
    PlayerSnapshot, WorldEvent,
};
pub use world::World;
