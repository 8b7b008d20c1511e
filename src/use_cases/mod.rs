// Use cases layer: application workflows for the game server.

pub mod game;
pub mod handle;
pub mod types;

pub use handle::{WorldHandle, WorldSettings, spawn_world};
pub use types::{GameEvent, GameNotice, WorldUpdate};
