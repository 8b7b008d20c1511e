// Wiring for the single authoritative world task and its outbound channels.

use crate::domain::{Rect, World};
use crate::use_cases::game::world_task;
use crate::use_cases::{GameEvent, GameNotice, WorldUpdate};
use axum::extract::ws::Utf8Bytes;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::info;

/// Channel sizing and cadence for the world task.
#[derive(Debug, Clone)]
pub struct WorldSettings {
    /// Capacity for inbound player events.
    pub input_channel_capacity: usize,
    /// Capacity for broadcast world updates.
    pub world_broadcast_capacity: usize,
    /// Capacity for hit/kill/death notices.
    pub event_broadcast_capacity: usize,
    /// Fixed tick interval for the game loop.
    pub tick_interval: Duration,
}

/// Everything a connection needs to talk to the running world.
#[derive(Clone)]
pub struct WorldHandle {
    /// Sender for game events into the world task.
    pub input_tx: mpsc::Sender<GameEvent>,
    /// Broadcast sender for raw world updates.
    pub world_tx: broadcast::Sender<WorldUpdate>,
    /// Broadcast sender for serialized world updates.
    pub world_bytes_tx: broadcast::Sender<Utf8Bytes>,
    /// Watch sender holding the latest serialized world update.
    pub world_latest_tx: watch::Sender<Utf8Bytes>,
    /// Broadcast sender for per-tick notices.
    pub notice_tx: broadcast::Sender<GameNotice>,
    /// Static map layout, sent once to each new connection.
    pub obstacles: Arc<Vec<Rect>>,
    pub map_size: f32,
}

/// Spawns the world task that owns `world` and returns the handle to it.
pub fn spawn_world(settings: &WorldSettings, world: World) -> WorldHandle {
    let (input_tx, input_rx) = mpsc::channel::<GameEvent>(settings.input_channel_capacity);
    let (world_tx, _world_rx) =
        broadcast::channel::<WorldUpdate>(settings.world_broadcast_capacity);
    let (world_bytes_tx, _world_bytes_rx) =
        broadcast::channel::<Utf8Bytes>(settings.world_broadcast_capacity);
    let (world_latest_tx, _world_latest_rx) = watch::channel::<Utf8Bytes>(Utf8Bytes::from(""));
    let (notice_tx, _notice_rx) =
        broadcast::channel::<GameNotice>(settings.event_broadcast_capacity);

    let obstacles = Arc::clone(&world.obstacles);
    let map_size = world.tuning.world.map_size;
    info!(
        obstacles = obstacles.len(),
        orbs = world.orbs.len(),
        map_size,
        "world generated"
    );

    tokio::spawn(world_task(
        world,
        input_rx,
        input_tx.downgrade(),
        world_tx.clone(),
        notice_tx.clone(),
        settings.tick_interval,
    ));

    WorldHandle {
        input_tx,
        world_tx,
        world_bytes_tx,
        world_latest_tx,
        notice_tx,
        obstacles,
        map_size,
    }
}
