// Use-case level inputs/outputs for the world task.

use crate::domain::{
    BulletSnapshot, DeathCause, KitId, LeaderboardEntry, OrbSnapshot, PlayerInput, PlayerSnapshot,
};
use tokio::sync::oneshot;

#[derive(Debug)]
pub enum GameEvent {
    Join {
        player_id: u64,
        name: String,
        kit: KitId,
    },
    Leave {
        player_id: u64,
    },
    Input {
        player_id: u64,
        input: PlayerInput,
        angle: f32,
    },
    Shoot {
        player_id: u64,
    },
    /// Name lookup answered against the live player set.
    CheckName {
        name: String,
        reply: oneshot::Sender<bool>,
    },
    /// Delayed orb replacement fired by the respawn scheduler.
    SpawnOrb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorldUpdate {
    pub tick: u64,
    pub players: Vec<PlayerSnapshot>,
    pub bullets: Vec<BulletSnapshot>,
    pub orbs: Vec<OrbSnapshot>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// One-off notifications raised during a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum GameNotice {
    Hit {
        x: f32,
        y: f32,
    },
    KillFeed {
        killer: String,
        victim: String,
    },
    /// Delivered only to the connection that owns `player_id`.
    YouDied {
        player_id: u64,
        killer: String,
        cause: DeathCause,
    },
}
