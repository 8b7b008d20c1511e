// Wire protocol DTOs and conversions for public game server messages.

use crate::domain::{
    BulletSnapshot, LeaderboardEntry, OrbSnapshot, PlayerInput, PlayerSnapshot, Rect,
};
use crate::use_cases::{GameNotice, WorldUpdate};
use serde::{Deserialize, Serialize};

pub const MAX_NAME_LEN: usize = 16;
pub const DEFAULT_NAME: &str = "Player";

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    // Assigned identity for the connection after Join is accepted.
    Identity { player_id: u64 },
    // Static layout, sent once when the socket opens.
    MapData(MapDataDto),
    // Snapshot of the world for a given tick.
    WorldUpdate(WorldUpdateDto),
    Hit { x: f32, y: f32 },
    KillFeed { killer: String, victim: String },
    // Only ever sent to the victim's own connection.
    YouDied { killer: String, cause: String },
    Pong { t: f64 },
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    // First message on every connection; repeated later to respawn.
    Join(JoinPayload),
    Input(PlayerInputDto),
    Shoot,
    Ping { t: f64 },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JoinPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kit: Option<String>,
}

/// Held movement keys plus facing, sent whenever either changes.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerInputDto {
    #[serde(default)]
    pub up: bool,
    #[serde(default)]
    pub down: bool,
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub right: bool,
    #[serde(default)]
    pub sprint: bool,
    #[serde(default)]
    pub angle: f32,
}

impl From<&PlayerInputDto> for PlayerInput {
    fn from(input: &PlayerInputDto) -> Self {
        Self {
            up: input.up,
            down: input.down,
            left: input.left,
            right: input.right,
            sprint: input.sprint,
        }
    }
}

/// Trims a requested display name; blank names get the default, long ones are cut.
pub fn sanitize_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_NAME.to_string();
    }
    trimmed.chars().take(MAX_NAME_LEN).collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct MapDataDto {
    pub map_size: f32,
    pub obstacles: Vec<ObstacleDto>,
}

impl MapDataDto {
    pub fn new(map_size: f32, obstacles: &[Rect]) -> Self {
        Self {
            map_size,
            obstacles: obstacles.iter().map(ObstacleDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ObstacleDto {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl From<&Rect> for ObstacleDto {
    fn from(rect: &Rect) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            w: rect.w,
            h: rect.h,
        }
    }
}

/// Snapshot of the world sent to clients on each tick.
#[derive(Debug, Clone, Serialize)]
pub struct WorldUpdateDto {
    pub tick: u64,
    pub players: Vec<PlayerStateDto>,
    pub bullets: Vec<BulletStateDto>,
    pub orbs: Vec<OrbStateDto>,
    pub leaderboard: Vec<LeaderboardEntryDto>,
}

impl From<WorldUpdate> for WorldUpdateDto {
    fn from(update: WorldUpdate) -> Self {
        Self {
            tick: update.tick,
            players: update.players.iter().map(PlayerStateDto::from).collect(),
            bullets: update.bullets.iter().map(BulletStateDto::from).collect(),
            orbs: update.orbs.iter().map(OrbStateDto::from).collect(),
            leaderboard: update
                .leaderboard
                .iter()
                .map(LeaderboardEntryDto::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerStateDto {
    pub id: u64,
    pub name: String,
    pub kit: &'static str,
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

impl From<&PlayerSnapshot> for PlayerStateDto {
    fn from(p: &PlayerSnapshot) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            kit: p.kit.name(),
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

#[derive(Debug, Clone, Serialize)]
pub struct BulletStateDto {
    pub id: u64,
    pub owner_id: u64,
    pub x: f32,
    pub y: f32,
}

impl From<&BulletSnapshot> for BulletStateDto {
    fn from(b: &BulletSnapshot) -> Self {
        Self {
            id: b.id,
            owner_id: b.owner_id,
            x: b.x,
            y: b.y,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrbStateDto {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl From<&OrbSnapshot> for OrbStateDto {
    fn from(o: &OrbSnapshot) -> Self {
        Self {
            id: o.id,
            x: o.x,
            y: o.y,
            radius: o.radius,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntryDto {
    pub id: u64,
    pub name: String,
    pub score: u32,
}

impl From<&LeaderboardEntry> for LeaderboardEntryDto {
    fn from(e: &LeaderboardEntry) -> Self {
        Self {
            id: e.id,
            name: e.name.clone(),
            score: e.score,
        }
    }
}

impl From<GameNotice> for ServerMessage {
    fn from(notice: GameNotice) -> Self {
        match notice {
            GameNotice::Hit { x, y } => ServerMessage::Hit { x, y },
            GameNotice::KillFeed { killer, victim } => ServerMessage::KillFeed { killer, victim },
            GameNotice::YouDied { killer, cause, .. } => ServerMessage::YouDied {
                killer,
                cause: cause.as_str().to_string(),
            },
        }
    }
}
