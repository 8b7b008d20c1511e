// Entity store: the single aggregate owning all live simulation state.

use crate::domain::geometry::Rect;
use crate::domain::state::{Bullet, Orb, Player, WorldEvent};
use crate::domain::tuning::Tuning;
use crate::domain::world_gen;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;

/// Players keep insertion order (join order); bullets and orbs are ordered by id.
pub struct World {
    pub tuning: Tuning,
    /// Immutable after generation; shared with the gateway for map data.
    pub obstacles: Arc<Vec<Rect>>,
    pub players: Vec<Player>,
    pub bullets: Vec<Bullet>,
    pub orbs: Vec<Orb>,
    pub rng: StdRng,

    /// Simulation clock, advanced by `tick_duration` per tick.
    pub now: Duration,
    pub tick: u64,
    pub tick_duration: Duration,

    next_bullet_id: u64,
    next_orb_id: u64,
    pending_orb_respawns: u32,
    events: Vec<WorldEvent>,
}

impl World {
    /// Empty arena with the given obstacles and no orbs.
    pub fn new(tuning: Tuning, obstacles: Vec<Rect>, rng: StdRng) -> Self {
        Self {
            tuning,
            obstacles: Arc::new(obstacles),
            players: Vec::new(),
            bullets: Vec::new(),
            orbs: Vec::new(),
            rng,
            now: Duration::ZERO,
            tick: 0,
            tick_duration: Duration::from_micros(1_000_000 / 60),
            next_bullet_id: 1,
            next_orb_id: 1,
            pending_orb_respawns: 0,
            events: Vec::new(),
        }
    }

    /// Generates the obstacle layout and fills the orb population.
    pub fn generate(tuning: Tuning, mut rng: StdRng) -> Self {
        let obstacles = world_gen::generate_obstacles(&tuning.world, &mut rng);
        let mut world = Self::new(tuning, obstacles, rng);
        while world.spawn_orb().is_some() {}
        world
    }

    pub fn player(&self, id: u64) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: u64) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Key snapshot for iteration that tolerates removals mid-pass.
    pub fn player_ids(&self) -> Vec<u64> {
        self.players.iter().map(|p| p.id).collect()
    }

    /// Returns false if a player with the same id is already live.
    pub fn insert_player(&mut self, player: Player) -> bool {
        if self.player(player.id).is_some() {
            return false;
        }
        self.players.push(player);
        true
    }

    pub fn remove_player(&mut self, id: u64) -> Option<Player> {
        let index = self.players.iter().position(|p| p.id == id)?;
        Some(self.players.remove(index))
    }

    pub fn is_name_taken(&self, name: &str) -> bool {
        let name = name.trim();
        self.players
            .iter()
            .any(|p| p.name.to_lowercase() == name.to_lowercase())
    }

    /// Assigns the next bullet id and stores the bullet.
    pub fn spawn_bullet(&mut self, mut bullet: Bullet) -> u64 {
        bullet.id = self.next_bullet_id;
        self.next_bullet_id += 1;
        let id = bullet.id;
        self.bullets.push(bullet);
        id
    }

    pub fn bullet_index(&self, id: u64) -> Option<usize> {
        self.bullets.binary_search_by_key(&id, |b| b.id).ok()
    }

    pub fn bullet_ids(&self) -> Vec<u64> {
        self.bullets.iter().map(|b| b.id).collect()
    }

    pub fn remove_bullet(&mut self, id: u64) -> Option<Bullet> {
        let index = self.bullet_index(id)?;
        Some(self.bullets.remove(index))
    }

    /// Places one orb if the live population is below target.
    pub fn spawn_orb(&mut self) -> Option<u64> {
        if self.orbs.len() >= self.tuning.world.orb_target {
            return None;
        }
        let (x, y, radius) =
            world_gen::find_safe_orb_location(&self.obstacles, &self.tuning.world, &mut self.rng);
        let id = self.next_orb_id;
        self.next_orb_id += 1;
        self.orbs.push(Orb { id, x, y, radius });
        Some(id)
    }

    pub fn insert_orb(&mut self, x: f32, y: f32, radius: f32) -> u64 {
        let id = self.next_orb_id;
        self.next_orb_id += 1;
        self.orbs.push(Orb { id, x, y, radius });
        id
    }

    pub fn remove_orb(&mut self, id: u64) -> Option<Orb> {
        let index = self.orbs.iter().position(|o| o.id == id)?;
        Some(self.orbs.remove(index))
    }

    /// Records that a consumed orb should be replaced after a delay.
    pub fn request_orb_respawn(&mut self) {
        if self.orbs.len() < self.tuning.world.orb_target {
            self.pending_orb_respawns += 1;
        }
    }

    pub fn take_orb_respawns(&mut self) -> u32 {
        std::mem::take(&mut self.pending_orb_respawns)
    }

    pub fn push_event(&mut self, event: WorldEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }
}
