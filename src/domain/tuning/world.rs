use std::time::Duration;

/// Map layout and pickup population tuning.
#[derive(Debug, Clone, Copy)]
pub struct WorldTuning {
    /// Side length of the square map in world units.
    pub map_size: f32,

    /// Obstacles requested at generation time (fewer may be placed).
    pub obstacle_count: usize,
    pub obstacle_min_side: f32,
    pub obstacle_max_side: f32,
    /// Minimum gap kept between any two obstacles.
    pub obstacle_padding: f32,
    pub obstacle_attempts: u32,

    /// Live orb population the respawn scheduler trends toward.
    pub orb_target: usize,
    pub orb_min_radius: f32,
    pub orb_max_radius: f32,
    pub orb_edge_inset: f32,
    pub orb_obstacle_clearance: f32,
    pub orb_respawn_min: Duration,
    pub orb_respawn_max: Duration,

    /// Rejection-sampling budget for orb and player placement.
    pub placement_attempts: u32,
    /// Extra clearance between a spawning hitbox and obstacles.
    pub spawn_obstacle_buffer: f32,
}

impl WorldTuning {
    pub fn center(&self) -> (f32, f32) {
        (self.map_size / 2.0, self.map_size / 2.0)
    }
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            map_size: 1600.0,
            obstacle_count: 30,
            obstacle_min_side: 60.0,
            obstacle_max_side: 160.0,
            obstacle_padding: 40.0,
            obstacle_attempts: 1000,
            orb_target: 50,
            orb_min_radius: 8.0,
            orb_max_radius: 12.0,
            orb_edge_inset: 30.0,
            orb_obstacle_clearance: 5.0,
            orb_respawn_min: Duration::from_millis(500),
            orb_respawn_max: Duration::from_millis(2500),
            placement_attempts: 50,
            spawn_obstacle_buffer: 20.0,
        }
    }
}
