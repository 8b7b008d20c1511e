// World generation: obstacle layout and rejection-sampled safe placements.
//
// Every search runs against a fixed attempt budget and degrades instead of failing:
// fewer obstacles, or the map center as a last-resort position.

use crate::domain::geometry::{Circle, Rect, circle_hits_any, distance, rects_overlap};
use crate::domain::kits::Special;
use crate::domain::state::Player;
use crate::domain::tuning::WorldTuning;
use rand::Rng;
use tracing::debug;

/// Extra spacing rules applied when placing a player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnExclusion {
    None,
    /// Keep clear of every live gravity well's pull field.
    PullFields { radius: f32 },
}

pub fn generate_obstacles<R: Rng>(tuning: &WorldTuning, rng: &mut R) -> Vec<Rect> {
    let mut obstacles: Vec<Rect> = Vec::with_capacity(tuning.obstacle_count);
    let mut attempts = 0;

    while obstacles.len() < tuning.obstacle_count && attempts < tuning.obstacle_attempts {
        attempts += 1;
        let w = rng.gen_range(tuning.obstacle_min_side..=tuning.obstacle_max_side);
        let h = rng.gen_range(tuning.obstacle_min_side..=tuning.obstacle_max_side);
        let candidate = Rect {
            x: rng.gen_range(0.0..=tuning.map_size - w),
            y: rng.gen_range(0.0..=tuning.map_size - h),
            w,
            h,
        };

        let clear = obstacles
            .iter()
            .all(|placed| !rects_overlap(&candidate, placed, tuning.obstacle_padding));
        if clear {
            obstacles.push(candidate);
        }
    }

    if obstacles.len() < tuning.obstacle_count {
        debug!(
            placed = obstacles.len(),
            requested = tuning.obstacle_count,
            attempts,
            "obstacle budget exhausted; using sparser map"
        );
    }
    obstacles
}

/// Returns `(x, y, radius)` for a new orb.
pub fn find_safe_orb_location<R: Rng>(
    obstacles: &[Rect],
    tuning: &WorldTuning,
    rng: &mut R,
) -> (f32, f32, f32) {
    let inset = tuning.orb_edge_inset;
    for _ in 0..tuning.placement_attempts {
        let x = rng.gen_range(inset..=tuning.map_size - inset);
        let y = rng.gen_range(inset..=tuning.map_size - inset);
        let radius = rng.gen_range(tuning.orb_min_radius..=tuning.orb_max_radius);
        let probe = Circle {
            x,
            y,
            r: radius + tuning.orb_obstacle_clearance,
        };
        if !circle_hits_any(probe, obstacles) {
            return (x, y, radius);
        }
    }

    let (x, y) = tuning.center();
    (x, y, (tuning.orb_min_radius + tuning.orb_max_radius) / 2.0)
}

pub fn find_safe_spawn<R: Rng>(
    obstacles: &[Rect],
    players: &[Player],
    radius: f32,
    tuning: &WorldTuning,
    exclusion: SpawnExclusion,
    rng: &mut R,
) -> (f32, f32) {
    let lo = radius.min(tuning.map_size / 2.0);
    let hi = tuning.map_size - lo;
    for _ in 0..tuning.placement_attempts {
        let x = rng.gen_range(lo..=hi);
        let y = rng.gen_range(lo..=hi);
        let probe = Circle {
            x,
            y,
            r: radius + tuning.spawn_obstacle_buffer,
        };
        if circle_hits_any(probe, obstacles) {
            continue;
        }
        if let SpawnExclusion::PullFields { radius: field } = exclusion {
            let inside_field = players.iter().any(|p| {
                p.profile().special == Special::AreaPull
                    && distance(x, y, p.x, p.y) < field + radius
            });
            if inside_field {
                continue;
            }
        }
        return (x, y);
    }

    debug!(radius, "spawn budget exhausted; falling back to map center");
    tuning.center()
}
