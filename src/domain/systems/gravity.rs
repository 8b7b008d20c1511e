// Gravity kit pre-pass: pull players and bullets toward each well, with contact damage.

use crate::domain::geometry::distance;
use crate::domain::kits::Special;
use crate::domain::state::DeathCause;
use crate::domain::systems::lifecycle;
use crate::domain::systems::movement::{Axis, step_axis};
use crate::domain::tuning::GravityTuning;
use crate::domain::world::World;

fn pull_force(g: &GravityTuning, dist: f32) -> f32 {
    g.base_force + g.falloff * (1.0 - dist / g.radius)
}

pub fn apply_pull(world: &mut World) {
    let wells: Vec<u64> = world
        .players
        .iter()
        .filter(|p| p.profile().special == Special::AreaPull)
        .map(|p| p.id)
        .collect();

    for well_id in wells {
        pull_players(world, well_id);
        pull_bullets(world, well_id);
    }
}

fn pull_players(world: &mut World, well_id: u64) {
    let now = world.now;
    let g = world.tuning.combat.gravity;

    for target_id in world.player_ids() {
        if target_id == well_id {
            continue;
        }
        // The well itself may have died from contact damage earlier in this pass.
        let Some(well) = world.player(well_id) else {
            return;
        };
        let (wx, wy, wr) = (well.x, well.y, well.radius());
        let Some(target) = world.player(target_id) else {
            continue;
        };
        if target.is_invincible(now) {
            continue;
        }
        let dist = distance(wx, wy, target.x, target.y);
        if dist >= g.radius || dist <= f32::EPSILON {
            continue;
        }

        let special = target.profile().special;
        let mut force = pull_force(&g, dist);
        if special == Special::AreaPull {
            force *= 2.0;
        }
        let (nx, ny) = ((wx - target.x) / dist, (wy - target.y) / dist);
        let touching = dist < wr + target.radius();

        let Some(index) = world.players.iter().position(|p| p.id == target_id) else {
            continue;
        };
        let target = &mut world.players[index];
        if special == Special::Elastic {
            target.vx += nx * force;
            target.vy += ny * force;
        } else {
            step_axis(target, Axis::X, nx * force, &world.obstacles);
            step_axis(target, Axis::Y, ny * force, &world.obstacles);
        }

        if touching {
            let victim_died = lifecycle::damage_player(
                world,
                target_id,
                g.contact_damage,
                Some(well_id),
                DeathCause::Gravity,
            );
            if victim_died {
                continue;
            }
            let well_died = lifecycle::damage_player(
                world,
                well_id,
                g.contact_damage * g.self_damage_scale,
                Some(target_id),
                DeathCause::Gravity,
            );
            if well_died {
                return;
            }
        }
    }
}

/// Bullets are deflected through their velocity rather than displaced.
fn pull_bullets(world: &mut World, well_id: u64) {
    let g = world.tuning.combat.gravity;
    let Some(well) = world.player(well_id) else {
        return;
    };
    let (wx, wy) = (well.x, well.y);

    for bullet in world.bullets.iter_mut().filter(|b| b.owner_id != well_id) {
        let dist = distance(wx, wy, bullet.x, bullet.y);
        if dist >= g.radius || dist <= f32::EPSILON {
            continue;
        }
        let force = pull_force(&g, dist) * g.bullet_pull_scale;
        bullet.vx += (wx - bullet.x) / dist * force;
        bullet.vy += (wy - bullet.y) / dist * force;
    }
}
