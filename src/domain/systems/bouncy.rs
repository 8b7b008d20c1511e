// Elastic kit: acceleration-driven motion that rebounds off walls and rams other players.

use crate::domain::geometry::{Rect, circle_hits_any, distance};
use crate::domain::state::{DeathCause, Player, WorldEvent};
use crate::domain::systems::lifecycle;
use crate::domain::systems::movement::{Axis, input_direction, update_stamina};
use crate::domain::tuning::{BouncyTuning, PlayerTuning};
use crate::domain::world::World;
use tracing::debug;

pub fn move_elastic(
    player: &mut Player,
    obstacles: &[Rect],
    map_size: f32,
    tuning: &PlayerTuning,
    bouncy: &BouncyTuning,
) {
    let accel = player.profile().speed * update_stamina(player, tuning);
    let (dx, dy) = input_direction(&player.input);
    player.vx += dx * accel;
    player.vy += dy * accel;

    let speed = player.vx.hypot(player.vy);
    if speed > bouncy.max_speed {
        let scale = bouncy.max_speed / speed;
        player.vx *= scale;
        player.vy *= scale;
    }
    player.vx *= bouncy.damping;
    player.vy *= bouncy.damping;

    bounce_axis(player, Axis::X, obstacles, map_size, bouncy.restitution);
    bounce_axis(player, Axis::Y, obstacles, map_size, bouncy.restitution);
}

/// Integrates one axis; on contact the move is dropped and that velocity component reflected.
fn bounce_axis(player: &mut Player, axis: Axis, obstacles: &[Rect], map_size: f32, restitution: f32) {
    let mut candidate = player.hitbox();
    let (pos, velocity) = match axis {
        Axis::X => {
            candidate.x += player.vx;
            (candidate.x, &mut player.vx)
        }
        Axis::Y => {
            candidate.y += player.vy;
            (candidate.y, &mut player.vy)
        }
    };
    if *velocity == 0.0 {
        return;
    }

    let out_of_bounds = pos < 0.0 || pos > map_size;
    if out_of_bounds || circle_hits_any(candidate, obstacles) {
        *velocity = -*velocity * restitution;
        return;
    }
    player.x = candidate.x;
    player.y = candidate.y;
}

/// Damages every overlapping opponent when moving above the ram threshold.
pub fn resolve_ram(world: &mut World, attacker_id: u64) {
    let now = world.now;
    let bouncy = world.tuning.combat.bouncy;
    let Some(attacker) = world.player(attacker_id) else {
        return;
    };
    let speed = attacker.vx.hypot(attacker.vy);
    if speed <= bouncy.ram_threshold || attacker.cooldown > 0 {
        return;
    }

    let (ax, ay, ar) = (attacker.x, attacker.y, attacker.radius());
    let profile = attacker.profile();
    let damage = speed * profile.damage;

    let victims: Vec<(u64, f32, f32)> = world
        .players
        .iter()
        .filter(|t| t.id != attacker_id && !t.is_invincible(now))
        .filter(|t| distance(ax, ay, t.x, t.y) < ar + t.radius())
        .map(|t| (t.id, t.x, t.y))
        .collect();
    if victims.is_empty() {
        return;
    }

    for (victim_id, x, y) in victims {
        debug!(attacker_id, victim_id, damage, "ram hit");
        world.push_event(WorldEvent::Hit { x, y });
        lifecycle::damage_player(world, victim_id, damage, Some(attacker_id), DeathCause::Ram);
    }

    if let Some(attacker) = world.player_mut(attacker_id) {
        attacker.vx = -attacker.vx * bouncy.ram_deflection;
        attacker.vy = -attacker.vy * bouncy.ram_deflection;
        attacker.cooldown = profile.cooldown_ticks;
        attacker.invincible_until = now;
        attacker.invincible = false;
    }
}
