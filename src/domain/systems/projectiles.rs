use crate::domain::geometry::distance;
use crate::domain::state::{Bullet, DeathCause, WorldEvent};
use crate::domain::systems::lifecycle;
use crate::domain::world::World;
use rand::Rng;
use tracing::debug;

/// Fires the player's kit if it is off cooldown and allowed to shoot.
///
/// Returns the number of bullets spawned.
pub fn shoot(world: &mut World, player_id: u64) -> usize {
    let now = world.now;
    let Some(player) = world.player(player_id) else {
        return 0;
    };
    let profile = player.profile();
    if player.cooldown > 0 || !profile.special.can_fire() {
        return 0;
    }
    let (x, y, angle) = (player.x, player.y, player.angle);

    let half_spread = profile.spread / 2.0;
    for _ in 0..profile.pellet_count {
        let heading = angle + world.rng.gen_range(-half_spread..=half_spread);
        world.spawn_bullet(Bullet {
            id: 0,
            owner_id: player_id,
            x,
            y,
            vx: heading.cos() * profile.projectile_speed,
            vy: heading.sin() * profile.projectile_speed,
            range: profile.range,
            traveled: 0.0,
            damage: profile.damage,
        });
    }

    let suppress = world.tuning.player.regen_suppress_on_fire;
    if let Some(player) = world.player_mut(player_id) {
        player.cooldown = profile.cooldown_ticks;
        player.regen_suppress = suppress;
        // Firing forfeits the spawn grace period.
        player.invincible_until = now;
        player.invincible = false;
    }
    profile.pellet_count as usize
}

pub fn tick_bullets(world: &mut World) {
    let now = world.now;
    let map_size = world.tuning.world.map_size;

    for bullet_id in world.bullet_ids() {
        let Some(index) = world.bullet_index(bullet_id) else {
            continue;
        };

        // Integrate movement and range.
        let bullet = &mut world.bullets[index];
        bullet.x += bullet.vx;
        bullet.y += bullet.vy;
        bullet.traveled += bullet.vx.hypot(bullet.vy);
        let bullet = bullet.clone();

        let out_of_bounds =
            bullet.x < 0.0 || bullet.x > map_size || bullet.y < 0.0 || bullet.y > map_size;
        if bullet.traveled > bullet.range || out_of_bounds {
            world.bullets.remove(index);
            continue;
        }

        if world
            .obstacles
            .iter()
            .any(|rect| rect.contains_point(bullet.x, bullet.y))
        {
            world.bullets.remove(index);
            continue;
        }

        // First live, vulnerable, non-owner player in join order takes the hit.
        let victim_id = world
            .players
            .iter()
            .filter(|p| p.id != bullet.owner_id && !p.is_invincible(now))
            .find(|p| distance(p.x, p.y, bullet.x, bullet.y) < p.radius())
            .map(|p| p.id);
        let Some(victim_id) = victim_id else {
            continue;
        };

        world.bullets.remove(index);
        world.push_event(WorldEvent::Hit {
            x: bullet.x,
            y: bullet.y,
        });
        debug!(
            victim_id,
            shooter_id = bullet.owner_id,
            bullet_id = bullet.id,
            damage = bullet.damage,
            "player hit"
        );
        lifecycle::damage_player(
            world,
            victim_id,
            bullet.damage,
            Some(bullet.owner_id),
            DeathCause::Bullet,
        );
    }
}
