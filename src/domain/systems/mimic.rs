// Mimic kit: a disguised mine that detonates on the first vulnerable player in reach.

use crate::domain::geometry::distance;
use crate::domain::state::{DeathCause, WorldEvent};
use crate::domain::systems::lifecycle;
use crate::domain::world::World;
use tracing::debug;

/// Checks the trigger and detonates. Returns false if the mine died from its own blast.
pub fn try_detonate(world: &mut World, mine_id: u64) -> bool {
    let now = world.now;
    let mimic = world.tuning.combat.mimic;
    let Some(mine) = world.player(mine_id) else {
        return false;
    };
    if mine.cooldown > 0 {
        return true;
    }

    let (mx, my, mr) = (mine.x, mine.y, mine.radius());
    let profile = mine.profile();
    let target = world
        .players
        .iter()
        .filter(|t| t.id != mine_id && !t.is_invincible(now))
        .find(|t| distance(mx, my, t.x, t.y) <= mr + t.radius() + mimic.trigger_margin)
        .map(|t| (t.id, t.x, t.y));
    let Some((target_id, tx, ty)) = target else {
        return true;
    };

    let dist = distance(mx, my, tx, ty);
    let (nx, ny) = if dist > f32::EPSILON {
        ((tx - mx) / dist, (ty - my) / dist)
    } else {
        (1.0, 0.0)
    };
    if let Some(target) = world.player_mut(target_id) {
        target.vx += nx * mimic.knockback;
        target.vy += ny * mimic.knockback;
    }
    if let Some(mine) = world.player_mut(mine_id) {
        mine.cooldown = profile.cooldown_ticks;
        mine.invincible_until = now;
        mine.invincible = false;
    }
    world.push_event(WorldEvent::Hit { x: tx, y: ty });
    debug!(mine_id, target_id, "mimic detonated");

    // The mine's own death resolves first; a dead mine credits no one for the target.
    let mine_died = lifecycle::damage_player(
        world,
        mine_id,
        mimic.self_damage,
        Some(target_id),
        DeathCause::Mimic,
    );
    let attacker = (!mine_died).then_some(mine_id);
    lifecycle::damage_player(world, target_id, profile.damage, attacker, DeathCause::Mimic);

    !mine_died
}
