// Lifecycle bookkeeping: spawning, damage/death resolution, regeneration, pickups and ranking.

use crate::domain::geometry::distance;
use crate::domain::kits::KitId;
use crate::domain::state::{DeathCause, LeaderboardEntry, Player, WorldEvent};
use crate::domain::tuning::PlayerTuning;
use crate::domain::world::World;
use crate::domain::world_gen::{self, SpawnExclusion};
use tracing::{debug, info};

pub const LEADERBOARD_SIZE: usize = 5;

/// Creates a player at a safe spawn point with a fresh invincibility window.
///
/// Returns false when the id is already live; a dead player re-joins under the same id.
pub fn spawn_player(world: &mut World, id: u64, name: String, kit: KitId) -> bool {
    if world.player(id).is_some() {
        return false;
    }

    let profile = kit.profile();
    let exclusion = SpawnExclusion::PullFields {
        radius: world.tuning.combat.gravity.radius,
    };
    let (x, y) = world_gen::find_safe_spawn(
        &world.obstacles,
        &world.players,
        profile.radius,
        &world.tuning.world,
        exclusion,
        &mut world.rng,
    );

    let mut player = Player::new(id, name, kit, x, y);
    player.stamina = world.tuning.player.stamina_max;
    player.invincible_until = world.now + world.tuning.player.spawn_invincibility;
    player.invincible = true;
    world.insert_player(player)
}

/// Applies damage and resolves the death if it is lethal. Returns true if the victim died.
///
/// Players inside their invincibility window are left untouched.
pub fn damage_player(
    world: &mut World,
    victim_id: u64,
    amount: f32,
    attacker_id: Option<u64>,
    cause: DeathCause,
) -> bool {
    let suppress = world.tuning.player.regen_suppress_on_hit;
    let now = world.now;
    let Some(victim) = world.player_mut(victim_id) else {
        return false;
    };
    if victim.is_invincible(now) {
        return false;
    }

    victim.hp -= amount;
    victim.regen_suppress = suppress;
    if victim.hp > 0.0 {
        return false;
    }

    resolve_death(world, victim_id, attacker_id, cause);
    true
}

/// Removes the victim and credits the attacker, if the attacker is still live.
pub fn resolve_death(
    world: &mut World,
    victim_id: u64,
    attacker_id: Option<u64>,
    cause: DeathCause,
) {
    let Some(victim) = world.remove_player(victim_id) else {
        return;
    };

    let reward = world.tuning.combat.rewards.for_cause(cause);
    let heal = world.tuning.player.kill_heal;
    let killer = attacker_id
        .and_then(|id| world.player_mut(id))
        .map(|killer| {
            killer.score += reward;
            killer.heal(heal);
            (killer.id, killer.name.clone())
        });

    info!(
        victim_id,
        killer_id = killer.as_ref().map(|(id, _)| *id),
        cause = cause.as_str(),
        "player killed"
    );

    world.push_event(WorldEvent::Kill {
        killer_id: killer.as_ref().map(|(id, _)| *id),
        killer_name: killer.map(|(_, name)| name),
        victim_id,
        victim_name: victim.name,
        cause,
    });
}

/// Passive healing, gated by the suppression counter.
pub fn regenerate(player: &mut Player, tuning: &PlayerTuning) {
    if player.regen_suppress > 0 {
        player.regen_suppress -= 1;
    } else if player.hp < player.max_hp {
        player.heal(tuning.regen_per_tick);
    }
}

/// Consumes every orb the player's hitbox touches.
pub fn collect_orbs(world: &mut World, player_id: u64) {
    let Some(player) = world.player(player_id) else {
        return;
    };
    let (x, y, r) = (player.x, player.y, player.radius());
    let touched: Vec<u64> = world
        .orbs
        .iter()
        .filter(|orb| distance(x, y, orb.x, orb.y) < r + orb.radius)
        .map(|orb| orb.id)
        .collect();

    let score = world.tuning.player.orb_score;
    let heal = world.tuning.player.orb_heal;
    for orb_id in touched {
        if world.remove_orb(orb_id).is_none() {
            continue;
        }
        if let Some(player) = world.player_mut(player_id) {
            player.score += score;
            player.heal(heal);
        }
        debug!(player_id, orb_id, "orb collected");
        world.request_orb_respawn();
    }
}

/// Top players by score; ties keep join order.
pub fn leaderboard(players: &[Player]) -> Vec<LeaderboardEntry> {
    let mut ranked: Vec<&Player> = players.iter().collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
        .into_iter()
        .take(LEADERBOARD_SIZE)
        .map(LeaderboardEntry::from)
        .collect()
}
