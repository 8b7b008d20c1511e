use super::types::{GameEvent, GameNotice, WorldUpdate};
use crate::domain::systems::{bouncy, gravity, lifecycle, mimic, movement, projectiles};
use crate::domain::{Special, World, WorldEvent};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

/// Display name used when a kill has no live credited attacker.
pub const UNKNOWN_KILLER: &str = "Unknown";

/// Everything one tick produced for the outbound side.
#[derive(Debug)]
pub struct TickOutcome {
    pub update: WorldUpdate,
    pub notices: Vec<GameNotice>,
    /// Orbs consumed this tick that should be replaced after a delay.
    pub orb_respawns: u32,
}

pub async fn world_task(
    mut world: World,
    mut input_rx: mpsc::Receiver<GameEvent>,
    respawn_tx: mpsc::WeakSender<GameEvent>,
    world_tx: broadcast::Sender<WorldUpdate>,
    notice_tx: broadcast::Sender<GameNotice>,
    tick_interval: Duration,
) {
    // Drive the fixed-step game loop at the configured tick rate.
    let mut interval = tokio::time::interval(tick_interval);

    loop {
        interval.tick().await;

        // Apply every pending intent before simulating, so the tick sees a settled world.
        loop {
            match input_rx.try_recv() {
                Ok(ev) => apply_event(&mut world, ev),
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    info!(tick = world.tick, "input channel closed; stopping world task");
                    return;
                }
            }
        }

        let outcome = run_tick(&mut world);

        for notice in outcome.notices {
            let _ = notice_tx.send(notice);
        }
        // No subscribers is fine; the next tick carries full state anyway.
        let _ = world_tx.send(outcome.update);

        let (min, max) = (
            world.tuning.world.orb_respawn_min,
            world.tuning.world.orb_respawn_max,
        );
        for _ in 0..outcome.orb_respawns {
            let delay_ms = world
                .rng
                .gen_range(min.as_millis() as u64..=max.as_millis() as u64);
            schedule_orb_respawn(&respawn_tx, Duration::from_millis(delay_ms));
        }
    }
}

/// Sleeps off the delay, then asks the world task to place a replacement orb.
///
/// The sender is weak so pending timers never keep a shut-down world alive.
pub fn schedule_orb_respawn(respawn_tx: &mpsc::WeakSender<GameEvent>, delay: Duration) {
    let respawn_tx = respawn_tx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let Some(tx) = respawn_tx.upgrade() else {
            return;
        };
        if tx.send(GameEvent::SpawnOrb).await.is_err() {
            debug!("world gone before orb respawn fired");
        }
    });
}

/// Applies a single inbound event to the world.
pub fn apply_event(world: &mut World, ev: GameEvent) {
    match ev {
        GameEvent::Join {
            player_id,
            name,
            kit,
        } => {
            if lifecycle::spawn_player(world, player_id, name.clone(), kit) {
                info!(player_id, %name, kit = kit.name(), "player joined");
            } else {
                debug!(player_id, "join ignored; player is still alive");
            }
        }
        GameEvent::Leave { player_id } => {
            // In-flight bullets from this player stay live.
            if world.remove_player(player_id).is_some() {
                info!(player_id, "player left");
            }
        }
        GameEvent::Input {
            player_id,
            input,
            angle,
        } => {
            if let Some(player) = world.player_mut(player_id) {
                player.input = input;
                if angle.is_finite() {
                    player.angle = angle;
                }
            }
        }
        GameEvent::Shoot { player_id } => {
            projectiles::shoot(world, player_id);
        }
        GameEvent::CheckName { name, reply } => {
            if reply.send(world.is_name_taken(&name)).is_err() {
                warn!("name check requester went away");
            }
        }
        GameEvent::SpawnOrb => {
            if let Some(orb_id) = world.spawn_orb() {
                debug!(orb_id, live = world.orbs.len(), "orb respawned");
            }
        }
    }
}

/// Advances the simulation by one fixed step.
pub fn run_tick(world: &mut World) -> TickOutcome {
    world.tick += 1;
    world.now += world.tick_duration;

    gravity::apply_pull(world);

    for player_id in world.player_ids() {
        update_player(world, player_id);
    }

    projectiles::tick_bullets(world);

    let mut notices = Vec::new();
    for event in world.drain_events() {
        push_notices(&mut notices, event);
    }

    TickOutcome {
        update: snapshot(world),
        notices,
        orb_respawns: world.take_orb_respawns(),
    }
}

fn update_player(world: &mut World, player_id: u64) {
    let now = world.now;
    let tuning = world.tuning;
    let Some(player) = world.player_mut(player_id) else {
        return;
    };

    player.invincible = player.is_invincible(now);
    lifecycle::regenerate(player, &tuning.player);
    let special = player.profile().special;

    if special == Special::ProximityMine && !mimic::try_detonate(world, player_id) {
        return;
    }

    let obstacles = Arc::clone(&world.obstacles);
    let Some(player) = world.player_mut(player_id) else {
        return;
    };
    match special {
        Special::Elastic => bouncy::move_elastic(
            player,
            &obstacles,
            tuning.world.map_size,
            &tuning.player,
            &tuning.combat.bouncy,
        ),
        Special::Standard | Special::AreaPull | Special::ProximityMine => {
            movement::move_walker(player, &obstacles, &tuning.player)
        }
    }
    if special == Special::Elastic {
        bouncy::resolve_ram(world, player_id);
    }

    let Some(player) = world.player_mut(player_id) else {
        return;
    };
    movement::clamp_to_map(player, tuning.world.map_size);
    player.cooldown = player.cooldown.saturating_sub(1);

    lifecycle::collect_orbs(world, player_id);
}

fn push_notices(notices: &mut Vec<GameNotice>, event: WorldEvent) {
    match event {
        WorldEvent::Hit { x, y } => notices.push(GameNotice::Hit { x, y }),
        WorldEvent::Kill {
            killer_name,
            victim_id,
            victim_name,
            cause,
            ..
        } => {
            let killer = killer_name.unwrap_or_else(|| UNKNOWN_KILLER.to_string());
            notices.push(GameNotice::KillFeed {
                killer: killer.clone(),
                victim: victim_name,
            });
            notices.push(GameNotice::YouDied {
                player_id: victim_id,
                killer,
                cause,
            });
        }
    }
}

/// Read-only projection of the live world.
pub fn snapshot(world: &World) -> WorldUpdate {
    WorldUpdate {
        tick: world.tick,
        players: world.players.iter().map(Into::into).collect(),
        bullets: world.bullets.iter().map(Into::into).collect(),
        orbs: world.orbs.iter().map(Into::into).collect(),
        // Ranked after the tick's deaths so every entry is a live player.
        leaderboard: lifecycle::leaderboard(&world.players),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::{Rect, circle_intersects_rect};
    use crate::domain::state::{Bullet, Player};
    use crate::domain::tuning::Tuning;
    use crate::domain::{DeathCause, KitId, PlayerInput};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tokio::sync::oneshot;
    use tokio::time::timeout;

    fn empty_world() -> World {
        World::new(Tuning::default(), Vec::new(), StdRng::seed_from_u64(99))
    }

    fn join(world: &mut World, player_id: u64, name: &str, kit: KitId) {
        apply_event(
            world,
            GameEvent::Join {
                player_id,
                name: name.to_string(),
                kit,
            },
        );
    }

    fn steer(player_id: u64, phase: u64) -> GameEvent {
        let input = match phase % 4 {
            0 => PlayerInput {
                right: true,
                down: true,
                sprint: true,
                ..PlayerInput::default()
            },
            1 => PlayerInput {
                left: true,
                ..PlayerInput::default()
            },
            2 => PlayerInput {
                up: true,
                left: true,
                ..PlayerInput::default()
            },
            _ => PlayerInput {
                down: true,
                sprint: true,
                ..PlayerInput::default()
            },
        };
        GameEvent::Input {
            player_id,
            input,
            angle: 0.0,
        }
    }

    #[test]
    fn when_players_roam_then_they_stay_in_bounds_and_out_of_obstacles() {
        let block = Rect {
            x: 700.0,
            y: 700.0,
            w: 200.0,
            h: 200.0,
        };
        let mut world = World::new(Tuning::default(), vec![block], StdRng::seed_from_u64(5));
        let kits = [KitId::Assault, KitId::Tank, KitId::Gravity, KitId::Bouncy, KitId::Sniper];
        for (i, kit) in kits.into_iter().enumerate() {
            join(&mut world, i as u64 + 1, kit.name(), kit);
        }

        for tick in 0..900u64 {
            if tick % 45 == 0 {
                for id in world.player_ids() {
                    apply_event(&mut world, steer(id, tick / 45 + id));
                }
            }
            run_tick(&mut world);

            for p in &world.players {
                assert!((0.0..=1600.0).contains(&p.x), "tick {tick}: {p:?}");
                assert!((0.0..=1600.0).contains(&p.y), "tick {tick}: {p:?}");
                assert!(!circle_intersects_rect(p.hitbox(), &block), "tick {tick}: {p:?}");
            }
        }
    }

    #[test]
    fn when_snapshot_is_read_twice_then_results_match() {
        let mut world = World::generate(Tuning::default(), StdRng::seed_from_u64(3));
        join(&mut world, 1, "a", KitId::Shotgun);
        join(&mut world, 2, "b", KitId::Mimic);
        apply_event(&mut world, GameEvent::Shoot { player_id: 1 });
        run_tick(&mut world);

        let first = snapshot(&world);
        assert_eq!(first, snapshot(&world));
        assert_eq!(first.tick, 1);
        assert_eq!(first.players.len(), 2);
    }

    #[test]
    fn when_lethal_bullet_lands_then_one_kill_feed_and_one_death_notice_name_the_shooter() {
        let mut world = empty_world();
        world.insert_player(Player::new(1, "Shooter".into(), KitId::Assault, 800.0, 800.0));
        let mut victim = Player::new(2, "Victim".into(), KitId::Assault, 830.0, 800.0);
        victim.hp = 5.0;
        world.insert_player(victim);
        world.spawn_bullet(Bullet {
            id: 0,
            owner_id: 1,
            x: 815.0,
            y: 800.0,
            vx: 8.0,
            vy: 0.0,
            range: 450.0,
            traveled: 0.0,
            damage: 8.0,
        });

        let outcome = run_tick(&mut world);

        assert!(outcome.update.players.iter().all(|p| p.id != 2));
        assert!(outcome.update.leaderboard.iter().all(|e| e.id != 2));
        let feeds: Vec<_> = outcome
            .notices
            .iter()
            .filter(|n| matches!(n, GameNotice::KillFeed { .. }))
            .collect();
        assert_eq!(
            feeds,
            vec![&GameNotice::KillFeed {
                killer: "Shooter".into(),
                victim: "Victim".into(),
            }]
        );
        let deaths: Vec<_> = outcome
            .notices
            .iter()
            .filter(|n| matches!(n, GameNotice::YouDied { .. }))
            .collect();
        assert_eq!(
            deaths,
            vec![&GameNotice::YouDied {
                player_id: 2,
                killer: "Shooter".into(),
                cause: DeathCause::Bullet,
            }]
        );
        assert_eq!(outcome.update.players[0].score, 100);
    }

    #[test]
    fn when_killer_is_gone_then_notices_use_placeholder_name() {
        let mut notices = Vec::new();
        push_notices(
            &mut notices,
            WorldEvent::Kill {
                killer_id: None,
                killer_name: None,
                victim_id: 9,
                victim_name: "v".into(),
                cause: DeathCause::Mimic,
            },
        );

        assert_eq!(
            notices[0],
            GameNotice::KillFeed {
                killer: UNKNOWN_KILLER.into(),
                victim: "v".into(),
            }
        );
    }

    #[test]
    fn when_many_players_score_then_leaderboard_is_sorted_top_five() {
        let mut world = empty_world();
        for id in 1..=7u64 {
            let mut p = Player::new(id, format!("p{id}"), KitId::Assault, 100.0 * id as f32, 300.0);
            p.score = (id as u32 * 37) % 11;
            world.insert_player(p);
        }

        let update = run_tick(&mut world).update;

        assert_eq!(update.leaderboard.len(), 5);
        assert!(update.leaderboard.windows(2).all(|w| w[0].score >= w[1].score));
        for entry in &update.leaderboard {
            assert!(update.players.iter().any(|p| p.id == entry.id));
        }
    }

    #[test]
    fn when_live_player_rejoins_then_join_is_ignored() {
        let mut world = empty_world();
        join(&mut world, 1, "first", KitId::Tank);
        join(&mut world, 1, "second", KitId::Sniper);

        assert_eq!(world.players.len(), 1);
        assert_eq!(world.players[0].name, "first");

        apply_event(&mut world, GameEvent::Leave { player_id: 1 });
        join(&mut world, 1, "second", KitId::Sniper);
        assert_eq!(world.players[0].kit, KitId::Sniper);
    }

    #[test]
    fn when_input_angle_is_not_finite_then_previous_angle_is_kept() {
        let mut world = empty_world();
        join(&mut world, 1, "a", KitId::Assault);
        apply_event(
            &mut world,
            GameEvent::Input {
                player_id: 1,
                input: PlayerInput::default(),
                angle: 1.25,
            },
        );
        apply_event(
            &mut world,
            GameEvent::Input {
                player_id: 1,
                input: PlayerInput::default(),
                angle: f32::NAN,
            },
        );

        assert_eq!(world.player(1).unwrap().angle, 1.25);
    }

    #[test]
    fn when_name_is_checked_then_reply_reflects_live_players() {
        let mut world = empty_world();
        join(&mut world, 1, "Alice", KitId::Assault);

        let (reply, mut rx) = oneshot::channel();
        apply_event(
            &mut world,
            GameEvent::CheckName {
                name: " alice ".into(),
                reply,
            },
        );
        assert_eq!(rx.try_recv(), Ok(true));

        let (reply, mut rx) = oneshot::channel();
        apply_event(
            &mut world,
            GameEvent::CheckName {
                name: "bob".into(),
                reply,
            },
        );
        assert_eq!(rx.try_recv(), Ok(false));
    }

    #[test]
    fn when_shooter_fires_in_tick_then_spawn_grace_is_lost() {
        let mut world = empty_world();
        join(&mut world, 1, "a", KitId::Assault);
        run_tick(&mut world);
        assert!(world.player(1).unwrap().invincible);

        apply_event(&mut world, GameEvent::Shoot { player_id: 1 });
        let update = run_tick(&mut world).update;

        assert!(!update.players[0].invincible);
        assert_eq!(update.bullets.len(), 1);
        assert_eq!(world.player(1).unwrap().cooldown, 9);
    }

    #[tokio::test(start_paused = true)]
    async fn when_orb_is_consumed_then_population_recovers_within_max_delay() {
        let mut tuning = Tuning::default();
        tuning.world.orb_target = 3;
        let mut world = World::new(tuning, Vec::new(), StdRng::seed_from_u64(21));
        while world.spawn_orb().is_some() {}
        let (ox, oy) = (world.orbs[0].x, world.orbs[0].y);
        world.insert_player(Player::new(1, "eater".into(), KitId::Assault, ox, oy));

        let (input_tx, input_rx) = mpsc::channel(64);
        let (world_tx, mut world_rx) = broadcast::channel(1024);
        let (notice_tx, _notice_rx) = broadcast::channel(64);
        tokio::spawn(world_task(
            world,
            input_rx,
            input_tx.downgrade(),
            world_tx,
            notice_tx,
            Duration::from_millis(16),
        ));

        let first = world_rx.recv().await.unwrap();
        assert_eq!(first.orbs.len(), 2);
        assert_eq!(first.players[0].score, 5);

        let recovered = timeout(Duration::from_secs(3), async {
            loop {
                match world_rx.recv().await {
                    Ok(update) if update.orbs.len() == 3 => break update,
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => panic!("world task stopped"),
                }
            }
        })
        .await
        .expect("orb population should recover");
        assert_eq!(recovered.orbs.len(), 3);
        drop(input_tx);
    }

    #[tokio::test(start_paused = true)]
    async fn when_all_senders_drop_then_world_task_stops() {
        let (input_tx, input_rx) = mpsc::channel(8);
        let (world_tx, _world_rx) = broadcast::channel(8);
        let (notice_tx, _notice_rx) = broadcast::channel(8);
        let handle = tokio::spawn(world_task(
            empty_world(),
            input_rx,
            input_tx.downgrade(),
            world_tx,
            notice_tx,
            Duration::from_millis(16),
        ));

        drop(input_tx);

        assert!(timeout(Duration::from_secs(1), handle).await.is_ok());
    }
}
