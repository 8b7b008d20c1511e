// Walk-and-slide movement for the standard, gravity and mimic kits.

use crate::domain::geometry::{Rect, circle_hits_any};
use crate::domain::state::{Player, PlayerInput};
use crate::domain::tuning::PlayerTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Unit-length (or zero) direction from the four directional flags.
pub fn input_direction(input: &PlayerInput) -> (f32, f32) {
    let mut dx: f32 = 0.0;
    let mut dy: f32 = 0.0;
    if input.up {
        dy -= 1.0;
    }
    if input.down {
        dy += 1.0;
    }
    if input.left {
        dx -= 1.0;
    }
    if input.right {
        dx += 1.0;
    }

    let len = dx.hypot(dy);
    if len > 0.0 {
        (dx / len, dy / len)
    } else {
        (0.0, 0.0)
    }
}

/// Drains or refills stamina and returns this tick's speed multiplier.
pub fn update_stamina(player: &mut Player, tuning: &PlayerTuning) -> f32 {
    if player.input.sprint && player.stamina > 0.0 {
        player.stamina = (player.stamina - tuning.sprint_drain).max(0.0);
        player.sprinting = true;
        tuning.sprint_multiplier
    } else {
        player.stamina = (player.stamina + tuning.stamina_regen).min(tuning.stamina_max);
        player.sprinting = false;
        1.0
    }
}

/// Moves along one axis, committing only if the hitbox stays clear of every obstacle.
///
/// The candidate keeps the other axis at its current (already committed) value.
pub fn step_axis(player: &mut Player, axis: Axis, delta: f32, obstacles: &[Rect]) -> bool {
    if delta == 0.0 {
        return true;
    }
    let mut candidate = player.hitbox();
    match axis {
        Axis::X => candidate.x += delta,
        Axis::Y => candidate.y += delta,
    }
    if circle_hits_any(candidate, obstacles) {
        return false;
    }
    player.x = candidate.x;
    player.y = candidate.y;
    true
}

pub fn move_walker(player: &mut Player, obstacles: &[Rect], tuning: &PlayerTuning) {
    // Knockback bypasses obstacle checks.
    player.x += player.vx;
    player.y += player.vy;
    player.vx *= tuning.knockback_damping;
    player.vy *= tuning.knockback_damping;
    if player.vx.hypot(player.vy) < tuning.knockback_epsilon {
        player.vx = 0.0;
        player.vy = 0.0;
    }

    let speed = player.profile().speed * update_stamina(player, tuning);
    let (dx, dy) = input_direction(&player.input);
    step_axis(player, Axis::X, dx * speed, obstacles);
    step_axis(player, Axis::Y, dy * speed, obstacles);
}

pub fn clamp_to_map(player: &mut Player, map_size: f32) {
    player.x = player.x.clamp(0.0, map_size);
    player.y = player.y.clamp(0.0, map_size);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::kits::KitId;

    fn walker(x: f32, y: f32, input: PlayerInput) -> Player {
        let mut p = Player::new(1, "w".into(), KitId::Assault, x, y);
        p.input = input;
        p
    }

    #[test]
    fn when_moving_diagonally_then_speed_matches_axis_speed() {
        let tuning = PlayerTuning::default();
        let mut p = walker(
            500.0,
            500.0,
            PlayerInput {
                up: true,
                right: true,
                ..PlayerInput::default()
            },
        );

        move_walker(&mut p, &[], &tuning);

        let moved = (p.x - 500.0).hypot(p.y - 500.0);
        assert!((moved - 5.0).abs() < 1e-4);
        assert!(p.x > 500.0 && p.y < 500.0);
    }

    #[test]
    fn when_one_axis_is_blocked_then_player_slides_along_wall() {
        let tuning = PlayerTuning::default();
        // Wall directly to the right; hitbox edge sits 2 units away.
        let wall = [Rect {
            x: 524.0,
            y: 300.0,
            w: 50.0,
            h: 400.0,
        }];
        let mut p = walker(
            500.0,
            500.0,
            PlayerInput {
                right: true,
                down: true,
                ..PlayerInput::default()
            },
        );

        move_walker(&mut p, &wall, &tuning);

        assert_eq!(p.x, 500.0);
        assert!(p.y > 500.0);
        assert!(!circle_hits_any(p.hitbox(), &wall));
    }

    #[test]
    fn when_sprinting_ten_ticks_then_stamina_drops_by_twelve() {
        let tuning = PlayerTuning::default();
        let mut p = walker(
            500.0,
            500.0,
            PlayerInput {
                sprint: true,
                ..PlayerInput::default()
            },
        );

        for _ in 0..10 {
            move_walker(&mut p, &[], &tuning);
        }

        assert!((p.stamina - 88.0).abs() < 1e-3);
        assert!(p.sprinting);
    }

    #[test]
    fn when_stamina_is_empty_then_sprint_stops_and_stamina_refills() {
        let tuning = PlayerTuning::default();
        let mut p = walker(
            500.0,
            500.0,
            PlayerInput {
                sprint: true,
                right: true,
                ..PlayerInput::default()
            },
        );
        p.stamina = 0.0;

        move_walker(&mut p, &[], &tuning);

        assert!(!p.sprinting);
        assert!((p.stamina - 0.6).abs() < 1e-6);
        assert!((p.x - 505.0).abs() < 1e-4);
    }

    #[test]
    fn when_knockback_is_applied_then_it_decays_to_zero() {
        let tuning = PlayerTuning::default();
        let mut p = walker(500.0, 500.0, PlayerInput::default());
        p.vx = 10.0;

        move_walker(&mut p, &[], &tuning);
        assert!((p.x - 510.0).abs() < 1e-4);
        assert!((p.vx - 8.5).abs() < 1e-4);

        for _ in 0..60 {
            move_walker(&mut p, &[], &tuning);
        }
        assert_eq!(p.vx, 0.0);
    }

    #[test]
    fn when_position_leaves_map_then_clamp_restores_bounds() {
        let mut p = walker(-3.0, 1605.0, PlayerInput::default());
        clamp_to_map(&mut p, 1600.0);
        assert_eq!((p.x, p.y), (0.0, 1600.0));
    }
}
