//! Bullet integration: advance, bounce off obstacles, expire
//!
//! Runs as the first tick phase. At most one obstacle is resolved per
//! bullet per tick; very fast bullets may tunnel through thin geometry,
//! which is accepted at these speeds and map sizes.

use std::time::Instant;

use crate::config::GameConfig;
use crate::game::physics::circle_rect_hit;
use crate::game::state::GameState;

/// Obstacle reflections a bullet survives; the next hit destroys it
pub const MAX_BOUNCES: u32 = 3;

/// Advance every bullet by one tick and drop the ones that expired:
/// fourth obstacle hit, out of map, or past the lifetime.
pub fn integrate(state: &mut GameState, config: &GameConfig, now: Instant, dt: f32) {
    let GameState {
        bullets, obstacles, ..
    } = state;

    bullets.retain_mut(|bullet| {
        bullet.position += bullet.velocity * dt;

        // Resolve the first obstacle contact this tick
        for obstacle in obstacles.iter() {
            if !circle_rect_hit(bullet.position, config.bullet_radius, obstacle) {
                continue;
            }
            if bullet.bounces >= MAX_BOUNCES {
                return false;
            }
            // Reflect along the axis where the center sits closest to an
            // edge; the shallower penetration picks the wall that was hit
            let offset_x = (bullet.position.x - obstacle.x)
                .abs()
                .min((bullet.position.x - (obstacle.x + obstacle.width)).abs());
            let offset_y = (bullet.position.y - obstacle.y)
                .abs()
                .min((bullet.position.y - (obstacle.y + obstacle.height)).abs());
            if offset_x < offset_y {
                bullet.velocity.x = -bullet.velocity.x;
            } else {
                bullet.velocity.y = -bullet.velocity.y;
            }
            bullet.bounces += 1;
            break;
        }

        if bullet.position.x < 0.0
            || bullet.position.x > config.map_width
            || bullet.position.y < 0.0
            || bullet.position.y > config.map_height
        {
            return false;
        }

        bullet.age(now) <= config.bullet_lifetime
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{Bullet, GameStats, Obstacle};
    use crate::util::vec2::Vec2;
    use std::time::Duration;

    fn state_with_obstacles(obstacles: Vec<Obstacle>) -> GameState {
        GameState::new(obstacles, GameStats::default())
    }

    fn bullet_at(x: f32, y: f32, vx: f32, vy: f32, now: Instant) -> Bullet {
        Bullet::new(
            "bullet_test".to_string(),
            "a_1".to_string(),
            Vec2::new(x, y),
            Vec2::new(vx, vy),
            10,
            now,
        )
    }

    fn wall(id: u32, x: f32, y: f32, width: f32, height: f32) -> Obstacle {
        Obstacle {
            id,
            x,
            y,
            width,
            height,
        }
    }

    #[test]
    fn test_bullet_advances_by_velocity() {
        let config = GameConfig::default();
        let now = Instant::now();
        let mut state = state_with_obstacles(Vec::new());
        state.bullets.push(bullet_at(50.0, 50.0, 15.0, 0.0, now));

        integrate(&mut state, &config, now, 1.0 / 60.0);

        let bullet = &state.bullets[0];
        assert!((bullet.position.x - 50.25).abs() < 1e-4);
        assert_eq!(bullet.position.y, 50.0);
    }

    #[test]
    fn test_bounce_reflects_x_on_vertical_wall() {
        let config = GameConfig::default();
        let now = Instant::now();
        // Wall at x in [20, 22], bullet arriving from the left
        let mut state = state_with_obstacles(vec![wall(0, 20.0, 48.0, 2.0, 4.0)]);
        state.bullets.push(bullet_at(19.7, 50.0, 15.0, 0.0, now));

        integrate(&mut state, &config, now, 1.0 / 60.0);

        let bullet = &state.bullets[0];
        assert_eq!(bullet.bounces, 1);
        assert_eq!(bullet.velocity.x, -15.0);
        assert_eq!(bullet.velocity.y, 0.0);
    }

    #[test]
    fn test_bounce_reflects_y_on_horizontal_wall() {
        let config = GameConfig::default();
        let now = Instant::now();
        // Wall at y in [20, 22], bullet arriving from below
        let mut state = state_with_obstacles(vec![wall(0, 40.0, 20.0, 20.0, 2.0)]);
        state.bullets.push(bullet_at(50.0, 19.7, 0.0, 15.0, now));

        integrate(&mut state, &config, now, 1.0 / 60.0);

        let bullet = &state.bullets[0];
        assert_eq!(bullet.bounces, 1);
        assert_eq!(bullet.velocity.x, 0.0);
        assert_eq!(bullet.velocity.y, -15.0);
    }

    #[test]
    fn test_bounce_preserves_speed() {
        let config = GameConfig::default();
        let now = Instant::now();
        let mut state = state_with_obstacles(vec![wall(0, 20.0, 40.0, 2.0, 20.0)]);
        let velocity = Vec2::new(10.606_6, 10.606_6);
        let speed_before = velocity.length();
        state.bullets.push(bullet_at(19.65, 50.0, velocity.x, velocity.y, now));

        integrate(&mut state, &config, now, 1.0 / 60.0);

        let bullet = &state.bullets[0];
        assert_eq!(bullet.bounces, 1);
        assert!((bullet.velocity.length() - speed_before).abs() < 1e-4);
    }

    #[test]
    fn test_fourth_obstacle_hit_destroys() {
        let config = GameConfig::default();
        let now = Instant::now();
        let mut state = state_with_obstacles(vec![wall(0, 20.0, 48.0, 2.0, 4.0)]);
        let mut bullet = bullet_at(19.7, 50.0, 15.0, 0.0, now);
        bullet.bounces = MAX_BOUNCES;
        state.bullets.push(bullet);

        integrate(&mut state, &config, now, 1.0 / 60.0);

        assert!(state.bullets.is_empty());
    }

    #[test]
    fn test_ping_pong_between_walls_destroys_after_cap() {
        let config = GameConfig::default();
        let now = Instant::now();
        // Two facing walls; the bullet ping-pongs between them
        let mut state = state_with_obstacles(vec![
            wall(0, 20.0, 40.0, 2.0, 20.0),
            wall(1, 10.0, 40.0, 2.0, 20.0),
        ]);
        state.bullets.push(bullet_at(15.0, 50.0, 15.0, 0.0, now));

        let dt = 1.0 / 60.0;
        let mut ticks = 0;
        while !state.bullets.is_empty() && ticks < 600 {
            integrate(&mut state, &config, now, dt);
            ticks += 1;
        }

        // Destroyed by the bounce cap, not by running forever
        assert!(state.bullets.is_empty());
        assert!(ticks < 600);
    }

    #[test]
    fn test_out_of_map_removed() {
        let config = GameConfig::default();
        let now = Instant::now();
        let mut state = state_with_obstacles(Vec::new());
        state.bullets.push(bullet_at(99.9, 50.0, 15.0, 0.0, now));

        integrate(&mut state, &config, now, 1.0 / 60.0);

        assert!(state.bullets.is_empty());
    }

    #[test]
    fn test_aged_out_removed() {
        let config = GameConfig::default();
        let created = Instant::now();
        let mut state = state_with_obstacles(Vec::new());
        state.bullets.push(bullet_at(50.0, 50.0, 0.1, 0.0, created));

        // Just under the lifetime: kept
        let almost = created + Duration::from_secs_f32(config.bullet_lifetime - 0.5);
        integrate(&mut state, &config, almost, 1.0 / 60.0);
        assert_eq!(state.bullets.len(), 1);

        // Past the lifetime: dropped
        let past = created + Duration::from_secs_f32(config.bullet_lifetime + 0.5);
        integrate(&mut state, &config, past, 1.0 / 60.0);
        assert!(state.bullets.is_empty());
    }
}
