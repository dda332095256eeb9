//! Spawn placement and obstacle generation

use hashbrown::HashMap;
use rand::Rng;
use tracing::debug;

use crate::config::GameConfig;
use crate::game::physics::circle_rect_hit;
use crate::game::state::{Obstacle, Player, PlayerId};
use crate::util::vec2::Vec2;

/// Attempts before the spawn search gives up and returns the map center
const MAX_SPAWN_ATTEMPTS: u32 = 100;

/// Attempts per obstacle slot before the slot is dropped
const MAX_OBSTACLE_ATTEMPTS: u32 = 50;

/// Sample a spawn point in the safe zone whose disk avoids every obstacle
/// and keeps `player_spawn_min_distance` to every live player.
///
/// Exhausting the attempt budget falls back to the map center; on a crowded
/// map that point may briefly overlap another player, which the next tick's
/// movement validation keeps from compounding.
pub fn find_spawn_position(
    config: &GameConfig,
    obstacles: &[Obstacle],
    players: &HashMap<PlayerId, Player>,
    rng: &mut impl Rng,
) -> Vec2 {
    let zone = config.spawn_safe_zone;

    for _ in 0..MAX_SPAWN_ATTEMPTS {
        let candidate = Vec2::new(
            rng.gen_range(zone.x_min..=zone.x_max),
            rng.gen_range(zone.y_min..=zone.y_max),
        );

        if obstacles
            .iter()
            .any(|obs| circle_rect_hit(candidate, config.player_radius, obs))
        {
            continue;
        }

        if players
            .values()
            .any(|p| candidate.distance_to(p.position) < config.player_spawn_min_distance)
        {
            continue;
        }

        return candidate;
    }

    debug!("spawn search exhausted, falling back to map center");
    Vec2::new(config.map_width / 2.0, config.map_height / 2.0)
}

/// Generate the fixed obstacle field. Each slot gets a random size, then up
/// to 50 placement attempts; rectangles entirely inside the spawn safe zone
/// are rejected. Slots that never place are dropped.
pub fn generate_obstacles(config: &GameConfig, rng: &mut impl Rng) -> Vec<Obstacle> {
    let mut obstacles = Vec::with_capacity(config.obstacle_count);
    let zone = config.spawn_safe_zone;

    for slot in 0..config.obstacle_count {
        let width = rng.gen_range(config.obstacle_min_size..=config.obstacle_max_size);
        let height = rng.gen_range(config.obstacle_min_size..=config.obstacle_max_size);

        for _ in 0..MAX_OBSTACLE_ATTEMPTS {
            let x = rng.gen_range(0.0..=(config.map_width - width));
            let y = rng.gen_range(0.0..=(config.map_height - height));

            if zone.contains_rect(x, y, width, height) {
                continue;
            }

            obstacles.push(Obstacle {
                id: slot as u32,
                x,
                y,
                width,
                height,
            });
            break;
        }
    }

    obstacles
}
