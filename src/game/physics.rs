//! Collision and movement primitives
//!
//! Pure geometry over the entity types. Hit tests use strict inequality:
//! two disks exactly touching do not collide.

use hashbrown::HashMap;

use crate::config::GameConfig;
use crate::game::state::{Obstacle, Player, PlayerId};
use crate::util::vec2::Vec2;

/// Circle/circle hit: distance strictly below the sum of radii
pub fn circle_circle_hit(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    a.distance_to(b) < radius_a + radius_b
}

/// Circle/AABB hit: clamp the center onto the rectangle, then compare the
/// distance to that closest point against the radius
pub fn circle_rect_hit(center: Vec2, radius: f32, rect: &Obstacle) -> bool {
    let closest = Vec2::new(
        center.x.clamp(rect.x, rect.x + rect.width),
        center.y.clamp(rect.y, rect.y + rect.height),
    );
    center.distance_to(closest) < radius
}

/// Component-wise clamp to the map extent
pub fn clamp_to_map(position: Vec2, config: &GameConfig) -> Vec2 {
    Vec2::new(
        position.x.clamp(0.0, config.map_width),
        position.y.clamp(0.0, config.map_height),
    )
}

/// Whether a player disk at `position` is a legal resting place: inside the
/// map margin, clear of every obstacle, and clear of every other player.
/// `exclude_id` skips the moving player's own disk.
pub fn position_valid(
    position: Vec2,
    config: &GameConfig,
    obstacles: &[Obstacle],
    players: &HashMap<PlayerId, Player>,
    exclude_id: Option<&str>,
) -> bool {
    let radius = config.player_radius;

    if position.x < radius || position.x > config.map_width - radius {
        return false;
    }
    if position.y < radius || position.y > config.map_height - radius {
        return false;
    }

    for obstacle in obstacles {
        if circle_rect_hit(position, radius, obstacle) {
            return false;
        }
    }

    for player in players.values() {
        if exclude_id == Some(player.id.as_str()) {
            continue;
        }
        if circle_circle_hit(position, radius, player.position, radius) {
            return false;
        }
    }

    true
}
