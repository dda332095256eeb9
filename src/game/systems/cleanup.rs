//! End-of-tick housekeeping: inactivity eviction and cooldown expiry

use std::time::Instant;

use tracing::info;

use crate::config::GameConfig;
use crate::game::state::{GameState, PlayerId};

/// Evict players silent for longer than the inactivity timeout and drop
/// death cooldowns that have run out. Eviction is not a death: the username
/// may rejoin immediately.
pub fn run(state: &mut GameState, config: &GameConfig, now: Instant) {
    let inactive: Vec<PlayerId> = state
        .players
        .iter()
        .filter(|(_, player)| {
            now.duration_since(player.last_activity).as_secs_f32() > config.inactivity_timeout
        })
        .map(|(id, _)| id.clone())
        .collect();

    for id in inactive {
        if let Some(player) = state.players.remove(&id) {
            info!("{} evicted after inactivity", player.username);
        }
    }

    state
        .death_cooldowns
        .retain(|_, died_at| now.duration_since(*died_at).as_secs_f32() <= config.death_cooldown);
}
