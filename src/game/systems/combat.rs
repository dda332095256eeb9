//! Bullet/player collision resolution and death adjudication
//!
//! Runs as the second tick phase, after bullet integration. Each bullet is
//! consumed by its first hit and damages at most one player per tick.
//! Players whose health reaches zero stay in the map (marked dead) until
//! the end of the phase so that later bullets striking them this tick are
//! still consumed; their damage is wasted. All dead players are removed
//! before the phase returns.

use std::time::Instant;

use crate::config::GameConfig;
use crate::game::physics::circle_circle_hit;
use crate::game::state::{GameState, PlayerId};

/// One death adjudicated this tick
#[derive(Debug, Clone)]
pub struct KillEvent {
    pub victim_id: PlayerId,
    pub victim_username: String,
    pub killer_id: PlayerId,
    /// Present only while the killer was still alive at adjudication time
    pub killer_username: Option<String>,
}

/// Resolve bullet hits in bullet creation order and handle deaths.
/// Returns the kills of this tick for stats persistence and observers.
pub fn resolve(state: &mut GameState, config: &GameConfig, now: Instant) -> Vec<KillEvent> {
    let mut events: Vec<KillEvent> = Vec::new();
    let GameState {
        bullets,
        players,
        death_cooldowns,
        stats,
        ..
    } = state;

    bullets.retain(|bullet| {
        let victim_id = players
            .iter()
            .find(|(id, player)| {
                **id != bullet.owner_id
                    && circle_circle_hit(
                        bullet.position,
                        config.bullet_radius,
                        player.position,
                        config.player_radius,
                    )
            })
            .map(|(id, _)| id.clone());

        let Some(victim_id) = victim_id else {
            return true;
        };

        // Bullet consumed. Damage lands only while the victim is alive;
        // a hit on a player already killed this tick is wasted.
        let mut lethal: Option<String> = None;
        if let Some(victim) = players.get_mut(&victim_id) {
            if victim.health > 0 {
                victim.health -= bullet.damage;
                if victim.health <= 0 {
                    lethal = Some(victim.username.clone());
                }
            }
        }

        if let Some(victim_username) = lethal {
            stats.total_kills_all_time += 1;
            stats.total_deaths_all_time += 1;
            death_cooldowns.insert(victim_username.clone(), now);

            let killer_username = match players.get_mut(&bullet.owner_id) {
                Some(killer) if killer.health > 0 => {
                    killer.kills += 1;
                    Some(killer.username.clone())
                }
                _ => None,
            };

            events.push(KillEvent {
                victim_id: victim_id.clone(),
                victim_username,
                killer_id: bullet.owner_id.clone(),
                killer_username,
            });
        }

        false
    });

    for event in &events {
        players.remove(&event.victim_id);
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{Bullet, GameStats, Player};
    use crate::util::vec2::Vec2;

    fn arena() -> GameState {
        GameState::new(Vec::new(), GameStats::default())
    }

    fn add_player(state: &mut GameState, id: &str, x: f32, y: f32, health: i32) {
        let username = id.split('_').next().unwrap().to_string();
        let mut player = Player::new(
            id.to_string(),
            username,
            Vec2::new(x, y),
            100,
            Instant::now(),
        );
        player.health = health;
        state.players.insert(id.to_string(), player);
    }

    fn add_bullet(state: &mut GameState, owner: &str, x: f32, y: f32) {
        let n = state.bullets.len();
        state.bullets.push(Bullet::new(
            format!("bullet_{n}"),
            owner.to_string(),
            Vec2::new(x, y),
            Vec2::new(15.0, 0.0),
            10,
            Instant::now(),
        ));
    }

    #[test]
    fn test_hit_applies_damage_and_consumes_bullet() {
        let config = GameConfig::default();
        let mut state = arena();
        add_player(&mut state, "a_1", 10.0, 10.0, 100);
        add_player(&mut state, "b_2", 50.0, 50.0, 100);
        add_bullet(&mut state, "a_1", 50.1, 50.0);

        let events = resolve(&mut state, &config, Instant::now());

        assert!(events.is_empty());
        assert!(state.bullets.is_empty());
        assert_eq!(state.players["b_2"].health, 90);
    }

    #[test]
    fn test_owner_is_skipped() {
        let config = GameConfig::default();
        let mut state = arena();
        add_player(&mut state, "a_1", 50.0, 50.0, 100);
        add_bullet(&mut state, "a_1", 50.0, 50.0);

        let events = resolve(&mut state, &config, Instant::now());

        assert!(events.is_empty());
        // No other player in reach: the bullet flies on
        assert_eq!(state.bullets.len(), 1);
        assert_eq!(state.players["a_1"].health, 100);
    }

    #[test]
    fn test_miss_leaves_bullet_alive() {
        let config = GameConfig::default();
        let mut state = arena();
        add_player(&mut state, "a_1", 10.0, 10.0, 100);
        add_player(&mut state, "b_2", 50.0, 50.0, 100);
        add_bullet(&mut state, "a_1", 30.0, 30.0);

        resolve(&mut state, &config, Instant::now());

        assert_eq!(state.bullets.len(), 1);
        assert_eq!(state.players["b_2"].health, 100);
    }

    #[test]
    fn test_lethal_hit_removes_victim_and_credits_killer() {
        let config = GameConfig::default();
        let now = Instant::now();
        let mut state = arena();
        add_player(&mut state, "a_1", 10.0, 10.0, 100);
        add_player(&mut state, "b_2", 50.0, 50.0, 10);
        add_bullet(&mut state, "a_1", 50.0, 50.0);

        let events = resolve(&mut state, &config, now);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].victim_username, "b");
        assert_eq!(events[0].killer_username.as_deref(), Some("a"));
        assert!(!state.players.contains_key("b_2"));
        assert_eq!(state.players["a_1"].kills, 1);
        assert_eq!(state.stats.total_kills_all_time, 1);
        assert_eq!(state.stats.total_deaths_all_time, 1);
        assert_eq!(state.death_cooldowns.get("b"), Some(&now));
    }

    #[test]
    fn test_second_bullet_on_fresh_corpse_is_consumed_and_wasted() {
        let config = GameConfig::default();
        let mut state = arena();
        add_player(&mut state, "a_1", 10.0, 10.0, 100);
        add_player(&mut state, "b_2", 50.0, 50.0, 10);
        add_bullet(&mut state, "a_1", 50.0, 50.0);
        add_bullet(&mut state, "a_1", 50.1, 50.0);

        let events = resolve(&mut state, &config, Instant::now());

        // One death, both bullets gone, one kill counted
        assert_eq!(events.len(), 1);
        assert!(state.bullets.is_empty());
        assert_eq!(state.players["a_1"].kills, 1);
        assert_eq!(state.stats.total_kills_all_time, 1);
    }

    #[test]
    fn test_two_bullets_both_damage_surviving_victim() {
        let config = GameConfig::default();
        let mut state = arena();
        add_player(&mut state, "a_1", 10.0, 10.0, 100);
        add_player(&mut state, "b_2", 50.0, 50.0, 100);
        add_bullet(&mut state, "a_1", 50.0, 50.0);
        add_bullet(&mut state, "a_1", 50.1, 50.0);

        resolve(&mut state, &config, Instant::now());

        assert_eq!(state.players["b_2"].health, 80);
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn test_dead_owners_bullet_still_kills_without_credit() {
        let config = GameConfig::default();
        let mut state = arena();
        // Owner of the bullet is long gone
        add_player(&mut state, "b_2", 50.0, 50.0, 10);
        add_bullet(&mut state, "ghost_9", 50.0, 50.0);

        let events = resolve(&mut state, &config, Instant::now());

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].killer_username, None);
        assert!(!state.players.contains_key("b_2"));
        assert_eq!(state.stats.total_kills_all_time, 1);
    }

    #[test]
    fn test_bullet_damages_at_most_one_player() {
        let config = GameConfig::default();
        let mut state = arena();
        add_player(&mut state, "a_1", 10.0, 10.0, 100);
        // Two potential victims overlapping the same bullet
        add_player(&mut state, "b_2", 50.0, 50.0, 100);
        add_player(&mut state, "c_3", 50.4, 50.0, 100);
        add_bullet(&mut state, "a_1", 50.2, 50.0);

        resolve(&mut state, &config, Instant::now());

        let damaged = [&state.players["b_2"], &state.players["c_3"]]
            .iter()
            .filter(|p| p.health < 100)
            .count();
        assert_eq!(damaged, 1);
    }
}
