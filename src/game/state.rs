//! Game state definitions and structures
//!
//! Contains all entities (players, bullets, obstacles) and the lifetime
//! stats counters. The whole struct lives behind the engine's state lock;
//! nothing here is mutated except through engine commands and the tick loop.

use std::time::Instant;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::util::vec2::Vec2;

/// Server-issued player identifier (`<username>_<8 hex>`)
pub type PlayerId = String;

/// Server-issued bullet identifier (`bullet_<12 hex>`)
pub type BulletId = String;

/// Live participant
#[derive(Debug, Clone)]
pub struct Player {
    /// Unique server-issued id
    pub id: PlayerId,
    /// Client-chosen display name (validated by the request surface)
    pub username: String,
    /// Position in world space, bounded by the map
    pub position: Vec2,
    /// Remaining health; a player at 0 is removed the same tick
    pub health: i32,
    /// Kills scored this life
    pub kills: u32,
    /// Last accepted move (rate limiting)
    pub last_move: Instant,
    /// Last accepted shot (rate limiting)
    pub last_shoot: Instant,
    /// Last command of any kind (inactivity eviction)
    pub last_activity: Instant,
}

impl Player {
    pub fn new(id: PlayerId, username: String, position: Vec2, health: i32, now: Instant) -> Self {
        Self {
            id,
            username,
            position,
            health,
            kills: 0,
            last_move: now,
            last_shoot: now,
            last_activity: now,
        }
    }

    /// Refresh the inactivity timestamp
    pub fn touch_activity(&mut self, now: Instant) {
        self.last_activity = now;
    }
}

/// Projectile in flight
#[derive(Debug, Clone)]
pub struct Bullet {
    pub id: BulletId,
    /// Firing player, kept by id only; the owner may die mid-flight
    pub owner_id: PlayerId,
    pub position: Vec2,
    /// Already scaled to units/second
    pub velocity: Vec2,
    pub damage: i32,
    pub created_at: Instant,
    /// Obstacle reflections so far; capped at 3 before destruction
    pub bounces: u32,
}

impl Bullet {
    pub fn new(
        id: BulletId,
        owner_id: PlayerId,
        position: Vec2,
        velocity: Vec2,
        damage: i32,
        now: Instant,
    ) -> Self {
        Self {
            id,
            owner_id,
            position,
            velocity,
            damage,
            created_at: now,
            bounces: 0,
        }
    }

    /// Seconds in flight
    pub fn age(&self, now: Instant) -> f32 {
        now.duration_since(self.created_at).as_secs_f32()
    }
}

/// Immovable axis-aligned rectangle, generated once at startup
#[derive(Debug, Clone, Copy)]
pub struct Obstacle {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Process-lifetime counters, persisted across restarts.
/// Absent fields default to zero on load; unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStats {
    #[serde(default)]
    pub total_kills_all_time: u64,
    #[serde(default)]
    pub total_deaths_all_time: u64,
    #[serde(default)]
    pub total_shots_all_time: u64,
    #[serde(default)]
    pub games_played: u64,
}

/// Complete authoritative state, protected by the engine's exclusive lock
#[derive(Debug)]
pub struct GameState {
    /// Ticks executed since start
    pub tick: u64,
    pub players: HashMap<PlayerId, Player>,
    /// Creation order; tick systems iterate bullets in this order
    pub bullets: Vec<Bullet>,
    pub obstacles: Vec<Obstacle>,
    /// username -> death timestamp; blocks rejoining until the cooldown expires
    pub death_cooldowns: HashMap<String, Instant>,
    pub stats: GameStats,
}

impl GameState {
    pub fn new(obstacles: Vec<Obstacle>, stats: GameStats) -> Self {
        Self {
            tick: 0,
            players: HashMap::new(),
            bullets: Vec::new(),
            obstacles,
            death_cooldowns: HashMap::new(),
            stats,
        }
    }

    pub fn get_player(&self, id: &str) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn get_player_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.get_mut(id)
    }

    /// Live bullets stamped with the given owner
    pub fn bullets_owned_by(&self, owner_id: &str) -> usize {
        self.bullets.iter().filter(|b| b.owner_id == owner_id).count()
    }
}
