//! Rounded wire forms of the game state
//!
//! Every snapshot is an independent copy taken under the state lock, so
//! readers never observe later mutation. Coordinates are rounded to two
//! decimals for transmission.

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::game::state::{Bullet, GameState, Obstacle, Player};

/// Round a world coordinate to two decimals for the wire
pub fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: String,
    pub username: String,
    pub x: f32,
    pub y: f32,
    pub health: i32,
    pub kills: u32,
}

impl PlayerSnapshot {
    pub fn from_player(player: &Player) -> Self {
        Self {
            id: player.id.clone(),
            username: player.username.clone(),
            x: round2(player.position.x),
            y: round2(player.position.y),
            health: player.health,
            kills: player.kills,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulletSnapshot {
    pub id: String,
    pub owner_id: String,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

impl BulletSnapshot {
    pub fn from_bullet(bullet: &Bullet) -> Self {
        Self {
            id: bullet.id.clone(),
            owner_id: bullet.owner_id.clone(),
            x: round2(bullet.position.x),
            y: round2(bullet.position.y),
            vx: round2(bullet.velocity.x),
            vy: round2(bullet.velocity.y),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleSnapshot {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ObstacleSnapshot {
    pub fn from_obstacle(obstacle: &Obstacle) -> Self {
        Self {
            id: obstacle.id,
            x: round2(obstacle.x),
            y: round2(obstacle.y),
            width: round2(obstacle.width),
            height: round2(obstacle.height),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub width: f32,
    pub height: f32,
}

/// Full game state as seen by clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub players: Vec<PlayerSnapshot>,
    pub bullets: Vec<BulletSnapshot>,
    pub obstacles: Vec<ObstacleSnapshot>,
    pub map: MapSnapshot,
}

impl GameSnapshot {
    pub fn from_state(state: &GameState, config: &GameConfig) -> Self {
        Self {
            players: state.players.values().map(PlayerSnapshot::from_player).collect(),
            bullets: state.bullets.iter().map(BulletSnapshot::from_bullet).collect(),
            obstacles: state
                .obstacles
                .iter()
                .map(ObstacleSnapshot::from_obstacle)
                .collect(),
            map: MapSnapshot {
                width: config.map_width,
                height: config.map_height,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub uptime_seconds: u64,
    pub tick_rate: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameCounters {
    pub players_online: usize,
    pub bullets_active: usize,
    pub obstacles_count: usize,
    pub total_kills_all_time: u64,
    pub total_deaths_all_time: u64,
    pub total_shots_all_time: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopPlayer {
    pub username: String,
    pub kills: u32,
    pub health: i32,
}

/// Aggregate counters and the current leaderboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerStats {
    pub server: ServerInfo,
    pub game: GameCounters,
    pub top_players_current: Vec<TopPlayer>,
}

impl ServerStats {
    pub fn from_state(state: &GameState, uptime_seconds: u64, tick_rate: u32) -> Self {
        let mut ranked: Vec<&Player> = state.players.values().collect();
        // Stable sort: equal kill counts keep their relative order within
        // this snapshot
        ranked.sort_by(|a, b| b.kills.cmp(&a.kills));

        Self {
            server: ServerInfo {
                uptime_seconds,
                tick_rate,
            },
            game: GameCounters {
                players_online: state.players.len(),
                bullets_active: state.bullets.len(),
                obstacles_count: state.obstacles.len(),
                total_kills_all_time: state.stats.total_kills_all_time,
                total_deaths_all_time: state.stats.total_deaths_all_time,
                total_shots_all_time: state.stats.total_shots_all_time,
            },
            top_players_current: ranked
                .into_iter()
                .take(10)
                .map(|p| TopPlayer {
                    username: p.username.clone(),
                    kills: p.kills,
                    health: p.health,
                })
                .collect(),
        }
    }
}
