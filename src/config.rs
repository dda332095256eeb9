use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

/// Rectangle in which spawn positions are sampled.
#[derive(Debug, Clone, Copy)]
pub struct SpawnZone {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

impl SpawnZone {
    /// Whether a rectangle lies entirely inside the zone.
    pub fn contains_rect(&self, x: f32, y: f32, width: f32, height: f32) -> bool {
        x >= self.x_min && x + width <= self.x_max && y >= self.y_min && y + height <= self.y_max
    }
}

/// Game configuration: every tunable of the simulation.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// World extent on the x axis
    pub map_width: f32,
    /// World extent on the y axis
    pub map_height: f32,
    /// Number of obstacle slots generated at startup
    pub obstacle_count: usize,
    /// Minimum obstacle edge length
    pub obstacle_min_size: f32,
    /// Maximum obstacle edge length
    pub obstacle_max_size: f32,
    /// Central zone in which players spawn (obstacles avoid it)
    pub spawn_safe_zone: SpawnZone,
    /// Player collision radius
    pub player_radius: f32,
    /// Player speed in units/second
    pub player_speed: f32,
    /// Health assigned on join
    pub player_max_health: i32,
    /// Minimum distance to other players at spawn
    pub player_spawn_min_distance: f32,
    /// Bullet collision radius
    pub bullet_radius: f32,
    /// Bullet speed in units/second
    pub bullet_speed: f32,
    /// Damage per bullet hit
    pub bullet_damage: i32,
    /// Seconds a bullet may fly before it expires
    pub bullet_lifetime: f32,
    /// Minimum interval between accepted shots, in seconds
    pub shoot_rate_limit: f32,
    /// Cap on live bullets per owner
    pub max_bullets_per_player: usize,
    /// Minimum interval between accepted moves, in seconds
    pub move_rate_limit: f32,
    /// Seconds a dead username is blocked from rejoining
    pub death_cooldown: f32,
    /// Seconds of silence before a player is evicted
    pub inactivity_timeout: f32,
    /// Physics frequency in Hz
    pub tick_rate: u32,
    /// Hard cap on concurrent players
    pub max_players: usize,
    /// Path of the persisted lifetime stats blob
    pub stats_file: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_width: 100.0,
            map_height: 100.0,
            obstacle_count: 20,
            obstacle_min_size: 2.0,
            obstacle_max_size: 5.0,
            spawn_safe_zone: SpawnZone {
                x_min: 40.0,
                x_max: 60.0,
                y_min: 40.0,
                y_max: 60.0,
            },
            player_radius: 0.5,
            player_speed: 5.0,
            player_max_health: 100,
            player_spawn_min_distance: 5.0,
            bullet_radius: 0.2,
            bullet_speed: 15.0,
            bullet_damage: 10,
            bullet_lifetime: 10.0,
            shoot_rate_limit: 0.5,
            max_bullets_per_player: 5,
            move_rate_limit: 0.05,
            death_cooldown: 10.0,
            inactivity_timeout: 120.0,
            tick_rate: 60,
            max_players: 100,
            stats_file: PathBuf::from("game_stats.json"),
        }
    }
}

impl GameConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(width) = std::env::var("MAP_WIDTH") {
            if let Ok(parsed) = width.parse() {
                config.map_width = parsed;
            }
        }

        if let Ok(height) = std::env::var("MAP_HEIGHT") {
            if let Ok(parsed) = height.parse() {
                config.map_height = parsed;
            }
        }

        if let Ok(count) = std::env::var("OBSTACLE_COUNT") {
            if let Ok(parsed) = count.parse() {
                config.obstacle_count = parsed;
            }
        }

        if let Ok(rate) = std::env::var("TICK_RATE") {
            if let Ok(parsed) = rate.parse() {
                config.tick_rate = parsed;
            }
        }

        if let Ok(max) = std::env::var("MAX_PLAYERS") {
            if let Ok(parsed) = max.parse() {
                config.max_players = parsed;
            }
        }

        if let Ok(cooldown) = std::env::var("DEATH_COOLDOWN") {
            if let Ok(parsed) = cooldown.parse() {
                config.death_cooldown = parsed;
            }
        }

        if let Ok(timeout) = std::env::var("INACTIVITY_TIMEOUT") {
            if let Ok(parsed) = timeout.parse() {
                config.inactivity_timeout = parsed;
            }
        }

        if let Ok(path) = std::env::var("STATS_FILE") {
            config.stats_file = PathBuf::from(path);
        }

        config.sanitize()
    }

    /// Enforce relations between tunables that the simulation relies on.
    /// Spawn spacing below one player diameter would let fresh spawns
    /// overlap an existing player's disk.
    pub fn sanitize(mut self) -> Self {
        let min_spacing = 2.0 * self.player_radius;
        if self.player_spawn_min_distance < min_spacing {
            warn!(
                "player_spawn_min_distance {} below player diameter, clamping to {}",
                self.player_spawn_min_distance, min_spacing
            );
            self.player_spawn_min_distance = min_spacing;
        }
        self
    }

    /// Delta time per tick in seconds
    pub fn tick_duration_secs(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }

    /// Target wall-clock length of one tick
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate as f64)
    }
}
