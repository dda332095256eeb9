//! Authoritative game engine
//!
//! Owns the single source of truth behind one exclusive lock. Command
//! handlers (join/move/shoot) and the snapshot reads are adjudicated under
//! that lock; a dedicated tick worker advances physics at a fixed rate
//! under the same lock. Commands never suspend while holding it.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::GameConfig;
use crate::game::physics::{clamp_to_map, position_valid};
use crate::game::snapshot::{round2, GameSnapshot, ServerStats};
use crate::game::spawn;
use crate::game::state::{Bullet, GameState, Player};
use crate::game::systems::combat::KillEvent;
use crate::game::systems::{bullets, cleanup, combat};
use crate::stats::StatsStore;
use crate::util::vec2::Vec2;

/// How long `stop` waits for the tick worker to acknowledge shutdown
const SHUTDOWN_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Typed command failures. Every denial is a return value; handlers recover
/// nothing internally.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CommandError {
    #[error("player not found")]
    PlayerNotFound,
    #[error("move too fast")]
    MoveTooFast,
    #[error("cooldown: {0:.2}s")]
    ShootCooldown(f32),
    #[error("invalid direction")]
    InvalidDirection,
    #[error("too many bullets")]
    TooManyBullets,
    #[error("death cooldown: wait {0:.1}s")]
    DeathCooldown(f32),
    #[error("server full")]
    ServerFull,
    #[error("username not whitelisted")]
    WhitelistReject,
    #[error("respawn limit reached")]
    RespawnsExhausted,
}

/// Successful join
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinAccepted {
    pub player_id: String,
    pub position: [f32; 2],
    pub health: i32,
}

/// Successful move; the position is where the player actually ended up,
/// unchanged when the step was blocked
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveAccepted {
    pub position: [f32; 2],
}

/// Successful shot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShootAccepted {
    pub bullet_id: String,
}

/// Join-time veto hook. The tournament overlay plugs in here; the default
/// admits everyone.
pub trait Admission: Send + Sync {
    fn check_join(&self, username: &str) -> Result<(), CommandError>;
}

/// Admits every username
pub struct OpenAdmission;

impl Admission for OpenAdmission {
    fn check_join(&self, _username: &str) -> Result<(), CommandError> {
        Ok(())
    }
}

/// Death notification hook, invoked once per adjudicated kill.
/// `killer` is absent when the shooter was no longer alive.
pub trait DeathObserver: Send + Sync {
    fn on_death(&self, victim: &str, killer: Option<&str>);
}

/// Ignores deaths
pub struct NoopDeathObserver;

impl DeathObserver for NoopDeathObserver {
    fn on_death(&self, _victim: &str, _killer: Option<&str>) {}
}

struct WorkerHandle {
    thread: thread::JoinHandle<()>,
    exited: crossbeam_channel::Receiver<()>,
}

/// The authoritative simulation engine
pub struct Engine {
    config: GameConfig,
    state: Mutex<GameState>,
    store: StatsStore,
    admission: Arc<dyn Admission>,
    death_observer: Arc<dyn DeathObserver>,
    running: AtomicBool,
    stopped: AtomicBool,
    worker: Mutex<Option<WorkerHandle>>,
    start_time: Instant,
}

impl Engine {
    pub fn new(config: GameConfig) -> Self {
        Self::with_overlay(config, Arc::new(OpenAdmission), Arc::new(NoopDeathObserver))
    }

    /// Build an engine with admission and death-observation hooks supplied
    /// at construction (tournament overlay injection point).
    pub fn with_overlay(
        config: GameConfig,
        admission: Arc<dyn Admission>,
        death_observer: Arc<dyn DeathObserver>,
    ) -> Self {
        let config = config.sanitize();
        let store = StatsStore::new(config.stats_file.clone());
        let stats = store.load();
        let obstacles = spawn::generate_obstacles(&config, &mut rand::thread_rng());

        info!(
            "engine initialized: map {}x{}, {} obstacles, tick rate {} Hz",
            config.map_width,
            config.map_height,
            obstacles.len(),
            config.tick_rate
        );

        Self {
            state: Mutex::new(GameState::new(obstacles, stats)),
            store,
            admission,
            death_observer,
            running: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            worker: Mutex::new(None),
            start_time: Instant::now(),
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Start the tick worker. Idempotent: the worker is spawned once; a
    /// stopped engine does not restart.
    pub fn start(self: &Arc<Self>) {
        if self.stopped.load(Ordering::SeqCst) || self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        // Each process run counts one game
        {
            let mut state = self.state.lock();
            state.stats.games_played += 1;
            self.store.save(&state.stats);
        }

        let (exit_tx, exit_rx) = crossbeam_channel::bounded(1);
        let engine = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name("arena-tick".to_string())
            .spawn(move || {
                engine.run_loop();
                let _ = exit_tx.send(());
            });

        match spawned {
            Ok(handle) => {
                *self.worker.lock() = Some(WorkerHandle {
                    thread: handle,
                    exited: exit_rx,
                });
                info!("tick loop started at {} Hz", self.config.tick_rate);
            }
            Err(e) => {
                error!("failed to spawn tick worker: {}", e);
                self.running.store(false, Ordering::SeqCst);
            }
        }
    }

    /// Stop the tick worker, wait up to ~2 s for it to exit, then flush
    /// stats. Idempotent. Commands issued afterwards are refused.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.worker.lock().take() {
            match handle.exited.recv_timeout(SHUTDOWN_JOIN_TIMEOUT) {
                Ok(()) => {
                    let _ = handle.thread.join();
                }
                Err(_) => warn!("tick worker did not exit in time, detaching"),
            }
        }

        let state = self.state.lock();
        self.store.save(&state.stats);
        info!("tick loop stopped");
    }

    fn run_loop(&self) {
        let tick_duration = self.config.tick_duration();

        while self.running.load(Ordering::SeqCst) {
            let tick_start = Instant::now();

            // A panicking tick must not take the simulation down; the lock
            // does not poison, so the state stays usable next tick.
            if catch_unwind(AssertUnwindSafe(|| self.tick())).is_err() {
                error!("tick panicked, continuing");
            }

            // Overruns start the next tick immediately; lost time is not
            // made up
            if let Some(remaining) = tick_duration.checked_sub(tick_start.elapsed()) {
                thread::sleep(remaining);
            }
        }
    }

    /// Advance the simulation by one tick: bullet integration, collision
    /// resolution, cleanup. Returns the kills adjudicated this tick.
    pub fn tick(&self) -> Vec<KillEvent> {
        let now = Instant::now();
        let dt = self.config.tick_duration_secs();
        let mut state = self.state.lock();

        state.tick += 1;
        bullets::integrate(&mut state, &self.config, now, dt);
        let kills = combat::resolve(&mut state, &self.config, now);

        if !kills.is_empty() {
            self.store.save(&state.stats);
        }
        for kill in &kills {
            info!(
                "{} killed by {}",
                kill.victim_username,
                kill.killer_username.as_deref().unwrap_or("unknown")
            );
            self.death_observer
                .on_death(&kill.victim_username, kill.killer_username.as_deref());
        }

        cleanup::run(&mut state, &self.config, now);
        kills
    }

    /// Join the arena under `username`. A username already live is not
    /// rejected; the newcomer gets a fresh id and both players coexist.
    pub fn join(&self, username: &str) -> Result<JoinAccepted, CommandError> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(CommandError::ServerFull);
        }
        self.admission.check_join(username)?;

        let now = Instant::now();
        let mut state = self.state.lock();

        if let Some(&died_at) = state.death_cooldowns.get(username) {
            let elapsed = now.duration_since(died_at).as_secs_f32();
            if elapsed < self.config.death_cooldown {
                return Err(CommandError::DeathCooldown(
                    self.config.death_cooldown - elapsed,
                ));
            }
            state.death_cooldowns.remove(username);
        }

        if state.players.len() >= self.config.max_players {
            return Err(CommandError::ServerFull);
        }

        let player_id = new_player_id(username);
        let position = spawn::find_spawn_position(
            &self.config,
            &state.obstacles,
            &state.players,
            &mut rand::thread_rng(),
        );
        let health = self.config.player_max_health;
        state.players.insert(
            player_id.clone(),
            Player::new(player_id.clone(), username.to_string(), position, health, now),
        );

        info!(
            "{} joined as {} at ({:.1}, {:.1})",
            username, player_id, position.x, position.y
        );

        Ok(JoinAccepted {
            player_id,
            position: [round2(position.x), round2(position.y)],
            health,
        })
    }

    /// Move one speed-limited step in the given direction. A zero direction
    /// refreshes activity and reports the current position.
    pub fn move_player(
        &self,
        player_id: &str,
        direction_x: f32,
        direction_y: f32,
    ) -> Result<MoveAccepted, CommandError> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(CommandError::PlayerNotFound);
        }

        let now = Instant::now();
        let mut state = self.state.lock();

        let (last_move, current) = {
            let player = state
                .get_player(player_id)
                .ok_or(CommandError::PlayerNotFound)?;
            (player.last_move, player.position)
        };

        if now.duration_since(last_move).as_secs_f32() < self.config.move_rate_limit {
            return Err(CommandError::MoveTooFast);
        }

        let direction = Vec2::new(direction_x, direction_y).normalize();
        if direction.is_zero() {
            if let Some(player) = state.get_player_mut(player_id) {
                player.touch_activity(now);
            }
            return Ok(MoveAccepted {
                position: [round2(current.x), round2(current.y)],
            });
        }

        // A client moving exactly at the rate limit travels player_speed
        // units per second
        let step = self.config.player_speed * self.config.move_rate_limit;
        let candidate = clamp_to_map(current + direction * step, &self.config);
        let valid = position_valid(
            candidate,
            &self.config,
            &state.obstacles,
            &state.players,
            Some(player_id),
        );

        let player = state
            .get_player_mut(player_id)
            .ok_or(CommandError::PlayerNotFound)?;
        if valid {
            player.position = candidate;
        }
        player.last_move = now;
        player.touch_activity(now);
        let position = player.position;

        Ok(MoveAccepted {
            position: [round2(position.x), round2(position.y)],
        })
    }

    /// Fire a bullet from the player's position in the given direction
    pub fn shoot(
        &self,
        player_id: &str,
        direction_x: f32,
        direction_y: f32,
    ) -> Result<ShootAccepted, CommandError> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(CommandError::PlayerNotFound);
        }

        let now = Instant::now();
        let mut state = self.state.lock();

        let (last_shoot, position) = {
            let player = state
                .get_player(player_id)
                .ok_or(CommandError::PlayerNotFound)?;
            (player.last_shoot, player.position)
        };

        let since_last = now.duration_since(last_shoot).as_secs_f32();
        if since_last < self.config.shoot_rate_limit {
            return Err(CommandError::ShootCooldown(
                self.config.shoot_rate_limit - since_last,
            ));
        }

        let direction = Vec2::new(direction_x, direction_y).normalize();
        if direction.is_zero() {
            return Err(CommandError::InvalidDirection);
        }

        if state.bullets_owned_by(player_id) >= self.config.max_bullets_per_player {
            return Err(CommandError::TooManyBullets);
        }

        let bullet_id = new_bullet_id();
        let velocity = direction * self.config.bullet_speed;
        state.bullets.push(Bullet::new(
            bullet_id.clone(),
            player_id.to_string(),
            position,
            velocity,
            self.config.bullet_damage,
            now,
        ));

        if let Some(player) = state.get_player_mut(player_id) {
            player.last_shoot = now;
            player.touch_activity(now);
        }
        state.stats.total_shots_all_time += 1;

        Ok(ShootAccepted { bullet_id })
    }

    /// Rounded copy of the full game state; safe to hand out, never aliases
    /// live state
    pub fn state_snapshot(&self) -> GameSnapshot {
        let state = self.state.lock();
        GameSnapshot::from_state(&state, &self.config)
    }

    /// Uptime, counters and the current top 10 by kills
    pub fn stats_snapshot(&self) -> ServerStats {
        let state = self.state.lock();
        ServerStats::from_state(
            &state,
            self.start_time.elapsed().as_secs(),
            self.config.tick_rate,
        )
    }
}

fn new_player_id(username: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{username}_{}", &hex[..8])
}

fn new_bullet_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("bullet_{}", &hex[..12])
}
