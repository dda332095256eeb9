//! Persistence of lifetime counters
//!
//! The stats blob is a small JSON object read once at startup and written
//! back on every kill and at shutdown. Saving is best-effort: a failed
//! write is logged and the simulation carries on.

use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::game::state::GameStats;

#[derive(Debug, Clone)]
pub struct StatsStore {
    path: PathBuf,
}

impl StatsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read the persisted counters. A missing or unreadable blob starts the
    /// counters at zero.
    pub fn load(&self) -> GameStats {
        match fs::read_to_string(&self.path) {
            Ok(contents) => match serde_json::from_str::<GameStats>(&contents) {
                Ok(stats) => {
                    info!(
                        "stats loaded: {} kills all-time",
                        stats.total_kills_all_time
                    );
                    stats
                }
                Err(e) => {
                    warn!("stats blob {} unparseable: {}", self.path.display(), e);
                    GameStats::default()
                }
            },
            Err(_) => GameStats::default(),
        }
    }

    /// Write the counters out. Never fatal, never blocks a command beyond
    /// the write itself.
    pub fn save(&self, stats: &GameStats) {
        let payload = match serde_json::to_string_pretty(stats) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("stats serialization failed: {}", e);
                return;
            }
        };
        if let Err(e) = fs::write(&self.path, payload) {
            warn!("stats save to {} failed: {}", self.path.display(), e);
        }
    }
}
