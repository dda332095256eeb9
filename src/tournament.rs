//! Tournament overlay
//!
//! Wraps the engine's join admission and death notifications: only
//! whitelisted usernames may enter, each player gets a bounded number of
//! respawns, and a separate score blob (kills/deaths per username) is
//! persisted on every death. Plugged into the engine at construction via
//! the `Admission` and `DeathObserver` traits.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use hashbrown::HashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::game::engine::{Admission, CommandError, DeathObserver};

/// Lifetime tournament record of one username
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TournamentScore {
    #[serde(default)]
    pub kills: u64,
    #[serde(default)]
    pub deaths: u64,
}

/// Persisted scoreboard, keyed by username
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TournamentScores {
    #[serde(default)]
    pub players: HashMap<String, TournamentScore>,
}

pub struct TournamentOverlay {
    whitelist: HashSet<String>,
    max_respawns: u32,
    scores: Mutex<TournamentScores>,
    path: PathBuf,
}

impl TournamentOverlay {
    pub fn new(
        whitelist: impl IntoIterator<Item = String>,
        max_respawns: u32,
        path: PathBuf,
    ) -> Self {
        let whitelist: HashSet<String> = whitelist.into_iter().collect();
        let scores = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(scores) => scores,
                Err(e) => {
                    warn!("score blob {} unparseable: {}", path.display(), e);
                    TournamentScores::default()
                }
            },
            Err(_) => TournamentScores::default(),
        };

        info!(
            "tournament overlay: {} whitelisted, {} respawns each",
            whitelist.len(),
            max_respawns
        );

        Self {
            whitelist,
            max_respawns,
            scores: Mutex::new(scores),
            path,
        }
    }

    /// Copy of the current scoreboard
    pub fn scores(&self) -> TournamentScores {
        self.scores.lock().clone()
    }

    fn save(&self, scores: &TournamentScores) {
        let payload = match serde_json::to_string_pretty(scores) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("score serialization failed: {}", e);
                return;
            }
        };
        if let Err(e) = fs::write(&self.path, payload) {
            warn!("score save to {} failed: {}", self.path.display(), e);
        }
    }
}

impl Admission for TournamentOverlay {
    fn check_join(&self, username: &str) -> Result<(), CommandError> {
        if !self.whitelist.contains(username) {
            return Err(CommandError::WhitelistReject);
        }
        let scores = self.scores.lock();
        if let Some(score) = scores.players.get(username) {
            if score.deaths >= self.max_respawns as u64 {
                return Err(CommandError::RespawnsExhausted);
            }
        }
        Ok(())
    }
}

impl DeathObserver for TournamentOverlay {
    fn on_death(&self, victim: &str, killer: Option<&str>) {
        let mut scores = self.scores.lock();
        scores.players.entry(victim.to_string()).or_default().deaths += 1;
        if let Some(killer) = killer {
            if killer != victim {
                scores.players.entry(killer.to_string()).or_default().kills += 1;
            }
        }
        self.save(&scores);
    }
}
