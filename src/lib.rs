//! Battle Arena Server Library
//!
//! Authoritative simulation engine for a small real-time multiplayer arena
//! shooter. Clients submit intents over an external request surface; the
//! engine validates them under a single state lock, advances physics at a
//! fixed tick rate, and publishes rounded snapshots.
//!
//! # Features
//!
//! - `tournament` - Tournament overlay with whitelist admission, respawn caps
//!   and a persistent scoreboard (enabled by default)

pub mod config;
pub mod game;
pub mod stats;
pub mod util;

// Feature-gated modules (enabled by default)
#[cfg(feature = "tournament")]
pub mod tournament;
