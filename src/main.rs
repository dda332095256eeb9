use std::sync::Arc;
use std::time::Duration;

use tracing::{info, Level};

use battle_arena_server::config::GameConfig;
use battle_arena_server::game::engine::Engine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    info!("Battle Arena Server v{}", env!("CARGO_PKG_VERSION"));

    let config = GameConfig::load_or_default();
    info!(
        "Configuration loaded: map {}x{}, tick rate {} Hz, max {} players",
        config.map_width, config.map_height, config.tick_rate, config.max_players
    );

    let engine = build_engine(config);
    engine.start();

    // Periodic stats logging
    let stats_engine = engine.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(30));
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let stats = stats_engine.stats_snapshot();
            info!(
                "uptime {}s, {} players online, {} bullets, {} kills all-time",
                stats.server.uptime_seconds,
                stats.game.players_online,
                stats.game.bullets_active,
                stats.game.total_kills_all_time
            );
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    engine.stop();
    info!("Server stopped");

    Ok(())
}

/// Build the engine, wiring the tournament overlay when a whitelist is
/// configured in the environment.
#[cfg(feature = "tournament")]
fn build_engine(config: GameConfig) -> Arc<Engine> {
    use std::path::PathBuf;

    use battle_arena_server::tournament::TournamentOverlay;

    if let Ok(whitelist) = std::env::var("TOURNAMENT_WHITELIST") {
        let names: Vec<String> = whitelist
            .split(',')
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        let max_respawns = std::env::var("TOURNAMENT_MAX_RESPAWNS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(3);
        let scores_file = std::env::var("TOURNAMENT_SCORES_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("tournament_scores.json"));

        let overlay = Arc::new(TournamentOverlay::new(names, max_respawns, scores_file));
        return Arc::new(Engine::with_overlay(config, overlay.clone(), overlay));
    }

    Arc::new(Engine::new(config))
}

#[cfg(not(feature = "tournament"))]
fn build_engine(config: GameConfig) -> Arc<Engine> {
    Arc::new(Engine::new(config))
}
