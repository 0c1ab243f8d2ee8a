// main.rs - proposal card game server
use clap::Parser;
use std::sync::Arc;

use proposal_cards::config::Config;
use proposal_cards::logging::setup_logging;
use proposal_cards::servers::{AppState, WebUiConfig, WebUiServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();
    let _logger = setup_logging(config.log_dir.as_deref())?;

    log::info!("🎴 {} v{}", proposal_cards::NAME, proposal_cards::VERSION);
    log::info!(
        "Games: {} | Mock mode: {} | Stats: {}",
        config.games_dir.display(),
        config.mock_mode,
        if config.memory_stats { "memory" } else { config.stats_db.as_str() }
    );

    let state = Arc::new(AppState::from_config(&config)?);

    let server = WebUiServer::new(WebUiConfig::from(&config), state);

    if let Err(e) = server.start().await {
        log::error!("Server stopped: {}", e);
        return Err(e.into());
    }
    Ok(())
}
