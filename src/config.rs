//! Server command line. Secrets stay in the environment, see the `from_env` constructors.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "proposal_cards", version, about = "Business proposal card game server")]
pub struct Config {
    /// HTTP port
    #[arg(short = 'p', long, default_value_t = 3000)]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Directory holding the game definition files
    #[arg(long, default_value = "data/games")]
    pub games_dir: PathBuf,

    /// SQLite file for usage statistics
    #[arg(long, default_value = "data/stats.db")]
    pub stats_db: String,

    /// Keep statistics in memory only (lost on restart)
    #[arg(long, default_value_t = false)]
    pub memory_stats: bool,

    /// SQLite file holding the hashed access keys
    #[arg(long, default_value = "data/access_keys.db")]
    pub auth_db: String,

    /// Answer AI calls with canned responses instead of calling the API
    #[arg(long, default_value_t = false)]
    pub mock_mode: bool,

    /// Static files served at the root
    #[arg(long, default_value = "public")]
    pub public_dir: PathBuf,

    /// Also write rotated log files into this directory
    #[arg(long)]
    pub log_dir: Option<String>,

    /// Override the Anthropic model (ANTHROPIC_MODEL otherwise)
    #[arg(long)]
    pub model: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse_from(["proposal_cards"]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.games_dir, PathBuf::from("data/games"));
        assert!(!config.memory_stats);
    }

    #[test]
    fn test_flags() {
        let config = Config::parse_from([
            "proposal_cards",
            "--port",
            "8080",
            "--memory-stats",
            "--mock-mode",
            "--model",
            "claude-haiku",
        ]);
        assert_eq!(config.port, 8080);
        assert!(config.memory_stats);
        assert!(config.mock_mode);
        assert_eq!(config.model.as_deref(), Some("claude-haiku"));
    }
}
