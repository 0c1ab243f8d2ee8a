//! Shared state handed to every router

use std::path::Path;
use std::sync::Arc;

use crate::ai::AiBackend;
use crate::auth::{AdminAuth, AuthDatabase, JwtConfig, JwtManager};
use crate::config::Config;
use crate::game::GameCatalog;
use crate::services::session_manager::SessionManager;
use crate::stats::{KeyValueStore, MemoryStore, SqliteStore};

pub struct AppState {
    pub catalog: GameCatalog,
    pub ai: AiBackend,
    pub stats: Arc<dyn KeyValueStore>,
    pub admin: AdminAuth,
    pub auth_db: AuthDatabase,
    pub jwt: JwtManager,
    pub sessions: SessionManager,
}

impl AppState {
    /// Session lifetime follows the token lifetime
    pub fn new(
        catalog: GameCatalog,
        ai: AiBackend,
        stats: Arc<dyn KeyValueStore>,
        admin: AdminAuth,
        auth_db: AuthDatabase,
        jwt: JwtManager,
    ) -> Self {
        let sessions = SessionManager::new(jwt.session_duration());
        Self {
            catalog,
            ai,
            stats,
            admin,
            auth_db,
            jwt,
            sessions,
        }
    }

    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let catalog = GameCatalog::load_dir(&config.games_dir)?;
        if catalog.is_empty() {
            log::warn!("No games found in {}", config.games_dir.display());
        }

        let stats: Arc<dyn KeyValueStore> = if config.memory_stats {
            log::info!("Stats store: in memory");
            Arc::new(MemoryStore::new())
        } else {
            ensure_parent_dir(&config.stats_db)?;
            log::info!("Stats store: {}", config.stats_db);
            Arc::new(SqliteStore::new(&config.stats_db)?)
        };

        ensure_parent_dir(&config.auth_db)?;
        let auth_db = AuthDatabase::new(&config.auth_db)?;

        Ok(Self::new(
            catalog,
            AiBackend::from_env(config.mock_mode, config.model.as_deref()),
            stats,
            AdminAuth::from_env(),
            auth_db,
            JwtManager::new(JwtConfig::from_env()),
        ))
    }
}

fn ensure_parent_dir(db_path: &str) -> std::io::Result<()> {
    match Path::new(db_path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
