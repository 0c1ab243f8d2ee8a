use axum::{
    extract::State,
    response::{Html, Json as ResponseJson},
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Serialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use super::ai_routes::ai_router;
use super::play_routes::play_router;
use super::AppState;
use crate::auth::auth_router;
use crate::config::Config;
use crate::stats::stats_router;
use crate::ProposalCardsError;

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(600);

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    pub mock_mode: bool,
    pub games: usize,
}

#[derive(Debug, Clone)]
pub struct WebUiConfig {
    pub port: u16,
    pub host: String,
    pub public_dir: PathBuf,
}

impl Default for WebUiConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
            public_dir: PathBuf::from("public"),
        }
    }
}

impl WebUiConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<&Config> for WebUiConfig {
    fn from(config: &Config) -> Self {
        Self {
            port: config.port,
            host: config.host.clone(),
            public_dir: config.public_dir.clone(),
        }
    }
}

pub struct WebUiServer {
    config: WebUiConfig,
    state: Arc<AppState>,
}

impl WebUiServer {
    pub fn new(config: WebUiConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    pub async fn start(&self) -> crate::Result<()> {
        let app = create_router(self.state.clone(), &self.config.public_dir);
        let addr: SocketAddr = self
            .config
            .address()
            .parse()
            .map_err(|e| ProposalCardsError::Server(format!("invalid bind address: {}", e)))?;
        let listener = TcpListener::bind(addr).await?;

        spawn_session_purge(self.state.clone());

        log::info!("🌐 Server listening on http://localhost:{}", self.config.port);
        axum::serve(listener, app).await?;
        Ok(())
    }
}

/// Every API router plus the static site, with permissive CORS
pub fn create_router(state: Arc<AppState>, public_dir: &Path) -> Router {
    let index_path = public_dir.join("index.html");

    Router::new()
        .route("/", get(move || serve_index(index_path.clone())))
        .route("/api/status", get(api_status).with_state(state.clone()))
        .merge(auth_router(state.clone()))
        .merge(play_router(state.clone()))
        .merge(ai_router(state.clone()))
        .merge(stats_router(state))
        .fallback_service(ServeDir::new(public_dir))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

fn spawn_session_purge(state: Arc<AppState>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let purged = state.sessions.purge_expired(Utc::now()).await;
            if purged > 0 {
                log::info!("Purged {} expired play sessions", purged);
            }
        }
    });
}

async fn serve_index(index_path: PathBuf) -> Html<String> {
    let index_content = tokio::fs::read_to_string(&index_path)
        .await
        .unwrap_or_else(|_| {
            r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"><title>Proposal Cards</title></head>
<body>
<h1>Proposal Cards</h1>
<p>The game server is running. Static files are served from the public directory.</p>
<p>API: <code>/api/games</code>, <code>/api/auth/access-key</code>, <code>/api/play/*</code></p>
</body></html>"#
                .to_string()
        });

    Html(index_content)
}

async fn api_status(State(state): State<Arc<AppState>>) -> ResponseJson<StatusResponse> {
    ResponseJson(StatusResponse {
        status: "ready".to_string(),
        version: crate::VERSION.to_string(),
        mock_mode: state.ai.is_mock(),
        games: state.catalog.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_ui_config_default() {
        let config = WebUiConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.public_dir, PathBuf::from("public"));
        assert_eq!(config.address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_web_ui_config_from_command_line() {
        use clap::Parser;

        let cli = Config::parse_from(["proposal_cards", "--port", "8080", "--host", "127.0.0.1"]);
        let config = WebUiConfig::from(&cli);
        assert_eq!(config.address(), "127.0.0.1:8080");
        assert_eq!(config.public_dir, PathBuf::from("public"));
    }

    #[tokio::test]
    async fn test_fallback_index_when_public_dir_is_missing() {
        let content = serve_index(PathBuf::from("/nonexistent/index.html")).await.0;
        assert!(content.contains("<!DOCTYPE html>"));
        assert!(content.contains("Proposal Cards"));
    }
}
