//! # Proposal Cards
//!
//! Server for a business proposal card game. Players draw shuffled cards from a
//! game's categories, fill in a few inputs, and get an AI-written proposal that
//! a second AI call scores against the game's weighted criteria.
//!
//! ## Features
//!
//! - **Games**: JSON game definitions, per-session card shuffling, selection and input checks
//! - **Prompts**: `{token}` templates filled from the selection
//! - **AI**: Anthropic Messages API client with a canned mock mode
//! - **Evaluation**: extraction and validation of the scoring model's JSON reply
//! - **Auth**: hashed access keys, JWT play sessions, admin password
//! - **Stats**: usage events over a key-value store, aggregated views and a dashboard
//!
//! ## Usage
//!
//! ```rust,no_run
//! use proposal_cards::{config::Config, servers::{AppState, WebUiConfig, WebUiServer}};
//! use clap::Parser;
//! use std::sync::Arc;
//!
//! # async fn run() -> proposal_cards::Result<()> {
//! let config = Config::parse();
//! let state = Arc::new(AppState::from_config(&config)?);
//! WebUiServer::new(WebUiConfig::default(), state).start().await
//! # }
//! ```

// ============================================================================
// PUBLIC API MODULES
// ============================================================================

/// Anthropic client and mock backend
pub mod ai;

/// Access keys, play-session tokens and admin auth
pub mod auth;

/// Server command line
pub mod config;

/// Parsing and validation of evaluation replies
pub mod evaluation;

/// Game definitions, catalog, shuffling and selection rules
pub mod game;

/// Prompt templates
pub mod prompt;

/// HTTP routers and the server
pub mod servers;

/// Play session store
pub mod services;

/// Usage statistics
pub mod stats;

pub mod logging;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

pub use ai::{AiBackend, AiError};
pub use evaluation::{EvaluationError, EvaluationResult};
pub use game::{GameCatalog, GameDefinition, GameError};
pub use servers::{AppState, WebUiConfig, WebUiServer};
pub use stats::{KeyValueStore, StoreError};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Top-level error for startup and the command line tools
#[derive(Debug, thiserror::Error)]
pub enum ProposalCardsError {
    #[error("Game error: {0}")]
    Game(#[from] GameError),

    #[error("AI error: {0}")]
    Ai(#[from] AiError),

    #[error("Auth error: {0}")]
    Auth(#[from] auth::AuthError),

    #[error("Stats store error: {0}")]
    Store(#[from] StoreError),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Logging setup failed: {0}")]
    Logging(#[from] flexi_logger::FlexiLoggerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ProposalCardsError>;

// ============================================================================
// LIBRARY VERSION INFO
// ============================================================================

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
