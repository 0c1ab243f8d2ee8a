//! Authentication module
//!
//! - Access key format checks and the hashed key store
//! - Play-session tokens (HS256 JWT)
//! - Admin password verification for the stats endpoints

pub mod access_key;
pub mod admin;
pub mod database;
pub mod jwt;
pub mod models;
pub mod password;
pub mod routes;

pub use admin::AdminAuth;
pub use database::AuthDatabase;
pub use jwt::{JwtConfig, JwtManager};
pub use models::*;
pub use routes::{auth_router, PlayContext};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid access key format")]
    InvalidFormat,

    #[error("An active key with this value already exists")]
    DuplicateKey,

    #[error("Hashing failed: {0}")]
    Hash(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Auth database lock poisoned")]
    LockPoisoned,
}
