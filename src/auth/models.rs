//! Authentication data models

use serde::{Deserialize, Serialize};

/// Stored access key. The key itself is only kept as an argon2 hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessKeyRecord {
    pub id: String,
    /// Masked form of the normalized key, also used as the stats identity
    pub masked: String,
    pub label: Option<String>,
    #[serde(skip_serializing)]
    pub key_hash: String,
    pub created_at: String,
    pub revoked: bool,
}

/// JWT claims of a play session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Play session id
    pub sub: String,
    /// Masked access key
    pub key: String,
    pub exp: usize,
    pub iat: usize,
}

// ==================== Request/Response DTOs ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessKeyRequest {
    #[serde(default)]
    pub access_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    /// RFC 3339
    pub expires_at: String,
    pub remaining_minutes: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub authenticated: bool,
    pub access_key: String,
    pub expires_at: String,
    pub remaining_minutes: i64,
    pub current_game: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
