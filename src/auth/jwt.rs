//! JWT token handling for play sessions

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation};

use super::models::Claims;

pub const DEFAULT_SESSION_HOURS: i64 = 8;

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    secret: String,
    expiration_hours: i64,
}

impl JwtConfig {
    pub fn new(secret: String, expiration_hours: i64) -> Self {
        Self {
            secret,
            expiration_hours,
        }
    }

    /// `SESSION_SECRET` and `SESSION_DURATION_HOURS`. Without a secret a random one is
    /// generated, so tokens stop validating when the process restarts.
    pub fn from_env() -> Self {
        let secret = match std::env::var("SESSION_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                log::warn!("SESSION_SECRET is not set, using a random per-process secret");
                random_secret()
            }
        };
        let expiration_hours = std::env::var("SESSION_DURATION_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|h: &i64| *h > 0)
            .unwrap_or(DEFAULT_SESSION_HOURS);
        Self::new(secret, expiration_hours)
    }

    pub fn session_duration(&self) -> chrono::Duration {
        chrono::Duration::hours(self.expiration_hours)
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiration_hours", &self.expiration_hours)
            .finish()
    }
}

/// 32 random bytes, base64 encoded
pub fn random_secret() -> String {
    let mut bytes = [0u8; 32];
    if let Err(e) = getrandom::getrandom(&mut bytes) {
        log::error!("OS random source unavailable ({}), falling back to a v4 uuid secret", e);
        return uuid::Uuid::new_v4().to_string();
    }
    STANDARD.encode(bytes)
}

/// JWT manager
#[derive(Clone)]
pub struct JwtManager {
    config: JwtConfig,
}

impl JwtManager {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    pub fn session_duration(&self) -> chrono::Duration {
        self.config.session_duration()
    }

    /// Sign a token for `session_id` that expires at `expires_at`
    pub fn create_token(
        &self,
        session_id: &str,
        masked_key: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp().max(0) as usize;

        let claims = Claims {
            sub: session_id.to_string(),
            key: masked_key.to_string(),
            exp: expires_at.timestamp().max(0) as usize,
            iat: now,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_bytes()),
        )
    }

    /// Verify and decode a JWT token
    pub fn verify_token(&self, token: &str) -> Result<TokenData<Claims>, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.secret.as_bytes()),
            &validation,
        )
    }
}
