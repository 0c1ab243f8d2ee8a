//! Access key and play session REST routes

use axum::{
    extract::{rejection::JsonRejection, FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;

use super::{access_key, models::*};
use crate::servers::response::{bad_request, error_response, unauthorized};
use crate::servers::AppState;
use crate::services::session_manager::{extend_session, PlaySession};

/// Live play session resolved from the `Authorization: Bearer` header.
///
/// Rejects with 401 when the header is missing, the token does not verify, or
/// the session behind it has expired or been closed.
pub struct PlayContext {
    pub session: PlaySession,
    pub now: DateTime<Utc>,
}

impl FromRequestParts<Arc<AppState>> for PlayContext {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(unauthorized)?;
        let claims = match state.jwt.verify_token(token) {
            Ok(data) => data.claims,
            Err(e) => {
                log::debug!("Rejected play token: {}", e);
                return Err(unauthorized());
            }
        };

        let now = Utc::now();
        match state.sessions.get(&claims.sub, now).await {
            Some(session) => Ok(PlayContext { session, now }),
            None => Err(unauthorized()),
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub fn auth_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/auth/access-key", post(submit_access_key))
        .route("/api/auth/session", get(session_status))
        .route("/api/auth/extend", post(extend))
        .route("/api/auth/logout", post(logout))
        .with_state(state)
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn issue_token(state: &AppState, session: &PlaySession, now: DateTime<Utc>) -> Response {
    match state
        .jwt
        .create_token(&session.id, &session.access_key, session.expires_at)
    {
        Ok(token) => Json(SessionResponse {
            token,
            expires_at: rfc3339(session.expires_at),
            remaining_minutes: session.remaining_minutes(now),
        })
        .into_response(),
        Err(e) => {
            log::error!("Failed to sign play token: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                "Failed to issue session token",
            )
        }
    }
}

/// POST /api/auth/access-key
async fn submit_access_key(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AccessKeyRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return bad_request(rejection),
    };

    let Some(key) = req
        .access_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
    else {
        return error_response(StatusCode::BAD_REQUEST, "Bad request", "accessKey is required");
    };

    if !access_key::is_valid_format(key) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid format", access_key::FORMAT_HINT);
    }

    // argon2 verification is CPU bound
    let db = state.auth_db.clone();
    let candidate = key.to_string();
    let lookup = tokio::task::spawn_blocking(move || db.find_active_key(&candidate)).await;

    let record = match lookup {
        Ok(Ok(Some(record))) => record,
        Ok(Ok(None)) => {
            log::info!("Rejected access key {}", access_key::masked_identity(key));
            return error_response(StatusCode::UNAUTHORIZED, "Unauthorized", "Invalid access key");
        }
        Ok(Err(e)) => {
            log::error!("Access key lookup failed: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                "Access key lookup failed",
            );
        }
        Err(e) => {
            log::error!("Access key lookup task failed: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                "Access key lookup failed",
            );
        }
    };

    let now = Utc::now();
    let session = state.sessions.open(&record.masked, now).await;
    issue_token(&state, &session, now)
}

/// GET /api/auth/session
async fn session_status(ctx: PlayContext) -> Json<SessionStatus> {
    let session = ctx.session;
    Json(SessionStatus {
        authenticated: true,
        access_key: session.access_key.clone(),
        expires_at: rfc3339(session.expires_at),
        remaining_minutes: session.remaining_minutes(ctx.now),
        current_game: session.current_game,
    })
}

/// POST /api/auth/extend
async fn extend(State(state): State<Arc<AppState>>, ctx: PlayContext) -> Response {
    let duration = state.sessions.duration();
    let now = ctx.now;
    let extended = state
        .sessions
        .transform::<_, _, ()>(&ctx.session.id, now, |session| {
            let session = extend_session(session, now, duration);
            Ok((session.clone(), session))
        })
        .await;

    match extended {
        Ok(Some(session)) => {
            log::info!("Extended play session {}", session.id);
            issue_token(&state, &session, now)
        }
        _ => unauthorized(),
    }
}

/// POST /api/auth/logout
async fn logout(State(state): State<Arc<AppState>>, ctx: PlayContext) -> Json<MessageResponse> {
    state.sessions.close(&ctx.session.id).await;
    log::info!("Closed play session {}", ctx.session.id);
    Json(MessageResponse {
        message: "Logged out".to_string(),
    })
}
