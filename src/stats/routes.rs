//! Stats logging, retrieval and the admin dashboard

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::aggregate::build_report;
use super::dashboard::render_dashboard;
use super::event::StatsEvent;
use super::recorder::{record_event, RecordError};
use crate::auth::AdminAuth;
use crate::servers::response::{bad_request, error_response, unauthorized};
use crate::servers::AppState;

pub const LOGGING_FAILED_MESSAGE: &str = "Stats logging failed, but game can continue";

#[derive(Debug, Deserialize)]
pub struct AdminQuery {
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn stats_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/stats/log", post(log_event))
        .route("/api/stats/get", get(get_stats))
        .route("/admin/dashboard", get(dashboard))
        .with_state(state)
}

/// POST /api/stats/log
async fn log_event(
    State(state): State<Arc<AppState>>,
    body: Result<Json<StatsEvent>, JsonRejection>,
) -> Response {
    let event = match body {
        Ok(Json(event)) => event,
        Err(rejection) => return bad_request(rejection),
    };

    match record_event(state.stats.as_ref(), &event) {
        Ok(()) => Json(LogResponse {
            success: true,
            message: None,
        })
        .into_response(),
        Err(RecordError::MissingFields) => error_response(
            StatusCode::BAD_REQUEST,
            "Missing required fields: eventType, timestamp",
            "eventType and timestamp are required",
        ),
        Err(e @ RecordError::InvalidTimestamp(_)) => {
            error_response(StatusCode::BAD_REQUEST, "Bad request", e.to_string())
        }
        Err(RecordError::Store(e)) => {
            log::error!("Failed to log stats: {}", e);
            Json(LogResponse {
                success: false,
                message: Some(LOGGING_FAILED_MESSAGE.to_string()),
            })
            .into_response()
        }
    }
}

/// Argon2 verification runs on the blocking pool, as the access-key lookup does
async fn is_admin(admin: &AdminAuth, password: Option<String>) -> bool {
    let Some(password) = password else {
        return false;
    };
    if !admin.is_configured() {
        return false;
    }
    let admin = admin.clone();
    match tokio::task::spawn_blocking(move || admin.verify(Some(&password))).await {
        Ok(valid) => valid,
        Err(e) => {
            log::error!("Admin password check failed: {}", e);
            false
        }
    }
}

/// GET /api/stats/get?password=
async fn get_stats(State(state): State<Arc<AppState>>, Query(query): Query<AdminQuery>) -> Response {
    if !is_admin(&state.admin, query.password).await {
        return unauthorized();
    }
    let report = build_report(state.stats.as_ref(), &state.catalog.names(), Utc::now());
    Json(report).into_response()
}

/// GET /admin/dashboard?password=
async fn dashboard(State(state): State<Arc<AppState>>, Query(query): Query<AdminQuery>) -> Response {
    if !is_admin(&state.admin, query.password).await {
        return (
            StatusCode::UNAUTHORIZED,
            Html("<!DOCTYPE html><html><body><h1>401 Unauthorized</h1></body></html>"),
        )
            .into_response();
    }
    let report = build_report(state.stats.as_ref(), &state.catalog.names(), Utc::now());
    Html(render_dashboard(&report)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;

    #[tokio::test]
    async fn test_admin_check_on_blocking_pool() {
        let admin = AdminAuth::new(Some(hash_password("dashboard-2025").unwrap()));

        assert!(is_admin(&admin, Some("dashboard-2025".to_string())).await);
        assert!(!is_admin(&admin, Some("dashboard-2024".to_string())).await);
        assert!(!is_admin(&admin, None).await);
    }

    #[tokio::test]
    async fn test_unconfigured_admin_rejects_everything() {
        let admin = AdminAuth::new(None);
        assert!(!is_admin(&admin, Some("dashboard-2025".to_string())).await);
    }
}
