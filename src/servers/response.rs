//! JSON error bodies shared by every router

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::ai::AiError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

pub fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            message: Some(message.into()),
            details: None,
        }),
    )
        .into_response()
}

pub fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "Unauthorized".to_string(),
            message: None,
            details: None,
        }),
    )
        .into_response()
}

/// Missing or malformed JSON body
pub fn bad_request(rejection: JsonRejection) -> Response {
    log::warn!("Rejected request body: {}", rejection.body_text());
    error_response(StatusCode::BAD_REQUEST, "Bad request", rejection.body_text())
}

/// Upstream failures keep the upstream status; everything else is a 500
pub fn ai_error_response(error: &AiError) -> Response {
    match error {
        AiError::NotConfigured => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Server configuration error",
            "ANTHROPIC_API_KEY is not configured",
        ),
        AiError::Upstream {
            status,
            message,
            details,
        } => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
            Json(ErrorResponse {
                error: "API error".to_string(),
                message: Some(message.clone()),
                details: Some(details.clone()),
            }),
        )
            .into_response(),
        AiError::InvalidResponse(message) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Invalid response",
            message.clone(),
        ),
        AiError::Request(message) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
            message.clone(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status_is_kept() {
        let response = ai_error_response(&AiError::Upstream {
            status: 429,
            message: "rate limited".to_string(),
            details: Value::Null,
        });
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_not_configured_is_500() {
        let response = ai_error_response(&AiError::NotConfigured);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
