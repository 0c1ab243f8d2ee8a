//! Gameplay routes. Everything under `/api/play` runs against the caller's play session.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use super::response::{ai_error_response, bad_request, error_response, unauthorized, ErrorResponse};
use super::AppState;
use crate::ai::Usage;
use crate::auth::{MessageResponse, PlayContext};
use crate::evaluation::{parse_evaluation, EvaluationResult};
use crate::game::input_validation::{validate_inputs, FieldError, UserInputs};
use crate::game::{Card, GameDefinition, GameSummary, Selection};
use crate::prompt::{build_evaluation_prompt, build_output_prompt};
use crate::services::session_manager::{select_game_in_session, PlaySession};
use crate::stats::{record_quietly, StatsEvent};

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct GamesResponse {
    pub games: Vec<GameSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRequest {
    #[serde(default)]
    pub game_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardsResponse {
    pub category_id: String,
    pub category_name: String,
    pub cards: Vec<Card>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRequest {
    #[serde(default)]
    pub card_ids: Vec<String>,
    #[serde(default)]
    pub inputs: UserInputs,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResponse {
    pub valid: bool,
    pub card_errors: Vec<String>,
    pub input_errors: Vec<FieldError>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResponse {
    #[serde(flatten)]
    pub evaluation: EvaluationResult,
    /// Σ score × weight over the game's criteria
    pub weighted_score: f64,
    pub unscored_criteria: Vec<String>,
    pub usage: Usage,
    pub model: String,
    pub mock_mode: bool,
}

pub fn play_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/games", get(list_games))
        .route("/api/play/game", post(select_game))
        .route("/api/play/cards/{category_id}", get(category_cards))
        .route("/api/play/shuffle/reset", post(reset_shuffle))
        .route("/api/play/selection", post(submit_selection))
        .route("/api/play/proposal", post(generate_proposal))
        .route("/api/play/evaluation", post(evaluate_proposal))
        .with_state(state)
}

// ============================================================================
// HELPERS
// ============================================================================

fn current_game(state: &AppState, session: &PlaySession) -> Result<Arc<GameDefinition>, Response> {
    let Some(game_id) = session.current_game.as_deref() else {
        return Err(error_response(
            StatusCode::CONFLICT,
            "No game selected",
            "Select a game first",
        ));
    };
    state.catalog.get(game_id).ok_or_else(|| {
        error_response(
            StatusCode::NOT_FOUND,
            "Not found",
            format!("Unknown game: {}", game_id),
        )
    })
}

fn session_event(event_type: &str, ctx: &PlayContext, game_id: &str) -> StatsEvent {
    StatsEvent::new(event_type, Utc::now())
        .with_game(Some(game_id))
        .with_masked_key(&ctx.session.access_key)
        .with_location("server")
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /api/games
async fn list_games(State(state): State<Arc<AppState>>) -> Json<GamesResponse> {
    Json(GamesResponse {
        games: state.catalog.summaries(),
    })
}

/// POST /api/play/game
async fn select_game(
    State(state): State<Arc<AppState>>,
    ctx: PlayContext,
    body: Result<Json<GameRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return bad_request(rejection),
    };
    let Some(game_id) = req.game_id.filter(|id| !id.trim().is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "Bad request", "gameId is required");
    };
    let Some(game) = state.catalog.get(&game_id) else {
        return error_response(
            StatusCode::NOT_FOUND,
            "Not found",
            format!("Unknown game: {}", game_id),
        );
    };

    let selected = state
        .sessions
        .transform::<_, _, ()>(&ctx.session.id, ctx.now, |session| {
            Ok((select_game_in_session(session, &game.game_id), ()))
        })
        .await;
    if !matches!(selected, Ok(Some(()))) {
        return unauthorized();
    }

    log::info!("Session {} selected game {}", ctx.session.id, game.game_id);
    record_quietly(
        state.stats.as_ref(),
        &session_event("game_selection", &ctx, &game.game_id).with_outcome(None),
    );
    Json(game.as_ref()).into_response()
}

/// GET /api/play/cards/{category_id}
async fn category_cards(
    State(state): State<Arc<AppState>>,
    ctx: PlayContext,
    Path(category_id): Path<String>,
) -> Response {
    let game = match current_game(&state, &ctx.session) {
        Ok(game) => game,
        Err(response) => return response,
    };
    let Some(category) = game.category(&category_id) else {
        return error_response(
            StatusCode::NOT_FOUND,
            "Not found",
            format!("Unknown category: {}", category_id),
        );
    };

    let cards = state
        .sessions
        .transform::<_, _, ()>(&ctx.session.id, ctx.now, |mut session| {
            let cards: Vec<Card> = session
                .shuffles
                .shuffled_cards_for_category(&game, &category_id, &mut rand::rng())
                .into_iter()
                .cloned()
                .collect();
            Ok((session, cards))
        })
        .await;

    match cards {
        Ok(Some(cards)) => Json(CardsResponse {
            category_id: category.category_id.clone(),
            category_name: category.category_name.clone(),
            cards,
        })
        .into_response(),
        _ => unauthorized(),
    }
}

/// POST /api/play/shuffle/reset; an absent gameId resets every game
async fn reset_shuffle(
    State(state): State<Arc<AppState>>,
    ctx: PlayContext,
    body: Result<Json<GameRequest>, JsonRejection>,
) -> Response {
    let game_id = match body {
        Ok(Json(req)) => req.game_id.filter(|id| !id.trim().is_empty()),
        Err(JsonRejection::MissingJsonContentType(_)) => None,
        Err(rejection) => return bad_request(rejection),
    };

    let reset = state
        .sessions
        .transform::<_, _, ()>(&ctx.session.id, ctx.now, |mut session| {
            match game_id.as_deref() {
                Some(game_id) => session.shuffles.reset(game_id),
                None => session.shuffles.reset_all(),
            }
            Ok((session, ()))
        })
        .await;
    if !matches!(reset, Ok(Some(()))) {
        return unauthorized();
    }

    let message = match game_id {
        Some(game_id) => format!("Shuffle reset for {}", game_id),
        None => "All shuffles reset".to_string(),
    };
    Json(MessageResponse { message }).into_response()
}

/// POST /api/play/selection. Invalid selections answer 422 and leave the session untouched.
async fn submit_selection(
    State(state): State<Arc<AppState>>,
    ctx: PlayContext,
    body: Result<Json<SelectionRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return bad_request(rejection),
    };
    let game = match current_game(&state, &ctx.session) {
        Ok(game) => game,
        Err(response) => return response,
    };

    let selection = Selection::new(req.card_ids, req.inputs);
    let card_errors: Vec<String> = match selection.validate(&game) {
        Ok(()) => Vec::new(),
        Err(errors) => errors.iter().map(ToString::to_string).collect(),
    };
    let inputs = validate_inputs(&game, &selection.inputs);

    let response = SelectionResponse {
        valid: card_errors.is_empty() && inputs.valid,
        card_errors,
        input_errors: inputs.errors,
    };
    if !response.valid {
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(response)).into_response();
    }

    let stored = state
        .sessions
        .transform(&ctx.session.id, ctx.now, |mut session| {
            if session.current_game.as_deref() != Some(game.game_id.as_str()) {
                return Err(error_response(
                    StatusCode::CONFLICT,
                    "Game changed",
                    "The selected game changed, submit the selection again",
                ));
            }
            session.selection = Some(selection);
            session.last_output = None;
            session.last_evaluation = None;
            Ok((session, ()))
        })
        .await;

    match stored {
        Ok(Some(())) => Json(response).into_response(),
        Ok(None) => unauthorized(),
        Err(conflict) => conflict,
    }
}

/// POST /api/play/proposal
async fn generate_proposal(State(state): State<Arc<AppState>>, ctx: PlayContext) -> Response {
    let game = match current_game(&state, &ctx.session) {
        Ok(game) => game,
        Err(response) => return response,
    };
    let Some(selection) = ctx.session.selection.clone() else {
        return error_response(
            StatusCode::CONFLICT,
            "No selection",
            "Submit a valid selection first",
        );
    };

    let prompt = build_output_prompt(&game, &selection);
    let event = session_event("output_generation", &ctx, &game.game_id);

    let response = match state.ai.generate(&prompt, Some(game.game_id.as_str())).await {
        Ok(response) => response,
        Err(e) => {
            log::error!("Proposal generation failed for {}: {}", game.game_id, e);
            record_quietly(
                state.stats.as_ref(),
                &event.with_outcome(Some(&e as &dyn std::error::Error)),
            );
            return ai_error_response(&e);
        }
    };

    // the player may have switched game or selection while the model was running
    let content = response.content.clone();
    let stored = state
        .sessions
        .transform::<_, _, ()>(&ctx.session.id, Utc::now(), |mut session| {
            let unchanged = session.current_game.as_deref() == Some(game.game_id.as_str())
                && session.selection.as_ref() == Some(&selection);
            if unchanged {
                session.last_output = Some(content);
                session.last_evaluation = None;
            }
            Ok((session, unchanged))
        })
        .await;
    if !matches!(stored, Ok(Some(true))) {
        log::warn!("Proposal for session {} was not stored, session changed", ctx.session.id);
    }

    record_quietly(state.stats.as_ref(), &event.with_outcome(None));
    Json(response).into_response()
}

/// POST /api/play/evaluation
async fn evaluate_proposal(State(state): State<Arc<AppState>>, ctx: PlayContext) -> Response {
    let game = match current_game(&state, &ctx.session) {
        Ok(game) => game,
        Err(response) => return response,
    };
    let (Some(selection), Some(output)) = (
        ctx.session.selection.clone(),
        ctx.session.last_output.clone(),
    ) else {
        return error_response(
            StatusCode::CONFLICT,
            "No proposal",
            "Generate a proposal before requesting an evaluation",
        );
    };

    let prompt = build_evaluation_prompt(&game, &selection, &output);
    let event = session_event("evaluation", &ctx, &game.game_id);

    let response = match state.ai.evaluate(&prompt, Some(game.game_id.as_str())).await {
        Ok(response) => response,
        Err(e) => {
            log::error!("Evaluation failed for {}: {}", game.game_id, e);
            record_quietly(
                state.stats.as_ref(),
                &event.with_outcome(Some(&e as &dyn std::error::Error)),
            );
            return ai_error_response(&e);
        }
    };

    let evaluation = match parse_evaluation(&response.content) {
        Ok(evaluation) => evaluation,
        Err(e) => {
            log::error!("Evaluation reply for {} rejected: {}", game.game_id, e);
            record_quietly(
                state.stats.as_ref(),
                &event.with_outcome(Some(&e as &dyn std::error::Error)),
            );
            return (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: "Evaluation parse failed".to_string(),
                    message: Some(e.to_string()),
                    details: Some(json!({ "kind": e.kind() })),
                }),
            )
                .into_response();
        }
    };

    let stored_evaluation = evaluation.clone();
    let stored = state
        .sessions
        .transform::<_, _, ()>(&ctx.session.id, Utc::now(), |mut session| {
            let unchanged = session.last_output.as_deref() == Some(output.as_str());
            if unchanged {
                session.last_evaluation = Some(stored_evaluation);
            }
            Ok((session, unchanged))
        })
        .await;
    if !matches!(stored, Ok(Some(true))) {
        log::warn!("Evaluation for session {} was not stored, session changed", ctx.session.id);
    }

    record_quietly(state.stats.as_ref(), &event.with_outcome(None));

    let criteria = &game.evaluation_criteria;
    Json(EvaluationResponse {
        weighted_score: evaluation.weighted_score(criteria),
        unscored_criteria: evaluation
            .unscored(criteria)
            .into_iter()
            .map(str::to_string)
            .collect(),
        evaluation,
        usage: response.usage,
        model: response.model,
        mock_mode: response.mock_mode,
    })
    .into_response()
}
