use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use kartei_core::card::Term;
use kartei_engine::normalize;

use crate::event_bridge;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub words: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegenerateRequest {
    pub word: String,
    pub id: usize,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// Accept a word list and stream batch progress as NDJSON. The final line
/// is either a `complete` event carrying the card preview or a `failed`
/// event with a human-readable message.
pub async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    let terms = normalize::normalize_terms(&request.words);
    if terms.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "no words provided");
    }

    match state.orchestrator.try_start(terms) {
        Ok(rx) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/x-ndjson")],
            Body::from_stream(event_bridge::event_stream(rx)),
        )
            .into_response(),
        Err(busy) => error_response(StatusCode::CONFLICT, &busy.to_string()),
    }
}

/// Return the previously generated deck package as a download.
pub async fn download(State(state): State<AppState>) -> Response {
    match tokio::fs::read(&state.config.package_path).await {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/octet-stream"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"german-vocabulary.apkg\"",
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(_) => error_response(
            StatusCode::NOT_FOUND,
            "package not found, generate cards first",
        ),
    }
}

/// Re-run the pipeline for a single (term, id) pair and return the updated
/// card.
pub async fn regenerate(
    State(state): State<AppState>,
    Json(request): Json<RegenerateRequest>,
) -> Response {
    let term = Term::new(&request.word);
    if term.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "no word provided");
    }

    match state.orchestrator.regenerate(request.id, term).await {
        Ok(Some(card)) => Json(card).into_response(),
        Ok(None) => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "term could not be classified",
        ),
        Err(busy) => error_response(StatusCode::CONFLICT, &busy.to_string()),
    }
}

pub async fn health(State(state): State<AppState>) -> Response {
    Json(serde_json::json!({
        "status": "healthy",
        "busy": state.orchestrator.is_busy(),
        "metrics": state.metrics.snapshot(),
    }))
    .into_response()
}
