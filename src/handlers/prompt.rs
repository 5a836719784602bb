use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    Extension,
};
use std::time::Instant;
use tracing::info;

use crate::error::{AppResult, ValidationError};
use crate::middleware::SessionId;
use crate::models::{AnswerRequest, ApiResponse, DifficultyInfo, GeneratedText, SummaryRequest};
use crate::services::{DifficultyLevel, SessionHandle};
use crate::state::AppState;

pub async fn summary_handler(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    payload: Result<Json<SummaryRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<GeneratedText>>> {
    let start = Instant::now();
    let Json(request) = payload?;
    info!(session_id = %session.0, difficulty = %request.difficulty, "Summary requested");

    let handle = existing_session(&state, session).await?;
    let controller = handle.lock().await;
    let text = controller
        .generate_summary(&state.dispatcher, request.difficulty)
        .await?;

    Ok(Json(ApiResponse::new(
        GeneratedText {
            text,
            difficulty: request.difficulty,
            model: state.dispatcher.model().to_string(),
        },
        start.elapsed().as_millis() as u64,
    )))
}

pub async fn answer_handler(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    payload: Result<Json<AnswerRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<GeneratedText>>> {
    let start = Instant::now();
    let Json(request) = payload?;
    info!(
        session_id = %session.0,
        difficulty = %request.difficulty,
        question_length = request.question.len(),
        "Answer requested"
    );

    let handle = existing_session(&state, session).await?;
    let controller = handle.lock().await;
    let text = controller
        .get_answer(&state.dispatcher, &request.question, request.difficulty)
        .await?;

    Ok(Json(ApiResponse::new(
        GeneratedText {
            text,
            difficulty: request.difficulty,
            model: state.dispatcher.model().to_string(),
        },
        start.elapsed().as_millis() as u64,
    )))
}

/// Actions never create a session; one without an upload has nothing to work on.
async fn existing_session(state: &AppState, session: SessionId) -> AppResult<SessionHandle> {
    state
        .sessions
        .get(session.0)
        .await
        .ok_or_else(|| ValidationError::NoDocument.into())
}

pub async fn difficulties_handler() -> Json<Vec<DifficultyInfo>> {
    Json(
        DifficultyLevel::ALL
            .into_iter()
            .map(|level| DifficultyInfo {
                level,
                prefix: level.prefix().to_string(),
            })
            .collect(),
    )
}
