//! Axum route handlers for AI drafting.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::generation::tracker::GenerationTarget;
use crate::models::Document;
use crate::orchestrator::GenerateOutcome;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerateStatus {
    Applied,
    Discarded,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub key: String,
    pub status: GenerateStatus,
    pub text: Option<String>,
    pub document: Document,
}

/// POST /api/v1/generate/summary
pub async fn handle_generate_summary(
    State(state): State<AppState>,
) -> Result<Json<GenerateResponse>, AppError> {
    run(&state, GenerationTarget::Summary).await
}

/// POST /api/v1/generate/experience/:index
pub async fn handle_generate_experience(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<GenerateResponse>, AppError> {
    run(&state, GenerationTarget::ExperienceDescription(index)).await
}

async fn run(state: &AppState, target: GenerationTarget) -> Result<Json<GenerateResponse>, AppError> {
    let key = target.key().to_string();
    let outcome = state.session.generate(target).await?;

    let (status, text) = match outcome {
        GenerateOutcome::Applied { text, .. } => (GenerateStatus::Applied, Some(text)),
        GenerateOutcome::Discarded => (GenerateStatus::Discarded, None),
        GenerateOutcome::Busy => return Err(AppError::GenerationInProgress(key)),
    };

    Ok(Json(GenerateResponse {
        key,
        status,
        text,
        document: (*state.session.document()).clone(),
    }))
}
