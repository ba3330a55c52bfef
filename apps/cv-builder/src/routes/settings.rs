use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tokio::task;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialRequest {
    pub credential: String,
}

/// PUT /api/v1/settings/credential
/// Persists the Gemini API key on this device and makes it the active one.
pub async fn handle_save_credential(
    State(state): State<AppState>,
    Json(request): Json<CredentialRequest>,
) -> Result<StatusCode, AppError> {
    let session = state.session.clone();
    task::spawn_blocking(move || session.save_credential(&request.credential))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("credential task failed: {e}")))??;
    Ok(StatusCode::NO_CONTENT)
}
