//! Axum route handler for PDF export.

use std::path::PathBuf;

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::orchestrator::ExportReceipt;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    /// Path of the rendered preview raster to paginate.
    pub surface: String,
}

/// POST /api/v1/export
///
/// Captures the preview raster, paginates it and writes the PDF. Returns 409 while
/// another export is running.
pub async fn handle_export(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Result<Json<ExportReceipt>, AppError> {
    if request.surface.trim().is_empty() {
        return Err(AppError::Validation("surface cannot be empty".to_string()));
    }

    let receipt = state.session.export(PathBuf::from(request.surface)).await?;
    Ok(Json(receipt))
}
