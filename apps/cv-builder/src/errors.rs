use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::credential::CredentialError;
use crate::export::ExportError;
use crate::generation::drafting::DraftError;
use crate::orchestrator::{EditError, GenerateError};

/// Surface-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error("A generation for {0} is already in progress")]
    GenerationInProgress(String),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<GenerateError> for AppError {
    fn from(err: GenerateError) -> Self {
        match err {
            GenerateError::Draft(e) => AppError::Draft(e),
            GenerateError::NoSuchEntry(index) => {
                AppError::NotFound(format!("No experience entry at position {index}"))
            }
        }
    }
}

impl From<EditError> for AppError {
    fn from(err: EditError) -> Self {
        AppError::NotFound(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Draft(e) => match e {
                DraftError::MissingCredential => {
                    (StatusCode::BAD_REQUEST, "MISSING_CREDENTIAL", e.to_string())
                }
                DraftError::InvalidCredential => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "INVALID_CREDENTIAL",
                    e.to_string(),
                ),
                DraftError::TransientFailure(cause) => {
                    tracing::error!("AI drafting error: {cause}");
                    (StatusCode::BAD_GATEWAY, "AI_UNAVAILABLE", e.to_string())
                }
            },
            AppError::GenerationInProgress(_) => (
                StatusCode::CONFLICT,
                "GENERATION_IN_PROGRESS",
                self.to_string(),
            ),
            AppError::Export(e) => match e {
                ExportError::CaptureUnavailable(_) => {
                    (StatusCode::NOT_FOUND, "CAPTURE_UNAVAILABLE", e.to_string())
                }
                ExportError::InProgress => {
                    (StatusCode::CONFLICT, "EXPORT_IN_PROGRESS", e.to_string())
                }
                ExportError::ExportFailed(cause) => {
                    tracing::error!("Export error: {cause}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "EXPORT_FAILED",
                        "Failed to create PDF. Please check the logs for details.".to_string(),
                    )
                }
            },
            AppError::Credential(e) => {
                tracing::error!("Credential error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Could not save the API key".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
