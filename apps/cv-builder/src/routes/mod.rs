pub mod document;
pub mod health;
pub mod settings;

use axum::{
    extract::State,
    response::Html,
    routing::{get, patch, post, put},
    Router,
};

use crate::errors::AppError;
use crate::export::handlers::handle_export;
use crate::generation::handlers::{handle_generate_experience, handle_generate_summary};
use crate::state::AppState;

/// GET /
/// The live preview page, rendered from the current document.
async fn preview_handler(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let doc = state.session.document();
    let html = state
        .renderer
        .render(&doc)
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok(Html(html))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/", get(preview_handler))
        .route("/api/v1/session", get(document::handle_get_session))
        // Form edits
        .route(
            "/api/v1/document/personal",
            patch(document::handle_set_personal),
        )
        .route("/api/v1/document/summary", put(document::handle_set_summary))
        .route("/api/v1/document/:list", post(document::handle_add_entry))
        .route(
            "/api/v1/document/:list/:index",
            patch(document::handle_set_entry_field).delete(document::handle_remove_entry),
        )
        // AI drafting
        .route("/api/v1/generate/summary", post(handle_generate_summary))
        .route(
            "/api/v1/generate/experience/:index",
            post(handle_generate_experience),
        )
        // Settings & export
        .route(
            "/api/v1/settings/credential",
            put(settings::handle_save_credential),
        )
        .route("/api/v1/export", post(handle_export))
        .with_state(state)
}
