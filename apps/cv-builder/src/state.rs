use std::sync::Arc;

use crate::orchestrator::Orchestrator;
use crate::render::PreviewRenderer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The one editing session this process serves.
    pub session: Arc<Orchestrator>,
    pub renderer: Arc<PreviewRenderer>,
}
