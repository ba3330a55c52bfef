mod config;
mod credential;
mod errors;
mod export;
mod generation;
mod llm_client;
mod models;
mod orchestrator;
mod render;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::credential::FileCredentialStore;
use crate::export::ImageFileCapture;
use crate::generation::drafting::DraftingClient;
use crate::llm_client::GeminiClient;
use crate::models::Document;
use crate::orchestrator::{ExportSettings, Orchestrator};
use crate::render::PreviewRenderer;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV builder v{}", env!("CARGO_PKG_VERSION"));

    let gemini = GeminiClient::new()?;
    info!("Gemini client initialized (model: {})", llm_client::MODEL);

    let credential_store = FileCredentialStore::new(&config.credential_path);
    info!("Credential file: {}", credential_store.path().display());

    let session = Orchestrator::new(
        Document::sample(),
        DraftingClient::new(Arc::new(gemini)),
        Arc::new(credential_store),
        Arc::new(ImageFileCapture),
        ExportSettings {
            dir: config.export_dir.clone(),
            format: config.page_format,
        },
    )?;
    info!(
        "Exports go to {} ({:?})",
        config.export_dir.display(),
        config.page_format
    );

    let state = AppState {
        session: Arc::new(session),
        renderer: Arc::new(PreviewRenderer::new()?),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Loopback only: the session holds the user's API key.
    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    info!("Listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
