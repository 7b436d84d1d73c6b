//! Lead widget server
//!
//! Hosts embeddable real-estate chat widgets that walk a visitor through a
//! scripted qualification flow and hand finished leads to a capture service.

mod api;
mod backend;
mod config;
mod runtime;
mod state_machine;
mod tone;
mod transcript;

use api::{create_router, AppState};
use config::ServerConfig;
use runtime::IDLE_SWEEP_INTERVAL;
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lead_widget=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = ServerConfig::from_env();
    tracing::info!(
        knowledge_base = %config.knowledge_base_url,
        contact_capture = %config.contact_capture_url,
        timeout_secs = config.backend_timeout.as_secs(),
        idle_timeout_secs = config.idle_timeout.as_secs(),
        "Backend services configured"
    );

    // Create application state
    let state = AppState::new(&config)?;
    state.widgets.start_idle_sweeper(IDLE_SWEEP_INTERVAL);

    // Widgets are embedded on arbitrary host pages
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new().gzip(true).br(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Lead widget server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
