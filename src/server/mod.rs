mod extract;
pub mod handlers;
pub mod types;

use crate::{Result, config::Config, service::StructureService};
use axum::{
    Router,
    extract::{DefaultBodyLimit, Request},
    routing::{get, post},
};
use handlers::AppState;
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, info_span};
use uuid::Uuid;

/// Builds the application router. Every request runs inside its own span
/// tagged with a fresh `request_id`. Request bodies are capped at
/// `state.max_body_bytes`.
pub fn router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_body_bytes);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        info_span!(
            "request",
            request_id = %Uuid::new_v4(),
            method = %request.method(),
            path = %request.uri().path(),
        )
    });

    Router::new()
        .route("/api/validate-smiles", post(handlers::validate_smiles))
        .route("/api/recognize-structure", post(handlers::recognize_structure))
        .route("/api/molfile-to-structure", post(handlers::molfile_to_structure))
        .route("/health", get(handlers::health))
        .layer(body_limit)
        .layer(trace)
        .layer(cors)
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    let service = StructureService::from_config(&config)?;

    if let Some(limit) = config.recognizer.max_concurrent {
        info!("Recognizer admission limited to {} concurrent runs", limit);
    }

    info!(
        "Request bodies limited to {} bytes",
        config.server.max_body_bytes
    );

    let app = router(AppState::with_config(service, &config.server));

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting chemical structure service on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
