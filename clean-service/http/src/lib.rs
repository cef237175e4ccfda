use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clean_application::CleanFileUseCase;
use clean_configuration::ServerConfig;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod handlers;

pub use error::{error_mapper, HttpError};
pub use handlers::*;

pub const CLEAN_ROUTE: &str = "/api/clean";

#[derive(Clone)]
pub struct AppState {
    pub usecase: Arc<dyn CleanFileUseCase>,
}

impl AppState {
    pub fn new(usecase: Arc<dyn CleanFileUseCase>) -> Self {
        Self { usecase }
    }
}

pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    // Uploads are unbounded unless the operator sets a cap.
    let body_limit = match config.max_body_bytes {
        Some(max) => DefaultBodyLimit::max(max),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        .route("/health", get(health_check))
        .route(CLEAN_ROUTE, post(clean_file).layer(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn create_app_routes(state: AppState, config: ServerConfig) -> anyhow::Result<()> {
    let router = build_router(state, &config);
    let bind_addr = config.bind_address();
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!(bind_addr = %bind_addr, "clean http server listening");
    axum::serve(listener, router).await?;
    Ok(())
}
