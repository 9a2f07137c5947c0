use analytics::AnalyticsEngine;
use axum::{Router, routing::get};
use configuration::Config;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
///
/// It is immutable: the currently selected tracking directory, experiment and
/// run live in the browser and arrive with each request.
pub struct AppState {
    pub config: Config,
    pub engine: AnalyticsEngine,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let engine = AnalyticsEngine::new(
            config.analytics.trading_days_per_year,
            config.analytics.histogram_bins,
        );
        Self { config, engine }
    }
}

/// Builds the application router with its middleware.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/settings", get(handlers::get_settings))
        .route("/api/experiments", get(handlers::get_experiments))
        .route("/api/experiments/:experiment_id/runs", get(handlers::get_runs))
        .route(
            "/api/experiments/:experiment_id/runs/:run_id",
            get(handlers::get_run_details),
        )
        .with_state(state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// The main function to configure and run the web server.
///
/// Tracing must already be initialised by the caller.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let addr = config.server.socket_addr()?;
    tracing::info!(
        tracking_dir = %config.tracking.root_dir.display(),
        layout_version = %config.artifacts.layout_version,
        "Artifact layout in use."
    );

    let app = create_router(Arc::new(AppState::new(config)));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Dashboard listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
