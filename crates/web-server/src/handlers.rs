use crate::{AppState, error::AppError};
use analytics::{RunView, build_run_view};
use axum::{
    Json,
    extract::{Path, Query, State},
    response::Html,
};
use core_types::{Experiment, RunInfo};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracking_store::TrackingStore;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Every data endpoint accepts the tracking root per request, so switching the
/// path in the sidebar re-scans without a restart.
#[derive(Debug, Default, Deserialize)]
pub struct TrackingQuery {
    pub tracking_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub default_tracking_dir: PathBuf,
    pub layout_version: String,
}

#[derive(Debug, Serialize)]
pub struct ExperimentsResponse {
    pub tracking_dir: PathBuf,
    pub experiments: Vec<Experiment>,
}

#[derive(Debug, Serialize)]
pub struct RunDetailsResponse {
    pub run: RunInfo,
    pub view: RunView,
}

impl AppState {
    fn open_store(&self, query: &TrackingQuery) -> Result<TrackingStore, AppError> {
        let root = query
            .tracking_dir
            .clone()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| self.config.tracking.root_dir.clone());
        Ok(TrackingStore::open(root)?)
    }
}

/// # GET /
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// # GET /api/settings
pub async fn get_settings(State(state): State<Arc<AppState>>) -> Json<SettingsResponse> {
    Json(SettingsResponse {
        default_tracking_dir: state.config.tracking.root_dir.clone(),
        layout_version: state.config.artifacts.layout_version.clone(),
    })
}

/// # GET /api/experiments
pub async fn get_experiments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TrackingQuery>,
) -> Result<Json<ExperimentsResponse>, AppError> {
    let store = state.open_store(&query)?;
    let experiments = store.list_experiments()?;
    Ok(Json(ExperimentsResponse {
        tracking_dir: store.root().to_path_buf(),
        experiments,
    }))
}

/// # GET /api/experiments/:experiment_id/runs
/// Runs of one experiment, most recent first.
pub async fn get_runs(
    Path(experiment_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<TrackingQuery>,
) -> Result<Json<Vec<RunInfo>>, AppError> {
    let store = state.open_store(&query)?;
    let runs = store.list_runs(&experiment_id)?;
    Ok(Json(runs))
}

/// # GET /api/experiments/:experiment_id/runs/:run_id
/// Loads the run's artifacts and computes its dashboard view.
pub async fn get_run_details(
    Path((experiment_id, run_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<TrackingQuery>,
) -> Result<Json<RunDetailsResponse>, AppError> {
    let store = state.open_store(&query)?;
    let run = store.run(&experiment_id, &run_id)?;
    let artifacts = store.load_artifacts(&experiment_id, &run_id, &state.config.artifacts)?;
    let view = build_run_view(&state.engine, &experiment_id, &run_id, &artifacts);
    tracing::info!(
        %experiment_id,
        %run_id,
        charts = view.charts.len(),
        notices = view.notices.len(),
        "Rendered run."
    );
    Ok(Json(RunDetailsResponse { run, view }))
}
