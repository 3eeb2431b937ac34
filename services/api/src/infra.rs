use crate::cli::ModelArgs;
use loan_risk::config::AppConfig;
use loan_risk::error::AppError;
use loan_risk::scoring::{ForestModel, ModelInfo, RiskScoringService};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) model: Arc<ModelInfo>,
}

/// Explicit `--model` wins; otherwise fall back to the environment configuration.
pub(crate) fn resolve_model_path(args: &ModelArgs) -> Result<PathBuf, AppError> {
    match &args.path {
        Some(path) => Ok(path.clone()),
        None => Ok(AppConfig::load()?.model.artifact_path),
    }
}

/// Loads the artifact once. Any failure is fatal to the caller.
pub(crate) fn load_model(path: &Path) -> Result<Arc<ForestModel>, AppError> {
    let model = ForestModel::from_path(path)?;
    let info = model.info();
    info!(
        model = %info.name,
        trees = info.tree_count,
        path = %path.display(),
        "risk model loaded"
    );
    Ok(Arc::new(model))
}

pub(crate) fn scoring_service(model: Arc<ForestModel>) -> RiskScoringService<ForestModel> {
    RiskScoringService::with_standard_mappings(model)
}
