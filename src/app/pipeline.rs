//! Shared "predict" pipeline.
//!
//! Keeping this in one place keeps the workflow testable without the CLI:
//! open store -> load + validate dataset -> resolve request -> predict

use tracing::{info, warn};

use crate::data::{load_dataset, open_store};
use crate::domain::{CollegeWithCutoff, PredictConfig, PredictionFilters};
use crate::error::AppError;
use crate::io::ingest::Dataset;
use crate::predict::{predict_colleges_from_database, predict_colleges_parallel};

/// All computed outputs of a single `tnea predict` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub source: String,
    pub dataset: Dataset,
    /// `None` when the request did not resolve (results are then empty).
    pub filters: Option<PredictionFilters>,
    pub results: Vec<CollegeWithCutoff>,
}

/// Execute the full pipeline and return the computed outputs.
pub fn run_predict(config: &PredictConfig) -> Result<RunOutput, AppError> {
    let store = open_store(&config.source)?;
    let dataset = load_dataset(store.as_ref())?;
    Ok(run_predict_with_dataset(config, dataset, store.describe()))
}

/// Execute the prediction step on an already-loaded dataset.
pub fn run_predict_with_dataset(config: &PredictConfig, dataset: Dataset, source: String) -> RunOutput {
    let filters = config.request.clone().into_filters();

    let results = match &filters {
        None => {
            warn!("prediction request did not resolve; returning no results");
            Vec::new()
        }
        Some(f) if config.parallel => {
            predict_colleges_parallel(f, &dataset.colleges, &dataset.branches, &dataset.cutoffs)
        }
        Some(f) => predict_colleges_from_database(f, &dataset.colleges, &dataset.branches, &dataset.cutoffs),
    };

    info!(results = results.len(), parallel = config.parallel, "prediction complete");

    RunOutput {
        source,
        dataset,
        filters,
        results,
    }
}
