//! Fire-and-forget recording of prediction requests.
//!
//! Recording never influences a prediction: sink failures are logged at
//! `warn` and dropped.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{Category, CollegeType, PredictionFilters};
use crate::error::AppError;

pub const ANALYTICS_URL_ENV: &str = "TNEA_ANALYTICS_URL";

/// One prediction request as seen by analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionLog {
    pub timestamp: DateTime<Utc>,
    pub marks: f64,
    pub category: Category,
    pub preferred_district: Option<String>,
    pub college_types: Vec<CollegeType>,
    pub branch_ids: Vec<String>,
    pub result_count: usize,
}

impl PredictionLog {
    pub fn new(filters: &PredictionFilters, result_count: usize) -> Self {
        Self {
            timestamp: Utc::now(),
            marks: filters.marks,
            category: filters.category,
            preferred_district: filters.preferred_district.clone(),
            college_types: filters.college_types.clone(),
            branch_ids: filters.branch_ids.clone(),
            result_count,
        }
    }
}

pub trait AnalyticsSink {
    fn record(&self, entry: &PredictionLog) -> Result<(), AppError>;
}

/// Record `entry`, swallowing (but logging) any sink failure.
pub fn record_prediction(sink: &dyn AnalyticsSink, entry: &PredictionLog) {
    match sink.record(entry) {
        Ok(()) => debug!(result_count = entry.result_count, "prediction recorded"),
        Err(e) => warn!(error = %e, "failed to record prediction; continuing"),
    }
}

/// Appends one JSON object per line.
#[derive(Debug, Clone)]
pub struct JsonlAnalytics {
    path: PathBuf,
}

impl JsonlAnalytics {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl AnalyticsSink for JsonlAnalytics {
    fn record(&self, entry: &PredictionLog) -> Result<(), AppError> {
        let mut line = serde_json::to_string(entry)
            .map_err(|e| AppError::usage(format!("Failed to encode prediction log: {e}")))?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| AppError::usage(format!("Failed to open '{}': {e}", self.path.display())))?;
        file.write_all(line.as_bytes())
            .map_err(|e| AppError::usage(format!("Failed to append prediction log: {e}")))
    }
}

/// POSTs each entry as JSON to an HTTP endpoint.
pub struct RestAnalytics {
    client: Client,
    url: String,
}

impl RestAnalytics {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    /// `None` when `TNEA_ANALYTICS_URL` is unset or blank.
    pub fn from_env() -> Option<Self> {
        dotenvy::dotenv().ok();
        std::env::var(ANALYTICS_URL_ENV)
            .ok()
            .filter(|u| !u.trim().is_empty())
            .map(Self::new)
    }
}

impl AnalyticsSink for RestAnalytics {
    fn record(&self, entry: &PredictionLog) -> Result<(), AppError> {
        let resp = self
            .client
            .post(&self.url)
            .json(entry)
            .send()
            .map_err(|e| AppError::remote(format!("Analytics request failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(AppError::remote(format!(
                "Analytics request failed with status {}.",
                resp.status()
            )));
        }
        Ok(())
    }
}
