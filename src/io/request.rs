//! Prediction requests as supplied by a caller (CLI flags or a JSON file).
//!
//! Requests are loosely typed on purpose: category and college-type strings
//! are only checked when converted into `PredictionFilters`, and a request
//! that does not convert simply produces no predictions.

use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{Category, CollegeType, PredictionFilters};
use crate::error::AppError;

/// Student marks, category and preferences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionRequest {
    pub marks: Option<f64>,
    pub category: Option<String>,
    pub preferred_district: Option<String>,
    /// Accepts both `college_type` and `college_types`.
    #[serde(alias = "college_types")]
    pub college_type: Vec<String>,
    /// Branch ids. Accepts both `branches` and `branch_ids`.
    #[serde(alias = "branch_ids")]
    pub branches: Vec<String>,
}

impl PredictionRequest {
    /// Overlay `other` on top of `self`: any field set in `other` wins.
    pub fn merged_with(mut self, other: PredictionRequest) -> PredictionRequest {
        if other.marks.is_some() {
            self.marks = other.marks;
        }
        if other.category.is_some() {
            self.category = other.category;
        }
        if other.preferred_district.is_some() {
            self.preferred_district = other.preferred_district;
        }
        if !other.college_type.is_empty() {
            self.college_type = other.college_type;
        }
        if !other.branches.is_empty() {
            self.branches = other.branches;
        }
        self
    }

    /// Resolve into engine filters.
    ///
    /// Returns `None` (with a warning) for a missing/empty/unknown category,
    /// an unknown college type, or missing/non-positive marks.
    pub fn into_filters(self) -> Option<PredictionFilters> {
        let marks = match self.marks {
            Some(m) if m.is_finite() && m > 0.0 => m,
            other => {
                warn!(marks = ?other, "marks missing or not positive; no prediction");
                return None;
            }
        };

        let category = match Category::from_str(self.category.as_deref().unwrap_or("")) {
            Ok(c) => c,
            Err(e) => {
                warn!("{e} No prediction.");
                return None;
            }
        };

        let mut college_types = Vec::with_capacity(self.college_type.len());
        for raw in self.college_type.iter().filter(|s| !s.trim().is_empty()) {
            match CollegeType::from_str(raw) {
                Ok(t) => college_types.push(t),
                Err(e) => {
                    warn!("{e} No prediction.");
                    return None;
                }
            }
        }

        let preferred_district = self
            .preferred_district
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let branch_ids = self
            .branches
            .into_iter()
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .collect();

        Some(PredictionFilters {
            marks,
            category,
            preferred_district,
            college_types,
            branch_ids,
        })
    }
}

/// Read a request JSON file.
pub fn read_request_json(path: &Path) -> Result<PredictionRequest, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::usage(format!("Failed to open request JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::usage(format!("Invalid request JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_with_optional_fields() {
        let req: PredictionRequest = serde_json::from_str(
            r#"{ "marks": 180, "category": "oc", "college_types": ["Government"], "branch_ids": ["B1", " "] }"#,
        )
        .unwrap();
        let filters = req.into_filters().unwrap();
        assert_eq!(filters.category, Category::Oc);
        assert_eq!(filters.college_types, vec![CollegeType::Government]);
        assert_eq!(filters.branch_ids, vec!["B1".to_string()]);
        assert_eq!(filters.preferred_district, None);
    }

    #[test]
    fn bad_inputs_do_not_convert() {
        let base = PredictionRequest {
            marks: Some(150.0),
            category: Some("BC".to_string()),
            ..Default::default()
        };
        assert!(base.clone().into_filters().is_some());

        let empty_category = PredictionRequest {
            category: Some("  ".to_string()),
            ..base.clone()
        };
        assert!(empty_category.into_filters().is_none());

        let zero_marks = PredictionRequest {
            marks: Some(0.0),
            ..base.clone()
        };
        assert!(zero_marks.into_filters().is_none());

        let unknown_type = PredictionRequest {
            college_type: vec!["deemed".to_string()],
            ..base
        };
        assert!(unknown_type.into_filters().is_none());
    }

    #[test]
    fn flags_override_file() {
        let file = PredictionRequest {
            marks: Some(150.0),
            category: Some("BC".to_string()),
            branches: vec!["B1".to_string()],
            ..Default::default()
        };
        let flags = PredictionRequest {
            marks: Some(170.0),
            ..Default::default()
        };
        let merged = file.merged_with(flags);
        assert_eq!(merged.marks, Some(170.0));
        assert_eq!(merged.category.as_deref(), Some("BC"));
        assert_eq!(merged.branches, vec!["B1".to_string()]);
    }
}
