//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - closed enums validated at the data-store boundary (`CollegeType`, `Category`)
//! - store entities (`College`, `Branch`, `CutoffRecord`) and their raw rows
//! - prediction inputs/outputs (`PredictionFilters`, `CollegeWithCutoff`)

pub mod types;

pub use types::*;
