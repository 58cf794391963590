//! Reporting utilities: run summary, ranked result tables, dataset summary.

pub mod format;

pub use format::*;
