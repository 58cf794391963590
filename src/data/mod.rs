//! Data collaborators: the cutoff store, analytics recording, demo datasets.

pub mod analytics;
pub mod rest;
pub mod sample;
pub mod store;

pub use analytics::{record_prediction, AnalyticsSink, JsonlAnalytics, PredictionLog, RestAnalytics};
pub use rest::RestStore;
pub use sample::{generate_dataset, SampleConfig, SampleDataset};
pub use store::{load_dataset, open_store, CsvStore, CutoffStore};
