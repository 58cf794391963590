//! Prediction engine.
//!
//! - `estimator`: marks vs. latest cutoff -> label + score
//! - `predictor`: filter/join/score/rank over the whole dataset
//! - `fees`: fee estimate by funding type

pub mod estimator;
pub mod fees;
pub mod predictor;

pub use estimator::{estimate_probability, latest_record, score_difference};
pub use fees::estimate_fees;
pub use predictor::{predict_colleges_from_database, predict_colleges_parallel, MIN_PROBABILITY_SCORE};
