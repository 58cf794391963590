//! `tnea-predictor` library crate.
//!
//! The binary (`tnea`) is a thin wrapper around this library so that:
//!
//! - the prediction engine is testable without spawning processes
//! - the engine can be embedded behind other front ends
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod predict;
pub mod report;
