//! Input/output helpers.
//!
//! - store-row ingest + validation (`ingest`)
//! - result and dataset exports (CSV/JSON) (`export`)
//! - prediction request files (`request`)

pub mod export;
pub mod ingest;
pub mod request;

pub use export::*;
pub use ingest::*;
pub use request::*;
