//! Cutoff data store access.
//!
//! The prediction engine wants complete in-memory snapshots; a store only
//! has to answer three "fetch all rows" reads.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::{Branch, BranchRow, College, CollegeRow, CutoffRecord, CutoffRow, DataSource};
use crate::error::AppError;
use crate::io::ingest::{assemble_dataset, read_table_csv, Dataset, Table, TableLoad};

/// Read access to colleges, branches and historical cutoffs.
pub trait CutoffStore {
    /// Human-readable origin, for logs and the run summary.
    fn describe(&self) -> String;

    fn fetch_colleges(&self) -> Result<TableLoad<College>, AppError>;

    fn fetch_branches(&self) -> Result<TableLoad<Branch>, AppError>;

    fn fetch_cutoffs(&self) -> Result<TableLoad<CutoffRecord>, AppError>;
}

/// Fetch all three tables and validate them into a `Dataset`.
pub fn load_dataset(store: &dyn CutoffStore) -> Result<Dataset, AppError> {
    let colleges = store.fetch_colleges()?;
    let branches = store.fetch_branches()?;
    let cutoffs = store.fetch_cutoffs()?;

    let dataset = assemble_dataset(colleges, branches, cutoffs)?;
    info!(
        source = %store.describe(),
        colleges = dataset.stats.n_colleges,
        branches = dataset.stats.n_branches,
        cutoffs = dataset.stats.n_cutoffs,
        rejected = dataset.row_errors.len(),
        "dataset loaded"
    );
    Ok(dataset)
}

/// Open the store named by a `DataSource`.
pub fn open_store(source: &DataSource) -> Result<Box<dyn CutoffStore>, AppError> {
    match source {
        DataSource::Csv(dir) => Ok(Box::new(CsvStore::new(dir)?)),
        DataSource::Remote => Ok(Box::new(crate::data::rest::RestStore::from_env()?)),
    }
}

/// A directory holding `colleges.csv`, `branches.csv` and `cutoffs.csv`.
#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    pub fn new(dir: &Path) -> Result<Self, AppError> {
        if !dir.is_dir() {
            return Err(AppError::usage(format!(
                "Dataset directory '{}' does not exist. Generate one with `tnea sample --out {}`.",
                dir.display(),
                dir.display()
            )));
        }
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path(&self, table: Table) -> PathBuf {
        self.dir.join(table.file_name())
    }
}

impl CutoffStore for CsvStore {
    fn describe(&self) -> String {
        format!("csv:{}", self.dir.display())
    }

    fn fetch_colleges(&self) -> Result<TableLoad<College>, AppError> {
        read_table_csv::<CollegeRow>(&self.path(Table::Colleges))
    }

    fn fetch_branches(&self) -> Result<TableLoad<Branch>, AppError> {
        read_table_csv::<BranchRow>(&self.path(Table::Branches))
    }

    fn fetch_cutoffs(&self) -> Result<TableLoad<CutoffRecord>, AppError> {
        read_table_csv::<CutoffRow>(&self.path(Table::Cutoffs))
    }
}
