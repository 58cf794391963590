//! Command-line parsing for the TNEA admission predictor.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the prediction code.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "tnea", version, about = "TNEA cutoff-based admission predictor")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `TNEA_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Predict colleges/branches for a student's marks and category.
    Predict(PredictArgs),
    /// Validate a dataset and print its summary and rejected rows.
    Inspect(InspectArgs),
    /// Write a deterministic synthetic dataset (CSV) for demos and testing.
    Sample(SampleArgs),
}

/// Where to read colleges/branches/cutoffs from.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Dataset directory with colleges.csv, branches.csv, cutoffs.csv.
    #[arg(long, value_name = "DIR", default_value = "data")]
    pub data: PathBuf,

    /// Read from the hosted store (TNEA_STORE_URL / TNEA_STORE_KEY) instead of CSV.
    #[arg(long)]
    pub remote: bool,
}

#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Request JSON file (marks, category, preferred_district, college_type, branches).
    /// Flags given on the command line override its fields.
    #[arg(long, value_name = "JSON")]
    pub request: Option<PathBuf>,

    /// Aggregate marks out of 200.
    #[arg(short, long)]
    pub marks: Option<f64>,

    /// Community category (OC, BC, BCM, MBC, SC, SCA, ST).
    #[arg(short, long)]
    pub category: Option<String>,

    /// Only colleges in this district.
    #[arg(short, long)]
    pub district: Option<String>,

    /// Only these college types (government, aided, self-financing). Comma-separated.
    #[arg(short = 't', long = "college-type", value_delimiter = ',')]
    pub college_type: Vec<String>,

    /// Only these branch ids. Comma-separated.
    #[arg(short, long = "branch", value_delimiter = ',')]
    pub branches: Vec<String>,

    /// Rows shown in the table (0 = all).
    #[arg(long, default_value_t = 25)]
    pub top: usize,

    /// Spread the prediction over all cores (same output).
    #[arg(long)]
    pub parallel: bool,

    /// Export ranked results to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export full results (with every cutoff year) to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Append each prediction request to a JSONL file.
    #[arg(long = "log-requests", value_name = "JSONL")]
    pub log_requests: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct InspectArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Maximum rejected rows to list.
    #[arg(long, default_value_t = 20)]
    pub errors: usize,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Output directory.
    #[arg(long, value_name = "DIR", default_value = "data")]
    pub out: PathBuf,

    /// Number of colleges to generate.
    #[arg(short = 'n', long, default_value_t = 60)]
    pub colleges: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// First cutoff year.
    #[arg(long, default_value_t = 2021)]
    pub year_from: u16,

    /// Last cutoff year.
    #[arg(long, default_value_t = 2023)]
    pub year_to: u16,
}
