//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - loads the dataset from CSV or the hosted store
//! - runs the prediction pipeline
//! - prints reports and writes optional exports

use clap::Parser;
use tracing::debug;

use crate::cli::{Command, DataArgs, InspectArgs, PredictArgs, SampleArgs};
use crate::data::{record_prediction, AnalyticsSink, JsonlAnalytics, PredictionLog, RestAnalytics, SampleConfig};
use crate::domain::{DataSource, PredictConfig};
use crate::error::AppError;
use crate::io::request::{read_request_json, PredictionRequest};

pub mod pipeline;

/// Entry point for the `tnea` binary.
pub fn run() -> Result<(), AppError> {
    // `tnea -m 180 -c OC` behaves like `tnea predict -m 180 -c OC`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    crate::logging::init_tracing(cli.verbose);

    match cli.command {
        Command::Predict(args) => handle_predict(args),
        Command::Inspect(args) => handle_inspect(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let config = predict_config_from_args(&args)?;
    let run = pipeline::run_predict(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(run.filters.as_ref(), &run.dataset, &run.source, &run.results)
    );
    println!("{}", crate::report::format_results(&run.results, config.top_n));

    if let Some(path) = &config.export_results {
        crate::io::export::write_results_csv(path, &run.results)?;
    }
    if let Some(path) = &config.export_json {
        crate::io::export::write_results_json(path, &run.results)?;
    }

    // Only resolved requests are worth recording.
    if let Some(filters) = &run.filters {
        let entry = PredictionLog::new(filters, run.results.len());
        let sink: Option<Box<dyn AnalyticsSink>> = match &config.log_requests {
            Some(path) => Some(Box::new(JsonlAnalytics::new(path))),
            None => RestAnalytics::from_env().map(|s| Box::new(s) as Box<dyn AnalyticsSink>),
        };
        match sink {
            Some(sink) => record_prediction(sink.as_ref(), &entry),
            None => debug!("no analytics sink configured"),
        }
    }

    Ok(())
}

fn handle_inspect(args: InspectArgs) -> Result<(), AppError> {
    let store = crate::data::open_store(&data_source(&args.data))?;
    let dataset = crate::data::load_dataset(store.as_ref())?;
    println!(
        "{}",
        crate::report::format_dataset_summary(&dataset, &store.describe(), args.errors)
    );
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        colleges: args.colleges,
        seed: args.seed,
        year_from: args.year_from,
        year_to: args.year_to,
    };
    let sample = crate::data::generate_dataset(&config)?;
    crate::io::export::write_dataset_csv(&args.out, &sample.colleges, &sample.branches, &sample.cutoffs)?;

    println!(
        "Wrote {} colleges, {} branches, {} cutoff rows to {}",
        sample.colleges.len(),
        sample.branches.len(),
        sample.cutoffs.len(),
        args.out.display()
    );
    Ok(())
}

fn data_source(args: &DataArgs) -> DataSource {
    if args.remote {
        DataSource::Remote
    } else {
        DataSource::Csv(args.data.clone())
    }
}

/// Resolve CLI flags (plus an optional request file) into a pipeline config.
///
/// Flags override fields from `--request`.
pub fn predict_config_from_args(args: &PredictArgs) -> Result<PredictConfig, AppError> {
    let from_flags = PredictionRequest {
        marks: args.marks,
        category: args.category.clone(),
        preferred_district: args.district.clone(),
        college_type: args.college_type.clone(),
        branches: args.branches.clone(),
    };

    let request = match &args.request {
        Some(path) => read_request_json(path)?.merged_with(from_flags),
        None => from_flags,
    };

    Ok(PredictConfig {
        source: data_source(&args.data),
        request,
        top_n: args.top,
        parallel: args.parallel,
        export_results: args.export.clone(),
        export_json: args.export_json.clone(),
        log_requests: args.log_requests.clone(),
    })
}

/// Rewrite argv so flags without a subcommand mean `predict`.
///
/// Rules:
/// - `tnea -m 180 -c OC`        -> `tnea predict -m 180 -c OC`
/// - `tnea -v -m 180 ...`       -> `tnea -v predict -m 180 ...`
/// - `tnea`, `--help/--version` -> unchanged (clap shows help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let first = argv
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, a)| !is_verbosity_flag(a))
        .map(|(i, a)| (i, a.clone()));

    let Some((idx, arg)) = first else {
        return argv;
    };

    let is_help_or_version = matches!(arg.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    let is_subcommand = matches!(arg.as_str(), "predict" | "inspect" | "sample");
    if is_help_or_version || is_subcommand {
        return argv;
    }

    if arg.starts_with('-') {
        argv.insert(idx, "predict".to_string());
    }
    argv
}

fn is_verbosity_flag(arg: &str) -> bool {
    arg == "--verbose" || (arg.len() > 1 && arg.starts_with('-') && arg[1..].chars().all(|c| c == 'v'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flags_first_become_predict() {
        assert_eq!(
            rewrite_args(argv(&["tnea", "-m", "180", "-c", "OC"])),
            argv(&["tnea", "predict", "-m", "180", "-c", "OC"])
        );
        assert_eq!(
            rewrite_args(argv(&["tnea", "-vv", "--marks", "150"])),
            argv(&["tnea", "-vv", "predict", "--marks", "150"])
        );
    }

    #[test]
    fn subcommands_and_help_unchanged() {
        for args in [
            argv(&["tnea"]),
            argv(&["tnea", "--help"]),
            argv(&["tnea", "-V"]),
            argv(&["tnea", "inspect", "--data", "d"]),
            argv(&["tnea", "-v", "sample"]),
            argv(&["tnea", "-v"]),
        ] {
            assert_eq!(rewrite_args(args.clone()), args);
        }
    }

    #[test]
    fn flags_override_request_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.json");
        std::fs::write(
            &path,
            r#"{"marks": 160, "category": "BC", "preferred_district": "Madurai", "college_types": ["aided"]}"#,
        )
        .unwrap();

        let cli = crate::cli::Cli::try_parse_from([
            "tnea",
            "predict",
            "--request",
            path.to_str().unwrap(),
            "-m",
            "181",
            "--remote",
        ])
        .unwrap();
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };

        let config = predict_config_from_args(&args).unwrap();
        assert_eq!(config.source, DataSource::Remote);
        assert_eq!(config.request.marks, Some(181.0));
        assert_eq!(config.request.category.as_deref(), Some("BC"));
        assert_eq!(config.request.preferred_district.as_deref(), Some("Madurai"));
        assert_eq!(config.request.college_type, vec!["aided"]);
        assert_eq!(config.top_n, 25);
    }
}
