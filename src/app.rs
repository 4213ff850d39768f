//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - initializes logging
//! - runs the reconciliation pipeline
//! - prints the run summary
//! - writes the dataset (`build` only)

use clap::Parser;
use tracing::info;

use crate::cli::{Command, LogFormatArg, RunArgs};
use crate::domain::ReconcileConfig;
use crate::error::AppError;
use crate::logging::{LogConfig, LogFormat, init_logging};

pub mod pipeline;

/// Entry point for the `recon` binary.
pub fn run() -> Result<(), AppError> {
    // Environment defaults (`RECON_DATA_DIR`, `RECON_OUTPUT`, `RUST_LOG`) may live in `.env`.
    dotenvy::dotenv().ok();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Build(args) => handle_run(args, OutputMode::Write),
        Command::Check(args) => handle_run(args, OutputMode::DryRun),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Write,
    DryRun,
}

fn handle_run(args: RunArgs, mode: OutputMode) -> Result<(), AppError> {
    init_logging(&LogConfig::from_verbosity(args.verbose).with_format(log_format(args.log_format)));

    let mut config = config_from_args(&args);
    if mode == OutputMode::DryRun {
        config.output = None;
    }

    let run = pipeline::run_reconcile(&config)?;
    println!("{}", crate::report::format_run_summary(&run, &config));

    if let Some(path) = &config.output {
        crate::io::write_dataset_json(path, &run.dataset())?;
        info!(path = %path.display(), countries = run.reconciled.sync.accepted.len(), "dataset written");
        println!("Data successfully written to {}", path.display());
    }

    Ok(())
}

pub fn config_from_args(args: &RunArgs) -> ReconcileConfig {
    let mut config = ReconcileConfig::with_defaults(&args.data_dir);
    config.base_year = args.base_year;
    config.output = Some(args.output.clone());

    let countries: Vec<String> = args
        .countries
        .iter()
        .map(|c| c.trim().to_ascii_uppercase())
        .filter(|c| !c.is_empty())
        .collect();
    if !countries.is_empty() {
        config.countries = countries;
    }
    if args.no_patches {
        config.patches.clear();
    }
    config
}

fn log_format(arg: LogFormatArg) -> LogFormat {
    match arg {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    }
}

/// Rewrite argv so `recon` defaults to `recon build`.
///
/// Rules:
/// - `recon`                     -> `recon build`
/// - `recon --data-dir X ...`    -> `recon build --data-dir X ...`
/// - `recon --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("build".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "build" | "check");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "build flags".
    if arg1.starts_with('-') {
        argv.insert(1, "build".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_build() {
        assert_eq!(rewrite_args(argv(&["recon"])), argv(&["recon", "build"]));
        assert_eq!(
            rewrite_args(argv(&["recon", "--data-dir", "x"])),
            argv(&["recon", "build", "--data-dir", "x"])
        );
        assert_eq!(rewrite_args(argv(&["recon", "check"])), argv(&["recon", "check"]));
        assert_eq!(rewrite_args(argv(&["recon", "--help"])), argv(&["recon", "--help"]));
    }

    #[test]
    fn config_applies_overrides() {
        let cli = crate::cli::Cli::parse_from(["recon", "build", "--countries", "aus, mex", "--no-patches", "--base-year", "2010"]);
        let Command::Build(args) = cli.command else {
            panic!("expected build");
        };
        let config = config_from_args(&args);
        assert_eq!(config.countries, vec!["AUS".to_string(), "MEX".to_string()]);
        assert!(config.patches.is_empty());
        assert_eq!(config.base_year, 2010);
        assert_eq!(config.output.as_deref(), Some(std::path::Path::new("data/affordability.json")));
    }
}
