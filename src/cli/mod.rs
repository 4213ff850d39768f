//! Command-line parsing for the housing-affordability reconciler.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! reconciliation code; `app` turns these arguments into a `ReconcileConfig`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::DEFAULT_BASE_YEAR;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "recon", version, about = "Reconcile OECD housing affordability series into one dataset")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reconcile all sources and write the dataset JSON.
    Build(RunArgs),
    /// Reconcile and print the summary without writing anything.
    Check(RunArgs),
}

/// Diagnostic log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

/// Options shared by `build` and `check`.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Directory holding the raw CSV exports and patch files.
    #[arg(long, env = "RECON_DATA_DIR", default_value = "_artifacts")]
    pub data_dir: PathBuf,

    /// Dataset JSON output path (`build` only).
    #[arg(short, long, env = "RECON_OUTPUT", default_value = "data/affordability.json")]
    pub output: PathBuf,

    /// Year whose CPI level real income is expressed in.
    #[arg(long, default_value_t = DEFAULT_BASE_YEAR)]
    pub base_year: i32,

    /// Comma-separated ISO-3 allowlist (defaults to the 37 OECD members covered).
    #[arg(long, value_delimiter = ',')]
    pub countries: Vec<String>,

    /// Skip the country-specific patch sources.
    #[arg(long)]
    pub no_patches: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormatArg::Pretty)]
    pub log_format: LogFormatArg,
}
