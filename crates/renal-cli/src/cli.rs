//! CLI argument definitions for the renal episode engine.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use renal_model::DuplicateDatePolicy;

#[derive(Parser)]
#[command(
    name = "renal",
    version,
    about = "Renal episode engine - AKI, AKD and CKD progression from laboratory data",
    long_about = "Detect acute kidney injury episodes and sustained eGFR decline from\n\
                  longitudinal creatinine measurements.\n\n\
                  Produces aki_year1, aki_all and progression_summary tables as CSV."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include patient identifiers in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the engine on a laboratory CSV and write the result tables.
    Run(RunArgs),

    /// Show one patient's daily references, flags and episodes.
    Inspect(InspectArgs),

    /// Print the effective engine options as JSON.
    Options(OptionArgs),
}

/// Options shared by every command that runs the engine.
#[derive(Args, Default)]
pub struct OptionArgs {
    /// JSON file with engine options; missing fields keep their defaults.
    #[arg(long = "options", value_name = "FILE")]
    pub options_file: Option<PathBuf>,

    /// How to resolve several labs on the same day.
    #[arg(long = "duplicates", value_enum)]
    pub duplicates: Option<DuplicatesArg>,

    /// Process patients on a single thread.
    #[arg(long = "sequential")]
    pub sequential: bool,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Laboratory CSV with one row per creatinine measurement.
    #[arg(value_name = "INPUT_CSV")]
    pub input: PathBuf,

    /// Output directory for result tables (default: <INPUT_CSV dir>/renal_output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Run the engine and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    #[command(flatten)]
    pub engine: OptionArgs,
}

#[derive(Parser)]
pub struct InspectArgs {
    #[arg(value_name = "INPUT_CSV")]
    pub input: PathBuf,

    /// Patient identifier to inspect.
    #[arg(long = "patient", value_name = "ID")]
    pub patient: String,

    #[command(flatten)]
    pub engine: OptionArgs,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DuplicatesArg {
    KeepLast,
    KeepFirst,
    Mean,
    Reject,
}

impl From<DuplicatesArg> for DuplicateDatePolicy {
    fn from(arg: DuplicatesArg) -> Self {
        match arg {
            DuplicatesArg::KeepLast => DuplicateDatePolicy::KeepLast,
            DuplicatesArg::KeepFirst => DuplicateDatePolicy::KeepFirst,
            DuplicatesArg::Mean => DuplicateDatePolicy::Mean,
            DuplicatesArg::Reject => DuplicateDatePolicy::Reject,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
