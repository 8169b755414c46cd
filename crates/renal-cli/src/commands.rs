use anyhow::{Context, Result};

use renal_cli::config::resolve_options;
use renal_cli::pipeline::{Inspection, RunResult, default_output_dir, inspect_patient, run_pipeline};
use renal_model::EngineOptions;

use crate::cli::{InspectArgs, OptionArgs, RunArgs};

fn engine_options(args: &OptionArgs) -> Result<EngineOptions> {
    resolve_options(
        args.options_file.as_deref(),
        args.duplicates.map(Into::into),
        args.sequential,
    )
}

pub fn run_run(args: &RunArgs) -> Result<RunResult> {
    let options = engine_options(&args.engine)?;
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| default_output_dir(&args.input));
    run_pipeline(&args.input, &output_dir, &options, args.dry_run)
}

pub fn run_inspect(args: &InspectArgs) -> Result<Inspection> {
    let options = engine_options(&args.engine)?;
    inspect_patient(&args.input, &args.patient, &options)
}

pub fn run_options(args: &OptionArgs) -> Result<()> {
    let options = engine_options(args)?;
    let json = serde_json::to_string_pretty(&options).context("serialize options")?;
    println!("{json}");
    Ok(())
}
