//! Load, run and write, shared by the CLI commands.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, info_span};

use renal_core::{EngineOutput, PatientAnalysis, analyze_patient, run_engine};
use renal_ingest::load_cohort;
use renal_model::{EngineOptions, Exclusion, PatientId};
use renal_output::{OutputTables, RunSummary, write_outputs};

use crate::logging::redact_value;

#[derive(Debug)]
pub struct RunResult {
    pub output_dir: PathBuf,
    pub output: EngineOutput,
    pub summary: RunSummary,
    /// Files written; empty on a dry run.
    pub written: Vec<PathBuf>,
    pub dry_run: bool,
}

/// Outcome of inspecting a single patient.
#[derive(Debug)]
pub enum Inspection {
    Analyzed(Box<PatientAnalysis>),
    Excluded(Exclusion),
}

/// `<input dir>/renal_output`.
pub fn default_output_dir(input: &Path) -> PathBuf {
    input
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("renal_output")
}

pub fn run_pipeline(
    input: &Path,
    output_dir: &Path,
    options: &EngineOptions,
    dry_run: bool,
) -> Result<RunResult> {
    let span = info_span!("run", input = %input.display());
    let _guard = span.enter();
    let started = Instant::now();

    let cohort = load_cohort(input, options.duplicate_policy)
        .with_context(|| format!("load {}", input.display()))?;
    let mut output = run_engine(&cohort.histories, options);
    output.merge_exclusions(cohort.excluded);
    for exclusion in &output.excluded {
        debug!(
            patient = redact_value(exclusion.patient_id.as_str()),
            reason = %exclusion.reason,
            "excluded"
        );
    }

    let summary = RunSummary::new(
        input.display().to_string(),
        &output,
        cohort.skipped_rows,
        options,
    );
    let written = if dry_run {
        Vec::new()
    } else {
        let mut tables = OutputTables::build(&output).context("build output tables")?;
        write_outputs(output_dir, &mut tables, &summary)?
    };
    info!(
        processed = summary.patients_processed,
        excluded = summary.patients_excluded,
        elapsed_ms = started.elapsed().as_millis(),
        "run complete"
    );

    Ok(RunResult {
        output_dir: output_dir.to_path_buf(),
        output,
        summary,
        written,
        dry_run,
    })
}

pub fn inspect_patient(
    input: &Path,
    patient: &str,
    options: &EngineOptions,
) -> Result<Inspection> {
    let patient_id = PatientId::new(patient)?;
    info!(patient = redact_value(patient_id.as_str()), "inspecting patient");
    let cohort = load_cohort(input, options.duplicate_policy)
        .with_context(|| format!("load {}", input.display()))?;

    if let Some(exclusion) = cohort
        .excluded
        .into_iter()
        .find(|exclusion| exclusion.patient_id == patient_id)
    {
        return Ok(Inspection::Excluded(exclusion));
    }
    let history = cohort
        .histories
        .iter()
        .find(|history| *history.patient_id() == patient_id)
        .ok_or_else(|| anyhow!("patient {patient_id} not found in {}", input.display()))?;
    Ok(match analyze_patient(history, options) {
        Ok(analysis) => Inspection::Analyzed(Box::new(analysis)),
        Err(reason) => Inspection::Excluded(Exclusion { patient_id, reason }),
    })
}
