//! The per-patient pass: grid, references, flags, episodes, summary.

use tracing::{debug, trace};

use renal_model::{
    AkiEpisode, EngineOptions, Episode, PatientError, PatientHistory, PatientId, ProgressionRecord,
    Threshold,
};

use crate::flags::{FlagSeries, evaluate_flags};
use crate::grid::{DailyGrid, build_grid};
use crate::progression::summarize;
use crate::reconcile::reconcile_aki;
use crate::reference::{ReferenceSet, compute_references};
use crate::segment::{aki_episodes, threshold_episodes};

/// Final per-patient records kept by a batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientResult {
    pub patient_id: PatientId,
    pub aki_episodes: Vec<AkiEpisode>,
    pub ckd_episodes: Vec<Episode>,
    pub progression: ProgressionRecord,
}

/// Every intermediate of one patient's pass.
///
/// Batch runs only keep the [`PatientResult`]; the full analysis backs the
/// `inspect` command.
#[derive(Debug, Clone)]
pub struct PatientAnalysis {
    pub grid: DailyGrid,
    pub references: Vec<ReferenceSet>,
    pub flags: FlagSeries,
    pub result: PatientResult,
}

pub fn analyze_patient(
    history: &PatientHistory,
    options: &EngineOptions,
) -> Result<PatientAnalysis, PatientError> {
    let grid = build_grid(history)?;
    if history.baseline.creatinine.is_none() {
        debug!("no day-0 creatinine, first-week references left empty");
    }
    let references = compute_references(&grid, options);
    let flags = evaluate_flags(&grid, &references, options);

    let ckd_episodes: Vec<Episode> = Threshold::ALL
        .into_iter()
        .flat_map(|threshold| threshold_episodes(&grid, threshold, flags.egfr(threshold), options))
        .collect();
    let raw_aki = aki_episodes(&grid, &flags.aki, options);
    let raw_aki_count = raw_aki.len();
    let aki_episodes = reconcile_aki(raw_aki, &ckd_episodes, options);
    trace!(
        grid_days = grid.len(),
        observed = grid.observed_count(),
        raw_aki = raw_aki_count,
        aki = aki_episodes.len(),
        ckd = ckd_episodes.len(),
        "patient segmented"
    );

    let progression = summarize(history, &aki_episodes, &ckd_episodes, options);
    Ok(PatientAnalysis {
        result: PatientResult {
            patient_id: history.patient_id().clone(),
            aki_episodes,
            ckd_episodes,
            progression,
        },
        grid,
        references,
        flags,
    })
}

/// Runs the pass and keeps only the final records.
pub fn process_patient(
    history: &PatientHistory,
    options: &EngineOptions,
) -> Result<PatientResult, PatientError> {
    analyze_patient(history, options).map(|analysis| analysis.result)
}
