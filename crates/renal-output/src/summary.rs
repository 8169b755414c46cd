use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use renal_core::EngineOutput;
use renal_model::{EngineOptions, Threshold};

/// Machine-readable overview of one run, written as `run_summary.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub input: String,
    pub patients_read: usize,
    pub patients_processed: usize,
    pub patients_excluded: usize,
    pub skipped_rows: usize,
    pub aki_episodes: usize,
    pub akd_episodes: usize,
    pub ckd_episodes: usize,
    /// Patients with confirmed progression, keyed by threshold label.
    pub progression: BTreeMap<u32, usize>,
    pub options: EngineOptions,
}

impl RunSummary {
    pub fn new(
        input: impl Into<String>,
        output: &EngineOutput,
        skipped_rows: usize,
        options: &EngineOptions,
    ) -> Self {
        Self {
            input: input.into(),
            patients_read: output.patient_count(),
            patients_processed: output.results.len(),
            patients_excluded: output.excluded.len(),
            skipped_rows,
            aki_episodes: output.aki_count(),
            akd_episodes: output.akd_count(),
            ckd_episodes: output.ckd_count(),
            progression: Threshold::ALL
                .into_iter()
                .map(|t| (t.label(), output.progression_count(t)))
                .collect(),
            options: options.clone(),
        }
    }
}
