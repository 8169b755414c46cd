//! Batch driver.
//!
//! Patients are independent, so the engine fans out one task per patient and
//! collects the outcomes once. A patient that cannot be processed is recorded
//! as excluded and the rest of the batch carries on.

use rayon::prelude::*;
use tracing::{info, info_span, warn};

use renal_model::{EngineOptions, Exclusion, PatientHistory, Threshold};

use crate::patient::{PatientResult, process_patient};

#[derive(Debug, Clone, PartialEq)]
pub enum PatientOutcome {
    Processed(PatientResult),
    Excluded(Exclusion),
}

/// Everything a run produced, in patient id order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineOutput {
    pub results: Vec<PatientResult>,
    pub excluded: Vec<Exclusion>,
}

impl EngineOutput {
    pub fn from_outcomes(outcomes: Vec<PatientOutcome>) -> Self {
        let mut output = Self::default();
        for outcome in outcomes {
            match outcome {
                PatientOutcome::Processed(result) => output.results.push(result),
                PatientOutcome::Excluded(exclusion) => output.excluded.push(exclusion),
            }
        }
        output.sort();
        output
    }

    /// Adds patients excluded before the engine ran (e.g. at ingest).
    pub fn merge_exclusions(&mut self, exclusions: impl IntoIterator<Item = Exclusion>) {
        self.excluded.extend(exclusions);
        self.sort();
    }

    fn sort(&mut self) {
        self.results.sort_by(|a, b| a.patient_id.cmp(&b.patient_id));
        self.excluded.sort_by(|a, b| a.patient_id.cmp(&b.patient_id));
    }

    pub fn patient_count(&self) -> usize {
        self.results.len() + self.excluded.len()
    }

    pub fn aki_count(&self) -> usize {
        self.results.iter().map(|r| r.aki_episodes.len()).sum()
    }

    pub fn akd_count(&self) -> usize {
        self.results
            .iter()
            .flat_map(|r| &r.aki_episodes)
            .filter(|aki| aki.is_akd)
            .count()
    }

    pub fn ckd_count(&self) -> usize {
        self.results.iter().map(|r| r.ckd_episodes.len()).sum()
    }

    /// Patients with confirmed progression at `threshold`.
    pub fn progression_count(&self, threshold: Threshold) -> usize {
        self.results
            .iter()
            .filter_map(|r| r.progression.threshold(threshold))
            .filter(|t| t.progression)
            .count()
    }
}

fn run_one(history: &PatientHistory, options: &EngineOptions) -> PatientOutcome {
    match process_patient(history, options) {
        Ok(result) => PatientOutcome::Processed(result),
        Err(reason) => {
            warn!(%reason, "patient excluded");
            PatientOutcome::Excluded(Exclusion {
                patient_id: history.patient_id().clone(),
                reason,
            })
        }
    }
}

/// Processes every patient, in parallel when `options.parallel` is set.
pub fn run_engine(histories: &[PatientHistory], options: &EngineOptions) -> EngineOutput {
    let span = info_span!("engine", patients = histories.len(), parallel = options.parallel);
    let _guard = span.enter();

    let outcomes: Vec<PatientOutcome> = if options.parallel {
        histories
            .par_iter()
            .map(|history| run_one(history, options))
            .collect()
    } else {
        histories
            .iter()
            .map(|history| run_one(history, options))
            .collect()
    };
    let output = EngineOutput::from_outcomes(outcomes);

    info!(
        processed = output.results.len(),
        excluded = output.excluded.len(),
        aki = output.aki_count(),
        akd = output.akd_count(),
        ckd = output.ckd_count(),
        "engine complete"
    );
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use renal_model::{PatientError, PatientId};

    fn excluded(id: &str) -> Exclusion {
        Exclusion {
            patient_id: PatientId::new(id).unwrap(),
            reason: PatientError::NoFollowUp,
        }
    }

    #[test]
    fn exclusions_are_merged_in_id_order() {
        let mut output = EngineOutput::from_outcomes(vec![
            PatientOutcome::Excluded(excluded("P3")),
            PatientOutcome::Excluded(excluded("P1")),
        ]);
        output.merge_exclusions([excluded("P2")]);
        let ids: Vec<&str> = output.excluded.iter().map(|e| e.patient_id.as_str()).collect();
        assert_eq!(ids, vec!["P1", "P2", "P3"]);
        assert_eq!(output.patient_count(), 3);
    }

    #[test]
    fn empty_batch() {
        let output = run_engine(&[], &EngineOptions::default());
        assert_eq!(output, EngineOutput::default());
    }
}
