//! Per-patient laboratory observations and the derived baseline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::PatientId;

/// One creatinine measurement with its eGFR, positioned relative to baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub patient_id: PatientId,
    pub lab_date: NaiveDate,
    pub days_since_baseline: i64,
    /// eGFR in mL/min/1.73m².
    pub egfr: f64,
    /// Creatinine in µmol/L.
    pub creatinine: f64,
}

impl Observation {
    /// On or after the baseline date.
    pub fn is_follow_up(&self) -> bool {
        self.days_since_baseline >= 0
    }
}

/// Baseline reference for a patient.
///
/// `creatinine` is the mean of all day-0 observations and is `None` when the
/// patient has no observation on the baseline date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub patient_id: PatientId,
    pub baseline_date: NaiveDate,
    pub creatinine: Option<f64>,
}

impl Baseline {
    /// Baseline from the day-0 observations of an already resolved history.
    pub fn derive(
        patient_id: PatientId,
        baseline_date: NaiveDate,
        observations: &[Observation],
    ) -> Self {
        Self::from_day_zero(
            patient_id,
            baseline_date,
            observations
                .iter()
                .filter(|obs| obs.days_since_baseline == 0)
                .map(|obs| obs.creatinine),
        )
    }

    /// Baseline as the mean of every creatinine value taken on the baseline
    /// date, including same-day repeats.
    pub fn from_day_zero(
        patient_id: PatientId,
        baseline_date: NaiveDate,
        creatinine: impl IntoIterator<Item = f64>,
    ) -> Self {
        let (sum, count) = creatinine
            .into_iter()
            .fold((0.0, 0_u32), |(sum, count), value| (sum + value, count + 1));
        Self {
            patient_id,
            baseline_date,
            creatinine: (count > 0).then(|| sum / f64::from(count)),
        }
    }
}

/// Complete, date-ordered history for one patient.
///
/// Observations carry distinct lab dates once the duplicate-date policy has
/// been applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientHistory {
    pub baseline: Baseline,
    pub observations: Vec<Observation>,
}

impl PatientHistory {
    pub fn new(baseline: Baseline, mut observations: Vec<Observation>) -> Self {
        observations.sort_by_key(|obs| obs.lab_date);
        Self {
            baseline,
            observations,
        }
    }

    pub fn patient_id(&self) -> &PatientId {
        &self.baseline.patient_id
    }

    /// Largest days-since-baseline offset observed.
    pub fn max_follow_up_days(&self) -> Option<i64> {
        self.observations
            .iter()
            .map(|obs| obs.days_since_baseline)
            .max()
    }

    pub fn has_follow_up(&self) -> bool {
        self.observations
            .iter()
            .any(|obs| obs.days_since_baseline > 0)
    }
}
