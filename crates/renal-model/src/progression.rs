use serde::{Deserialize, Serialize};

use crate::{PatientId, Threshold};

/// Progression outcome for one patient at one eGFR threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdProgression {
    pub threshold: Threshold,
    /// At least one retained sustained episode below the threshold.
    pub sustained_90day: bool,
    pub first_sustained_offset: Option<i64>,
    /// Late-window mean eGFR is below the threshold.
    pub follow_up_under: bool,
    /// Sustained episode confirmed by the late-window mean.
    pub progression: bool,
    /// Time to confirmed progression, censored at max follow-up otherwise.
    pub person_time_days: i64,
    /// Time to the first sustained episode, censored at max follow-up otherwise.
    pub person_time_days_not_adjusted: i64,
}

/// Per-patient summary row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionRecord {
    pub patient_id: PatientId,
    pub max_follow_up_days: i64,
    pub aki_total_count: usize,
    pub akd_count: usize,
    pub aki_year1_count: usize,
    pub last_6_months: Option<f64>,
    pub last_12_months: Option<f64>,
    /// One entry per threshold, in `Threshold::ALL` order.
    pub thresholds: Vec<ThresholdProgression>,
}

impl ProgressionRecord {
    pub fn threshold(&self, threshold: Threshold) -> Option<&ThresholdProgression> {
        self.thresholds.iter().find(|t| t.threshold == threshold)
    }
}
