//! Configuration options for episode detection.

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// How to resolve several observations on the same calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateDatePolicy {
    /// Keep the row that appears last in the input.
    #[default]
    KeepLast,
    /// Keep the row that appears first in the input.
    KeepFirst,
    /// Average creatinine and eGFR across the day's rows.
    Mean,
    /// Exclude the patient.
    Reject,
}

/// Options controlling the episode engine.
///
/// Every field has a default, so partial JSON option files are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Absolute creatinine rise (µmol/L) over the 48-hour reference that flags AKI.
    pub aki_abs_rise: f64,
    /// Creatinine ratio over the 7-day or 365-day reference that flags AKI.
    pub aki_ratio: f64,
    /// Largest run of unflagged days bridged inside one AKI episode.
    pub aki_gap_days: usize,
    /// AKI episodes lasting longer than this are tagged AKD.
    pub akd_min_days: i64,
    /// Minimum duration of a sustained eGFR episode; also the AKI ceiling.
    pub sustained_min_days: i64,
    /// Days after baseline on which references are forced to the baseline value.
    pub baseline_window_days: i64,
    /// Smallest gap to the adjacent observation that enables the median reference.
    pub median_min_gap_days: i64,
    /// Length of the median reference window.
    pub median_window_days: i64,
    /// Late follow-up window used to confirm progression.
    pub late_window_days: i64,
    /// Secondary late follow-up window reported alongside.
    pub late_window_long_days: i64,
    /// AKI episodes starting within this many days of baseline count as year-1.
    pub year1_days: i64,
    pub duplicate_policy: DuplicateDatePolicy,
    /// Process patients on the rayon thread pool.
    pub parallel: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            aki_abs_rise: 26.0,
            aki_ratio: 1.5,
            aki_gap_days: 7,
            akd_min_days: 7,
            sustained_min_days: 90,
            baseline_window_days: 7,
            median_min_gap_days: 8,
            median_window_days: 365,
            late_window_days: 182,
            late_window_long_days: 365,
            year1_days: 365,
            duplicate_policy: DuplicateDatePolicy::default(),
            parallel: true,
        }
    }
}

impl EngineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicateDatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Checks that thresholds and windows are usable.
    pub fn validate(&self) -> Result<(), ModelError> {
        if !(self.aki_abs_rise.is_finite() && self.aki_abs_rise > 0.0) {
            return Err(invalid("aki_abs_rise", "must be a positive number"));
        }
        if !(self.aki_ratio.is_finite() && self.aki_ratio > 1.0) {
            return Err(invalid("aki_ratio", "must be greater than 1"));
        }
        if self.sustained_min_days <= 0 {
            return Err(invalid("sustained_min_days", "must be positive"));
        }
        if self.akd_min_days < 0 || self.akd_min_days >= self.sustained_min_days {
            return Err(invalid(
                "akd_min_days",
                "must be between 0 and sustained_min_days",
            ));
        }
        if self.baseline_window_days < 0 {
            return Err(invalid("baseline_window_days", "must not be negative"));
        }
        if self.median_min_gap_days < 1 || self.median_min_gap_days > self.median_window_days {
            return Err(invalid(
                "median_min_gap_days",
                "must be between 1 and median_window_days",
            ));
        }
        if self.late_window_days <= 0 || self.late_window_long_days <= 0 {
            return Err(invalid("late_window_days", "windows must be positive"));
        }
        if self.year1_days < 0 {
            return Err(invalid("year1_days", "must not be negative"));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, reason: &str) -> ModelError {
    ModelError::InvalidOption {
        name,
        reason: reason.to_string(),
    }
}
