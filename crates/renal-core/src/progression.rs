//! Sustained progression and person-time summaries.
//!
//! A sustained episode alone does not count as progression: the mean eGFR
//! over the late follow-up window must also stay below the threshold. Person
//! time runs to the first sustained episode when progression is confirmed and
//! is censored at the last follow-up otherwise.

use renal_model::{
    AkiEpisode, EngineOptions, Episode, PatientHistory, ProgressionRecord, Threshold,
    ThresholdProgression,
};

/// Mean eGFR over follow-up observations in the last `window_days`.
///
/// When follow-up is shorter than the window, every follow-up observation is
/// averaged and pre-baseline labs are still left out.
pub fn late_window_mean(
    history: &PatientHistory,
    max_follow_up: i64,
    window_days: i64,
) -> Option<f64> {
    let from = max_follow_up - window_days;
    let values: Vec<f64> = history
        .observations
        .iter()
        .filter(|obs| obs.is_follow_up() && obs.days_since_baseline >= from)
        .map(|obs| obs.egfr)
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

pub fn threshold_progression(
    threshold: Threshold,
    ckd: &[Episode],
    last_6_months: Option<f64>,
    max_follow_up: i64,
) -> ThresholdProgression {
    let first_sustained_offset = ckd
        .iter()
        .filter(|episode| episode.threshold() == Some(threshold))
        .map(|episode| episode.start_offset_days)
        .min();
    let sustained_90day = first_sustained_offset.is_some();
    let follow_up_under = last_6_months.is_some_and(|mean| mean < threshold.value());
    let progression = sustained_90day && follow_up_under;
    let person_time_days_not_adjusted = first_sustained_offset.unwrap_or(max_follow_up);
    ThresholdProgression {
        threshold,
        sustained_90day,
        first_sustained_offset,
        follow_up_under,
        progression,
        person_time_days: if progression {
            person_time_days_not_adjusted
        } else {
            max_follow_up
        },
        person_time_days_not_adjusted,
    }
}

pub fn summarize(
    history: &PatientHistory,
    aki: &[AkiEpisode],
    ckd: &[Episode],
    options: &EngineOptions,
) -> ProgressionRecord {
    let max_follow_up = history.max_follow_up_days().unwrap_or_default();
    let last_6_months = late_window_mean(history, max_follow_up, options.late_window_days);
    let last_12_months = late_window_mean(history, max_follow_up, options.late_window_long_days);
    let aki_year1_count = aki
        .iter()
        .filter(|aki| (0..=options.year1_days).contains(&aki.episode.start_offset_days))
        .count();
    ProgressionRecord {
        patient_id: history.patient_id().clone(),
        max_follow_up_days: max_follow_up,
        aki_total_count: aki.len(),
        akd_count: aki.iter().filter(|aki| aki.is_akd).count(),
        aki_year1_count,
        last_6_months,
        last_12_months,
        thresholds: Threshold::ALL
            .into_iter()
            .map(|threshold| threshold_progression(threshold, ckd, last_6_months, max_follow_up))
            .collect(),
    }
}
