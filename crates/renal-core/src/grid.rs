//! Daily timeline construction.
//!
//! Irregular lab dates are laid onto a contiguous one-day grid spanning the
//! patient's first to last observation. Days without a lab carry no
//! creatinine or eGFR; nothing is imputed. The static baseline covariates are
//! held once on the grid and apply to every point.

use chrono::NaiveDate;
use serde::Serialize;

use renal_model::{PatientError, PatientHistory, PatientId};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridPoint {
    pub date: NaiveDate,
    pub days_since_baseline: i64,
    pub creatinine: Option<f64>,
    pub egfr: Option<f64>,
}

impl GridPoint {
    pub fn is_observed(&self) -> bool {
        self.creatinine.is_some()
    }

    pub fn is_follow_up(&self) -> bool {
        self.days_since_baseline >= 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyGrid {
    pub patient_id: PatientId,
    pub baseline_date: NaiveDate,
    pub baseline_creatinine: Option<f64>,
    pub points: Vec<GridPoint>,
}

impl DailyGrid {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Creatinine per grid day.
    pub fn creatinine(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|point| point.creatinine).collect()
    }

    pub fn observed_count(&self) -> usize {
        self.points.iter().filter(|point| point.is_observed()).count()
    }
}

/// Builds the daily grid for one patient.
///
/// Fails with `NoObservations` for an empty history and `NoFollowUp` when no
/// observation lies after the baseline date.
pub fn build_grid(history: &PatientHistory) -> Result<DailyGrid, PatientError> {
    let (Some(first), Some(last)) = (history.observations.first(), history.observations.last())
    else {
        return Err(PatientError::NoObservations);
    };
    if !history.has_follow_up() {
        return Err(PatientError::NoFollowUp);
    }

    let baseline_date = history.baseline.baseline_date;
    let span = (last.lab_date - first.lab_date).num_days();
    let mut points = Vec::with_capacity(usize::try_from(span + 1).unwrap_or_default());
    let mut observations = history.observations.iter().peekable();
    let mut date = first.lab_date;
    while date <= last.lab_date {
        let observed = observations.next_if(|obs| obs.lab_date == date);
        points.push(GridPoint {
            date,
            days_since_baseline: (date - baseline_date).num_days(),
            creatinine: observed.map(|obs| obs.creatinine),
            egfr: observed.map(|obs| obs.egfr),
        });
        let Some(next) = date.succ_opt() else {
            break;
        };
        date = next;
    }

    Ok(DailyGrid {
        patient_id: history.patient_id().clone(),
        baseline_date,
        baseline_creatinine: history.baseline.creatinine,
        points,
    })
}
