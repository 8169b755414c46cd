//! Grouping validated rows into per-patient histories.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, warn};

use renal_model::{
    Baseline, DuplicateDatePolicy, Exclusion, Observation, PatientError, PatientHistory, PatientId,
};

use crate::csv_reader::LabRow;
use crate::egfr::{ckd_epi_2021, creatinine_to_umol};

/// Patients ready for the engine plus those rejected while preparing.
#[derive(Debug, Clone, Default)]
pub struct PreparedCohort {
    pub histories: Vec<PatientHistory>,
    pub excluded: Vec<Exclusion>,
    /// Rows dropped for missing values.
    pub skipped_rows: usize,
}

/// A row with every value the engine needs.
#[derive(Debug, Clone, Copy)]
struct UsableRow {
    baseline_date: NaiveDate,
    lab_date: NaiveDate,
    creatinine: f64,
    egfr: f64,
}

impl UsableRow {
    fn from_lab_row(row: &LabRow) -> Option<Self> {
        let baseline_date = row.baseline_date?;
        let lab_date = row.lab_date?;
        let creatinine_mgdl = row.creatinine_mgdl?;
        let egfr = match row.egfr {
            Some(egfr) => egfr,
            None => ckd_epi_2021(creatinine_mgdl, row.age_at_lab?, row.sex?),
        };
        Some(Self {
            baseline_date,
            lab_date,
            creatinine: creatinine_to_umol(creatinine_mgdl),
            egfr,
        })
    }
}

/// Builds one history per patient, in patient id order.
///
/// Rows missing a date, creatinine, or the inputs to eGFR are skipped. A
/// patient left with no rows is excluded with `NoObservations`; duplicate lab
/// dates are resolved by `policy`.
pub fn prepare_cohort(rows: &[LabRow], policy: DuplicateDatePolicy) -> PreparedCohort {
    let mut grouped: BTreeMap<PatientId, Vec<Option<UsableRow>>> = BTreeMap::new();
    for row in rows {
        grouped
            .entry(row.patient_id.clone())
            .or_default()
            .push(UsableRow::from_lab_row(row));
    }

    let mut cohort = PreparedCohort::default();
    for (patient_id, patient_rows) in grouped {
        let usable: Vec<UsableRow> = patient_rows.iter().flatten().copied().collect();
        let skipped = patient_rows.len() - usable.len();
        if skipped > 0 {
            debug!(skipped, "rows with missing values skipped");
            cohort.skipped_rows += skipped;
        }
        match build_history(patient_id.clone(), &usable, policy) {
            Ok(history) => cohort.histories.push(history),
            Err(reason) => {
                warn!(reason = %reason, "patient excluded during preparation");
                cohort.excluded.push(Exclusion { patient_id, reason });
            }
        }
    }
    cohort
}

fn build_history(
    patient_id: PatientId,
    rows: &[UsableRow],
    policy: DuplicateDatePolicy,
) -> Result<PatientHistory, PatientError> {
    let Some(first) = rows.first() else {
        return Err(PatientError::NoObservations);
    };
    let baseline_date = first.baseline_date;
    if rows.iter().any(|row| row.baseline_date != baseline_date) {
        warn!(%baseline_date, "conflicting baseline dates, using the first");
    }

    let mut by_date: BTreeMap<NaiveDate, Vec<&UsableRow>> = BTreeMap::new();
    for row in rows {
        by_date.entry(row.lab_date).or_default().push(row);
    }

    let mut observations = Vec::with_capacity(by_date.len());
    for (lab_date, same_day) in by_date {
        let (creatinine, egfr) = resolve_same_day(lab_date, &same_day, policy)?;
        observations.push(Observation {
            patient_id: patient_id.clone(),
            lab_date,
            days_since_baseline: (lab_date - baseline_date).num_days(),
            egfr,
            creatinine,
        });
    }
    // Same-day repeats on the baseline date all feed the baseline mean,
    // whatever the duplicate policy kept for the day-0 observation.
    let baseline = Baseline::from_day_zero(
        patient_id,
        baseline_date,
        rows.iter()
            .filter(|row| row.lab_date == baseline_date)
            .map(|row| row.creatinine),
    );
    Ok(PatientHistory::new(baseline, observations))
}

fn resolve_same_day(
    date: NaiveDate,
    rows: &[&UsableRow],
    policy: DuplicateDatePolicy,
) -> Result<(f64, f64), PatientError> {
    let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
        return Err(PatientError::NoObservations);
    };
    if rows.len() == 1 {
        return Ok((first.creatinine, first.egfr));
    }
    debug!(%date, count = rows.len(), ?policy, "duplicate lab date");
    match policy {
        DuplicateDatePolicy::KeepFirst => Ok((first.creatinine, first.egfr)),
        DuplicateDatePolicy::KeepLast => Ok((last.creatinine, last.egfr)),
        DuplicateDatePolicy::Mean => {
            let n = rows.len() as f64;
            let creatinine = rows.iter().map(|row| row.creatinine).sum::<f64>() / n;
            let egfr = rows.iter().map(|row| row.egfr).sum::<f64>() / n;
            Ok((creatinine, egfr))
        }
        DuplicateDatePolicy::Reject => Err(PatientError::DuplicateDate { date }),
    }
}
