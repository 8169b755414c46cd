//! Tests for renal-model types.

use chrono::NaiveDate;
use renal_model::{
    Baseline, DuplicateDatePolicy, EngineOptions, Observation, PatientHistory, PatientId,
};

fn obs(id: &PatientId, date: NaiveDate, offset: i64, creatinine: f64) -> Observation {
    Observation {
        patient_id: id.clone(),
        lab_date: date,
        days_since_baseline: offset,
        egfr: 60.0,
        creatinine,
    }
}

#[test]
fn baseline_is_mean_of_day_zero() {
    let id = PatientId::new("P001").unwrap();
    let day0 = NaiveDate::from_ymd_opt(2023, 5, 1).unwrap();
    let day1 = day0.succ_opt().unwrap();
    let observations = vec![obs(&id, day0, 0, 80.0), obs(&id, day1, 1, 120.0)];
    let baseline = Baseline::derive(id, day0, &observations);
    assert_eq!(baseline.creatinine, Some(80.0));
}

#[test]
fn baseline_is_missing_without_day_zero() {
    let id = PatientId::new("P002").unwrap();
    let day0 = NaiveDate::from_ymd_opt(2023, 5, 1).unwrap();
    let later = NaiveDate::from_ymd_opt(2023, 5, 4).unwrap();
    let baseline = Baseline::derive(id.clone(), day0, &[obs(&id, later, 3, 90.0)]);
    assert_eq!(baseline.creatinine, None);
}

#[test]
fn history_orders_observations_and_reports_follow_up() {
    let id = PatientId::new("P003").unwrap();
    let day0 = NaiveDate::from_ymd_opt(2023, 5, 1).unwrap();
    let late = NaiveDate::from_ymd_opt(2023, 6, 10).unwrap();
    let observations = vec![obs(&id, late, 40, 85.0), obs(&id, day0, 0, 80.0)];
    let baseline = Baseline::derive(id, day0, &observations);
    let history = PatientHistory::new(baseline, observations);
    assert_eq!(history.observations[0].lab_date, day0);
    assert_eq!(history.max_follow_up_days(), Some(40));
    assert!(history.has_follow_up());
}

#[test]
fn partial_options_file_uses_defaults() {
    let options: EngineOptions =
        serde_json::from_str(r#"{"aki_gap_days": 3, "duplicate_policy": "mean"}"#)
            .expect("parse options");
    assert_eq!(options.aki_gap_days, 3);
    assert_eq!(options.duplicate_policy, DuplicateDatePolicy::Mean);
    assert_eq!(options.sustained_min_days, 90);
    assert!(options.parallel);
}
