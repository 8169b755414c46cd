//! Table rendering and writing for a small mixed cohort.

use chrono::{Duration, NaiveDate};

use renal_core::{EngineOutput, run_engine};
use renal_model::{Baseline, EngineOptions, Observation, PatientHistory, PatientId};
use renal_output::{OutputTables, RUN_SUMMARY_FILE, RunSummary, frame_to_csv, write_outputs};

fn history(id: &str, labs: &[(i64, f64, f64)]) -> PatientHistory {
    let id = PatientId::new(id).unwrap();
    let base = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
    let observations: Vec<Observation> = labs
        .iter()
        .map(|&(offset, creatinine, egfr)| Observation {
            patient_id: id.clone(),
            lab_date: base + Duration::days(offset),
            days_since_baseline: offset,
            egfr,
            creatinine,
        })
        .collect();
    let baseline = Baseline::derive(id, base, &observations);
    PatientHistory::new(baseline, observations)
}

fn cohort_output() -> EngineOutput {
    let mut progressing = vec![(0, 100.0, 50.0)];
    progressing.extend((100..=400).step_by(50).map(|day| (day, 100.0, 25.0)));
    let histories = vec![
        history("P1", &[(0, 80.0, 90.0), (3, 130.0, 60.0)]),
        history("P2", &[(0, 80.0, 90.0), (10, 82.0, 88.0)]),
        history("P3", &[(-3, 90.0, 70.0), (0, 85.0, 72.0)]),
        history("P4", &progressing),
    ];
    run_engine(&histories, &EngineOptions::default().with_parallel(false))
}

#[test]
fn aki_all_has_zero_rows_for_patients_without_aki() {
    let mut tables = OutputTables::build(&cohort_output()).unwrap();
    let csv = frame_to_csv(&mut tables.aki_all).unwrap();
    insta::assert_snapshot!(csv, @r"
    patient_id,is_event,start_offset_days,stop_offset_days,duration_days,start_date,stop_date,is_akd
    P1,1,3,3,0,2023-06-04,2023-06-04,0
    P2,0,0,0,0,,,
    P4,0,0,0,0,,,
    ");
}

#[test]
fn ckd_episodes_and_exclusions() {
    let mut tables = OutputTables::build(&cohort_output()).unwrap();
    let ckd = frame_to_csv(&mut tables.ckd_episodes).unwrap();
    insta::assert_snapshot!(ckd, @r"
    patient_id,threshold,start_date,stop_date,start_offset_days,stop_offset_days,duration_days
    P4,30,2023-09-09,2024-07-05,100,400,300
    P4,45,2023-09-09,2024-07-05,100,400,300
    P4,60,2023-06-01,2024-07-05,0,400,400
    ");
    let excluded = frame_to_csv(&mut tables.exclusions).unwrap();
    insta::assert_snapshot!(excluded, @r"
    patient_id,reason
    P3,no post-baseline observations
    ");
}

#[test]
fn progression_summary_columns() {
    let tables = OutputTables::build(&cohort_output()).unwrap();
    let summary = &tables.progression_summary;
    assert_eq!(summary.height(), 3);

    let progression = summary.column("ckd30_progression").unwrap().i32().unwrap();
    assert_eq!(progression.get(0), Some(0));
    assert_eq!(progression.get(2), Some(1));
    let person_time = summary.column("persontimedays_30").unwrap().i64().unwrap();
    assert_eq!(person_time.get(2), Some(100));
    let censored = summary.column("persontimedays_15").unwrap().i64().unwrap();
    assert_eq!(censored.get(2), Some(400));
    let late = summary.column("last6months").unwrap().f64().unwrap();
    assert_eq!(late.get(2), Some(25.0));
}

#[test]
fn writes_every_table_and_the_run_summary() {
    let dir = tempfile::tempdir().unwrap();
    let output = cohort_output();
    let options = EngineOptions::default();
    let summary = RunSummary::new("labs.csv", &output, 2, &options);
    let mut tables = OutputTables::build(&output).unwrap();

    let written = write_outputs(dir.path(), &mut tables, &summary).unwrap();
    assert_eq!(written.len(), 6);
    for name in [
        "aki_year1.csv",
        "aki_all.csv",
        "progression_summary.csv",
        "ckd_episodes.csv",
        "exclusions.csv",
    ] {
        assert!(dir.path().join(name).is_file(), "{name} missing");
    }

    let json = std::fs::read_to_string(dir.path().join(RUN_SUMMARY_FILE)).unwrap();
    let parsed: RunSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, summary);
    assert_eq!(parsed.patients_read, 4);
    assert_eq!(parsed.patients_excluded, 1);
    assert_eq!(parsed.aki_episodes, 1);
    assert_eq!(parsed.progression.get(&30), Some(&1));

    let year1 = std::fs::read_to_string(dir.path().join("aki_year1.csv")).unwrap();
    assert!(year1.starts_with("patient_id,akiyear1_sum\nP1,1\n"));
}
