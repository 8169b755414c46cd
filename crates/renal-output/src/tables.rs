//! Result tables as Polars DataFrames.
//!
//! Column names follow the established analysis naming (`akinhs_total_count`,
//! `persontimedays_30_notadjusted`, ...) so downstream scripts keep working.
//! Binary indicators are 0/1 integers; dates are ISO strings.

use chrono::NaiveDate;
use polars::prelude::*;

use renal_core::{EngineOutput, PatientResult};
use renal_model::{Threshold, ThresholdProgression};

/// Name of each table, also used as the CSV file stem.
pub const AKI_YEAR1: &str = "aki_year1";
pub const AKI_ALL: &str = "aki_all";
pub const PROGRESSION_SUMMARY: &str = "progression_summary";
pub const CKD_EPISODES: &str = "ckd_episodes";
pub const EXCLUSIONS: &str = "exclusions";

/// All tables of one run.
#[derive(Debug, Clone)]
pub struct OutputTables {
    pub aki_year1: DataFrame,
    pub aki_all: DataFrame,
    pub progression_summary: DataFrame,
    pub ckd_episodes: DataFrame,
    pub exclusions: DataFrame,
}

impl OutputTables {
    pub fn build(output: &EngineOutput) -> PolarsResult<Self> {
        Ok(Self {
            aki_year1: aki_year1_frame(&output.results)?,
            aki_all: aki_all_frame(&output.results)?,
            progression_summary: progression_summary_frame(&output.results)?,
            ckd_episodes: ckd_episodes_frame(&output.results)?,
            exclusions: exclusions_frame(output)?,
        })
    }

    /// `(name, frame)` pairs in write order.
    pub fn named_mut(&mut self) -> [(&'static str, &mut DataFrame); 5] {
        [
            (AKI_YEAR1, &mut self.aki_year1),
            (AKI_ALL, &mut self.aki_all),
            (PROGRESSION_SUMMARY, &mut self.progression_summary),
            (CKD_EPISODES, &mut self.ckd_episodes),
            (EXCLUSIONS, &mut self.exclusions),
        ]
    }
}

fn flag(value: bool) -> i32 {
    i32::from(value)
}

fn count(value: usize) -> u64 {
    value as u64
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn patient_ids(results: &[PatientResult]) -> Vec<String> {
    results.iter().map(|r| r.patient_id.to_string()).collect()
}

pub fn aki_year1_frame(results: &[PatientResult]) -> PolarsResult<DataFrame> {
    let sums: Vec<u64> = results
        .iter()
        .map(|r| count(r.progression.aki_year1_count))
        .collect();
    DataFrame::new(vec![
        Series::new("patient_id".into(), patient_ids(results)).into_column(),
        Series::new("akiyear1_sum".into(), sums).into_column(),
    ])
}

/// One row per retained AKI episode; patients without AKI get a single zero row.
pub fn aki_all_frame(results: &[PatientResult]) -> PolarsResult<DataFrame> {
    let mut patient_id = Vec::new();
    let mut is_event = Vec::new();
    let mut start_offset = Vec::new();
    let mut stop_offset = Vec::new();
    let mut duration = Vec::new();
    let mut start_date: Vec<Option<String>> = Vec::new();
    let mut stop_date: Vec<Option<String>> = Vec::new();
    let mut is_akd: Vec<Option<i32>> = Vec::new();

    for result in results {
        if result.aki_episodes.is_empty() {
            patient_id.push(result.patient_id.to_string());
            is_event.push(0);
            start_offset.push(0_i64);
            stop_offset.push(0_i64);
            duration.push(0_i64);
            start_date.push(None);
            stop_date.push(None);
            is_akd.push(None);
            continue;
        }
        for aki in &result.aki_episodes {
            let episode = &aki.episode;
            patient_id.push(result.patient_id.to_string());
            is_event.push(1);
            start_offset.push(episode.start_offset_days);
            stop_offset.push(episode.stop_offset_days);
            duration.push(episode.duration_days);
            start_date.push(Some(iso(episode.start_date)));
            stop_date.push(Some(iso(episode.stop_date)));
            is_akd.push(Some(flag(aki.is_akd)));
        }
    }

    DataFrame::new(vec![
        Series::new("patient_id".into(), patient_id).into_column(),
        Series::new("is_event".into(), is_event).into_column(),
        Series::new("start_offset_days".into(), start_offset).into_column(),
        Series::new("stop_offset_days".into(), stop_offset).into_column(),
        Series::new("duration_days".into(), duration).into_column(),
        Series::new("start_date".into(), start_date).into_column(),
        Series::new("stop_date".into(), stop_date).into_column(),
        Series::new("is_akd".into(), is_akd).into_column(),
    ])
}

/// Per-threshold column family, filled in `Threshold::ALL` order.
fn threshold_columns<T>(
    results: &[PatientResult],
    name: impl Fn(Threshold) -> String,
    value: impl Fn(&ThresholdProgression) -> T,
) -> Vec<Column>
where
    Series: NamedFrom<Vec<Option<T>>, [Option<T>]>,
{
    Threshold::ALL
        .into_iter()
        .map(|threshold| {
            let values: Vec<Option<T>> = results
                .iter()
                .map(|r| r.progression.threshold(threshold).map(&value))
                .collect();
            Series::new(name(threshold).into(), values).into_column()
        })
        .collect()
}

pub fn progression_summary_frame(results: &[PatientResult]) -> PolarsResult<DataFrame> {
    let records: Vec<_> = results.iter().map(|r| &r.progression).collect();
    let mut columns = vec![
        Series::new("patient_id".into(), patient_ids(results)).into_column(),
        Series::new(
            "max_follow_up_days".into(),
            records.iter().map(|r| r.max_follow_up_days).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "akinhs_total_count".into(),
            records.iter().map(|r| count(r.aki_total_count)).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "akinhslonger7days_count".into(),
            records.iter().map(|r| count(r.akd_count)).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "last6months".into(),
            records.iter().map(|r| r.last_6_months).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "last12months".into(),
            records.iter().map(|r| r.last_12_months).collect::<Vec<_>>(),
        )
        .into_column(),
    ];
    columns.extend(threshold_columns(
        results,
        |t| format!("followupunder_{}", t.label()),
        |p| flag(p.follow_up_under),
    ));
    columns.extend(threshold_columns(
        results,
        |t| format!("sustained90day_{}", t.label()),
        |p| flag(p.sustained_90day),
    ));
    columns.extend(threshold_columns(
        results,
        |t| format!("ckd{}_progression", t.label()),
        |p| flag(p.progression),
    ));
    columns.extend(threshold_columns(
        results,
        |t| format!("persontimedays_{}", t.label()),
        |p| p.person_time_days,
    ));
    columns.extend(threshold_columns(
        results,
        |t| format!("persontimedays_{}_notadjusted", t.label()),
        |p| p.person_time_days_not_adjusted,
    ));
    DataFrame::new(columns)
}

pub fn ckd_episodes_frame(results: &[PatientResult]) -> PolarsResult<DataFrame> {
    let episodes: Vec<_> = results.iter().flat_map(|r| &r.ckd_episodes).collect();
    DataFrame::new(vec![
        Series::new(
            "patient_id".into(),
            episodes.iter().map(|e| e.patient_id.to_string()).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "threshold".into(),
            episodes
                .iter()
                .map(|e| e.threshold().map(Threshold::label))
                .collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "start_date".into(),
            episodes.iter().map(|e| iso(e.start_date)).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "stop_date".into(),
            episodes.iter().map(|e| iso(e.stop_date)).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "start_offset_days".into(),
            episodes.iter().map(|e| e.start_offset_days).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "stop_offset_days".into(),
            episodes.iter().map(|e| e.stop_offset_days).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "duration_days".into(),
            episodes.iter().map(|e| e.duration_days).collect::<Vec<_>>(),
        )
        .into_column(),
    ])
}

pub fn exclusions_frame(output: &EngineOutput) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Series::new(
            "patient_id".into(),
            output
                .excluded
                .iter()
                .map(|e| e.patient_id.to_string())
                .collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "reason".into(),
            output
                .excluded
                .iter()
                .map(|e| e.reason.to_string())
                .collect::<Vec<_>>(),
        )
        .into_column(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_run_still_has_every_column() {
        let tables = OutputTables::build(&EngineOutput::default()).unwrap();
        assert_eq!(tables.aki_year1.height(), 0);
        assert_eq!(tables.aki_all.width(), 8);
        // patient_id, 5 scalars, 5 families of 4 thresholds
        assert_eq!(tables.progression_summary.width(), 26);
        assert_eq!(tables.ckd_episodes.width(), 7);
        assert_eq!(tables.exclusions.width(), 2);
    }
}
