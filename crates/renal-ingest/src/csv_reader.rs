//! Laboratory CSV loading and row validation.
//!
//! The file is read with every column as text, then each cell is parsed here
//! so that a malformed value can be reported with its row and column.
//! Empty cells are treated as missing values, never as errors.

use std::path::Path;

use chrono::NaiveDate;
use polars::prelude::{CsvReadOptions, DataFrame, DataType, SerReader};
use tracing::debug;

use renal_model::PatientId;

use crate::dates::parse_lab_date;
use crate::egfr::Sex;
use crate::error::{IngestError, Result};

pub const PATIENT_ID: &str = "patient_id";
pub const BASELINE_DATE: &str = "baseline_date";
pub const LAB_DATE: &str = "lab_date";
pub const AGE_AT_LAB: &str = "age_at_lab";
pub const SEX_CODE: &str = "sex_code";
pub const CREATININE_MGDL: &str = "creatinine_mgdl";
/// Optional precomputed eGFR column.
pub const EGFR: &str = "egfr";

pub const REQUIRED_COLUMNS: [&str; 6] = [
    PATIENT_ID,
    BASELINE_DATE,
    LAB_DATE,
    AGE_AT_LAB,
    SEX_CODE,
    CREATININE_MGDL,
];

/// One validated input row. `None` fields were empty in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct LabRow {
    /// 1-based data row number.
    pub row: usize,
    pub patient_id: PatientId,
    pub baseline_date: Option<NaiveDate>,
    pub lab_date: Option<NaiveDate>,
    pub age_at_lab: Option<f64>,
    pub sex: Option<Sex>,
    pub creatinine_mgdl: Option<f64>,
    pub egfr: Option<f64>,
}

/// Reads a laboratory CSV into a DataFrame of string columns.
pub fn read_lab_csv(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    if df.height() == 0 {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }
    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "lab csv loaded"
    );
    Ok(df)
}

/// Validates a laboratory DataFrame into typed rows.
///
/// Fails on the first malformed cell.
pub fn lab_rows_from_frame(df: &DataFrame) -> Result<Vec<LabRow>> {
    for column in REQUIRED_COLUMNS {
        if find_column(df, column).is_none() {
            return Err(IngestError::MissingColumn {
                column: column.to_string(),
            });
        }
    }
    let patient_ids = string_column(df, PATIENT_ID)?;
    let baseline_dates = string_column(df, BASELINE_DATE)?;
    let lab_dates = string_column(df, LAB_DATE)?;
    let ages = string_column(df, AGE_AT_LAB)?;
    let sexes = string_column(df, SEX_CODE)?;
    let creatinines = string_column(df, CREATININE_MGDL)?;
    let egfrs = if find_column(df, EGFR).is_some() {
        string_column(df, EGFR)?
    } else {
        vec![None; df.height()]
    };

    let mut rows = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let row = idx + 1;
        let raw_id = patient_ids[idx].as_deref().unwrap_or("");
        let patient_id = PatientId::new(raw_id)
            .map_err(|_| IngestError::invalid(row, PATIENT_ID, raw_id, "identifier is empty"))?;
        rows.push(LabRow {
            row,
            patient_id,
            baseline_date: parse_date_cell(row, BASELINE_DATE, baseline_dates[idx].as_deref())?,
            lab_date: parse_date_cell(row, LAB_DATE, lab_dates[idx].as_deref())?,
            age_at_lab: parse_positive_cell(row, AGE_AT_LAB, ages[idx].as_deref())?,
            sex: parse_sex_cell(row, sexes[idx].as_deref())?,
            creatinine_mgdl: parse_positive_cell(
                row,
                CREATININE_MGDL,
                creatinines[idx].as_deref(),
            )?,
            egfr: parse_positive_cell(row, EGFR, egfrs[idx].as_deref())?,
        });
    }
    Ok(rows)
}

/// Reads and validates a laboratory CSV in one step.
pub fn read_lab_rows(path: &Path) -> Result<Vec<LabRow>> {
    let df = read_lab_csv(path)?;
    lab_rows_from_frame(&df)
}

fn find_column(df: &DataFrame, name: &str) -> Option<String> {
    df.get_column_names()
        .into_iter()
        .find(|candidate| candidate.trim().eq_ignore_ascii_case(name))
        .map(|candidate| candidate.to_string())
}

fn string_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let actual = find_column(df, name).ok_or_else(|| IngestError::MissingColumn {
        column: name.to_string(),
    })?;
    let column = df.column(&actual)?.cast(&DataType::String)?;
    let values = column.str()?;
    Ok(values
        .into_iter()
        .map(|value| {
            value
                .map(|text| text.trim().trim_matches('\u{feff}').to_string())
                .filter(|text| !text.is_empty())
        })
        .collect())
}

fn parse_date_cell(row: usize, column: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
    let Some(value) = value else {
        return Ok(None);
    };
    parse_lab_date(value)
        .map(Some)
        .ok_or_else(|| IngestError::invalid(row, column, value, "not a calendar date"))
}

fn parse_positive_cell(row: usize, column: &str, value: Option<&str>) -> Result<Option<f64>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let parsed: f64 = value
        .parse()
        .map_err(|_| IngestError::invalid(row, column, value, "not a number"))?;
    if !parsed.is_finite() || parsed <= 0.0 {
        return Err(IngestError::invalid(row, column, value, "must be positive"));
    }
    Ok(Some(parsed))
}

fn parse_sex_cell(row: usize, value: Option<&str>) -> Result<Option<Sex>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let code: f64 = value
        .parse()
        .map_err(|_| IngestError::invalid(row, SEX_CODE, value, "not a number"))?;
    if code.fract() != 0.0 {
        return Err(IngestError::invalid(row, SEX_CODE, value, "expected 1 or 2"));
    }
    Sex::from_code(code as i64)
        .map(Some)
        .ok_or_else(|| IngestError::invalid(row, SEX_CODE, value, "expected 1 or 2"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{Column, IntoColumn, NamedFrom, Series};

    fn frame(columns: Vec<(&str, Vec<&str>)>) -> DataFrame {
        let cols: Vec<Column> = columns
            .into_iter()
            .map(|(name, values)| {
                Series::new(
                    name.into(),
                    values.iter().copied().map(String::from).collect::<Vec<_>>(),
                )
                .into_column()
            })
            .collect();
        DataFrame::new(cols).unwrap()
    }

    fn full_frame(creatinine: &str, sex: &str) -> DataFrame {
        frame(vec![
            ("Patient_ID", vec!["P1"]),
            ("baseline_date", vec!["2024-01-01"]),
            ("lab_date", vec!["2024-01-04"]),
            ("age_at_lab", vec!["54"]),
            ("sex_code", vec![sex]),
            ("creatinine_mgdl", vec![creatinine]),
        ])
    }

    #[test]
    fn parses_valid_row() {
        let rows = lab_rows_from_frame(&full_frame("1.2", "2")).unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.row, 1);
        assert_eq!(row.patient_id.as_str(), "P1");
        assert_eq!(row.sex, Some(Sex::Female));
        assert_eq!(row.creatinine_mgdl, Some(1.2));
        assert_eq!(row.egfr, None);
    }

    #[test]
    fn empty_creatinine_is_missing() {
        let rows = lab_rows_from_frame(&full_frame("", "1")).unwrap();
        assert_eq!(rows[0].creatinine_mgdl, None);
    }

    #[test]
    fn non_numeric_creatinine_fails_with_row() {
        let err = lab_rows_from_frame(&full_frame("high", "1")).unwrap_err();
        match err {
            IngestError::InvalidValue { row, column, .. } => {
                assert_eq!(row, 1);
                assert_eq!(column, CREATININE_MGDL);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_sex_code_fails() {
        let err = lab_rows_from_frame(&full_frame("1.0", "3")).unwrap_err();
        assert!(matches!(err, IngestError::InvalidValue { .. }));
    }

    #[test]
    fn missing_column_is_reported() {
        let df = frame(vec![("patient_id", vec!["P1"])]);
        let err = lab_rows_from_frame(&df).unwrap_err();
        assert!(matches!(
            err,
            IngestError::MissingColumn { ref column } if column == BASELINE_DATE
        ));
    }
}
