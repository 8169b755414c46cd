//! Laboratory data ingestion for the renal episode engine.
//!
//! This crate sits at the input boundary: it reads the laboratory CSV with
//! Polars, validates every row (failing fast on malformed cells), derives
//! eGFR with CKD-EPI 2021 when the file does not carry it, and groups rows
//! into per-patient histories.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use renal_ingest::{load_cohort, read_lab_rows};
//! use renal_model::DuplicateDatePolicy;
//!
//! let cohort = load_cohort(Path::new("labs.csv"), DuplicateDatePolicy::KeepLast)?;
//! println!("{} patients", cohort.histories.len());
//! ```

use std::path::Path;

use tracing::info;

use renal_model::DuplicateDatePolicy;

pub mod csv_reader;
pub mod dates;
pub mod egfr;
mod error;
pub mod observations;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading ===
pub use csv_reader::{LabRow, REQUIRED_COLUMNS, lab_rows_from_frame, read_lab_csv, read_lab_rows};

// === Derivations ===
pub use dates::parse_lab_date;
pub use egfr::{CREATININE_MGDL_TO_UMOLL, Sex, ckd_epi_2021, creatinine_to_umol};
pub use observations::{PreparedCohort, prepare_cohort};

/// Reads, validates and groups a laboratory CSV.
pub fn load_cohort(path: &Path, policy: DuplicateDatePolicy) -> Result<PreparedCohort> {
    let rows = read_lab_rows(path)?;
    let cohort = prepare_cohort(&rows, policy);
    info!(
        rows = rows.len(),
        patients = cohort.histories.len(),
        excluded = cohort.excluded.len(),
        skipped_rows = cohort.skipped_rows,
        "ingest complete"
    );
    Ok(cohort)
}
