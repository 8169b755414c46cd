use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid patient id: {0:?}")]
    InvalidPatientId(String),
    #[error("invalid option {name}: {reason}")]
    InvalidOption { name: &'static str, reason: String },
}

/// Reasons a single patient is left out of a run.
///
/// These never abort the batch; the engine records them next to the
/// processed patients.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
pub enum PatientError {
    #[error("no usable observations")]
    NoObservations,
    #[error("no post-baseline observations")]
    NoFollowUp,
    #[error("multiple observations on {date}")]
    DuplicateDate { date: NaiveDate },
}

/// A patient left out of a run, with the reason.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Exclusion {
    pub patient_id: crate::PatientId,
    pub reason: PatientError,
}

pub type Result<T> = std::result::Result<T, ModelError>;
