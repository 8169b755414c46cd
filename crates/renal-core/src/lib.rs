//! Episode engine for longitudinal renal laboratory data.
//!
//! Each patient passes through the same sequential stages:
//!
//! 1. [`grid`] lays observations onto a daily timeline.
//! 2. [`reference`] computes rolling creatinine references per day.
//! 3. [`flags`] evaluates the AKI rules and eGFR thresholds.
//! 4. [`segment`] turns flag series into AKI and sustained CKD episodes.
//! 5. [`reconcile`] removes AKI that coincide with CKD onset and tags AKD.
//! 6. [`progression`] summarizes sustained progression and person-time.
//!
//! [`run_engine`] applies this pass to a whole cohort.

pub mod engine;
pub mod flags;
pub mod grid;
pub mod patient;
pub mod progression;
pub mod reconcile;
pub mod reference;
pub mod segment;

pub use engine::{EngineOutput, PatientOutcome, run_engine};
pub use flags::{AkiAssessment, FlagSeries, evaluate_flags};
pub use grid::{DailyGrid, GridPoint, build_grid};
pub use patient::{PatientAnalysis, PatientResult, analyze_patient, process_patient};
pub use progression::summarize;
pub use reconcile::reconcile_aki;
pub use reference::{ReferenceSet, compute_references, min_present};
pub use segment::{Run, aki_episodes, bridge_gaps, segment_runs, threshold_episodes};
