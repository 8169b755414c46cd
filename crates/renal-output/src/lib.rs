//! Output generation for the renal episode engine.
//!
//! Every run produces the same set of CSV tables:
//!
//! - **aki_year1**: AKI episodes starting in the first year, per patient
//! - **aki_all**: every retained AKI episode (one zero row for patients without AKI)
//! - **progression_summary**: sustained progression and person-time per threshold
//! - **ckd_episodes**: every retained sustained eGFR episode
//! - **exclusions**: patients left out of the run, with the reason
//!
//! plus `run_summary.json` with counts and the effective options.

mod summary;
mod tables;
mod writer;

pub use summary::RunSummary;
pub use tables::{
    AKI_ALL, AKI_YEAR1, CKD_EPISODES, EXCLUSIONS, OutputTables, PROGRESSION_SUMMARY,
    aki_all_frame, aki_year1_frame, ckd_episodes_frame, exclusions_frame,
    progression_summary_frame,
};
pub use writer::{
    RUN_SUMMARY_FILE, frame_to_csv, write_frame_csv, write_outputs, write_run_summary,
    write_tables,
};
