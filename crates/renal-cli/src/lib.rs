//! CLI library components for the renal episode engine.

pub mod config;
pub mod logging;
pub mod pipeline;
