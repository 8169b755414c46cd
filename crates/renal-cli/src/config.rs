//! Engine option resolution.
//!
//! Precedence: command-line flags, then the `--options` JSON file, then
//! built-in defaults.

use std::path::Path;

use anyhow::{Context, Result};

use renal_model::{DuplicateDatePolicy, EngineOptions};

pub fn load_options_file(path: &Path) -> Result<EngineOptions> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse options {}", path.display()))
}

pub fn resolve_options(
    options_file: Option<&Path>,
    duplicates: Option<DuplicateDatePolicy>,
    sequential: bool,
) -> Result<EngineOptions> {
    let mut options = match options_file {
        Some(path) => load_options_file(path)?,
        None => EngineOptions::default(),
    };
    if let Some(policy) = duplicates {
        options.duplicate_policy = policy;
    }
    if sequential {
        options.parallel = false;
    }
    options.validate().context("invalid engine options")?;
    Ok(options)
}
