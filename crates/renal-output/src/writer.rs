//! CSV and JSON writers.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::*;
use tracing::{debug, info};

use crate::summary::RunSummary;
use crate::tables::OutputTables;

pub const RUN_SUMMARY_FILE: &str = "run_summary.json";

/// Writes `frame` as CSV with a header row.
pub fn write_frame_csv<W: Write>(writer: W, frame: &mut DataFrame) -> PolarsResult<()> {
    CsvWriter::new(writer).include_header(true).finish(frame)
}

/// Renders `frame` as CSV text.
pub fn frame_to_csv(frame: &mut DataFrame) -> Result<String> {
    let mut buffer = Vec::new();
    write_frame_csv(&mut buffer, frame)?;
    String::from_utf8(buffer).context("csv output is not valid utf-8")
}

/// Writes every table as `<name>.csv` into `output_dir`.
pub fn write_tables(output_dir: &Path, tables: &mut OutputTables) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("create {}", output_dir.display()))?;
    let mut outputs = Vec::new();
    for (name, frame) in tables.named_mut() {
        let path = output_dir.join(format!("{name}.csv"));
        let file = File::create(&path).with_context(|| format!("create {}", path.display()))?;
        write_frame_csv(file, frame).with_context(|| format!("write {}", path.display()))?;
        debug!(table = name, rows = frame.height(), "table written");
        outputs.push(path);
    }
    Ok(outputs)
}

pub fn write_run_summary(output_dir: &Path, summary: &RunSummary) -> Result<PathBuf> {
    let path = output_dir.join(RUN_SUMMARY_FILE);
    let json = serde_json::to_string_pretty(summary).context("serialize run summary")?;
    std::fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

/// Writes all tables and the run summary.
pub fn write_outputs(
    output_dir: &Path,
    tables: &mut OutputTables,
    summary: &RunSummary,
) -> Result<Vec<PathBuf>> {
    let mut outputs = write_tables(output_dir, tables)?;
    outputs.push(write_run_summary(output_dir, summary)?);
    info!(files = outputs.len(), dir = %output_dir.display(), "outputs written");
    Ok(outputs)
}
