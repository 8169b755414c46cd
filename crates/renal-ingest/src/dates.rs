//! Calendar date parsing for laboratory rows.

use chrono::NaiveDate;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];

/// Parses a full calendar date.
///
/// Accepts ISO `YYYY-MM-DD`, `YYYY/MM/DD` and `DD/MM/YYYY`. A trailing time
/// component (`2024-01-15T08:30` or `2024-01-15 08:30:00`) is ignored.
pub fn parse_lab_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    let date_part = trimmed.split(['T', ' ']).next().unwrap_or(trimmed);
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
}
