//! Rolling creatinine references used by the AKI rules.
//!
//! All windows are measured in grid days and exclude the current day. Only
//! observed creatinine contributes; a day without its own creatinine gets an
//! empty reference set.

use serde::Serialize;

use renal_model::EngineOptions;

use crate::grid::DailyGrid;

/// 7-day window length in grid rows.
const WINDOW_7D_DAYS: usize = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ReferenceSet {
    pub min_7d_before: Option<f64>,
    pub min_7d_after: Option<f64>,
    pub min_48h_before: Option<f64>,
    pub min_48h_after: Option<f64>,
    pub min_48h_combined: Option<f64>,
    pub min_7d_combined: Option<f64>,
    pub median_pre_365d: Option<f64>,
    pub median_post_365d: Option<f64>,
}

impl ReferenceSet {
    /// Backward-looking 48-hour reference, falling back to the combined one.
    pub fn rise_reference(&self) -> Option<f64> {
        self.min_48h_before.or(self.min_48h_combined)
    }

    /// Backward-looking 7-day reference, falling back to the combined one.
    pub fn ratio_7d_reference(&self) -> Option<f64> {
        self.min_7d_before.or(self.min_7d_combined)
    }

    fn override_minima(&mut self, value: Option<f64>) {
        self.min_7d_before = value;
        self.min_7d_after = value;
        self.min_48h_before = value;
        self.min_48h_after = value;
        self.min_48h_combined = value;
        self.min_7d_combined = value;
    }
}

/// The smaller of two optional values, or whichever one exists.
pub fn min_present(left: Option<f64>, right: Option<f64>) -> Option<f64> {
    match (left, right) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(a), None) => Some(a),
        (None, b) => b,
    }
}

/// Computes one reference set per grid day.
pub fn compute_references(grid: &DailyGrid, options: &EngineOptions) -> Vec<ReferenceSet> {
    let values = grid.creatinine();
    let observed: Vec<usize> = values
        .iter()
        .enumerate()
        .filter_map(|(idx, value)| value.map(|_| idx))
        .collect();
    let median_window = usize::try_from(options.median_window_days).unwrap_or_default();
    let min_gap = usize::try_from(options.median_min_gap_days).unwrap_or_default();

    let mut references = vec![ReferenceSet::default(); values.len()];
    for (rank, &idx) in observed.iter().enumerate() {
        // 48 hours on a daily grid: the two adjacent rows on each side.
        let min_48h_before = min_present(
            lookback(&values, idx, 1).flatten(),
            lookback(&values, idx, 2).flatten(),
        );
        let min_48h_after = min_present(
            values.get(idx + 1).copied().flatten(),
            values.get(idx + 2).copied().flatten(),
        );
        let min_7d_before = window_min(&values, idx.saturating_sub(WINDOW_7D_DAYS), idx);
        let min_7d_after = window_min(&values, idx + 1, idx + 1 + WINDOW_7D_DAYS);

        let median_pre_365d = rank
            .checked_sub(1)
            .map(|prev| idx - observed[prev])
            .filter(|gap| (min_gap..=median_window).contains(gap))
            .and_then(|_| {
                window_median(&values, &observed, idx.saturating_sub(median_window), idx)
            });
        let median_post_365d = observed
            .get(rank + 1)
            .map(|next| next - idx)
            .filter(|gap| (min_gap..=median_window).contains(gap))
            .and_then(|_| window_median(&values, &observed, idx + 1, idx + 1 + median_window));

        let mut set = ReferenceSet {
            min_7d_before,
            min_7d_after,
            min_48h_before,
            min_48h_after,
            min_48h_combined: min_present(min_48h_before, min_48h_after),
            min_7d_combined: min_present(min_7d_before, min_7d_after),
            median_pre_365d,
            median_post_365d,
        };
        let offset = grid.points[idx].days_since_baseline;
        if (0..=options.baseline_window_days).contains(&offset) {
            set.override_minima(grid.baseline_creatinine);
        }
        references[idx] = set;
    }
    references
}

fn lookback(values: &[Option<f64>], idx: usize, rows: usize) -> Option<Option<f64>> {
    idx.checked_sub(rows).map(|prev| values[prev])
}

/// Minimum over `values[start..end]`, clamped to the series.
fn window_min(values: &[Option<f64>], start: usize, end: usize) -> Option<f64> {
    let end = end.min(values.len());
    if start >= end {
        return None;
    }
    values[start..end].iter().flatten().copied().reduce(f64::min)
}

/// Median of observed values with grid index in `start..end`.
fn window_median(
    values: &[Option<f64>],
    observed: &[usize],
    start: usize,
    end: usize,
) -> Option<f64> {
    let lo = observed.partition_point(|&idx| idx < start);
    let hi = observed.partition_point(|&idx| idx < end);
    let mut window: Vec<f64> = observed[lo..hi]
        .iter()
        .filter_map(|&idx| values[idx])
        .collect();
    median(&mut window)
}

pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len().is_multiple_of(2) {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
