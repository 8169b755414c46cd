//! Run-length segmentation of flag series into episodes.
//!
//! A run is a maximal stretch of consecutive `Some(true)` positions. AKI runs
//! are found on the daily grid after short gaps between flags are bridged;
//! eGFR-threshold runs are found on observed days only, so days without a lab
//! neither extend nor break a run.
//!
//! Only follow-up days (offset >= 0) are segmented. Flags before the baseline
//! date still exist on the grid but never open an episode, so a run already
//! under way at baseline starts at the first follow-up day.

use std::ops::RangeInclusive;

use renal_model::{EngineOptions, Episode, EpisodeKind, Threshold};

use crate::grid::DailyGrid;

/// Inclusive position range of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Run {
    pub start: usize,
    pub stop: usize,
}

impl Run {
    pub fn positions(&self) -> RangeInclusive<usize> {
        self.start..=self.stop
    }
}

/// Maximal runs of `Some(true)` in position order.
pub fn segment_runs(series: &[Option<bool>]) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut open: Option<usize> = None;
    for (idx, value) in series.iter().enumerate() {
        match (*value == Some(true), open) {
            (true, None) => open = Some(idx),
            (false, Some(start)) => {
                runs.push(Run {
                    start,
                    stop: idx - 1,
                });
                open = None;
            }
            _ => {}
        }
    }
    if let Some(start) = open {
        runs.push(Run {
            start,
            stop: series.len() - 1,
        });
    }
    runs
}

/// Joins runs separated by at most `max_gap` non-flagged positions.
///
/// Only positions strictly between two runs are changed, so nothing further
/// than `max_gap` from a genuine flag is ever set.
pub fn bridge_gaps(series: &[Option<bool>], max_gap: usize) -> Vec<Option<bool>> {
    let mut bridged = series.to_vec();
    for pair in segment_runs(series).windows(2) {
        let gap = pair[1].start - pair[0].stop - 1;
        if gap <= max_gap {
            for value in &mut bridged[pair[0].stop + 1..pair[1].start] {
                *value = Some(true);
            }
        }
    }
    bridged
}

/// AKI episodes shorter than the sustained duration.
pub fn aki_episodes(
    grid: &DailyGrid,
    aki: &[Option<bool>],
    options: &EngineOptions,
) -> Vec<Episode> {
    let bridged = bridge_gaps(&follow_up_only(grid, aki), options.aki_gap_days);
    segment_runs(&bridged)
        .into_iter()
        .map(|run| episode_from_positions(grid, EpisodeKind::Aki, run.start, run.stop))
        .filter(|episode| episode.duration_days < options.sustained_min_days)
        .collect()
}

/// Sustained episodes below one eGFR threshold.
pub fn threshold_episodes(
    grid: &DailyGrid,
    threshold: Threshold,
    below: &[Option<bool>],
    options: &EngineOptions,
) -> Vec<Episode> {
    let below = follow_up_only(grid, below);
    let observed: Vec<usize> = below
        .iter()
        .enumerate()
        .filter_map(|(idx, value)| value.map(|_| idx))
        .collect();
    let compressed: Vec<Option<bool>> = observed.iter().map(|&idx| below[idx]).collect();
    segment_runs(&compressed)
        .into_iter()
        .map(|run| {
            episode_from_positions(
                grid,
                EpisodeKind::Ckd(threshold),
                observed[run.start],
                observed[run.stop],
            )
        })
        .filter(|episode| episode.duration_days >= options.sustained_min_days)
        .collect()
}

/// Clears flags on days before baseline.
fn follow_up_only(grid: &DailyGrid, series: &[Option<bool>]) -> Vec<Option<bool>> {
    series
        .iter()
        .zip(&grid.points)
        .map(|(value, point)| if point.is_follow_up() { *value } else { None })
        .collect()
}

fn episode_from_positions(
    grid: &DailyGrid,
    kind: EpisodeKind,
    start: usize,
    stop: usize,
) -> Episode {
    let first = &grid.points[start];
    let last = &grid.points[stop];
    Episode::new(
        grid.patient_id.clone(),
        kind,
        (first.date, first.days_since_baseline),
        (last.date, last.days_since_baseline),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use renal_model::PatientId;

    use crate::grid::GridPoint;

    fn flags(bits: &[u8]) -> Vec<Option<bool>> {
        bits.iter().map(|&bit| Some(bit == 1)).collect()
    }

    fn grid(len: usize) -> DailyGrid {
        grid_from(0, len)
    }

    /// Grid whose first day sits `first_offset` days from baseline.
    fn grid_from(first_offset: i64, len: usize) -> DailyGrid {
        let baseline_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        DailyGrid {
            patient_id: PatientId::new("P1").unwrap(),
            baseline_date,
            baseline_creatinine: Some(80.0),
            points: (0..len)
                .map(|idx| GridPoint {
                    date: baseline_date + chrono::Duration::days(first_offset + idx as i64),
                    days_since_baseline: first_offset + idx as i64,
                    creatinine: Some(80.0),
                    egfr: Some(50.0),
                })
                .collect(),
        }
    }

    fn rebuild(runs: &[Run], len: usize) -> Vec<Option<bool>> {
        let mut series = vec![Some(false); len];
        for run in runs {
            for idx in run.positions() {
                series[idx] = Some(true);
            }
        }
        series
    }

    #[test]
    fn finds_maximal_runs() {
        let runs = segment_runs(&flags(&[1, 1, 0, 1, 0, 0, 1]));
        assert_eq!(
            runs,
            vec![
                Run { start: 0, stop: 1 },
                Run { start: 3, stop: 3 },
                Run { start: 6, stop: 6 },
            ]
        );
    }

    #[test]
    fn missing_breaks_a_run() {
        let runs = segment_runs(&[Some(true), None, Some(true)]);
        assert_eq!(runs.len(), 2);
    }

    #[test]
    fn seven_day_gap_is_bridged() {
        let series = flags(&[0, 1, 1, 0, 0, 0, 0, 0, 0, 0, 1, 0]);
        let episodes = aki_episodes(&grid(series.len()), &series, &EngineOptions::default());
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].start_offset_days, 1);
        assert_eq!(episodes[0].stop_offset_days, 10);
        assert_eq!(episodes[0].duration_days, 9);
    }

    #[test]
    fn eight_day_gap_is_not_bridged() {
        let series = flags(&[0, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0]);
        let episodes = aki_episodes(&grid(series.len()), &series, &EngineOptions::default());
        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[1].start_offset_days, 11);
    }

    #[test]
    fn bridging_covers_missing_days() {
        let series = vec![Some(true), None, None, Some(false), Some(true)];
        assert_eq!(bridge_gaps(&series, 7), vec![Some(true); 5]);
    }

    #[test]
    fn long_aki_runs_are_not_aki_episodes() {
        let series = vec![Some(true); 91];
        let episodes = aki_episodes(&grid(91), &series, &EngineOptions::default());
        assert!(episodes.is_empty());
        let series = vec![Some(true); 90];
        let episodes = aki_episodes(&grid(90), &series, &EngineOptions::default());
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].duration_days, 89);
    }

    #[test]
    fn threshold_runs_skip_unobserved_days() {
        let mut below = vec![None; 200];
        below[10] = Some(true);
        below[60] = Some(true);
        below[120] = Some(true);
        below[150] = Some(false);
        below[199] = Some(true);
        let episodes = threshold_episodes(
            &grid(200),
            Threshold::Egfr30,
            &below,
            &EngineOptions::default(),
        );
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].start_offset_days, 10);
        assert_eq!(episodes[0].stop_offset_days, 120);
        assert_eq!(episodes[0].kind, EpisodeKind::Ckd(Threshold::Egfr30));
    }

    #[test]
    fn short_threshold_runs_are_dropped() {
        let mut below = vec![None; 100];
        below[0] = Some(true);
        below[89] = Some(true);
        let episodes = threshold_episodes(
            &grid(100),
            Threshold::Egfr45,
            &below,
            &EngineOptions::default(),
        );
        assert!(episodes.is_empty());
    }

    #[test]
    fn pre_baseline_aki_flags_open_no_episode() {
        // Offsets -10..=9; flags at -8, -3 and 4.
        let mut series = vec![Some(false); 20];
        series[2] = Some(true);
        series[7] = Some(true);
        series[14] = Some(true);
        let episodes = aki_episodes(&grid_from(-10, 20), &series, &EngineOptions::default());
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].start_offset_days, 4);
        assert_eq!(episodes[0].stop_offset_days, 4);
    }

    #[test]
    fn threshold_run_under_way_at_baseline_starts_at_follow_up() {
        // Offsets -200..=300, eGFR below the threshold every 20 days.
        let grid = grid_from(-200, 501);
        let below: Vec<Option<bool>> = (0..501)
            .map(|idx| (idx % 20 == 0).then_some(true))
            .collect();
        let episodes =
            threshold_episodes(&grid, Threshold::Egfr15, &below, &EngineOptions::default());
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].start_offset_days, 0);
        assert_eq!(episodes[0].stop_offset_days, 300);

        // Only 80 follow-up days remain, too short to be sustained.
        let grid = grid_from(-200, 281);
        let below: Vec<Option<bool>> = (0..281)
            .map(|idx| (idx % 20 == 0).then_some(true))
            .collect();
        let episodes =
            threshold_episodes(&grid, Threshold::Egfr15, &below, &EngineOptions::default());
        assert!(episodes.is_empty());
    }

    fn series_strategy() -> impl Strategy<Value = Vec<Option<bool>>> {
        prop::collection::vec(prop::option::of(any::<bool>()), 0..120)
    }

    proptest! {
        #[test]
        fn segmentation_is_idempotent(series in series_strategy()) {
            let runs = segment_runs(&series);
            let again = segment_runs(&rebuild(&runs, series.len()));
            prop_assert_eq!(runs, again);
        }

        #[test]
        fn runs_cover_exactly_the_flagged_positions(series in series_strategy()) {
            let runs = segment_runs(&series);
            let rebuilt = rebuild(&runs, series.len());
            for (idx, value) in series.iter().enumerate() {
                prop_assert_eq!(*value == Some(true), rebuilt[idx] == Some(true));
            }
        }

        #[test]
        fn bridging_never_reaches_beyond_the_gap(
            series in series_strategy(),
            max_gap in 0usize..10,
        ) {
            let bridged = bridge_gaps(&series, max_gap);
            prop_assert_eq!(bridged.len(), series.len());
            let flagged: Vec<usize> = series
                .iter()
                .enumerate()
                .filter(|(_, value)| **value == Some(true))
                .map(|(idx, _)| idx)
                .collect();
            for (idx, (before, after)) in series.iter().zip(&bridged).enumerate() {
                if before != after {
                    let nearest = flagged
                        .iter()
                        .map(|&flag| flag.abs_diff(idx))
                        .min()
                        .unwrap_or(usize::MAX);
                    prop_assert!(nearest <= max_gap);
                    prop_assert_eq!(*after, Some(true));
                }
            }
            // Every bridged run is separated from the next by more than max_gap.
            let runs = segment_runs(&bridged);
            for pair in runs.windows(2) {
                prop_assert!(pair[1].start - pair[0].stop - 1 > max_gap);
            }
        }
    }
}
