//! Reconciliation of AKI episodes against sustained CKD episodes.

use std::collections::BTreeSet;

use tracing::trace;

use renal_model::{AkiEpisode, EngineOptions, Episode};

/// Drops AKI episodes touching a CKD onset, deduplicates, and tags AKD.
///
/// An AKI episode is dropped when its start or stop offset equals the start
/// offset of any sustained episode at any threshold. AKI lying strictly inside
/// an ongoing CKD episode is kept.
pub fn reconcile_aki(
    aki: Vec<Episode>,
    ckd: &[Episode],
    options: &EngineOptions,
) -> Vec<AkiEpisode> {
    let ckd_starts: BTreeSet<i64> = ckd.iter().map(|episode| episode.start_offset_days).collect();
    let mut seen = BTreeSet::new();
    aki.into_iter()
        .filter(|episode| {
            let overlaps_onset = ckd_starts.contains(&episode.start_offset_days)
                || ckd_starts.contains(&episode.stop_offset_days);
            if overlaps_onset {
                trace!(
                    start = episode.start_offset_days,
                    stop = episode.stop_offset_days,
                    "aki episode dropped at ckd onset"
                );
            }
            !overlaps_onset
        })
        .filter(|episode| {
            seen.insert((
                episode.start_offset_days,
                episode.stop_offset_days,
                episode.duration_days,
            ))
        })
        .map(|episode| AkiEpisode {
            is_akd: episode.duration_days > options.akd_min_days,
            episode,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use renal_model::{EpisodeKind, PatientId, Threshold};

    fn episode(kind: EpisodeKind, start: i64, stop: i64) -> Episode {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Episode::new(
            PatientId::new("P1").unwrap(),
            kind,
            (base + chrono::Duration::days(start), start),
            (base + chrono::Duration::days(stop), stop),
        )
    }

    #[test]
    fn drops_aki_at_ckd_onset() {
        let ckd = vec![episode(EpisodeKind::Ckd(Threshold::Egfr60), 100, 300)];
        let aki = vec![
            episode(EpisodeKind::Aki, 100, 102),
            episode(EpisodeKind::Aki, 95, 100),
            episode(EpisodeKind::Aki, 150, 151),
            episode(EpisodeKind::Aki, 20, 21),
        ];
        let kept = reconcile_aki(aki, &ckd, &EngineOptions::default());
        let starts: Vec<i64> = kept.iter().map(|a| a.episode.start_offset_days).collect();
        assert_eq!(starts, vec![150, 20]);
    }

    #[test]
    fn any_threshold_onset_counts() {
        let ckd = vec![
            episode(EpisodeKind::Ckd(Threshold::Egfr60), 100, 300),
            episode(EpisodeKind::Ckd(Threshold::Egfr30), 200, 300),
        ];
        let aki = vec![episode(EpisodeKind::Aki, 195, 200)];
        assert!(reconcile_aki(aki, &ckd, &EngineOptions::default()).is_empty());
    }

    #[test]
    fn deduplicates_and_tags_akd() {
        let aki = vec![
            episode(EpisodeKind::Aki, 10, 20),
            episode(EpisodeKind::Aki, 10, 20),
            episode(EpisodeKind::Aki, 40, 47),
        ];
        let kept = reconcile_aki(aki, &[], &EngineOptions::default());
        assert_eq!(kept.len(), 2);
        assert!(kept[0].is_akd);
        assert!(!kept[1].is_akd);
    }
}
