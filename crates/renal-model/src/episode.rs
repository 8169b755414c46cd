//! Episode records produced by the segmenter.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::PatientId;

/// eGFR cut-offs tracked for sustained CKD episodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Threshold {
    Egfr15,
    Egfr30,
    Egfr45,
    Egfr60,
}

impl Threshold {
    /// All thresholds in output column order.
    pub const ALL: [Threshold; 4] = [
        Threshold::Egfr15,
        Threshold::Egfr30,
        Threshold::Egfr45,
        Threshold::Egfr60,
    ];

    pub fn value(self) -> f64 {
        f64::from(self.label())
    }

    /// Integer label used in column names (`sustained90day_30`, ...).
    pub fn label(self) -> u32 {
        match self {
            Threshold::Egfr15 => 15,
            Threshold::Egfr30 => 30,
            Threshold::Egfr45 => 45,
            Threshold::Egfr60 => 60,
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "eGFR<{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EpisodeKind {
    Aki,
    Ckd(Threshold),
}

/// A maximal run of flagged positions, expressed in dates and baseline offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub patient_id: PatientId,
    pub kind: EpisodeKind,
    pub start_date: NaiveDate,
    pub stop_date: NaiveDate,
    pub start_offset_days: i64,
    pub stop_offset_days: i64,
    pub duration_days: i64,
}

impl Episode {
    /// Builds an episode; `start` and `stop` are ordered if given reversed.
    pub fn new(
        patient_id: PatientId,
        kind: EpisodeKind,
        start: (NaiveDate, i64),
        stop: (NaiveDate, i64),
    ) -> Self {
        let (start, stop) = if start.1 <= stop.1 {
            (start, stop)
        } else {
            (stop, start)
        };
        Self {
            patient_id,
            kind,
            start_date: start.0,
            stop_date: stop.0,
            start_offset_days: start.1,
            stop_offset_days: stop.1,
            duration_days: stop.1 - start.1,
        }
    }

    pub fn threshold(&self) -> Option<Threshold> {
        match self.kind {
            EpisodeKind::Ckd(threshold) => Some(threshold),
            EpisodeKind::Aki => None,
        }
    }
}

/// AKI episode after reconciliation, tagged as AKD when it lasts long enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AkiEpisode {
    pub episode: Episode,
    pub is_akd: bool,
}
