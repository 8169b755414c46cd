//! Per-day AKI and eGFR-threshold flags.

use serde::Serialize;

use renal_model::{EngineOptions, Threshold};

use crate::grid::DailyGrid;
use crate::reference::ReferenceSet;

/// Outcome of each AKI rule on one day. `None` means the rule had no reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AkiAssessment {
    /// Rise over the 48-hour minimum exceeds the absolute threshold.
    pub rise_48h: Option<bool>,
    /// Ratio to the 7-day minimum reaches the ratio threshold.
    pub ratio_7d: Option<bool>,
    /// Ratio to the pre-365-day median reaches the ratio threshold.
    pub ratio_365d: Option<bool>,
}

impl AkiAssessment {
    pub fn evaluate(creatinine: f64, references: &ReferenceSet, options: &EngineOptions) -> Self {
        Self {
            rise_48h: references
                .rise_reference()
                .map(|reference| creatinine - reference > options.aki_abs_rise),
            ratio_7d: references
                .ratio_7d_reference()
                .map(|reference| creatinine / reference >= options.aki_ratio),
            ratio_365d: references
                .median_pre_365d
                .map(|reference| creatinine / reference >= options.aki_ratio),
        }
    }

    /// 1 if any rule fires, 0 if at least one rule was evaluable, else missing.
    pub fn flag(&self) -> Option<bool> {
        let rules = [self.rise_48h, self.ratio_7d, self.ratio_365d];
        if rules.contains(&Some(true)) {
            Some(true)
        } else if rules.iter().any(Option::is_some) {
            Some(false)
        } else {
            None
        }
    }
}

/// Flag series aligned with the daily grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlagSeries {
    pub aki: Vec<Option<bool>>,
    pub assessments: Vec<AkiAssessment>,
    /// One series per threshold, in `Threshold::ALL` order.
    pub egfr_below: Vec<(Threshold, Vec<Option<bool>>)>,
}

impl FlagSeries {
    pub fn egfr(&self, threshold: Threshold) -> &[Option<bool>] {
        self.egfr_below
            .iter()
            .find(|(candidate, _)| *candidate == threshold)
            .map(|(_, series)| series.as_slice())
            .unwrap_or(&[])
    }
}

pub fn evaluate_flags(
    grid: &DailyGrid,
    references: &[ReferenceSet],
    options: &EngineOptions,
) -> FlagSeries {
    let assessments: Vec<AkiAssessment> = grid
        .points
        .iter()
        .zip(references)
        .map(|(point, refs)| match point.creatinine {
            Some(creatinine) => AkiAssessment::evaluate(creatinine, refs, options),
            None => AkiAssessment::default(),
        })
        .collect();
    let aki = assessments.iter().map(AkiAssessment::flag).collect();
    let egfr_below = Threshold::ALL
        .into_iter()
        .map(|threshold| {
            let series = grid
                .points
                .iter()
                .map(|point| point.egfr.map(|egfr| egfr < threshold.value()))
                .collect();
            (threshold, series)
        })
        .collect();
    FlagSeries {
        aki,
        assessments,
        egfr_below,
    }
}
