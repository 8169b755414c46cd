//! CKD-EPI 2021 race-free eGFR equation and creatinine unit conversion.
//!
//! eGFR = 142 × min(Scr/κ, 1)^α × max(Scr/κ, 1)^−1.200 × 0.9938^age × 1.012 [female]
//!
//! with κ = 0.7 (female) / 0.9 (male) and α = −0.241 (female) / −0.302 (male).
//! Scr is serum creatinine in mg/dL.

use serde::{Deserialize, Serialize};

/// µmol/L per mg/dL of creatinine.
pub const CREATININE_MGDL_TO_UMOLL: f64 = 88.42;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Decodes the input sex code (1 = male, 2 = female).
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Sex::Male),
            2 => Some(Sex::Female),
            _ => None,
        }
    }
}

/// eGFR in mL/min/1.73m² from creatinine in mg/dL.
pub fn ckd_epi_2021(creatinine_mgdl: f64, age_years: f64, sex: Sex) -> f64 {
    let (kappa, alpha, factor) = match sex {
        Sex::Female => (0.7, -0.241, 1.012),
        Sex::Male => (0.9, -0.302, 1.0),
    };
    let ratio = creatinine_mgdl / kappa;
    142.0
        * ratio.min(1.0).powf(alpha)
        * ratio.max(1.0).powf(-1.200)
        * 0.9938_f64.powf(age_years)
        * factor
}

pub fn creatinine_to_umol(creatinine_mgdl: f64) -> f64 {
    creatinine_mgdl * CREATININE_MGDL_TO_UMOLL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn male_at_kappa_depends_only_on_age() {
        // Scr/κ == 1 removes both creatinine terms.
        let egfr = ckd_epi_2021(0.9, 0.0, Sex::Male);
        assert!((egfr - 142.0).abs() < 1e-9);
    }

    #[test]
    fn female_factor_applies() {
        let egfr = ckd_epi_2021(0.7, 0.0, Sex::Female);
        assert!((egfr - 142.0 * 1.012).abs() < 1e-9);
    }

    #[test]
    fn reference_values() {
        // 60-year-old man, creatinine 1.0 mg/dL: ~86 mL/min/1.73m².
        let egfr = ckd_epi_2021(1.0, 60.0, Sex::Male);
        assert!((egfr - 86.0).abs() < 1.0, "got {egfr}");
        // 50-year-old woman, creatinine 2.0 mg/dL: ~30 mL/min/1.73m².
        let egfr = ckd_epi_2021(2.0, 50.0, Sex::Female);
        assert!((egfr - 30.0).abs() < 1.5, "got {egfr}");
    }

    #[test]
    fn higher_creatinine_lowers_egfr() {
        let low = ckd_epi_2021(0.8, 45.0, Sex::Male);
        let high = ckd_epi_2021(2.4, 45.0, Sex::Male);
        assert!(high < low);
    }

    #[test]
    fn sex_codes() {
        assert_eq!(Sex::from_code(1), Some(Sex::Male));
        assert_eq!(Sex::from_code(2), Some(Sex::Female));
        assert_eq!(Sex::from_code(3), None);
    }

    #[test]
    fn converts_units() {
        assert!((creatinine_to_umol(1.0) - 88.42).abs() < 1e-9);
    }
}
