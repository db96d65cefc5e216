//! # CACS-CL
//! Calcium-score-weighted clinical likelihood: a fitted linear blend of the
//! base likelihood and the Agatston bin, with base × bin interactions.
//! The fitted coefficients keep the sum near `[0, 1]`; only a clamp is applied.

use serde::{Deserialize, Serialize};

use super::clamp_percent;
use crate::constants::{CACS_BIN_LOWER_BOUNDS, CACS_CL};

/// Agatston bins carrying a model effect. A score of 0 has no bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacsBin {
    From1To9,
    From10To99,
    From100To399,
    From400To999,
    From1000,
}

impl CacsBin {
    const ORDER: [CacsBin; 5] = [
        Self::From1To9,
        Self::From10To99,
        Self::From100To399,
        Self::From400To999,
        Self::From1000,
    ];

    pub fn for_score(agatston: u32) -> Option<Self> {
        CACS_BIN_LOWER_BOUNDS
            .iter()
            .rposition(|&lower| agatston >= lower)
            .map(|i| Self::ORDER[i])
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Descriptive grade of the calcium burden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalcificationGrade {
    None,
    Minimal,
    Mild,
    Moderate,
    Severe,
    Extensive,
}

impl CalcificationGrade {
    pub fn for_score(agatston: u32) -> Self {
        match CacsBin::for_score(agatston) {
            None => Self::None,
            Some(CacsBin::From1To9) => Self::Minimal,
            Some(CacsBin::From10To99) => Self::Mild,
            Some(CacsBin::From100To399) => Self::Moderate,
            Some(CacsBin::From400To999) => Self::Severe,
            Some(CacsBin::From1000) => Self::Extensive,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::None => "No calcification",
            Self::Minimal => "Minimal calcification",
            Self::Mild => "Mild calcification",
            Self::Moderate => "Moderate calcification",
            Self::Severe => "Severe calcification",
            Self::Extensive => "Extensive calcification",
        }
    }
}

/// CACS-CL as a percentage, from a base likelihood (RF-CL or its manual
/// override) in percent and an Agatston score.
pub fn compute_cacs_cl(base_percent: f64, agatston: u32) -> f64 {
    let c = &CACS_CL;
    let base = base_percent / 100.0;

    let mut p = c.intercept + c.base * base;
    if let Some(bin) = CacsBin::for_score(agatston) {
        let i = bin.index();
        p += c.bins[i] + c.interactions[i] * base;
    }

    clamp_percent(p * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_score_uses_only_intercept_and_base() {
        let p = compute_cacs_cl(50.0, 0);
        assert!((p - 10.235).abs() < 1e-9, "got {p}");
    }

    #[test]
    fn bins_are_mutually_exclusive_at_edges() {
        assert_eq!(CacsBin::for_score(0), None);
        assert_eq!(CacsBin::for_score(1), Some(CacsBin::From1To9));
        assert_eq!(CacsBin::for_score(9), Some(CacsBin::From1To9));
        assert_eq!(CacsBin::for_score(10), Some(CacsBin::From10To99));
        assert_eq!(CacsBin::for_score(399), Some(CacsBin::From100To399));
        assert_eq!(CacsBin::for_score(400), Some(CacsBin::From400To999));
        assert_eq!(CacsBin::for_score(1000), Some(CacsBin::From1000));
        assert_eq!(CacsBin::for_score(u32::MAX), Some(CacsBin::From1000));
    }

    #[test]
    fn extensive_calcification_at_full_base() {
        // 0.0013 + 0.2021 + 0.4040 + 0.4489 = 1.0563 -> clamped
        assert!((compute_cacs_cl(100.0, 2500) - 100.0).abs() < 1e-12);
    }

    #[test]
    fn moderate_bin_blend() {
        // 0.0013 + 0.2*0.2021 + 0.1131 + 0.2*0.4077 = 0.23636
        let p = compute_cacs_cl(20.0, 150);
        assert!((p - 23.636).abs() < 1e-9, "got {p}");
    }

    #[test]
    fn grades_follow_bins() {
        assert_eq!(CalcificationGrade::for_score(0), CalcificationGrade::None);
        assert_eq!(CalcificationGrade::for_score(5), CalcificationGrade::Minimal);
        assert_eq!(CalcificationGrade::for_score(99), CalcificationGrade::Mild);
        assert_eq!(CalcificationGrade::for_score(100), CalcificationGrade::Moderate);
        assert_eq!(CalcificationGrade::for_score(999), CalcificationGrade::Severe);
        assert_eq!(
            CalcificationGrade::for_score(1000).description(),
            "Extensive calcification"
        );
    }
}
