//! # Clinical Constants
//! Fixed coefficient tables behind the probability models and the
//! guideline thresholds used by the recommendation engine. Pure data.
//!
//! Sources:
//! - RF-CL logistic model: Winther et al., JACC 2020.
//! - Likelihood ratios: Knuuti et al., Eur Heart J 2018 meta-analysis.
//! - Thresholds: 2024 ESC Guidelines for Chronic Coronary Syndromes.

use crate::diagnostics::DiagnosticTest;

/// Coefficients of the risk-factor-weighted clinical likelihood logit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RfClCoefficients {
    pub intercept: f64,
    pub sex: f64,
    pub age: f64,
    pub typical: f64,
    pub non_anginal: f64,
    pub nb_rf: f64,
    pub age_typical: f64,
    pub age_nb_rf: f64,
    pub typical_nb_rf: f64,
    pub sex_nb_rf: f64,
}

pub const RF_CL: RfClCoefficients = RfClCoefficients {
    intercept: -9.5260,
    sex: 1.6128,
    age: 0.08440,
    typical: 2.7112,
    non_anginal: -0.4675,
    nb_rf: 1.4940,
    age_typical: -0.0187,
    age_nb_rf: -0.0131,
    typical_nb_rf: -0.2799,
    sex_nb_rf: -0.2091,
};

/// Linear CACS-CL model: intercept + base proportion, plus one main effect
/// and one interaction effect per Agatston bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacsClCoefficients {
    pub intercept: f64,
    pub base: f64,
    /// Main effects in bin order `[1,9] [10,99] [100,399] [400,999] [1000,∞)`.
    pub bins: [f64; 5],
    /// Base-proportion × bin interaction effects, same order.
    pub interactions: [f64; 5],
}

pub const CACS_CL: CacsClCoefficients = CacsClCoefficients {
    intercept: 0.0013,
    base: 0.2021,
    bins: [0.0082, 0.0238, 0.1131, 0.2306, 0.4040],
    interactions: [0.1311, 0.2909, 0.4077, 0.4658, 0.4489],
};

/// Inclusive lower bounds of the five Agatston bins. Score 0 falls in none.
pub const CACS_BIN_LOWER_BOUNDS: [u32; 5] = [1, 10, 100, 400, 1000];

/// Positive / negative likelihood ratio pair for one test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LikelihoodRatio {
    pub positive: f64,
    pub negative: f64,
}

const fn lr(positive: f64, negative: f64) -> LikelihoodRatio {
    LikelihoodRatio { positive, negative }
}

/// LRs against the anatomical (ICA) reference standard.
pub const ANATOMICAL_LR: [(DiagnosticTest, LikelihoodRatio); 6] = [
    (DiagnosticTest::StressEcg, lr(1.53, 0.68)),
    (DiagnosticTest::StressEcho, lr(4.67, 0.18)),
    (DiagnosticTest::Spect, lr(2.88, 0.19)),
    (DiagnosticTest::Pet, lr(5.87, 0.12)),
    (DiagnosticTest::StressCmr, lr(4.54, 0.13)),
    (DiagnosticTest::Ccta, lr(4.44, 0.04)),
];

/// LRs against the functional (FFR/iFR) reference standard.
pub const FUNCTIONAL_LR: [(DiagnosticTest, LikelihoodRatio); 4] = [
    (DiagnosticTest::Spect, lr(4.21, 0.33)),
    (DiagnosticTest::Pet, lr(6.04, 0.13)),
    (DiagnosticTest::StressCmr, lr(7.10, 0.13)),
    (DiagnosticTest::Ccta, lr(1.97, 0.13)),
];

/// Functional tests validated against FFR.
pub const FFR_VALIDATED_TESTS: [DiagnosticTest; 3] = [
    DiagnosticTest::Spect,
    DiagnosticTest::Pet,
    DiagnosticTest::StressCmr,
];

// --- age domain ---
pub const MIN_AGE: u32 = 18;
pub const MAX_AGE: u32 = 100;
/// Band the risk models were validated in (inclusive).
pub const VALIDATED_AGE_RANGE: (u32, u32) = (30, 79);

// --- guideline probability thresholds (percent) ---
/// At or below: very low likelihood, deferral of testing.
pub const DEFER_TESTING_MAX: f64 = 5.0;
/// At or below (and above `DEFER_TESTING_MAX`): low/moderate, CCTA rule-out range.
pub const RULE_OUT_MAX: f64 = 50.0;
/// Strictly above: very high likelihood, direct ICA.
pub const DIRECT_ICA_MIN: f64 = 85.0;
