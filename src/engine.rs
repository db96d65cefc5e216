//! # Recommendation Engine
//! Pure, testable logic that maps `(probability, completed tests)` → ranked
//! recommendations. No I/O and no hidden state.
//!
//! Policy, first satisfied branch wins:
//! 1) positive CCTA → ICA (high event risk)
//! 2) any positive functional test → ICA (high event risk)
//! 3) probability tiers, refined by which tests were completed

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::constants::{DEFER_TESTING_MAX, DIRECT_ICA_MIN, RULE_OUT_MAX};
use crate::diagnostics::{DiagnosticTest, TestRecord, TestResult};
use crate::models::clamp_percent;
use crate::recommendation::{Recommendation, RecommendationKind};

fn default_defer_max() -> f64 {
    DEFER_TESTING_MAX
}
fn default_rule_out_max() -> f64 {
    RULE_OUT_MAX
}
fn default_ica_min() -> f64 {
    DIRECT_ICA_MIN
}

/// Probability cut-offs (percent) separating the guideline tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// `p <= defer_max`: very low likelihood.
    #[serde(default = "default_defer_max")]
    pub defer_max: f64,
    /// `defer_max < p <= rule_out_max`: low or moderate likelihood.
    #[serde(default = "default_rule_out_max")]
    pub rule_out_max: f64,
    /// `p > ica_min`: very high likelihood.
    #[serde(default = "default_ica_min")]
    pub ica_min: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            defer_max: DEFER_TESTING_MAX,
            rule_out_max: RULE_OUT_MAX,
            ica_min: DIRECT_ICA_MIN,
        }
    }
}

impl Thresholds {
    /// Tiers only make sense when `0 <= defer <= rule_out <= ica <= 100`.
    pub fn is_ordered(&self) -> bool {
        0.0 <= self.defer_max
            && self.defer_max <= self.rule_out_max
            && self.rule_out_max <= self.ica_min
            && self.ica_min <= 100.0
    }
}

/// Recommendations for `probability` (percent) under the guideline cut-offs.
pub fn recommend(probability: f64, tests: &TestRecord) -> Vec<Recommendation> {
    recommend_with(probability, tests, &Thresholds::default())
}

/// Same as [`recommend`] with explicit cut-offs.
pub fn recommend_with(probability: f64, tests: &TestRecord, t: &Thresholds) -> Vec<Recommendation> {
    let kind = decide(probability, tests, t);
    match kind {
        Some(k) => info!(
            target: "cadence::engine",
            kind = ?k,
            high_risk = k.is_high_risk(),
            "recommendation selected"
        ),
        None => debug!(target: "cadence::engine", "no recommendation for this tier"),
    }
    kind.map(Recommendation::from).into_iter().collect()
}

/// Core decision table. At most one recommendation is produced, none for a
/// non-finite probability.
pub fn decide(probability: f64, tests: &TestRecord, t: &Thresholds) -> Option<RecommendationKind> {
    if !probability.is_finite() {
        warn!(target: "cadence::engine", "non-finite probability; no recommendation");
        return None;
    }
    let p = clamp_percent(probability);
    let ccta = tests.result(DiagnosticTest::Ccta);
    let has_ccta = tests.ccta_completed();
    let has_functional = tests.any_functional_completed();

    // 1) + 2) High event risk on a completed test ignores the probability.
    if has_ccta && ccta == TestResult::Positive {
        return Some(RecommendationKind::IcaHighRiskCcta);
    }
    if functional_results(tests).any(|r| r == TestResult::Positive) {
        return Some(RecommendationKind::IcaHighRiskFunctional);
    }

    // 3) Probability tiers.
    if p > t.ica_min {
        return Some(RecommendationKind::IcaVeryHighProbability);
    }

    match (has_ccta, has_functional) {
        // Any completed positive already returned above, so with both kinds
        // completed only the negative branch is reachable. The uncertain
        // branch is kept to mirror the guideline table.
        (true, true) => {
            let any_positive = ccta == TestResult::Positive
                || functional_results(tests).any(|r| r == TestResult::Positive);
            if any_positive {
                Some(RecommendationKind::IcaUncertainDiagnosis)
            } else {
                Some(RecommendationKind::AnocaAfterNegativeTesting)
            }
        }
        (true, false) if ccta != TestResult::Positive => {
            Some(RecommendationKind::FunctionalImagingAfterCcta)
        }
        // Unreachable: positive CCTA returned in step 1.
        (true, false) => None,
        (false, true) => {
            if functional_results(tests).any(|r| r == TestResult::NonDiagnostic) {
                Some(RecommendationKind::CctaAfterNonDiagnostic)
            } else if p > t.defer_max && p <= t.rule_out_max {
                Some(RecommendationKind::CctaRuleOut)
            } else if p <= t.defer_max {
                Some(RecommendationKind::AnocaVeryLowProbability)
            } else {
                None
            }
        }
        (false, false) => {
            if p <= t.defer_max {
                Some(RecommendationKind::DeferTesting)
            } else if p <= t.rule_out_max {
                Some(RecommendationKind::CctaOrFunctionalImaging)
            } else if p <= t.ica_min {
                Some(RecommendationKind::FunctionalImaging)
            } else {
                None
            }
        }
    }
}

/// Results of the completed functional tests.
fn functional_results(tests: &TestRecord) -> impl Iterator<Item = TestResult> + '_ {
    DiagnosticTest::ALL
        .into_iter()
        .filter(|f| f.is_functional() && tests.is_completed(*f))
        .map(|f| tests.result(f))
}
