//! # Assessment pipeline
//! Immutable inputs → every probability stage → recommendations.
//!
//! Stage chain (each later stage derives from exactly one earlier stage):
//! - RF-CL from profile + risk factors
//! - manual override, if present, replaces RF-CL downstream
//! - CACS-CL from the active base (override or RF-CL) when a score is given
//! - post-test probability from CACS-CL, else the active base, when valid
//!   test results exist under the reference standard
//!
//! All stages stay inspectable; the presentation layer shows each one with
//! its delta and lets the clinician choose which one drives recommendations.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::diagnostics::{ReferenceStandard, TestRecord};
use crate::engine::{self, Thresholds};
use crate::models::{adjust_for_test_results, compute_cacs_cl, compute_rf_cl, CalcificationGrade};
use crate::patient::{PatientProfile, RiskFactorSet};
use crate::recommendation::Recommendation;
use crate::telemetry::fingerprint;
use crate::validate::{validate_age, Validation};

/// Everything one evaluation needs. Rebuilt on every input change.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AssessmentInput {
    pub profile: PatientProfile,
    pub risk_factors: RiskFactorSet,
    /// Agatston score, when a calcium scan is available.
    #[serde(default)]
    pub agatston: Option<u32>,
    /// Clinician-chosen likelihood replacing RF-CL downstream.
    #[serde(default)]
    pub manual_override: Option<f64>,
    #[serde(default)]
    pub tests: TestRecord,
    #[serde(default)]
    pub reference_standard: ReferenceStandard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    RfCl,
    ManualOverride,
    CacsCl,
    PostTest,
}

/// A named percentage together with the value it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProbabilityStage {
    pub kind: StageKind,
    pub value: f64,
    /// Value of the stage this one was computed from (`None` for RF-CL).
    pub base: Option<f64>,
    /// True when the chain runs through a manual override.
    pub adjusted: bool,
}

impl ProbabilityStage {
    /// Change relative to the base stage, 0 for RF-CL.
    pub fn delta(&self) -> f64 {
        self.base.map_or(0.0, |b| self.value - b)
    }

    /// Display form, e.g. `42.3%` or `42.3%*` for adjusted chains.
    pub fn display_value(&self) -> String {
        let marker = if self.adjusted { "*" } else { "" };
        format!("{:.1}%{marker}", self.value)
    }
}

/// Selectable scores, in the fixed order they are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreKind {
    RfCl,
    AdjustedRfCl,
    CacsCl,
    AdjustedCacsCl,
    PostTestRfCl,
    PostTestAdjustedRfCl,
    PostTestCacsCl,
    PostTestAdjustedCacsCl,
}

impl ScoreKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::RfCl => "RF-CL",
            Self::AdjustedRfCl => "Adjusted RF-CL",
            Self::CacsCl => "CACS-CL",
            Self::AdjustedCacsCl => "Adjusted CACS-CL",
            Self::PostTestRfCl => "Post-Test RF-CL",
            Self::PostTestAdjustedRfCl => "Post-Test Adjusted RF-CL",
            Self::PostTestCacsCl => "Post-Test CACS-CL",
            Self::PostTestAdjustedCacsCl => "Post-Test Adjusted CACS-CL",
        }
    }

    pub fn is_adjusted(self) -> bool {
        matches!(
            self,
            Self::AdjustedRfCl
                | Self::AdjustedCacsCl
                | Self::PostTestAdjustedRfCl
                | Self::PostTestAdjustedCacsCl
        )
    }
}

impl fmt::Display for ScoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Output of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub rf_cl: ProbabilityStage,
    pub manual_override: Option<ProbabilityStage>,
    pub cacs_cl: Option<ProbabilityStage>,
    pub post_test: Option<ProbabilityStage>,
    pub calcification: Option<CalcificationGrade>,
    pub reference_standard: ReferenceStandard,
    pub tests: TestRecord,
    /// Age check: invalid outside 18–100, warning outside 30–79.
    pub age_check: Validation,
    /// Informational notes for display (not errors).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

pub const FFR_NOTE: &str =
    "Note: Only SPECT, PET, and Stress CMR have been validated against FFR as reference standard.";

impl Assessment {
    pub fn evaluate(input: &AssessmentInput) -> Self {
        let id = fingerprint(input);
        let profile = &input.profile;

        let age_check = validate_age(i64::from(profile.age));
        if let Some(msg) = &age_check.message {
            warn!(target: "cadence::assessment", %id, valid = age_check.valid, "{msg}");
        }

        let rf = compute_rf_cl(profile.age, profile.sex, profile.symptoms, &input.risk_factors);
        let rf_cl = ProbabilityStage {
            kind: StageKind::RfCl,
            value: rf,
            base: None,
            adjusted: false,
        };

        let manual_override = input
            .manual_override
            .filter(|v| v.is_finite())
            .map(|v| ProbabilityStage {
                kind: StageKind::ManualOverride,
                value: v.clamp(0.0, 100.0),
                base: Some(rf),
                adjusted: true,
            });
        let adjusted = manual_override.is_some();
        let active = manual_override.map_or(rf, |s| s.value);

        let cacs_cl = input.agatston.map(|score| ProbabilityStage {
            kind: StageKind::CacsCl,
            value: compute_cacs_cl(active, score),
            base: Some(active),
            adjusted,
        });
        let calcification = input.agatston.map(CalcificationGrade::for_score);

        let post_base = cacs_cl.map_or(active, |s| s.value);
        let results = input.tests.valid_results(input.reference_standard);
        let post_test = (!results.is_empty()).then(|| ProbabilityStage {
            kind: StageKind::PostTest,
            value: adjust_for_test_results(post_base, &results, input.reference_standard),
            base: Some(post_base),
            adjusted,
        });

        let mut notes = Vec::new();
        if input.tests.lacks_ffr_validated(input.reference_standard) {
            notes.push(FFR_NOTE.to_string());
        }

        debug!(
            target: "cadence::assessment",
            %id,
            rf_cl = rf,
            adjusted,
            cacs_cl = ?cacs_cl.map(|s| s.value),
            post_test = ?post_test.map(|s| s.value),
            "stages computed"
        );

        Self {
            rf_cl,
            manual_override,
            cacs_cl,
            post_test,
            calcification,
            reference_standard: input.reference_standard,
            tests: input.tests,
            age_check,
            notes,
        }
    }

    /// Stages in derivation order.
    pub fn stages(&self) -> Vec<ProbabilityStage> {
        std::iter::once(self.rf_cl)
            .chain(self.manual_override)
            .chain(self.cacs_cl)
            .chain(self.post_test)
            .collect()
    }

    /// Override if present, else RF-CL.
    pub fn active_base(&self) -> f64 {
        self.manual_override.map_or(self.rf_cl.value, |s| s.value)
    }

    /// Last stage of the chain.
    pub fn final_probability(&self) -> f64 {
        self.post_test
            .or(self.cacs_cl)
            .or(self.manual_override)
            .unwrap_or(self.rf_cl)
            .value
    }

    pub fn is_adjusted(&self) -> bool {
        self.manual_override.is_some()
    }

    /// Scores the clinician may base recommendations on, in display order.
    pub fn available_scores(&self) -> Vec<ScoreKind> {
        let adj = self.is_adjusted();
        let mut out = vec![ScoreKind::RfCl];
        if adj {
            out.push(ScoreKind::AdjustedRfCl);
        }
        if self.cacs_cl.is_some() {
            out.push(if adj {
                ScoreKind::AdjustedCacsCl
            } else {
                ScoreKind::CacsCl
            });
        }
        if self.post_test.is_some() {
            out.push(match (self.cacs_cl.is_some(), adj) {
                (true, true) => ScoreKind::PostTestAdjustedCacsCl,
                (true, false) => ScoreKind::PostTestCacsCl,
                (false, true) => ScoreKind::PostTestAdjustedRfCl,
                (false, false) => ScoreKind::PostTestRfCl,
            });
        }
        out
    }

    /// The most refined available score.
    pub fn default_score(&self) -> ScoreKind {
        self.available_scores()
            .last()
            .copied()
            .unwrap_or(ScoreKind::RfCl)
    }

    /// Value of `kind`, `None` when not available in this assessment.
    pub fn score(&self, kind: ScoreKind) -> Option<f64> {
        if !self.available_scores().contains(&kind) {
            return None;
        }
        match kind {
            ScoreKind::RfCl => Some(self.rf_cl.value),
            ScoreKind::AdjustedRfCl => self.manual_override.map(|s| s.value),
            ScoreKind::CacsCl | ScoreKind::AdjustedCacsCl => self.cacs_cl.map(|s| s.value),
            ScoreKind::PostTestRfCl
            | ScoreKind::PostTestAdjustedRfCl
            | ScoreKind::PostTestCacsCl
            | ScoreKind::PostTestAdjustedCacsCl => self.post_test.map(|s| s.value),
        }
    }

    /// Resolve the selection: unavailable or missing falls back to the default.
    pub fn basis(&self, selected: Option<ScoreKind>) -> (ScoreKind, f64) {
        if let Some(kind) = selected {
            if let Some(v) = self.score(kind) {
                return (kind, v);
            }
        }
        let kind = self.default_score();
        (kind, self.score(kind).unwrap_or(self.rf_cl.value))
    }

    /// Recommendations driven by the selected score.
    pub fn recommendations(&self, selected: Option<ScoreKind>, thresholds: &Thresholds) -> Vec<Recommendation> {
        let (_, p) = self.basis(selected);
        engine::recommend_with(p, &self.tests, thresholds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{DiagnosticTest, TestResult};
    use crate::patient::{Sex, SymptomCategory};
    use crate::recommendation::RecommendationKind;

    fn input() -> AssessmentInput {
        AssessmentInput {
            profile: PatientProfile::new(60, Sex::Female, SymptomCategory::Atypical),
            ..Default::default()
        }
    }

    #[test]
    fn rf_cl_only() {
        let a = Assessment::evaluate(&input());
        assert_eq!(a.available_scores(), vec![ScoreKind::RfCl]);
        assert_eq!(a.final_probability(), a.rf_cl.value);
        assert_eq!(a.stages().len(), 1);
        assert!(!a.age_check.is_warning());
    }

    #[test]
    fn override_feeds_cacs() {
        let a = Assessment::evaluate(&AssessmentInput {
            manual_override: Some(40.0),
            agatston: Some(0),
            ..input()
        });
        let cacs = a.cacs_cl.unwrap();
        assert_eq!(cacs.base, Some(40.0));
        assert!((cacs.value - compute_cacs_cl(40.0, 0)).abs() < 1e-12);
        assert!(cacs.adjusted);
        assert_eq!(a.calcification, Some(CalcificationGrade::None));
        assert_eq!(
            a.available_scores(),
            vec![ScoreKind::RfCl, ScoreKind::AdjustedRfCl, ScoreKind::AdjustedCacsCl]
        );
        assert!(a.cacs_cl.unwrap().display_value().ends_with("%*"));
    }

    #[test]
    fn post_test_bases_on_cacs_when_present() {
        let tests = TestRecord::new().with(DiagnosticTest::Ccta, TestResult::Negative);
        let a = Assessment::evaluate(&AssessmentInput {
            agatston: Some(120),
            tests,
            ..input()
        });
        let post = a.post_test.unwrap();
        assert_eq!(post.base, a.cacs_cl.map(|s| s.value));
        assert!(post.delta() < 0.0);
        assert_eq!(a.default_score(), ScoreKind::PostTestCacsCl);
        assert_eq!(a.final_probability(), post.value);
    }

    #[test]
    fn functional_standard_without_validated_tests() {
        let tests = TestRecord::new().with(DiagnosticTest::StressEcg, TestResult::Negative);
        let a = Assessment::evaluate(&AssessmentInput {
            tests,
            reference_standard: ReferenceStandard::Functional,
            ..input()
        });
        assert!(a.post_test.is_none());
        assert_eq!(a.notes, vec![FFR_NOTE.to_string()]);
    }

    #[test]
    fn selection_falls_back_to_default() {
        let a = Assessment::evaluate(&AssessmentInput {
            manual_override: Some(3.0),
            ..input()
        });
        assert_eq!(a.basis(Some(ScoreKind::CacsCl)), (ScoreKind::AdjustedRfCl, 3.0));
        assert_eq!(a.basis(None), (ScoreKind::AdjustedRfCl, 3.0));
        let (k, v) = a.basis(Some(ScoreKind::RfCl));
        assert_eq!(k, ScoreKind::RfCl);
        assert_eq!(v, a.rf_cl.value);

        let recs = a.recommendations(None, &Thresholds::default());
        assert_eq!(recs[0].kind, RecommendationKind::DeferTesting);
    }

    #[test]
    fn override_is_clamped_and_nan_ignored() {
        let a = Assessment::evaluate(&AssessmentInput {
            manual_override: Some(140.0),
            ..input()
        });
        assert_eq!(a.active_base(), 100.0);

        let b = Assessment::evaluate(&AssessmentInput {
            manual_override: Some(f64::NAN),
            ..input()
        });
        assert!(!b.is_adjusted());
    }

    #[test]
    fn out_of_band_age_warns_but_computes() {
        let a = Assessment::evaluate(&AssessmentInput {
            profile: PatientProfile::new(85, Sex::Male, SymptomCategory::Typical),
            ..Default::default()
        });
        assert!(a.age_check.is_warning());
        assert!((0.0..=100.0).contains(&a.rf_cl.value));
    }
}
