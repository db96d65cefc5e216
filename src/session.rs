//! Interactive session state.
//!
//! Holds the current form inputs and applies each user action atomically:
//! an action that changes what RF-CL is computed from also drops the manual
//! override in the same step, so a stale override is never shown next to
//! updated inputs. Evaluation itself stays a pure function of the inputs.

use serde::Serialize;
use tracing::debug;

use crate::assessment::{Assessment, AssessmentInput, ScoreKind};
use crate::config::Settings;
use crate::diagnostics::{DiagnosticTest, ReferenceStandard, TestResult};
use crate::patient::{PatientProfile, PrimarySymptom, RiskFactor, RiskFactorSet, Sex};
use crate::recommendation::Recommendation;

#[derive(Debug, Clone)]
pub struct Session {
    input: AssessmentInput,
    symptom: PrimarySymptom,
    selected: Option<ScoreKind>,
    settings: Settings,
}

/// Snapshot returned to the presentation layer after every action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub assessment: Assessment,
    /// Score the recommendations are based on.
    pub basis: ScoreKind,
    pub probability: f64,
    pub recommendations: Vec<Recommendation>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(*Settings::defaults())
    }
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        let symptom = PrimarySymptom::default();
        let input = AssessmentInput {
            profile: PatientProfile::from_selection(55, Sex::Male, symptom),
            reference_standard: settings.reference_standard,
            ..Default::default()
        };
        Self {
            input,
            symptom,
            selected: None,
            settings,
        }
    }

    pub fn input(&self) -> &AssessmentInput {
        &self.input
    }

    pub fn primary_symptom(&self) -> PrimarySymptom {
        self.symptom
    }

    pub fn manual_override(&self) -> Option<f64> {
        self.input.manual_override
    }

    fn invalidate_override(&mut self, reason: &'static str) {
        if self.input.manual_override.take().is_some() {
            debug!(target: "cadence::session", reason, "manual override cleared");
        }
    }

    pub fn set_age(&mut self, age: u32) {
        if self.input.profile.age != age {
            self.input.profile.age = age;
            self.invalidate_override("age changed");
        }
    }

    pub fn set_sex(&mut self, sex: Sex) {
        if self.input.profile.sex != sex {
            self.input.profile.sex = sex;
            self.invalidate_override("sex changed");
        }
    }

    pub fn set_primary_symptom(&mut self, symptom: PrimarySymptom) {
        if self.symptom != symptom {
            self.symptom = symptom;
            self.input.profile.symptoms = symptom.category();
            self.invalidate_override("symptoms changed");
        }
    }

    pub fn set_risk_factor(&mut self, factor: RiskFactor, present: bool) {
        if self.input.risk_factors.has(factor) != present {
            self.input.risk_factors.set(factor, present);
            self.invalidate_override("risk factors changed");
        }
    }

    pub fn set_risk_factors(&mut self, risk_factors: RiskFactorSet) {
        if self.input.risk_factors != risk_factors {
            self.input.risk_factors = risk_factors;
            self.invalidate_override("risk factors changed");
        }
    }

    /// Clinician adjustment of RF-CL, clamped to `[0, 100]`. Non-finite
    /// values are ignored.
    pub fn set_manual_override(&mut self, value: f64) {
        if value.is_finite() {
            self.input.manual_override = Some(value.clamp(0.0, 100.0));
        }
    }

    pub fn reset_manual_override(&mut self) {
        self.invalidate_override("reset");
    }

    pub fn set_agatston(&mut self, score: Option<u32>) {
        self.input.agatston = score;
    }

    pub fn set_test_completed(&mut self, test: DiagnosticTest, completed: bool) {
        self.input.tests.set_completed(test, completed);
    }

    pub fn set_test_result(&mut self, test: DiagnosticTest, result: TestResult) {
        self.input.tests.record(test, result);
    }

    pub fn set_reference_standard(&mut self, reference: ReferenceStandard) {
        self.input.reference_standard = reference;
    }

    /// Choose the score recommendations are based on; `None` follows the
    /// most refined one available.
    pub fn select_score(&mut self, score: Option<ScoreKind>) {
        self.selected = score;
    }

    pub fn evaluate(&self) -> Evaluation {
        let assessment = Assessment::evaluate(&self.input);
        let (basis, probability) = assessment.basis(self.selected);
        let recommendations = assessment.recommendations(Some(basis), &self.settings.thresholds);
        Evaluation {
            assessment,
            basis,
            probability,
            recommendations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::ChestPainCriteria;

    #[test]
    fn risk_factor_toggle_clears_override() {
        let mut s = Session::default();
        s.set_manual_override(30.0);
        assert_eq!(s.manual_override(), Some(30.0));

        s.set_risk_factor(RiskFactor::Smoking, true);
        assert_eq!(s.manual_override(), None);
        assert_eq!(s.evaluate().assessment.manual_override, None);
    }

    #[test]
    fn unchanged_inputs_keep_override() {
        let mut s = Session::default();
        s.set_manual_override(30.0);
        s.set_age(55);
        s.set_sex(Sex::Male);
        s.set_primary_symptom(PrimarySymptom::default());
        assert_eq!(s.manual_override(), Some(30.0));
    }

    #[test]
    fn symptom_change_rederives_category_and_clears_override() {
        let mut s = Session::default();
        s.set_manual_override(12.5);
        let symptom = PrimarySymptom::ChestPain(ChestPainCriteria::default());
        s.set_primary_symptom(symptom);
        assert_eq!(s.primary_symptom(), symptom);
        assert_eq!(s.manual_override(), None);
        assert_eq!(
            s.input().profile.symptoms,
            crate::patient::SymptomCategory::NonAnginal
        );
    }

    #[test]
    fn unchecking_test_drops_it_from_post_test() {
        let mut s = Session::default();
        s.set_test_completed(DiagnosticTest::Ccta, true);
        s.set_test_result(DiagnosticTest::Ccta, TestResult::Positive);
        assert!(s.evaluate().assessment.post_test.is_some());

        s.set_test_completed(DiagnosticTest::Ccta, false);
        let e = s.evaluate();
        assert!(e.assessment.post_test.is_none());
        assert_eq!(e.basis, ScoreKind::RfCl);
    }

    #[test]
    fn override_is_clamped_and_reset() {
        let mut s = Session::default();
        s.set_manual_override(-4.0);
        assert_eq!(s.manual_override(), Some(0.0));
        s.set_manual_override(f64::INFINITY);
        assert_eq!(s.manual_override(), Some(0.0));
        s.reset_manual_override();
        assert_eq!(s.manual_override(), None);
    }

    #[test]
    fn selected_score_drives_recommendation_basis() {
        let mut s = Session::default();
        s.set_manual_override(90.0);
        s.set_agatston(Some(0));
        s.select_score(Some(ScoreKind::AdjustedRfCl));
        let e = s.evaluate();
        assert_eq!(e.basis, ScoreKind::AdjustedRfCl);
        assert_eq!(e.probability, 90.0);
        assert_eq!(e.recommendations.len(), 1);
    }
}
