//! # RF-CL
//! Risk-factor-weighted clinical likelihood of obstructive CAD
//! (Winther et al. 2020): logistic regression over sex, age, symptom class
//! and the bucketed risk-factor count, with four two-way interactions.

use tracing::warn;

use super::clamp_percent;
use crate::constants::{RF_CL, VALIDATED_AGE_RANGE};
use crate::patient::{RiskFactorSet, Sex, SymptomCategory};

/// Linear predictor of the RF-CL model.
pub fn rf_cl_logit(age: u32, sex: Sex, symptoms: SymptomCategory, risk_factors: &RiskFactorSet) -> f64 {
    let c = &RF_CL;
    let age = f64::from(age);
    let sex = f64::from(sex.binary());
    let typical = indicator(symptoms == SymptomCategory::Typical);
    let non_anginal = indicator(symptoms == SymptomCategory::NonAnginal);
    let nb_rf = f64::from(risk_factors.nb_rf());

    c.intercept
        + c.sex * sex
        + c.age * age
        + c.typical * typical
        + c.non_anginal * non_anginal
        + c.nb_rf * nb_rf
        + c.age_typical * age * typical
        + c.age_nb_rf * age * nb_rf
        + c.typical_nb_rf * typical * nb_rf
        + c.sex_nb_rf * sex * nb_rf
}

/// RF-CL as a percentage in `[0, 100]`.
///
/// Never rejects an age; ages outside the validated 30–79 band only log a
/// warning.
pub fn compute_rf_cl(age: u32, sex: Sex, symptoms: SymptomCategory, risk_factors: &RiskFactorSet) -> f64 {
    let (lo, hi) = VALIDATED_AGE_RANGE;
    if !(lo..=hi).contains(&age) {
        warn!(target: "cadence::models", "age outside validated range {lo}-{hi}; RF-CL extrapolated");
    }

    let logit = rf_cl_logit(age, sex, symptoms, risk_factors);
    let p = 1.0 / (1.0 + (-logit).exp());
    clamp_percent(p * 100.0)
}

fn indicator(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::RiskFactor;

    #[test]
    fn typical_male_55_without_risk_factors() {
        let p = compute_rf_cl(55, Sex::Male, SymptomCategory::Typical, &RiskFactorSet::default());
        assert!((p - 21.35).abs() < 0.05, "got {p}");
    }

    #[test]
    fn equal_counts_give_equal_output() {
        let a = RiskFactorSet::default()
            .with(RiskFactor::Diabetes)
            .with(RiskFactor::Smoking);
        let b = RiskFactorSet::default()
            .with(RiskFactor::Hypertension)
            .with(RiskFactor::FamilyHistory);
        let pa = compute_rf_cl(62, Sex::Female, SymptomCategory::Atypical, &a);
        let pb = compute_rf_cl(62, Sex::Female, SymptomCategory::Atypical, &b);
        assert_eq!(pa.to_bits(), pb.to_bits());
    }

    #[test]
    fn counts_within_one_bucket_are_indistinguishable() {
        let one = RiskFactorSet::default().with(RiskFactor::Smoking);
        let zero = RiskFactorSet::default();
        let p0 = compute_rf_cl(48, Sex::Male, SymptomCategory::NonAnginal, &zero);
        let p1 = compute_rf_cl(48, Sex::Male, SymptomCategory::NonAnginal, &one);
        assert_eq!(p0.to_bits(), p1.to_bits());
    }

    #[test]
    fn out_of_band_ages_still_compute() {
        for age in [18, 25, 85, 100] {
            let p = compute_rf_cl(age, Sex::Female, SymptomCategory::Typical, &RiskFactorSet::default());
            assert!((0.0..=100.0).contains(&p));
        }
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let rf = RiskFactorSet::default().with(RiskFactor::Dyslipidemia);
        let a = compute_rf_cl(70, Sex::Male, SymptomCategory::Typical, &rf);
        let b = compute_rf_cl(70, Sex::Male, SymptomCategory::Typical, &rf);
        assert_eq!(a.to_bits(), b.to_bits());
    }
}
