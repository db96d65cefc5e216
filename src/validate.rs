//! Input guards for form payloads.
//!
//! Every check returns a `Validation` (valid flag + optional message) instead
//! of an error: the caller decides whether to block or just warn. A valid
//! result may still carry a message, which is then a soft warning.

use serde::Serialize;
use serde_json::Value;

use crate::constants::{MAX_AGE, MIN_AGE, VALIDATED_AGE_RANGE};
use crate::diagnostics::{DiagnosticTest, ReferenceStandard, TestResult};
use crate::patient::{RiskFactor, RiskFactorSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Validation {
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            valid: true,
            message: Some(message.into()),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
        }
    }

    /// Valid but carrying a message.
    pub fn is_warning(&self) -> bool {
        self.valid && self.message.is_some()
    }
}

/// Age must lie in `[18, 100]`; outside 30–79 it is valid with a warning.
pub fn validate_age(age: i64) -> Validation {
    if !(i64::from(MIN_AGE)..=i64::from(MAX_AGE)).contains(&age) {
        return Validation::invalid(format!("Age must be between {MIN_AGE} and {MAX_AGE}"));
    }
    let (lo, hi) = VALIDATED_AGE_RANGE;
    if !(i64::from(lo)..=i64::from(hi)).contains(&age) {
        return Validation::warning(format!(
            "The risk models were validated for ages {lo}-{hi}. Results outside this range should be interpreted with caution."
        ));
    }
    Validation::ok()
}

/// The payload must be an object holding all five risk-factor keys, with
/// boolean values throughout.
pub fn validate_risk_factors(payload: &Value) -> Validation {
    let Some(map) = payload.as_object() else {
        return Validation::invalid("Risk factors must be an object");
    };
    if !RiskFactor::ALL.iter().all(|f| map.contains_key(f.key())) {
        return Validation::invalid("Missing required risk factors");
    }
    if !map.values().all(Value::is_boolean) {
        return Validation::invalid("Risk factor values must be boolean");
    }
    Validation::ok()
}

/// Results must use the form vocabulary (`Positive`, `Negative`, empty) and
/// the reference standard must be `anatomical` or `functional`.
pub fn validate_test_results(payload: &Value, reference: &str) -> Validation {
    let Some(map) = payload.as_object() else {
        return Validation::invalid("Test results must be an object");
    };
    let vocabulary_ok = map
        .values()
        .all(|v| v.as_str().and_then(TestResult::from_form).is_some());
    if !vocabulary_ok {
        return Validation::invalid("Invalid test result value");
    }
    if ReferenceStandard::parse(reference).is_none() {
        return Validation::invalid("Invalid reference standard");
    }
    Validation::ok()
}

/// Parse a risk-factor payload that passed `validate_risk_factors`.
pub fn parse_risk_factors(payload: &Value) -> Option<RiskFactorSet> {
    if !validate_risk_factors(payload).valid {
        return None;
    }
    let mut set = RiskFactorSet::default();
    for f in RiskFactor::ALL {
        set.set(f, payload[f.key()].as_bool()?);
    }
    Some(set)
}

/// Parse a results payload that passed `validate_test_results`. Unknown
/// test identifiers are dropped.
pub fn parse_test_results(payload: &Value) -> Option<Vec<(DiagnosticTest, TestResult)>> {
    let map = payload.as_object()?;
    let mut out = Vec::with_capacity(map.len());
    for (id, v) in map {
        let result = TestResult::from_form(v.as_str()?)?;
        if let Some(test) = DiagnosticTest::from_id(id) {
            out.push((test, result));
        }
    }
    out.sort_by_key(|(t, _)| *t);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn age_bounds_and_soft_band() {
        assert!(!validate_age(17).valid);
        assert!(!validate_age(101).valid);
        assert_eq!(validate_age(55), Validation::ok());
        assert!(validate_age(18).is_warning());
        assert!(validate_age(80).is_warning());
        assert!(!validate_age(30).is_warning());
        assert!(!validate_age(79).is_warning());
    }

    #[test]
    fn risk_factor_payload_shape() {
        let full = json!({
            "diabetes": true, "smoking": false, "hypertension": false,
            "dyslipidemia": true, "family_history": false
        });
        assert!(validate_risk_factors(&full).valid);
        assert_eq!(parse_risk_factors(&full).map(|s| s.count()), Some(2));

        let missing = json!({"diabetes": true});
        let v = validate_risk_factors(&missing);
        assert!(!v.valid);
        assert_eq!(v.message.as_deref(), Some("Missing required risk factors"));

        let non_bool = json!({
            "diabetes": 1, "smoking": false, "hypertension": false,
            "dyslipidemia": true, "family_history": false
        });
        assert_eq!(
            validate_risk_factors(&non_bool).message.as_deref(),
            Some("Risk factor values must be boolean")
        );
    }

    #[test]
    fn test_result_vocabulary_and_reference() {
        let ok = json!({"ccta": "Positive", "pet": "", "spect": "Negative"});
        assert!(validate_test_results(&ok, "anatomical").valid);
        assert!(!validate_test_results(&ok, "ffr").valid);

        let bad = json!({"ccta": "Non-diagnostic"});
        assert_eq!(
            validate_test_results(&bad, "functional").message.as_deref(),
            Some("Invalid test result value")
        );
    }

    #[test]
    fn parse_drops_unknown_ids() {
        let payload = json!({"pet": "Positive", "ica": "Negative", "ccta": ""});
        let parsed = parse_test_results(&payload).unwrap();
        assert_eq!(
            parsed,
            vec![
                (DiagnosticTest::Ccta, TestResult::Unset),
                (DiagnosticTest::Pet, TestResult::Positive)
            ]
        );
    }
}
