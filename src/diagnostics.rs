//! Diagnostic tests, their results, and the per-session record of which
//! tests were completed.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::{ANATOMICAL_LR, FFR_VALIDATED_TESTS, FUNCTIONAL_LR};
use crate::constants::LikelihoodRatio;
use crate::validate::parse_test_results;

/// Non-invasive tests that can feed the post-test adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticTest {
    Ccta,
    StressEcg,
    StressEcho,
    Spect,
    Pet,
    StressCmr,
}

impl DiagnosticTest {
    pub const ALL: [DiagnosticTest; 6] = [
        Self::Ccta,
        Self::StressEcg,
        Self::StressEcho,
        Self::Spect,
        Self::Pet,
        Self::StressCmr,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::Ccta => "ccta",
            Self::StressEcg => "stress_ecg",
            Self::StressEcho => "stress_echo",
            Self::Spect => "spect",
            Self::Pet => "pet",
            Self::StressCmr => "stress_cmr",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.id() == id)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ccta => "CCTA",
            Self::StressEcg => "Str-ECG",
            Self::StressEcho => "Str-Echo",
            Self::Spect => "SPECT",
            Self::Pet => "PET",
            Self::StressCmr => "Str-CMR",
        }
    }

    /// CCTA is the only anatomical test; the rest detect ischaemia.
    pub fn is_functional(self) -> bool {
        !matches!(self, Self::Ccta)
    }

    /// Criteria that make a positive result "high event risk".
    pub fn high_risk_features(self) -> &'static str {
        match self {
            Self::Ccta => "Left main disease with ≥50% stenosis; three-vessel disease with ≥70% stenosis; two-vessel disease with ≥70% stenosis including proximal LAD; one-vessel proximal LAD disease with ≥70% stenosis and FFR-CT ≤0.8",
            Self::StressEcg => "Duke Treadmill Score < −10",
            Self::StressEcho => "≥3 of 16 segments with stress-induced hypokinesia or akinesia",
            Self::Spect | Self::Pet => "Area of ischaemia ≥10% of the LV myocardium",
            Self::StressCmr => "≥2 of 16 segments with stress perfusion defects or ≥3 dobutamine-induced dysfunctional segments",
        }
    }
}

impl fmt::Display for DiagnosticTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Result of one test.
///
/// `NonDiagnostic` is only reachable through the typed API; form payloads
/// carry `Positive`, `Negative` or an empty string (see `validate`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TestResult {
    #[default]
    #[serde(rename = "")]
    Unset,
    Positive,
    Negative,
    #[serde(rename = "Non-diagnostic")]
    NonDiagnostic,
}

impl TestResult {
    /// Parse the form vocabulary: `Positive`, `Negative` or empty.
    pub fn from_form(value: &str) -> Option<Self> {
        match value {
            "" => Some(Self::Unset),
            "Positive" => Some(Self::Positive),
            "Negative" => Some(Self::Negative),
            _ => None,
        }
    }

    pub fn is_set(self) -> bool {
        !matches!(self, Self::Unset)
    }
}

/// Reference standard the likelihood ratios were measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceStandard {
    /// Invasive coronary angiography.
    #[default]
    Anatomical,
    /// FFR/iFR pressure wire.
    Functional,
}

impl ReferenceStandard {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "anatomical" => Some(Self::Anatomical),
            "functional" => Some(Self::Functional),
            _ => None,
        }
    }

    /// LR pair for `test`, `None` when the test has no validated LR here.
    pub fn likelihood_ratio(self, test: DiagnosticTest) -> Option<LikelihoodRatio> {
        let table: &[(DiagnosticTest, LikelihoodRatio)] = match self {
            Self::Anatomical => &ANATOMICAL_LR,
            Self::Functional => &FUNCTIONAL_LR,
        };
        table.iter().find(|(t, _)| *t == test).map(|(_, lr)| *lr)
    }

    /// Tests whose results are valid under this standard.
    pub fn accepts(self, test: DiagnosticTest) -> bool {
        self.likelihood_ratio(test).is_some()
    }
}

/// Completion flag and result for one test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TestEntry {
    pub completed: bool,
    pub result: TestResult,
}

/// Per-test completion and result record.
///
/// A result only counts while the test is marked completed; un-marking a
/// test clears its result. Serialized as a map keyed by test id, e.g.
/// `{"ccta": {"completed": true, "result": "Positive"}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<DiagnosticTest, TestEntry>",
    into = "BTreeMap<DiagnosticTest, TestEntry>"
)]
pub struct TestRecord {
    entries: [TestEntry; 6],
}

impl From<BTreeMap<DiagnosticTest, TestEntry>> for TestRecord {
    /// Entries not marked completed are dropped along with their result.
    fn from(map: BTreeMap<DiagnosticTest, TestEntry>) -> Self {
        let mut rec = Self::new();
        for (test, entry) in map.into_iter().filter(|(_, e)| e.completed) {
            rec.set_completed(test, true);
            if entry.result.is_set() {
                rec.record(test, entry.result);
            }
        }
        rec
    }
}

impl From<TestRecord> for BTreeMap<DiagnosticTest, TestEntry> {
    fn from(rec: TestRecord) -> Self {
        DiagnosticTest::ALL
            .into_iter()
            .map(|t| (t, rec.entry(t)))
            .collect()
    }
}

impl TestRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: mark `test` completed with `result`.
    pub fn with(mut self, test: DiagnosticTest, result: TestResult) -> Self {
        self.record(test, result);
        self
    }

    fn slot(test: DiagnosticTest) -> usize {
        test as usize
    }

    pub fn entry(&self, test: DiagnosticTest) -> TestEntry {
        self.entries[Self::slot(test)]
    }

    pub fn is_completed(&self, test: DiagnosticTest) -> bool {
        self.entry(test).completed
    }

    /// Result of a completed test; `Unset` for tests not completed.
    pub fn result(&self, test: DiagnosticTest) -> TestResult {
        let e = self.entry(test);
        if e.completed {
            e.result
        } else {
            TestResult::Unset
        }
    }

    /// Toggle completion. Completing defaults the result to `Negative`,
    /// un-completing clears it.
    pub fn set_completed(&mut self, test: DiagnosticTest, completed: bool) {
        let e = &mut self.entries[Self::slot(test)];
        if e.completed == completed {
            return;
        }
        e.completed = completed;
        e.result = if completed {
            TestResult::Negative
        } else {
            TestResult::Unset
        };
    }

    /// Set the result of a test. Any set result marks it completed;
    /// `Unset` un-completes it.
    pub fn record(&mut self, test: DiagnosticTest, result: TestResult) {
        let e = &mut self.entries[Self::slot(test)];
        e.completed = result.is_set();
        e.result = result;
    }

    /// Build from the form's `completedTests` (`{id: bool}`) and
    /// `testResults` (`{id: "Positive" | "Negative" | ""}`) maps. Unknown
    /// ids are dropped; a result counts only for a completed test. `None`
    /// when either payload is malformed.
    pub fn from_form(completed: &Value, results: &Value) -> Option<Self> {
        let flags = completed.as_object()?;
        let results: BTreeMap<DiagnosticTest, TestResult> =
            parse_test_results(results)?.into_iter().collect();

        let mut rec = Self::new();
        for (id, flag) in flags {
            let done = flag.as_bool()?;
            let Some(test) = DiagnosticTest::from_id(id) else {
                continue;
            };
            if !done {
                continue;
            }
            rec.set_completed(test, true);
            if let Some(&r) = results.get(&test).filter(|r| r.is_set()) {
                rec.record(test, r);
            }
        }
        Some(rec)
    }

    pub fn ccta_completed(&self) -> bool {
        self.is_completed(DiagnosticTest::Ccta)
    }

    pub fn any_functional_completed(&self) -> bool {
        DiagnosticTest::ALL
            .into_iter()
            .any(|t| t.is_functional() && self.is_completed(t))
    }

    pub fn any_completed(&self) -> bool {
        DiagnosticTest::ALL.iter().any(|&t| self.is_completed(t))
    }

    /// Completed tests with a set result, in canonical order.
    pub fn results(&self) -> Vec<(DiagnosticTest, TestResult)> {
        DiagnosticTest::ALL
            .iter()
            .map(|&t| (t, self.result(t)))
            .filter(|(_, r)| r.is_set())
            .collect()
    }

    /// Results that carry a validated LR under `reference`.
    pub fn valid_results(&self, reference: ReferenceStandard) -> Vec<(DiagnosticTest, TestResult)> {
        self.results()
            .into_iter()
            .filter(|(t, _)| reference.accepts(*t))
            .collect()
    }

    /// True when the functional standard is active but none of the
    /// FFR-validated tests has been completed.
    pub fn lacks_ffr_validated(&self, reference: ReferenceStandard) -> bool {
        reference == ReferenceStandard::Functional
            && !FFR_VALIDATED_TESTS.iter().any(|&t| self.is_completed(t))
    }
}
