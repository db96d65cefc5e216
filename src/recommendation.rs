//! Recommendation records and the guideline template table.
//!
//! Every recommendation the engine can emit is a `RecommendationKind`; its
//! display template (title, reason, performance note, guideline excerpt and
//! class/level) is fixed here, so a recommendation cannot exist without one.
//! Quotations are reproduced verbatim from the 2024 ESC CCS guideline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// ESC class of recommendation and level of evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassLevel {
    pub class: &'static str,
    pub level: &'static str,
}

impl ClassLevel {
    pub const I_A: ClassLevel = ClassLevel { class: "I", level: "A" };
    pub const I_B: ClassLevel = ClassLevel { class: "I", level: "B" };
    pub const IIA_B: ClassLevel = ClassLevel { class: "IIa", level: "B" };
}

impl fmt::Display for ClassLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Class {}, Level {}", self.class, self.level)
    }
}

pub const ICA: &str = "Invasive Coronary Angiography";
pub const ANOCA_INOCA: &str = "Consider ANOCA/INOCA";
pub const FUNCTIONAL_IMAGING_AFTER_CCTA: &str = "Non-invasive Functional Imaging";
pub const CCTA: &str = "CCTA";
pub const DEFER_TESTING: &str = "Consider Defer Testing";
pub const CCTA_OR_FUNCTIONAL: &str = "CCTA or Functional Imaging";
pub const FUNCTIONAL_IMAGING: &str = "Functional Imaging";

const HIGH_RISK_QUOTE: &str = "In individuals at high risk of adverse events (regardless of symptoms), ICA—complemented by invasive coronary pressure (FFR/iFR) when appropriate—is recommended, with the aim of refining risk stratification and improving symptoms and cardiovascular outcomes by revascularization.";

const HIGH_RISK_NOTE: &str = "Invasive coronary angiography/coronary pressure assessment is indicated if non-invasive assessment suggests high event risk—e.g. CCTA shows ≥50% left main stenosis, or ≥70% proximal LAD stenosis with single or two-vessel CAD, or ≥70% proximal three-vessel CAD—or when any stress test shows moderate to severe inducible ischaemia or when symptoms are highly suggestive of obstructive CAD.";

const ANOCA_QUOTE: &str = "In persistently symptomatic patients despite medical treatment with suspected ANOCA/INOCA (i.e. anginal symptoms with normal coronary arteries or non-obstructive lesions at non-invasive imaging) and poor quality of life, invasive coronary functional testing is recommended to identify potentially treatable endotypes and to improve symptoms and quality of life, considering patient choices and preferences.";

/// Every recommendation the engine can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    IcaHighRiskCcta,
    IcaHighRiskFunctional,
    IcaVeryHighProbability,
    IcaUncertainDiagnosis,
    AnocaAfterNegativeTesting,
    FunctionalImagingAfterCcta,
    CctaAfterNonDiagnostic,
    CctaRuleOut,
    AnocaVeryLowProbability,
    DeferTesting,
    CctaOrFunctionalImaging,
    FunctionalImaging,
}

/// Static display template of a `RecommendationKind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub test_name: &'static str,
    pub reason: &'static str,
    pub performance: &'static str,
    pub quote: &'static str,
    /// Supporting excerpt shown under the main quotation.
    pub note: Option<&'static str>,
    pub class_level: Option<ClassLevel>,
}

impl RecommendationKind {
    pub fn template(self) -> Template {
        match self {
            Self::IcaHighRiskCcta => Template {
                test_name: ICA,
                reason: "High event risk on CCTA - ≥50% left main stenosis, or ≥70% proximal LAD stenosis with single or two-vessel CAD, or ≥70% proximal three-vessel CAD",
                performance: "ICA with coronary pressure assessment",
                quote: HIGH_RISK_QUOTE,
                note: Some(HIGH_RISK_NOTE),
                class_level: Some(ClassLevel::I_A),
            },
            Self::IcaHighRiskFunctional => Template {
                test_name: ICA,
                reason: "High event risk on functional testing - moderate to severe inducible ischaemia",
                performance: "ICA with coronary pressure assessment",
                quote: HIGH_RISK_QUOTE,
                note: Some(HIGH_RISK_NOTE),
                class_level: Some(ClassLevel::I_A),
            },
            Self::IcaVeryHighProbability => Template {
                test_name: ICA,
                reason: "Very high pre-test probability",
                performance: "Direct referral for invasive testing with FFR capability",
                quote: "In individuals at high risk of adverse events (regardless of symptoms), ICA—complemented by invasive coronary pressure (FFR/iFR) when appropriate—is recommended.",
                note: None,
                class_level: Some(ClassLevel::I_A),
            },
            Self::IcaUncertainDiagnosis => Template {
                test_name: ICA,
                reason: "Uncertain diagnosis after non-invasive testing",
                performance: "ICA with FFR capability",
                quote: "Invasive coronary angiography with the availability of invasive functional assessments is recommended to confirm or exclude the diagnosis of obstructive CAD or ANOCA/INOCA in individuals with an uncertain diagnosis on non-invasive testing.",
                note: None,
                class_level: Some(ClassLevel::I_B),
            },
            Self::AnocaAfterNegativeTesting => Template {
                test_name: ANOCA_INOCA,
                reason: "Obstructive CAD excluded but symptoms persist",
                performance: "Consider invasive coronary functional testing to assess for microvascular or vasospastic disease if appropriate",
                quote: ANOCA_QUOTE,
                note: None,
                class_level: Some(ClassLevel::I_B),
            },
            Self::FunctionalImagingAfterCcta => Template {
                test_name: FUNCTIONAL_IMAGING_AFTER_CCTA,
                reason: "CAD of uncertain functional significance on CCTA",
                performance: "Functional testing recommended",
                quote: "Functional imaging for myocardial ischaemia is recommended if CCTA has shown CAD of uncertain functional significance or is not diagnostic.",
                note: None,
                class_level: Some(ClassLevel::I_B),
            },
            Self::CctaAfterNonDiagnostic => Template {
                test_name: CCTA,
                reason: "Non-diagnostic functional test",
                performance: "CCTA recommended when functional test is non-diagnostic",
                quote: "CCTA is recommended in individuals with low or moderate (>5%–50%) pre-test likelihood if functional imaging for myocardial ischaemia is not diagnostic.",
                note: None,
                class_level: Some(ClassLevel::I_B),
            },
            Self::CctaRuleOut => Template {
                test_name: CCTA,
                reason: "Rule out obstructive CAD in appropriate PTP range",
                performance: "CCTA recommended to confirm absence of obstructive CAD",
                quote: "To rule out obstructive CAD in individuals with low or moderate (>5%–50%) pre-test likelihood, CCTA is recommended as the preferred diagnostic modality.",
                note: None,
                class_level: Some(ClassLevel::I_B),
            },
            Self::AnocaVeryLowProbability => Template {
                test_name: ANOCA_INOCA,
                reason: "Negative functional tests with very low PTP suggests non-obstructive cause",
                performance: "Consider invasive coronary functional testing to assess for microvascular or vasospastic disease",
                quote: ANOCA_QUOTE,
                note: None,
                class_level: Some(ClassLevel::I_B),
            },
            Self::DeferTesting => Template {
                test_name: DEFER_TESTING,
                reason: "Very low pre-test probability",
                performance: "Risk of false positives exceeds benefit",
                quote: "In individuals with a very low (≤5%) pre-test likelihood of obstructive CAD, deferral of further diagnostic tests should be considered.",
                note: None,
                class_level: Some(ClassLevel::IIA_B),
            },
            Self::CctaOrFunctionalImaging => Template {
                test_name: CCTA_OR_FUNCTIONAL,
                reason: "Low or moderate pre-test probability",
                performance: "Either modality appropriate",
                quote: "In symptomatic patients in whom the pre-test likelihood of obstructive CAD is >5%, CCTA or non-invasive functional imaging for myocardial ischaemia is recommended as the initial diagnostic test.",
                note: None,
                class_level: Some(ClassLevel::I_B),
            },
            Self::FunctionalImaging => Template {
                test_name: FUNCTIONAL_IMAGING,
                reason: "High pre-test probability",
                performance: "Functional imaging preferred",
                quote: "In individuals with suspected CCS and moderate or high (>15%–85%) pre-test likelihood of obstructive CAD, stress imaging is recommended to diagnose myocardial ischaemia and estimate the risk of MACE.",
                note: None,
                class_level: Some(ClassLevel::I_B),
            },
        }
    }

    /// Whether this kind short-circuits on a high-risk test finding.
    pub fn is_high_risk(self) -> bool {
        matches!(self, Self::IcaHighRiskCcta | Self::IcaHighRiskFunctional)
    }
}

/// One ranked recommendation card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub test_name: &'static str,
    pub reason: &'static str,
    pub performance_note: &'static str,
    pub guideline_quote: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guideline_note: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_level: Option<ClassLevel>,
}

impl From<RecommendationKind> for Recommendation {
    fn from(kind: RecommendationKind) -> Self {
        let t = kind.template();
        Self {
            kind,
            test_name: t.test_name,
            reason: t.reason,
            performance_note: t.performance,
            guideline_quote: t.quote,
            guideline_note: t.note,
            class_level: t.class_level,
        }
    }
}

impl Recommendation {
    /// Markdown card as shown by the presentation layer.
    pub fn to_markdown(&self) -> String {
        let mut out = format!("### {}\n\n", self.test_name);
        if let Some(cl) = self.class_level {
            out.push_str(&format!("**ESC Guideline Recommendation ({cl}):**\n\n"));
        }
        out.push_str(&format!("*\"{}\"*\n\n", self.guideline_quote));
        if let Some(note) = self.guideline_note {
            out.push_str(&format!("> {note}\n\n"));
        }
        out.push_str(&format!("**Reason:** {}\n\n", self.reason));
        out.push_str(&format!("**Performance:** {}", self.performance_note));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_risk_cards_share_quote_and_class() {
        let a = Recommendation::from(RecommendationKind::IcaHighRiskCcta);
        let b = Recommendation::from(RecommendationKind::IcaHighRiskFunctional);
        assert_eq!(a.test_name, ICA);
        assert_eq!(a.guideline_quote, b.guideline_quote);
        assert_eq!(a.class_level, Some(ClassLevel::I_A));
        assert!(a.guideline_note.is_some());
        assert_ne!(a.reason, b.reason);
    }

    #[test]
    fn defer_testing_is_class_iia() {
        let r = Recommendation::from(RecommendationKind::DeferTesting);
        assert_eq!(r.class_level, Some(ClassLevel::IIA_B));
        assert!(r.guideline_quote.contains("very low (≤5%)"));
    }

    #[test]
    fn markdown_card_layout() {
        let md = Recommendation::from(RecommendationKind::CctaRuleOut).to_markdown();
        assert!(md.starts_with("### CCTA\n"));
        assert!(md.contains("**ESC Guideline Recommendation (Class I, Level B):**"));
        assert!(md.contains("*\"To rule out obstructive CAD"));
        assert!(md.ends_with("**Performance:** CCTA recommended to confirm absence of obstructive CAD"));
    }

    #[test]
    fn serializes_kind_in_snake_case() {
        let v = serde_json::to_value(Recommendation::from(RecommendationKind::FunctionalImaging)).unwrap();
        assert_eq!(v["kind"], serde_json::json!("functional_imaging"));
        assert_eq!(v["class_level"]["class"], serde_json::json!("I"));
        assert!(v.get("guideline_note").is_none());
    }
}
