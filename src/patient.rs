//! Patient characteristics consumed by the RF-CL model.
//!
//! The presentation layer collects raw selections (primary symptom, chest-pain
//! criteria, exertional dyspnoea flag, risk-factor pills); this module maps
//! them onto the three-way `SymptomCategory` and the five-flag `RiskFactorSet`.

use serde::{Deserialize, Serialize};

/// Biological sex as used by the Winther model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Model encoding: 1 = male, 0 = female.
    pub fn binary(self) -> u8 {
        match self {
            Self::Male => 1,
            Self::Female => 0,
        }
    }
}

/// Symptom class of the presenting complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymptomCategory {
    Typical,
    Atypical,
    NonAnginal,
}

impl SymptomCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Typical => "Typical Angina",
            Self::Atypical => "Atypical Angina",
            Self::NonAnginal => "Non-anginal Chest Pain",
        }
    }
}

/// The three classic characteristics of anginal chest pain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChestPainCriteria {
    pub substernal: bool,
    pub provoked_by_exertion: bool,
    pub relieved_by_rest: bool,
}

impl ChestPainCriteria {
    pub fn all() -> Self {
        Self {
            substernal: true,
            provoked_by_exertion: true,
            relieved_by_rest: true,
        }
    }

    pub fn count(&self) -> usize {
        [self.substernal, self.provoked_by_exertion, self.relieved_by_rest]
            .iter()
            .filter(|&&c| c)
            .count()
    }
}

/// Primary symptom as selected on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PrimarySymptom {
    ChestPain(ChestPainCriteria),
    Dyspnoea { exertional: bool },
}

impl Default for PrimarySymptom {
    fn default() -> Self {
        Self::ChestPain(ChestPainCriteria::all())
    }
}

impl PrimarySymptom {
    /// 3 criteria → typical, 2 → atypical, 0–1 → non-anginal.
    /// Exertional dyspnoea is treated as atypical angina.
    pub fn category(&self) -> SymptomCategory {
        match self {
            Self::ChestPain(c) => match c.count() {
                3 => SymptomCategory::Typical,
                2 => SymptomCategory::Atypical,
                _ => SymptomCategory::NonAnginal,
            },
            Self::Dyspnoea { exertional: true } => SymptomCategory::Atypical,
            Self::Dyspnoea { exertional: false } => SymptomCategory::NonAnginal,
        }
    }
}

/// Demographics and symptom class for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub age: u32,
    pub sex: Sex,
    pub symptoms: SymptomCategory,
}

impl PatientProfile {
    pub fn new(age: u32, sex: Sex, symptoms: SymptomCategory) -> Self {
        Self { age, sex, symptoms }
    }

    /// Build from the raw primary-symptom selection.
    pub fn from_selection(age: u32, sex: Sex, symptom: PrimarySymptom) -> Self {
        Self::new(age, sex, symptom.category())
    }
}

impl Default for PatientProfile {
    fn default() -> Self {
        Self::from_selection(55, Sex::Male, PrimarySymptom::default())
    }
}

/// The five risk factors counted by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    Diabetes,
    Smoking,
    Hypertension,
    Dyslipidemia,
    FamilyHistory,
}

impl RiskFactor {
    pub const ALL: [RiskFactor; 5] = [
        Self::Diabetes,
        Self::Smoking,
        Self::Hypertension,
        Self::Dyslipidemia,
        Self::FamilyHistory,
    ];

    /// Map key used by form payloads.
    pub fn key(self) -> &'static str {
        match self {
            Self::Diabetes => "diabetes",
            Self::Smoking => "smoking",
            Self::Hypertension => "hypertension",
            Self::Dyslipidemia => "dyslipidemia",
            Self::FamilyHistory => "family_history",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Diabetes => "Diabetes",
            Self::Smoking => "Current/Past Smoking",
            Self::Hypertension => "Hypertension",
            Self::Dyslipidemia => "Dyslipidemia",
            Self::FamilyHistory => "Family History of Early CAD",
        }
    }
}

/// Presence flags for the five risk factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RiskFactorSet {
    pub diabetes: bool,
    pub smoking: bool,
    pub hypertension: bool,
    pub dyslipidemia: bool,
    pub family_history: bool,
}

impl RiskFactorSet {
    pub fn with(mut self, factor: RiskFactor) -> Self {
        self.set(factor, true);
        self
    }

    pub fn set(&mut self, factor: RiskFactor, present: bool) {
        match factor {
            RiskFactor::Diabetes => self.diabetes = present,
            RiskFactor::Smoking => self.smoking = present,
            RiskFactor::Hypertension => self.hypertension = present,
            RiskFactor::Dyslipidemia => self.dyslipidemia = present,
            RiskFactor::FamilyHistory => self.family_history = present,
        }
    }

    pub fn has(&self, factor: RiskFactor) -> bool {
        match factor {
            RiskFactor::Diabetes => self.diabetes,
            RiskFactor::Smoking => self.smoking,
            RiskFactor::Hypertension => self.hypertension,
            RiskFactor::Dyslipidemia => self.dyslipidemia,
            RiskFactor::FamilyHistory => self.family_history,
        }
    }

    /// Number of risk factors present (0–5).
    pub fn count(&self) -> usize {
        RiskFactor::ALL.iter().filter(|&&f| self.has(f)).count()
    }

    /// Ordinal severity class used by the model: 0–1 → 1, 2–3 → 2, 4–5 → 3.
    pub fn nb_rf(&self) -> u8 {
        nb_rf_class(self.count())
    }
}

/// Bucket a risk-factor count into the Winther `nbRf` class.
pub fn nb_rf_class(count: usize) -> u8 {
    match count {
        0 | 1 => 1,
        2 | 3 => 2,
        _ => 3,
    }
}
