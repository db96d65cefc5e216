// src/lib.rs
//! # CADence
//! Pre-test probability of obstructive coronary artery disease per the 2024
//! ESC Chronic Coronary Syndromes guideline, and the guideline-referenced
//! diagnostic recommendation that follows from it.
//!
//! Pipeline: validated inputs → RF-CL → (manual override) → CACS-CL →
//! post-test likelihood → recommendation engine. Every stage is pure and
//! stays inspectable through [`Assessment`].

pub mod assessment;
pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod engine;
pub mod models;
pub mod patient;
pub mod recommendation;
pub mod session;
pub mod telemetry;
pub mod validate;

// ---- Re-exports for stable public API ----
pub use crate::assessment::{Assessment, AssessmentInput, ProbabilityStage, ScoreKind, StageKind};
pub use crate::config::Settings;
pub use crate::diagnostics::{DiagnosticTest, ReferenceStandard, TestRecord, TestResult};
pub use crate::engine::{recommend, recommend_with, Thresholds};
pub use crate::models::{adjust_for_test_results, compute_cacs_cl, compute_rf_cl};
pub use crate::patient::{PatientProfile, PrimarySymptom, RiskFactor, RiskFactorSet, Sex, SymptomCategory};
pub use crate::recommendation::{ClassLevel, Recommendation, RecommendationKind};
pub use crate::session::{Evaluation, Session};
pub use crate::validate::Validation;
