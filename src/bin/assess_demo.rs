//! Demo that walks one patient through the pipeline and prints each step as JSON.

use cadence::config::load_settings_default;
use cadence::telemetry::init_tracing;
use cadence::{DiagnosticTest, PrimarySymptom, RiskFactor, Session, TestResult};
use tracing::{info, warn};

fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; picks up CADENCE_DEV_LOG / CADENCE_CONFIG_PATH.
    let _ = dotenvy::dotenv();
    init_tracing();

    let settings = load_settings_default().unwrap_or_else(|e| {
        warn!(error = ?e, "settings not loaded; using guideline defaults");
        *cadence::Settings::defaults()
    });

    let mut session = Session::new(settings);
    print_step("baseline", &session)?;

    session.set_primary_symptom(PrimarySymptom::Dyspnoea { exertional: true });
    print_step("exertional dyspnoea", &session)?;

    session.set_risk_factor(RiskFactor::Hypertension, true);
    session.set_risk_factor(RiskFactor::Dyslipidemia, true);
    print_step("risk factors", &session)?;

    session.set_agatston(Some(180));
    print_step("calcium score", &session)?;

    session.set_test_completed(DiagnosticTest::Ccta, true);
    session.set_test_result(DiagnosticTest::Ccta, TestResult::Negative);
    print_step("negative CCTA", &session)?;

    session.set_test_completed(DiagnosticTest::Pet, true);
    session.set_test_result(DiagnosticTest::Pet, TestResult::Positive);
    print_step("positive PET", &session)?;

    info!("assess-demo done");
    Ok(())
}

fn print_step(step: &str, session: &Session) -> anyhow::Result<()> {
    let input = session.input();
    let e = session.evaluate();

    println!("== {step}: {} {:.1}%", e.basis, e.probability);
    println!(
        "   {} yrs, {:?} ({}), {}",
        input.profile.age,
        session.primary_symptom(),
        input.profile.symptoms.label(),
        risk_factor_labels(session)
    );
    let tests: Vec<String> = DiagnosticTest::ALL
        .into_iter()
        .filter(|&t| input.tests.is_completed(t))
        .map(|t| format!("{} {:?}", t.label(), input.tests.result(t)))
        .collect();
    if !tests.is_empty() {
        println!("   tests: {}", tests.join(", "));
    }

    for r in &e.recommendations {
        println!("{}\n", r.to_markdown());
        if r.kind.is_high_risk() {
            for t in DiagnosticTest::ALL
                .into_iter()
                .filter(|&t| input.tests.result(t) == TestResult::Positive)
            {
                println!("   high-risk criteria ({}): {}", t.label(), t.high_risk_features());
            }
        }
    }
    println!("{}", serde_json::to_string_pretty(&e.assessment.stages())?);
    Ok(())
}

fn risk_factor_labels(session: &Session) -> String {
    let present: Vec<&str> = RiskFactor::ALL
        .into_iter()
        .filter(|&f| session.input().risk_factors.has(f))
        .map(RiskFactor::label)
        .collect();
    if present.is_empty() {
        "no risk factors".to_string()
    } else {
        present.join(", ")
    }
}
