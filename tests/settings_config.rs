// tests/settings_config.rs
use cadence::config::load_settings_from;
use cadence::{recommend_with, DiagnosticTest, ReferenceStandard, RecommendationKind, TestRecord, TestResult};
use std::fs;

#[test]
fn toml_and_json_settings_files() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("cadence.toml");
    fs::write(
        &p_toml,
        r#"
reference_standard = "functional"

[thresholds]
defer_max = 15.0
"#,
    )
    .unwrap();
    let s = load_settings_from(&p_toml).unwrap();
    assert_eq!(s.reference_standard, ReferenceStandard::Functional);
    assert_eq!(s.thresholds.defer_max, 15.0);
    assert_eq!(s.thresholds.ica_min, 85.0);

    // Looser deferral cut-off shifts the tier
    let tests = TestRecord::new();
    let r = recommend_with(12.0, &tests, &s.thresholds);
    assert_eq!(r[0].kind, RecommendationKind::DeferTesting);

    let p_json = dir.path().join("cadence.json");
    fs::write(&p_json, r#"{"thresholds":{"rule_out_max":40.0}}"#).unwrap();
    let s = load_settings_from(&p_json).unwrap();
    let tests = TestRecord::new().with(DiagnosticTest::Spect, TestResult::Negative);
    assert!(recommend_with(45.0, &tests, &s.thresholds).is_empty());
}

#[test]
fn invalid_settings_report_path() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("broken.toml");
    fs::write(&p, "[thresholds]\nica_min = 120.0\n").unwrap();
    let err = load_settings_from(&p).unwrap_err();
    assert!(format!("{err:#}").contains("broken.toml"));

    assert!(load_settings_from(&dir.path().join("absent.toml")).is_err());
}
