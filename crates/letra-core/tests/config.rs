use std::io::Write;

use letra_core::domain::{LineCountRule, SectionKind, SectionRule, SectionShape};
use letra_core::{
    GenreConfig, LetraConfig, LetraError, Orchestrator, OrchestratorConfig, SyllableBudget,
};

#[test]
fn defaults_round_trip_through_toml() {
    let config = LetraConfig::default();
    let text = config.to_toml_string().expect("serialize");
    let parsed = LetraConfig::from_toml_str(&text).expect("parse");
    assert_eq!(parsed, config);
}

#[test]
fn custom_genre_round_trips_through_toml() {
    let shape = SectionShape {
        rules: vec![SectionRule {
            kind: SectionKind::Chorus,
            rule: LineCountRule::OneOf { counts: vec![4] },
        }],
        unstacked_word_limit: 10,
    };
    let config = LetraConfig {
        orchestrator: OrchestratorConfig {
            desired_count: 2,
            max_attempts: Some(5),
            ..OrchestratorConfig::default()
        },
        genres: vec![GenreConfig::new("axe", SyllableBudget::new(5, 7, 9)).with_shape(shape)],
        ..LetraConfig::default()
    };
    let text = config.to_toml_string().expect("serialize");
    let parsed = LetraConfig::from_toml_str(&text).expect("parse");
    assert_eq!(parsed, config);
    assert_eq!(parsed.catalog().get("Axé").shape.unstacked_word_limit, 10);
}

#[test]
fn loads_partial_file_from_disk() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(
        file,
        "[orchestrator]\ndesired_count = 1\nattempts_per_candidate = 4\n\n[scoring]\ncatchiness = 30.0"
    )
    .expect("write");

    let config = LetraConfig::from_file(file.path()).expect("load");
    assert_eq!(config.orchestrator.max_attempts(), 4);
    assert_eq!(config.scoring.catchiness, 30.0);
    assert_eq!(config.scoring.shape, 20.0);
    assert!(Orchestrator::new(config.orchestrator).is_ok());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = LetraConfig::from_file(dir.path().join("letra.toml")).expect_err("missing");
    assert!(matches!(err, LetraError::Io(_)));
}

#[test]
fn invalid_genre_budget_is_rejected() {
    let err = LetraConfig::from_toml_str(
        "[[genres]]\nname = \"samba\"\nbudget = { min = 9, ideal = 8, max = 12 }\n",
    )
    .expect_err("min above ideal");
    assert!(matches!(err, LetraError::InvalidConfig(_)));
}

#[test]
fn max_attempts_below_desired_is_rejected() {
    let err = LetraConfig::from_toml_str("[orchestrator]\ndesired_count = 3\nmax_attempts = 2\n")
        .expect_err("budget too small");
    assert!(err.to_string().contains("max_attempts"));
}
