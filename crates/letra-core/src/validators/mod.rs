//! Lyric validators.
//!
//! Each validator is a pure `validate(&Lyric, &GenreConfig) -> ValidationReport`
//! over verse lines (see [`crate::domain::classify`]). [`validate_all`] runs
//! them in a fixed order; only word integrity is hard.

pub mod chorus;
pub mod completeness;
pub mod repetition;
pub mod shape;
pub mod spacing;
pub mod syllable_compliance;
pub mod word_integrity;

use crate::domain::{GenreConfig, Lyric, Severity, ValidationReport};

pub use chorus::{analyze as analyze_chorus, ChorusAnalysis};
pub use completeness::{complete_verses, incompleteness_reason, VerseCompleter};
pub use repetition::{collapse_repetitions, find_repetition};
pub use spacing::{normalize_line, normalize_spaces};

type ValidateFn = fn(&Lyric, &GenreConfig) -> ValidationReport;

const VALIDATORS: &[ValidateFn] = &[
    word_integrity::validate,
    repetition::validate,
    completeness::validate,
    spacing::validate,
    shape::validate,
    syllable_compliance::validate,
    chorus::validate,
];

/// Run every validator, in a fixed order.
pub fn validate_all(lyric: &Lyric, genre: &GenreConfig) -> Vec<ValidationReport> {
    VALIDATORS.iter().map(|v| v(lyric, genre)).collect()
}

/// Whether any hard validator failed.
pub fn has_hard_failure(reports: &[ValidationReport]) -> bool {
    reports.iter().any(|r| r.kind.is_hard() && !r.is_valid)
}

/// `"<validator> linha N: reason"` for every error of a hard validator.
pub fn hard_failure_reasons(reports: &[ValidationReport]) -> Vec<String> {
    reports
        .iter()
        .filter(|r| r.kind.is_hard())
        .flat_map(|r| {
            r.violations
                .iter()
                .filter(|v| v.severity == Severity::Error)
                .map(move |v| format!("{} linha {}: {}", r.kind, v.line, v.reason))
        })
        .collect()
}

/// Whether every report is free of errors.
pub fn all_valid(reports: &[ValidationReport]) -> bool {
    reports.iter().all(|r| r.is_valid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValidatorKind;

    #[test]
    fn test_reports_in_fixed_order() {
        let reports = validate_all(&Lyric::parse("Vem dançar comigo agora"), &GenreConfig::default());
        let kinds: Vec<ValidatorKind> = reports.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ValidatorKind::WordIntegrity,
                ValidatorKind::Repetition,
                ValidatorKind::Completeness,
                ValidatorKind::Spacing,
                ValidatorKind::SectionShape,
                ValidatorKind::SyllableCompliance,
                ValidatorKind::Chorus,
            ]
        );
    }

    #[test]
    fn test_hard_failure_only_from_word_integrity() {
        let soft = validate_all(&Lyric::parse("o sol o sol"), &GenreConfig::default());
        assert!(!all_valid(&soft));
        assert!(!has_hard_failure(&soft));

        let hard = validate_all(&Lyric::parse("Meu coraç bate forte"), &GenreConfig::default());
        assert!(has_hard_failure(&hard));
        let reasons = hard_failure_reasons(&hard);
        assert_eq!(reasons.len(), 1);
        assert!(reasons[0].starts_with("word_integrity linha 1"));
    }
}
