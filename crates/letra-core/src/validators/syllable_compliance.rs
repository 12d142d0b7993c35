//! Syllable-compliance validator.
//!
//! Every verse line over `budget.max` is an error carrying its count, the
//! excess and up to three rewrites from [`suggest_rewrites`], each already
//! re-counted to fit. Lines under `budget.min` are only warned about.

use crate::domain::{GenreConfig, Lyric, ValidationReport, ValidatorKind, Violation, ViolationDetail};
use crate::rewrite::suggest_rewrites;
use crate::syllable::count_line;

pub fn validate(lyric: &Lyric, genre: &GenreConfig) -> ValidationReport {
    let budget = genre.budget;
    let mut violations = Vec::new();

    for (index, line) in lyric.verse_lines() {
        let syllables = count_line(line);
        if syllables > budget.max {
            let excess = syllables - budget.max;
            let suggestions = suggest_rewrites(line, budget.max);
            violations.push(
                Violation::error(
                    index,
                    line,
                    format!(
                        "verso com {syllables} sílabas poéticas; máximo {} (excesso de {excess})",
                        budget.max
                    ),
                )
                .with_detail(ViolationDetail::Syllables {
                    syllables,
                    excess,
                    suggestions,
                }),
            );
        } else if syllables < budget.min {
            violations.push(
                Violation::warning(
                    index,
                    line,
                    format!(
                        "verso com {syllables} sílabas poéticas; mínimo {}",
                        budget.min
                    ),
                )
                .with_detail(ViolationDetail::Syllables {
                    syllables,
                    excess: 0,
                    suggestions: Vec::new(),
                }),
            );
        }
    }

    ValidationReport::new(ValidatorKind::SyllableCompliance, violations)
}
