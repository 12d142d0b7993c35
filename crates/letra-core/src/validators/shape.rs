//! Section-shape validator.
//!
//! Counts the verse lines of each section against the genre's
//! [`LineCountRule`](crate::domain::LineCountRule) for its kind, and flags
//! "un-stacked" lines: two verses fused onto one physical line.

use crate::domain::{
    GenreConfig, Lyric, Section, ValidationReport, ValidatorKind, Violation, ViolationDetail,
};
use crate::text::word_tokens;

/// Shape violation for one section, if its line count breaks the rule.
pub fn section_violation(lyric: &Lyric, section: &Section, genre: &GenreConfig) -> Option<Violation> {
    let rule = genre.shape.rule_for(section.kind)?;
    let found = lyric.section_verse_indices(section).len();
    let mismatch = rule.check(found)?;
    let reason = format!(
        "{} deve ter {} (encontradas {found})",
        section.kind.label_pt(),
        mismatch.expected
    );
    Some(
        Violation::error(section.header_index, &lyric.lines()[section.header_index], reason)
            .with_severity(mismatch.severity)
            .with_detail(ViolationDetail::Shape {
                section: section.kind,
                found,
                expected: mismatch.expected,
            }),
    )
}

/// Whether a line carries more words than one sung verse should.
pub fn is_unstacked(line: &str, genre: &GenreConfig) -> bool {
    word_tokens(line).len() > genre.shape.unstacked_word_limit
}

pub fn validate(lyric: &Lyric, genre: &GenreConfig) -> ValidationReport {
    let mut violations: Vec<Violation> = lyric
        .sections()
        .iter()
        .filter_map(|s| section_violation(lyric, s, genre))
        .collect();

    let limit = genre.shape.unstacked_word_limit;
    for (index, line) in lyric.verse_lines() {
        let words = word_tokens(line).len();
        if words > limit {
            violations.push(
                Violation::error(
                    index,
                    line,
                    format!("verso com {words} palavras (limite {limit}): dois versos na mesma linha"),
                )
                .with_detail(ViolationDetail::Unstacked { words, limit }),
            );
        }
    }

    violations.sort_by_key(|v| v.line);
    ValidationReport::new(ValidatorKind::SectionShape, violations)
}
