//! Unified validation report.
//!
//! Every validator returns a [`ValidationReport`] tagged with its
//! [`ValidatorKind`]; validator-specific data lives in [`ViolationDetail`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::lyric::SectionKind;

/// Severity level for a violation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// Which validator produced a report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ValidatorKind {
    WordIntegrity,
    Repetition,
    Completeness,
    Spacing,
    SectionShape,
    SyllableCompliance,
    Chorus,
}

impl ValidatorKind {
    /// Hard validators disqualify a candidate regardless of score.
    pub fn is_hard(self) -> bool {
        matches!(self, Self::WordIntegrity)
    }
}

impl fmt::Display for ValidatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::WordIntegrity => "word_integrity",
            Self::Repetition => "repetition",
            Self::Completeness => "completeness",
            Self::Spacing => "spacing",
            Self::SectionShape => "section_shape",
            Self::SyllableCompliance => "syllable_compliance",
            Self::Chorus => "chorus",
        };
        f.write_str(s)
    }
}

/// Validator-specific payload attached to a violation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViolationDetail {
    Truncation {
        fragment: String,
        suggestion: Option<String>,
    },
    Repetition {
        phrase: String,
    },
    Incomplete {
        last_word: Option<String>,
    },
    Spacing {
        normalized: String,
    },
    Shape {
        section: SectionKind,
        found: usize,
        expected: String,
    },
    Unstacked {
        words: usize,
        limit: usize,
    },
    Syllables {
        syllables: usize,
        excess: usize,
        suggestions: Vec<String>,
    },
    Chorus {
        pattern: Option<String>,
    },
}

/// One finding: where, what, and why.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Violation {
    /// 1-based physical line number; 0 refers to the lyric as a whole.
    pub line: usize,
    /// Offending text (the whole line, or the section header).
    pub text: String,
    /// Human-readable reason, in Portuguese.
    pub reason: String,
    pub severity: Severity,
    pub detail: Option<ViolationDetail>,
}

impl Violation {
    /// Create an error-severity violation for 0-based line `index`.
    pub fn error(index: usize, text: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            line: index + 1,
            text: text.into(),
            reason: reason.into(),
            severity: Severity::Error,
            detail: None,
        }
    }

    /// Create a warning-severity violation for 0-based line `index`.
    pub fn warning(index: usize, text: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(index, text, reason)
        }
    }

    /// Violation about the lyric as a whole (line 0).
    pub fn global(reason: impl Into<String>) -> Self {
        Self {
            line: 0,
            text: String::new(),
            reason: reason.into(),
            severity: Severity::Error,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: ViolationDetail) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

/// Outcome of one validator over a full lyric.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationReport {
    pub kind: ValidatorKind,
    /// False iff at least one error-severity violation exists.
    pub is_valid: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Build a report, deriving `is_valid` from the violations.
    pub fn new(kind: ValidatorKind, violations: Vec<Violation>) -> Self {
        let is_valid = !violations.iter().any(|v| v.severity == Severity::Error);
        Self {
            kind,
            is_valid,
            violations,
        }
    }

    /// Number of error-severity violations.
    pub fn error_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
            .count()
    }

    /// Distinct 1-based line numbers carrying an error.
    pub fn error_lines(&self) -> Vec<usize> {
        let mut lines: Vec<usize> = self
            .violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
            .map(|v| v.line)
            .collect();
        lines.sort_unstable();
        lines.dedup();
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity_follows_severity() {
        let warn_only = ValidationReport::new(
            ValidatorKind::SectionShape,
            vec![Violation::warning(3, "x", "longo demais")],
        );
        assert!(warn_only.is_valid);
        assert_eq!(warn_only.error_count(), 0);

        let with_error = ValidationReport::new(
            ValidatorKind::SectionShape,
            vec![Violation::error(3, "x", "curto demais")],
        );
        assert!(!with_error.is_valid);
        assert_eq!(with_error.violations[0].line, 4);
    }

    #[test]
    fn test_only_word_integrity_is_hard() {
        assert!(ValidatorKind::WordIntegrity.is_hard());
        assert!(!ValidatorKind::SyllableCompliance.is_hard());
        assert!(!ValidatorKind::Chorus.is_hard());
    }

    #[test]
    fn test_report_serializes_with_kind_tag() {
        let report = ValidationReport::new(
            ValidatorKind::Repetition,
            vec![Violation::error(0, "o sol o sol", "frase repetida").with_detail(
                ViolationDetail::Repetition {
                    phrase: "o sol".to_string(),
                },
            )],
        );
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["kind"], "repetition");
        assert_eq!(json["violations"][0]["detail"]["type"], "repetition");
    }
}
