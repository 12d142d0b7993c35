//! Shared line classification.
//!
//! Every component decides whether a line is sung content through
//! [`classify`]. Nothing else in the crate pattern-matches brackets or
//! parentheses on its own.

use serde::{Deserialize, Serialize};

/// Structural role of one physical line of a lyric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// Empty or whitespace-only.
    Blank,
    /// Section header such as `[Refrão]`.
    Header,
    /// Instrumentation or metadata such as `(solo de viola)`.
    Directive,
    /// Sung content.
    Verse,
}

/// Classify a single line.
pub fn classify(line: &str) -> LineKind {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        LineKind::Blank
    } else if trimmed.starts_with('[') && trimmed.ends_with(']') {
        LineKind::Header
    } else if trimmed.starts_with('(') && trimmed.ends_with(')') {
        LineKind::Directive
    } else {
        LineKind::Verse
    }
}

/// Shorthand for `classify(line) == LineKind::Verse`.
pub fn is_verse(line: &str) -> bool {
    classify(line) == LineKind::Verse
}

/// Inner text of a header line, without the brackets.
pub fn header_label(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if classify(trimmed) != LineKind::Header {
        return None;
    }
    Some(trimmed[1..trimmed.len() - 1].trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_kinds() {
        assert_eq!(classify(""), LineKind::Blank);
        assert_eq!(classify("   \t"), LineKind::Blank);
        assert_eq!(classify("[Refrão]"), LineKind::Header);
        assert_eq!(classify("  [Verso 1]  "), LineKind::Header);
        assert_eq!(classify("(solo de viola)"), LineKind::Directive);
        assert_eq!(classify("Eu vou te esperar"), LineKind::Verse);
    }

    #[test]
    fn test_partial_brackets_are_verse() {
        assert_eq!(classify("[Refrão] vem comigo"), LineKind::Verse);
        assert_eq!(classify("(baixinho) te quero"), LineKind::Verse);
    }

    #[test]
    fn test_header_label() {
        assert_eq!(header_label("[ Pré-Refrão ]"), Some("Pré-Refrão"));
        assert_eq!(header_label("Refrão"), None);
    }
}
