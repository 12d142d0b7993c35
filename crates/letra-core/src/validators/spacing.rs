//! Space normalization.

use crate::domain::{GenreConfig, Lyric, ValidationReport, ValidatorKind, Violation, ViolationDetail};

/// Punctuation that never takes a space before it.
const TIGHT_PUNCTUATION: &[char] = &[',', '.', ';', ':', '!', '?', '…'];

/// Collapse whitespace runs, drop spaces before punctuation and trim.
///
/// Idempotent: `normalize_line(&normalize_line(x)) == normalize_line(x)`.
pub fn normalize_line(line: &str) -> String {
    let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut out = String::with_capacity(collapsed.len());
    for c in collapsed.chars() {
        if TIGHT_PUNCTUATION.contains(&c) && out.ends_with(' ') {
            out.pop();
        }
        out.push(c);
    }
    out
}

/// Normalize every line of `text`, keeping the line structure.
pub fn normalize_spaces(text: &str) -> String {
    text.lines()
        .map(normalize_line)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn validate(lyric: &Lyric, _genre: &GenreConfig) -> ValidationReport {
    let violations = lyric
        .verse_lines()
        .filter_map(|(index, line)| {
            let normalized = normalize_line(line);
            (normalized != line).then(|| {
                Violation::warning(index, line, "espaçamento irregular")
                    .with_detail(ViolationDetail::Spacing { normalized })
            })
        })
        .collect();
    ValidationReport::new(ValidatorKind::Spacing, violations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_line() {
        assert_eq!(normalize_line("  Eu   vou \t embora  "), "Eu vou embora");
        assert_eq!(normalize_line("Olha , meu bem !"), "Olha, meu bem!");
        assert_eq!(normalize_line("a , , b"), "a,, b");
        assert_eq!(normalize_line(""), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for input in ["a  ,  b", " x ;y ", "Tá bom ... né ?", "   ", "[ Refrão ]"] {
            let once = normalize_spaces(input);
            assert_eq!(normalize_spaces(&once), once, "{input:?}");
        }
    }

    #[test]
    fn test_spacing_only_warns() {
        let lyric = Lyric::parse("Vem  dançar comigo agora");
        let report = validate(&lyric, &GenreConfig::default());
        assert!(report.is_valid);
        assert_eq!(report.violations.len(), 1);
    }
}
