//! Repetition validator: adjacent duplicated phrases inside one line.
//!
//! `"o sol o sol brilha"` is a generation artifact. Matching is case- and
//! punctuation-insensitive and only looks at 2- and 3-word phrases within a
//! single line, so a chorus repeated across sections is never penalised.

use crate::domain::{GenreConfig, Lyric, ValidationReport, ValidatorKind, Violation, ViolationDetail};
use crate::text::{normalized_word, split_affixes};
use crate::validators::spacing::normalize_line;

/// Phrase lengths checked, longest first.
const PHRASE_LENGTHS: [usize; 2] = [3, 2];

/// A duplicated phrase: tokens `start..start + len` repeat immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatedPhrase {
    pub start: usize,
    pub len: usize,
    /// Normalized words of the phrase, space separated.
    pub phrase: String,
}

fn find_in_tokens(tokens: &[&str]) -> Option<RepeatedPhrase> {
    let words: Vec<String> = tokens.iter().map(|t| normalized_word(t)).collect();
    for len in PHRASE_LENGTHS {
        if tokens.len() < 2 * len {
            continue;
        }
        for start in 0..=tokens.len() - 2 * len {
            let first = &words[start..start + len];
            let second = &words[start + len..start + 2 * len];
            if first.iter().all(|w| !w.is_empty()) && first == second {
                return Some(RepeatedPhrase {
                    start,
                    len,
                    phrase: first.join(" "),
                });
            }
        }
    }
    None
}

/// First adjacent repeated phrase in `line`, if any. Token positions refer
/// to the space-normalized line.
pub fn find_repetition(line: &str) -> Option<RepeatedPhrase> {
    let normalized = normalize_line(line);
    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    find_in_tokens(&tokens)
}

/// Collapse every `phrase phrase` to a single `phrase`, keeping the first
/// occurrence. The trailing punctuation of the dropped copy moves onto the
/// kept one. Lines without repetition are returned unchanged; otherwise the
/// result is space-normalized.
pub fn collapse_repetitions(line: &str) -> String {
    let mut tokens: Vec<String> = normalize_line(line)
        .split_whitespace()
        .map(str::to_string)
        .collect();
    let mut changed = false;
    loop {
        let borrowed: Vec<&str> = tokens.iter().map(String::as_str).collect();
        let Some(rep) = find_in_tokens(&borrowed) else {
            break;
        };
        let kept_last = rep.start + rep.len - 1;
        let dropped_last = rep.start + 2 * rep.len - 1;
        let (_, _, trailing) = split_affixes(&tokens[dropped_last]);
        let trailing = trailing.to_string();
        let (leading, core, _) = split_affixes(&tokens[kept_last]);
        let merged = format!("{leading}{core}{trailing}");
        tokens[kept_last] = merged;
        tokens.drain(rep.start + rep.len..=dropped_last);
        changed = true;
    }
    if changed {
        tokens.join(" ")
    } else {
        line.to_string()
    }
}

pub fn validate(lyric: &Lyric, _genre: &GenreConfig) -> ValidationReport {
    let violations = lyric
        .verse_lines()
        .filter_map(|(index, line)| {
            find_repetition(line).map(|rep| {
                Violation::error(
                    index,
                    line,
                    format!("frase repetida em sequência: '{}'", rep.phrase),
                )
                .with_detail(ViolationDetail::Repetition { phrase: rep.phrase })
            })
        })
        .collect();
    ValidationReport::new(ValidatorKind::Repetition, violations)
}
