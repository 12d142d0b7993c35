//! Verse-completeness validator.
//!
//! A verse line is incomplete when it is too short, ends on a closed-class
//! word (preposition, article, possessive, conjunction) or ends on
//! punctuation that implies continuation. The reason string is also the
//! instruction handed to an external [`VerseCompleter`].

use async_trait::async_trait;

use crate::domain::{
    is_verse, CorrectionRecord, CorrectionStep, GeneratorError, GenreConfig, Lyric,
    ValidationReport, ValidatorKind, Violation, ViolationDetail,
};
use crate::text::{normalized_word, word_tokens};

/// Words a finished verse cannot end on.
pub const CLOSED_CLASS_WORDS: &[&str] = &[
    "de", "da", "do", "das", "dos", "em", "no", "na", "nos", "nas", "que", "pra", "pro", "para",
    "por", "pelo", "pela", "com", "sem", "o", "a", "os", "as", "um", "uma", "uns", "umas", "meu",
    "minha", "teu", "tua", "seu", "sua", "nosso", "nossa", "e", "mas", "ou", "se", "ao", "à",
    "até", "sobre", "entre",
];

const CONTINUATION_MARKS: &[char] = &[',', '-', '–', '—'];

const MIN_TOKENS: usize = 3;

/// Why `line` reads as an unfinished verse, if it does.
pub fn incompleteness_reason(line: &str) -> Option<String> {
    let tokens = word_tokens(line);
    if tokens.len() < MIN_TOKENS {
        return Some(format!(
            "verso curto demais ({} palavra(s)); mínimo de {MIN_TOKENS}",
            tokens.len()
        ));
    }
    let trimmed = line.trim_end();
    if let Some(mark) = trimmed.chars().last().filter(|c| CONTINUATION_MARKS.contains(c)) {
        return Some(format!("verso termina em '{mark}', sugerindo continuação"));
    }
    let last = tokens.last().map(|t| normalized_word(t)).unwrap_or_default();
    if CLOSED_CLASS_WORDS.contains(&last.as_str()) {
        return Some(format!(
            "verso termina na palavra '{last}', que pede continuação"
        ));
    }
    None
}

pub fn validate(lyric: &Lyric, _genre: &GenreConfig) -> ValidationReport {
    let violations = lyric
        .verse_lines()
        .filter_map(|(index, line)| {
            incompleteness_reason(line).map(|reason| {
                let last_word = word_tokens(line).last().map(|t| normalized_word(t));
                Violation::error(index, line, reason)
                    .with_detail(ViolationDetail::Incomplete { last_word })
            })
        })
        .collect();
    ValidationReport::new(ValidatorKind::Completeness, violations)
}

/// External collaborator that finishes an incomplete verse.
#[async_trait]
pub trait VerseCompleter: Send + Sync {
    /// Propose a full replacement for `line`, given why it was flagged.
    async fn complete(&self, line: &str, reason: &str) -> Result<String, GeneratorError>;
}

/// Ask `completer` to finish every incomplete verse line.
///
/// A proposal is kept only when it is a single verse line that is no longer
/// flagged; otherwise the original line stays. Completer failures are logged
/// and leave the line untouched.
pub async fn complete_verses(
    lyric: &Lyric,
    completer: &dyn VerseCompleter,
) -> (Lyric, Vec<CorrectionRecord>) {
    let mut lines = lyric.lines().to_vec();
    let mut records = Vec::new();

    for index in 0..lines.len() {
        let line = lines[index].clone();
        if !is_verse(&line) {
            continue;
        }
        let Some(reason) = incompleteness_reason(&line) else {
            continue;
        };
        let proposal = match completer.complete(&line, &reason).await {
            Ok(p) => p.trim().to_string(),
            Err(e) => {
                tracing::warn!(line = index + 1, error = %e, "verse completer failed");
                continue;
            }
        };
        if proposal.contains('\n') || !is_verse(&proposal) {
            tracing::debug!(line = index + 1, "completer proposal is not a single verse line");
            continue;
        }
        if let Some(still) = incompleteness_reason(&proposal) {
            tracing::debug!(line = index + 1, reason = %still, "completer proposal still incomplete");
            continue;
        }
        tracing::debug!(line = index + 1, before = %line, after = %proposal, "verse completed");
        records.push(CorrectionRecord::new(
            CorrectionStep::Completion,
            Some(index),
            line,
            proposal.clone(),
        ));
        lines[index] = proposal;
    }

    (Lyric::from_lines(lines), records)
}
