//! Poetic syllable counter for Brazilian Portuguese.
//!
//! Each word contributes its grammatical syllables, approximated as maximal
//! runs of vowels (diphthongs and triphthongs count once). Elision then
//! merges a vowel-final word into a following vowel-initial (or silent
//! `h` + vowel) word by subtracting one syllable from the first word, unless
//! the first word is a monosyllable or resists elision.
//!
//! This is the only syllable rule set in the crate; validators, the scorer and
//! the correction pipeline all count through [`count_line`].

use serde::{Deserialize, Serialize};

use crate::text::{has_letters, is_vowel, normalized_word};

/// Words that resist elision phonetically even though they end in a vowel.
const ELISION_EXCEPTIONS: &[&str] = &[
    "não", "são", "coração", "mão", "então", "também", "você", "até", "é", "só", "já", "lá",
    "pé", "fé", "nós", "aí", "aqui", "ali", "avó", "avô", "está", "vovó", "sertão",
];

/// Per-word breakdown of a line count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordSyllables {
    pub word: String,
    /// Grammatical syllables before elision.
    pub syllables: usize,
    /// Whether this word lost a syllable to elision with the next word.
    pub elided: bool,
}

/// Remove `[...]` and `(...)` spans, nesting tolerated.
pub fn strip_markers(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut depth = 0usize;
    for c in line.chars() {
        match c {
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

/// Grammatical syllables of a single token.
///
/// Tokens without letters count 0; tokens with letters but no vowels count 1.
pub fn count_word(token: &str) -> usize {
    if !has_letters(token) {
        return 0;
    }
    let word = normalized_word(token);
    let mut runs = 0usize;
    let mut in_vowel = false;
    for c in word.chars() {
        let v = is_vowel(c);
        if v && !in_vowel {
            runs += 1;
        }
        in_vowel = v;
    }
    runs.max(1)
}

fn ends_in_vowel(word: &str) -> bool {
    word.chars().last().is_some_and(is_vowel)
}

fn starts_with_vowel_sound(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) if is_vowel(c) => true,
        Some('h') => chars.next().is_some_and(is_vowel),
        _ => false,
    }
}

fn resists_elision(word: &str) -> bool {
    ELISION_EXCEPTIONS.contains(&word)
        || word.ends_with("ão")
        || word.ends_with("ãe")
        || word.ends_with("õe")
}

/// Whether `first` elides into `next` at the word boundary.
pub fn elides(first: &str, next: &str) -> bool {
    let a = normalized_word(first);
    let b = normalized_word(next);
    count_word(&a) > 1 && ends_in_vowel(&a) && starts_with_vowel_sound(&b) && !resists_elision(&a)
}

/// Per-word syllables and elision flags for a line.
pub fn line_breakdown(line: &str) -> Vec<WordSyllables> {
    let stripped = strip_markers(line);
    let words: Vec<&str> = stripped.split_whitespace().filter(|w| has_letters(w)).collect();
    words
        .iter()
        .enumerate()
        .map(|(i, w)| WordSyllables {
            word: (*w).to_string(),
            syllables: count_word(w),
            elided: words.get(i + 1).is_some_and(|next| elides(w, next)),
        })
        .collect()
}

/// Poetic syllables of a line: 0 for a line without letters, otherwise >= 1.
pub fn count_line(line: &str) -> usize {
    let breakdown = line_breakdown(line);
    if breakdown.is_empty() {
        return 0;
    }
    let total: usize = breakdown
        .iter()
        .map(|w| w.syllables - usize::from(w.elided))
        .sum();
    total.max(1)
}
