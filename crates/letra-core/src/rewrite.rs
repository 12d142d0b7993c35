//! Syllable-reducing rewrites.
//!
//! A data-driven table of sanctioned substitutions: colloquial contractions
//! (`você` -> `cê`, `para o` -> `pro`), elision of `de` before a vowel
//! (`de amor` -> `d'amor`) and removal of non-initial articles. Every rewrite
//! is re-counted and is only offered when it strictly lowers the syllable
//! count, so no rule can ever lengthen a line. Rewrites only drop or swap
//! whole tokens; they never cut a word.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::syllable::count_line;
use crate::text::{is_vowel, match_case, normalized_word, split_affixes};

/// Kind of substitution a rule performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteKind {
    Contraction,
    Elision,
    ArticleRemoval,
}

/// One entry in the contraction table.
#[derive(Debug, Clone, Copy)]
pub struct Contraction {
    /// Lower-case word sequence to match.
    pub from: &'static [&'static str],
    pub to: &'static str,
}

/// Multi-word entries come first so `para o` wins over `para`.
pub const CONTRACTIONS: &[Contraction] = &[
    Contraction { from: &["para", "o"], to: "pro" },
    Contraction { from: &["para", "os"], to: "pros" },
    Contraction { from: &["para", "a"], to: "pra" },
    Contraction { from: &["para", "as"], to: "pras" },
    Contraction { from: &["em", "um"], to: "num" },
    Contraction { from: &["em", "uma"], to: "numa" },
    Contraction { from: &["de", "um"], to: "dum" },
    Contraction { from: &["de", "uma"], to: "duma" },
    Contraction { from: &["não", "é"], to: "né" },
    Contraction { from: &["para"], to: "pra" },
    Contraction { from: &["você"], to: "cê" },
    Contraction { from: &["vocês"], to: "cês" },
    Contraction { from: &["está"], to: "tá" },
    Contraction { from: &["estás"], to: "tás" },
    Contraction { from: &["estou"], to: "tô" },
    Contraction { from: &["estava"], to: "tava" },
    Contraction { from: &["estavam"], to: "tavam" },
    Contraction { from: &["estamos"], to: "tamo" },
    Contraction { from: &["estão"], to: "tão" },
];

const REMOVABLE_ARTICLES: &[&str] = &["o", "os", "as", "um", "uma"];

/// Every token a rewrite may introduce that is not copied from its input.
pub const COLLOQUIAL_FORMS: &[&str] = &[
    "pro", "pros", "pra", "pras", "num", "numa", "dum", "duma", "né", "cê", "cês", "tá", "tás",
    "tô", "tava", "tavam", "tamo", "tão",
];

/// Contraction outputs that are never ordinary words. They stay lower-case
/// at line start; the others (`tão`, `num`) follow the case of their source.
pub const LOWERCASE_FORMS: &[&str] = &[
    "pro", "pros", "pra", "pras", "né", "cê", "cês", "tá", "tás", "tô", "tava", "tavam", "tamo",
];

/// Whether a token is one a rewrite may introduce.
pub fn is_colloquial(token: &str) -> bool {
    let word = normalized_word(token);
    COLLOQUIAL_FORMS.contains(&word.as_str()) || is_elided_form(&word)
}

/// Whether a token stays lower-case at line start.
pub fn stays_lowercase(token: &str) -> bool {
    let word = normalized_word(token);
    LOWERCASE_FORMS.contains(&word.as_str()) || is_elided_form(&word)
}

/// `d'amor`-style elided forms.
pub fn is_elided_form(word: &str) -> bool {
    word.starts_with("d'") || word.starts_with("d’")
}

/// A concrete substitution at a token position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub kind: RewriteKind,
    pub start: usize,
    pub len: usize,
    /// `None` deletes the matched tokens.
    pub replacement: Option<String>,
}

impl Edit {
    fn end(&self) -> usize {
        self.start + self.len
    }

    fn overlaps(&self, other: &Edit) -> bool {
        self.start < other.end() && other.start < self.end()
    }
}

/// Whether `tokens[i]` may be merged with the following token.
fn joinable(tokens: &[&str], i: usize) -> bool {
    let (_, _, trailing) = split_affixes(tokens[i]);
    trailing.is_empty()
}

fn contraction_edits(tokens: &[&str]) -> Vec<Edit> {
    let words: Vec<String> = tokens.iter().map(|t| normalized_word(t)).collect();
    let mut edits = Vec::new();
    for rule in CONTRACTIONS {
        let n = rule.from.len();
        if n > tokens.len() {
            continue;
        }
        for start in 0..=tokens.len() - n {
            let matches = rule
                .from
                .iter()
                .enumerate()
                .all(|(k, w)| words[start + k] == *w);
            let inner_joinable = (start..start + n - 1).all(|i| joinable(tokens, i));
            if !(matches && inner_joinable) {
                continue;
            }
            let (leading, source, _) = split_affixes(tokens[start]);
            let (_, _, trailing) = split_affixes(tokens[start + n - 1]);
            let form = if LOWERCASE_FORMS.contains(&rule.to) {
                rule.to.to_string()
            } else {
                match_case(source, rule.to)
            };
            edits.push(Edit {
                kind: RewriteKind::Contraction,
                start,
                len: n,
                replacement: Some(format!("{leading}{form}{trailing}")),
            });
        }
    }
    edits
}

fn elision_edits(tokens: &[&str]) -> Vec<Edit> {
    let mut edits = Vec::new();
    for start in 0..tokens.len().saturating_sub(1) {
        if normalized_word(tokens[start]) != "de" || !joinable(tokens, start) {
            continue;
        }
        let (lead_next, core_next, trail_next) = split_affixes(tokens[start + 1]);
        if !lead_next.is_empty() || !core_next.chars().next().is_some_and(is_vowel) {
            continue;
        }
        let (leading, _, _) = split_affixes(tokens[start]);
        edits.push(Edit {
            kind: RewriteKind::Elision,
            start,
            len: 2,
            replacement: Some(format!(
                "{leading}d'{}{trail_next}",
                core_next.to_lowercase()
            )),
        });
    }
    edits
}

fn article_edits(tokens: &[&str]) -> Vec<Edit> {
    (1..tokens.len())
        .filter(|&i| {
            let (leading, core, trailing) = split_affixes(tokens[i]);
            leading.is_empty()
                && trailing.is_empty()
                && REMOVABLE_ARTICLES.contains(&core.to_lowercase().as_str())
                && i + 1 < tokens.len()
        })
        .map(|i| Edit {
            kind: RewriteKind::ArticleRemoval,
            start: i,
            len: 1,
            replacement: None,
        })
        .collect()
}

/// All candidate edits on a line, contractions first.
pub fn candidate_edits(line: &str, include_articles: bool) -> Vec<Edit> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let mut edits = contraction_edits(&tokens);
    edits.extend(elision_edits(&tokens));
    if include_articles {
        edits.extend(article_edits(&tokens));
    }
    edits
}

/// Apply non-overlapping edits to `line`. Overlapping edits after the first
/// are ignored.
pub fn apply_edits(line: &str, edits: &[&Edit]) -> String {
    let mut accepted: Vec<&Edit> = Vec::new();
    for e in edits {
        if accepted.iter().all(|a| !a.overlaps(e)) {
            accepted.push(e);
        }
    }
    accepted.sort_by(|a, b| b.start.cmp(&a.start));

    let mut tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
    for e in accepted {
        let replacement: Vec<String> = e.replacement.iter().cloned().collect();
        tokens.splice(e.start..e.end(), replacement);
    }
    tokens.join(" ")
}

/// Apply a single edit if it strictly lowers the syllable count.
pub fn apply_reducing(line: &str, edit: &Edit) -> Option<String> {
    let rewritten = apply_edits(line, &[edit]);
    (count_line(&rewritten) < count_line(line)).then_some(rewritten)
}

/// Up to three rewrites of `line` that fit within `max_syllables`.
///
/// Single edits are tried first, then pairs of edits, then the full
/// contraction pass of [`reduce_line`]. Ordered by number of edits, then by
/// how close the result stays to the budget. Empty when nothing fits.
pub fn suggest_rewrites(line: &str, max_syllables: usize) -> Vec<String> {
    let original = count_line(line);
    if original <= max_syllables {
        return Vec::new();
    }
    let edits = candidate_edits(line, true);

    let mut ranked: Vec<(usize, usize, String)> = Vec::new();
    let mut consider = |edit_count: usize, text: String| {
        let n = count_line(&text);
        if n < original && n <= max_syllables && !text.is_empty() {
            ranked.push((edit_count, max_syllables - n, text));
        }
    };

    for e in &edits {
        consider(1, apply_edits(line, &[e]));
    }
    for (i, a) in edits.iter().enumerate() {
        for b in edits.iter().skip(i + 1) {
            if !a.overlaps(b) {
                consider(2, apply_edits(line, &[a, b]));
            }
        }
    }
    let reduced = reduce_line(line);
    if reduced != line {
        consider(usize::MAX, reduced);
    }

    ranked.sort();
    let mut seen = BTreeSet::new();
    ranked
        .into_iter()
        .filter(|(_, _, text)| seen.insert(text.clone()))
        .map(|(_, _, text)| text)
        .take(3)
        .collect()
}

/// Apply every reducing contraction and elision until none applies.
///
/// Articles are never removed here. The result is a fixed point:
/// `reduce_line(reduce_line(x)) == reduce_line(x)`.
pub fn reduce_line(line: &str) -> String {
    let mut current: String = line.split_whitespace().collect::<Vec<_>>().join(" ");
    if current.is_empty() {
        return line.to_string();
    }
    loop {
        let next = candidate_edits(&current, false)
            .iter()
            .find_map(|e| apply_reducing(&current, e));
        match next {
            Some(n) => current = n,
            None => break,
        }
    }
    if count_line(&current) < count_line(line) {
        current
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contractions_reduce() {
        assert_eq!(
            apply_edits("você vai voltar", &[&candidate_edits("você vai voltar", false)[0]]),
            "cê vai voltar"
        );
        let line = "Eu vou para o mar";
        let edits = candidate_edits(line, false);
        assert_eq!(edits[0].replacement.as_deref(), Some("pro"));
        assert_eq!(apply_edits(line, &[&edits[0]]), "Eu vou pro mar");
    }

    #[test]
    fn test_elision_keeps_punctuation() {
        let line = "canção de amor,";
        let edits: Vec<Edit> = candidate_edits(line, false)
            .into_iter()
            .filter(|e| e.kind == RewriteKind::Elision)
            .collect();
        assert_eq!(edits.len(), 1);
        assert_eq!(apply_edits(line, &[&edits[0]]), "canção d'amor,");
    }

    #[test]
    fn test_no_contraction_across_comma() {
        let edits = candidate_edits("vou para, o mar", false);
        assert!(edits.iter().all(|e| e.len == 1));
    }

    #[test]
    fn test_line_initial_article_kept() {
        let edits = candidate_edits("O sol brilha no mar", true);
        assert!(edits
            .iter()
            .all(|e| !(e.kind == RewriteKind::ArticleRemoval && e.start == 0)));
    }

    #[test]
    fn test_suggestions_fit_budget() {
        let line = "Você está esperando por mim para o resto da vida";
        let max = count_line(line) - 2;
        let suggestions = suggest_rewrites(line, max);
        assert!(!suggestions.is_empty());
        assert!(suggestions.len() <= 3);
        for s in &suggestions {
            assert!(count_line(s) <= max, "{s}");
        }
    }

    #[test]
    fn test_no_suggestion_when_nothing_fits() {
        assert!(suggest_rewrites("Saudade imensa devastadora incontrolável", 3).is_empty());
    }

    #[test]
    fn test_reduce_line_is_fixed_point() {
        let line = "Você está para o lado de uma estrela";
        let once = reduce_line(line);
        assert!(count_line(&once) < count_line(line));
        assert_eq!(reduce_line(&once), once);
    }

    #[test]
    fn test_colloquial_detection() {
        assert!(is_colloquial("pra"));
        assert!(is_colloquial("d'amor"));
        assert!(!is_colloquial("Amor"));
    }

    #[test]
    fn test_ordinary_words_do_not_stay_lowercase() {
        assert!(stays_lowercase("pra"));
        assert!(stays_lowercase("d'amor"));
        assert!(!stays_lowercase("tão"));
        assert!(!stays_lowercase("num"));
    }

    #[test]
    fn test_contraction_follows_source_case() {
        let edit = candidate_edits("Estão dançando no salão", false)
            .into_iter()
            .find(|e| e.kind == RewriteKind::Contraction && e.start == 0)
            .expect("estão contracts");
        assert_eq!(edit.replacement.as_deref(), Some("Tão"));

        let edit = candidate_edits("Para a lua", false)
            .into_iter()
            .find(|e| e.kind == RewriteKind::Contraction && e.start == 0)
            .expect("para a contracts");
        assert_eq!(edit.replacement.as_deref(), Some("pra"));
    }
}
