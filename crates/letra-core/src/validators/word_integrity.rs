//! Word-integrity validator: detects truncated words.
//!
//! Generators cut words off mid-token (`coraç`, `saudad`). Detection is a
//! table of [`TruncationRule`]s plus a deny-list of observed artifacts; a
//! suggestion is attached when the fragment is a prefix of exactly one
//! vocabulary word. This is the only hard validator.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::{GenreConfig, Lyric, ValidationReport, ValidatorKind, Violation, ViolationDetail};
use crate::text::normalized_word;

/// A pattern over a lower-cased word core that marks it as truncated.
pub struct TruncationRule {
    pub name: &'static str,
    pub pattern: Regex,
    pub reason: &'static str,
}

const RULE_TABLE: &[(&str, &str, &str)] = &[
    ("cedilla_ending", r"ç$", "palavra termina em 'ç'"),
    ("impossible_coda", r"(nh|lh|qu|gu)$", "terminação impossível em português"),
    ("double_consonant_ending", r"(ss|rr)$", "consoante dupla no fim da palavra"),
    ("short_nasal_fragment", r"^\p{L}{0,2}ã$", "fragmento curto terminado em 'ã'"),
];

pub static TRUNCATION_RULES: Lazy<Vec<TruncationRule>> = Lazy::new(|| {
    RULE_TABLE
        .iter()
        .filter_map(|&(name, pattern, reason)| {
            Regex::new(pattern).ok().map(|pattern| TruncationRule {
                name,
                pattern,
                reason,
            })
        })
        .collect()
});

/// Fragments seen in generator output that no rule catches.
pub const TRUNCATION_DENY_LIST: &[&str] = &[
    "paix", "saudad", "solid", "sorris", "desesper", "lembranç", "esperanç", "cançã", "ilusã",
    "razã", "emoç", "coraç", "soliã", "amanh", "felicid", "verdad", "liberd", "sentim",
];

/// Real words that would otherwise trip a rule.
const KNOWN_WORDS: &[&str] = &[
    "lã", "fã", "vã", "sã", "rã", "cã", "stress", "boss", "miss", "kiss", "express", "chess",
];

/// Vocabulary used to complete unambiguous fragments.
pub const VOCABULARY: &[&str] = &[
    "coração", "emoção", "paixão", "canção", "saudade", "solidão", "ilusão", "razão", "sertão",
    "estação", "perdão", "lembrança", "esperança", "sorriso", "desespero", "felicidade",
    "liberdade", "verdade", "vontade", "cidade", "amanhã", "manhã", "carinho", "caminho",
    "sozinho", "destino", "momento", "sentimento", "pensamento", "coragem", "viagem", "alegria",
    "poesia", "melodia", "estrela", "luar", "abraço", "laço", "beijo", "desejo", "olhar",
    "sonhar", "mundo", "mulher", "dançar", "cantar", "braço", "espaço", "cansaço", "pedaço",
    "compasso", "terra", "sossego", "nossa", "nosso", "ninguém", "alguém", "também", "mãe",
    "mão", "chão", "irmão", "irmã", "maçã",
];

/// Why a token looks truncated, if it does.
pub fn truncation_reason(token: &str) -> Option<&'static str> {
    let word = normalized_word(token);
    if word.is_empty() || KNOWN_WORDS.contains(&word.as_str()) || VOCABULARY.contains(&word.as_str())
    {
        return None;
    }
    if TRUNCATION_DENY_LIST.contains(&word.as_str()) {
        return Some("fragmento de palavra conhecido");
    }
    TRUNCATION_RULES
        .iter()
        .find(|r| r.pattern.is_match(&word))
        .map(|r| r.reason)
}

/// The single vocabulary word starting with `fragment`, if unambiguous.
pub fn suggest_completion(fragment: &str) -> Option<&'static str> {
    let word = normalized_word(fragment);
    if word.is_empty() {
        return None;
    }
    let mut matches = VOCABULARY
        .iter()
        .filter(|v| v.starts_with(word.as_str()) && v.len() > word.len());
    match (matches.next(), matches.next()) {
        (Some(only), None) => Some(*only),
        _ => None,
    }
}

pub fn validate(lyric: &Lyric, _genre: &GenreConfig) -> ValidationReport {
    let mut violations = Vec::new();
    for (index, line) in lyric.verse_lines() {
        for token in line.split_whitespace() {
            if let Some(reason) = truncation_reason(token) {
                let fragment = normalized_word(token);
                let suggestion = suggest_completion(&fragment).map(str::to_string);
                let reason = match &suggestion {
                    Some(s) => format!("palavra truncada '{fragment}' ({reason}); sugestão: '{s}'"),
                    None => format!("palavra truncada '{fragment}' ({reason})"),
                };
                violations.push(
                    Violation::error(index, line, reason).with_detail(ViolationDetail::Truncation {
                        fragment,
                        suggestion,
                    }),
                );
            }
        }
    }
    ValidationReport::new(ValidatorKind::WordIntegrity, violations)
}
