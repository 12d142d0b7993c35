//! Chorus validator: presence, hook and clichés.
//!
//! A lyric needs a chorus, the chorus needs a hook (a repeated line or
//! 3-word phrase, or the whole chorus returning verbatim) and chorus lines
//! must avoid the stock tear-soaked imagery generators fall back on.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::{
    GenreConfig, Lyric, SectionKind, Severity, ValidationReport, ValidatorKind, Violation,
    ViolationDetail,
};
use crate::text::normalized_word;

/// A named pattern of worn-out imagery.
pub struct ClicheRule {
    pub name: &'static str,
    pub pattern: Regex,
}

const CLICHE_TABLE: &[(&str, &str)] = &[
    ("lagrimas", r"(?i)\bl[áa]grimas?\b"),
    ("travesseiro", r"(?i)\btravesseiro\b"),
    ("choro", r"(?i)\bchor(o|ar|ando|ei|ou)\b"),
    (
        "coracao_partido",
        r"(?i)\bcora[çc][ãa]o\s+(partido|despedaçado|quebrado)\b",
    ),
    ("dor_no_peito", r"(?i)\bdor\s+no\s+peito\b"),
    ("saudade_mata", r"(?i)\bsaudade\s+(que\s+)?(me\s+)?mata\b"),
    ("sofrimento", r"(?i)\bsofr(er|endo|imento)\b"),
    ("solidao", r"(?i)\bsolid[ãa]o\b"),
];

pub static CLICHE_RULES: Lazy<Vec<ClicheRule>> = Lazy::new(|| {
    CLICHE_TABLE
        .iter()
        .filter_map(|&(name, pattern)| {
            Regex::new(pattern)
                .ok()
                .map(|pattern| ClicheRule { name, pattern })
        })
        .collect()
});

/// Name of the first cliché rule `line` matches.
pub fn cliche_in(line: &str) -> Option<&'static str> {
    CLICHE_RULES
        .iter()
        .find(|r| r.pattern.is_match(line))
        .map(|r| r.name)
}

fn line_key(line: &str) -> Vec<String> {
    line.split_whitespace()
        .map(normalized_word)
        .filter(|w| !w.is_empty())
        .collect()
}

/// Whether chorus lines repeat a line or a 3-word phrase among themselves.
pub fn has_internal_hook(lines: &[&str]) -> bool {
    let keys: Vec<Vec<String>> = lines.iter().map(|l| line_key(l)).filter(|k| !k.is_empty()).collect();
    let mut seen_lines = HashSet::new();
    if keys.iter().any(|k| !seen_lines.insert(k.clone())) {
        return true;
    }
    let mut seen_grams = HashSet::new();
    keys.iter()
        .flat_map(|k| k.windows(3).map(|w| w.join(" ")).collect::<Vec<_>>())
        .any(|gram| !seen_grams.insert(gram))
}

/// Chorus facts shared by the validator and the scorer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChorusAnalysis {
    pub chorus_sections: usize,
    /// Every chorus section has an internal hook or returns verbatim.
    pub has_hook: bool,
    /// Some chorus section is repeated verbatim by another.
    pub repeated_verbatim: bool,
    /// `(line index, rule name)` of every cliché, chorus or not.
    pub cliches: Vec<(usize, &'static str)>,
}

pub fn analyze(lyric: &Lyric) -> ChorusAnalysis {
    let choruses: Vec<Vec<usize>> = lyric
        .sections()
        .iter()
        .filter(|s| s.kind == SectionKind::Chorus)
        .map(|s| lyric.section_verse_indices(s))
        .collect();

    let texts: Vec<Vec<&str>> = choruses
        .iter()
        .map(|idx| idx.iter().map(|&i| lyric.lines()[i].as_str()).collect())
        .collect();
    let keys: Vec<Vec<Vec<String>>> = texts
        .iter()
        .map(|lines| lines.iter().map(|l| line_key(l)).collect())
        .collect();

    let returns = |n: usize| {
        !keys[n].is_empty() && keys.iter().enumerate().any(|(m, other)| m != n && *other == keys[n])
    };
    let repeated_verbatim = (0..keys.len()).any(|n| returns(n));
    let has_hook = !texts.is_empty()
        && (0..texts.len()).all(|n| has_internal_hook(&texts[n]) || returns(n));

    let cliches = lyric
        .verse_lines()
        .filter_map(|(i, line)| cliche_in(line).map(|name| (i, name)))
        .collect();

    ChorusAnalysis {
        chorus_sections: choruses.len(),
        has_hook,
        repeated_verbatim,
        cliches,
    }
}

pub fn validate(lyric: &Lyric, _genre: &GenreConfig) -> ValidationReport {
    let analysis = analyze(lyric);
    let mut violations = Vec::new();

    if analysis.chorus_sections == 0 {
        violations.push(
            Violation::global("a letra não tem refrão")
                .with_detail(ViolationDetail::Chorus { pattern: None }),
        );
    } else if !analysis.has_hook {
        violations.push(
            Violation::global("o refrão não tem gancho: nenhuma linha ou frase se repete")
                .with_detail(ViolationDetail::Chorus { pattern: None }),
        );
    }

    for &(index, name) in &analysis.cliches {
        let in_chorus = lyric
            .section_of(index)
            .is_some_and(|s| s.kind == SectionKind::Chorus);
        let severity = if in_chorus {
            Severity::Error
        } else {
            Severity::Warning
        };
        violations.push(
            Violation::error(index, &lyric.lines()[index], format!("clichê: '{name}'"))
                .with_severity(severity)
                .with_detail(ViolationDetail::Chorus {
                    pattern: Some(name.to_string()),
                }),
        );
    }

    ValidationReport::new(ValidatorKind::Chorus, violations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cliche_rules_compile() {
        assert_eq!(CLICHE_RULES.len(), CLICHE_TABLE.len());
        assert_eq!(cliche_in("Minhas lágrimas caem no travesseiro"), Some("lagrimas"));
        assert_eq!(cliche_in("Meu coração partido"), Some("coracao_partido"));
        assert_eq!(cliche_in("A saudade me mata"), Some("saudade_mata"));
        assert!(cliche_in("Vem dançar comigo agora").is_none());
        assert!(cliche_in("Chorinho na varanda").is_none());
    }

    #[test]
    fn test_internal_hook() {
        assert!(has_internal_hook(&["Vem comigo", "Dança", "Vem comigo"]));
        assert!(has_internal_hook(&["vem dançar comigo", "hoje vem dançar comigo"]));
        assert!(!has_internal_hook(&["Vem dançar comigo agora", "Deixa a vida nos levar"]));
    }

    #[test]
    fn test_missing_chorus_is_invalid() {
        let report = validate(&Lyric::parse("[Verso]\nO vento canta devagar"), &GenreConfig::default());
        assert!(!report.is_valid);
        assert_eq!(report.violations[0].line, 0);
    }

    #[test]
    fn test_chorus_returning_verbatim_is_a_hook() {
        let text = "[Refrão]\nVem dançar comigo agora\nDeixa a vida nos levar\n[Verso]\nO vento canta devagar\n[Refrão]\nVem dançar comigo agora\nDeixa a vida nos levar";
        let analysis = analyze(&Lyric::parse(text));
        assert!(analysis.has_hook);
        assert!(analysis.repeated_verbatim);
        assert!(validate(&Lyric::parse(text), &GenreConfig::default()).is_valid);
    }

    #[test]
    fn test_cliche_in_chorus_is_error() {
        let text = "[Refrão]\nMinhas lágrimas caem no travesseiro\nMinhas lágrimas caem no travesseiro";
        let report = validate(&Lyric::parse(text), &GenreConfig::default());
        assert!(!report.is_valid);
        assert!(report
            .violations
            .iter()
            .any(|v| v.line == 2 && v.severity == Severity::Error));
    }
}
