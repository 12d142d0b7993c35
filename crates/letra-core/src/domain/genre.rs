//! Per-genre prosody configuration.
//!
//! A [`GenreConfig`] bundles the syllable budget and the section shape rules
//! for one genre. Configs are immutable once loaded; lookup through
//! [`GenreCatalog::get`] never fails and falls back to the default genre.

use serde::{Deserialize, Serialize};

use crate::domain::lyric::SectionKind;
use crate::domain::report::Severity;
use crate::domain::{LetraError, Result};
use crate::text::fold_accents;

/// Syllable counts allowed per verse line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyllableBudget {
    pub min: usize,
    pub ideal: usize,
    pub max: usize,
}

impl SyllableBudget {
    pub const fn new(min: usize, ideal: usize, max: usize) -> Self {
        Self { min, ideal, max }
    }

    /// Whether `syllables` lies in `[min, max]`.
    pub fn contains(&self, syllables: usize) -> bool {
        (self.min..=self.max).contains(&syllables)
    }

    fn validate(&self) -> Result<()> {
        if self.min == 0 || self.min > self.ideal || self.ideal > self.max {
            return Err(LetraError::InvalidConfig(format!(
                "syllable budget must satisfy 0 < min <= ideal <= max, got {}/{}/{}",
                self.min, self.ideal, self.max
            )));
        }
        Ok(())
    }
}

impl Default for SyllableBudget {
    fn default() -> Self {
        Self::new(6, 9, 12)
    }
}

/// Allowed verse-line count for one section kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LineCountRule {
    /// Exactly one of the listed counts.
    OneOf { counts: Vec<usize> },
    /// Inclusive range. Above `max` is only a warning when
    /// `overflow_is_warning` is set.
    Range {
        min: usize,
        max: usize,
        #[serde(default)]
        overflow_is_warning: bool,
    },
}

/// Result of checking a line count against a [`LineCountRule`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineCountMismatch {
    pub severity: Severity,
    /// Expectation phrase, e.g. `"2 ou 4 linhas"`.
    pub expected: String,
}

impl LineCountRule {
    pub fn min(&self) -> usize {
        match self {
            Self::OneOf { counts } => counts.iter().copied().min().unwrap_or(0),
            Self::Range { min, .. } => *min,
        }
    }

    pub fn max(&self) -> usize {
        match self {
            Self::OneOf { counts } => counts.iter().copied().max().unwrap_or(0),
            Self::Range { max, .. } => *max,
        }
    }

    /// Portuguese phrase describing the expectation.
    pub fn describe(&self) -> String {
        match self {
            Self::OneOf { counts } => {
                let parts: Vec<String> = counts.iter().map(|c| c.to_string()).collect();
                match parts.split_last() {
                    Some((last, rest)) if !rest.is_empty() => {
                        format!("{} ou {} linhas", rest.join(", "), last)
                    }
                    Some((last, _)) => format!("{last} linhas"),
                    None => "0 linhas".to_string(),
                }
            }
            Self::Range { min, max, .. } if min == max => format!("{min} linhas"),
            Self::Range { min, max, .. } => format!("entre {min} e {max} linhas"),
        }
    }

    /// `None` when `count` satisfies the rule.
    pub fn check(&self, count: usize) -> Option<LineCountMismatch> {
        let severity = match self {
            Self::OneOf { counts } if counts.contains(&count) => return None,
            Self::OneOf { .. } => Severity::Error,
            Self::Range { min, max, .. } if (*min..=*max).contains(&count) => return None,
            Self::Range {
                max,
                overflow_is_warning: true,
                ..
            } if count > *max => Severity::Warning,
            Self::Range { .. } => Severity::Error,
        };
        Some(LineCountMismatch {
            severity,
            expected: self.describe(),
        })
    }

    /// Nearest allowed count at or above `count`, if any.
    pub fn pad_target(&self, count: usize) -> Option<usize> {
        match self {
            Self::OneOf { counts } => counts.iter().copied().filter(|&c| c >= count).min(),
            Self::Range { min, max, .. } => (count <= *max).then(|| count.max(*min)),
        }
    }
}

/// Line-count rule bound to a section kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRule {
    pub kind: SectionKind,
    pub rule: LineCountRule,
}

/// Expected section shapes for a genre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionShape {
    pub rules: Vec<SectionRule>,
    /// Lines with more words than this are two verses fused into one.
    pub unstacked_word_limit: usize,
}

impl SectionShape {
    pub fn rule_for(&self, kind: SectionKind) -> Option<&LineCountRule> {
        self.rules.iter().find(|r| r.kind == kind).map(|r| &r.rule)
    }
}

impl Default for SectionShape {
    fn default() -> Self {
        let range = |min, max, overflow_is_warning| LineCountRule::Range {
            min,
            max,
            overflow_is_warning,
        };
        Self {
            rules: vec![
                SectionRule {
                    kind: SectionKind::Chorus,
                    rule: LineCountRule::OneOf { counts: vec![2, 4] },
                },
                SectionRule {
                    kind: SectionKind::Verse,
                    rule: range(6, 8, true),
                },
                SectionRule {
                    kind: SectionKind::PreChorus,
                    rule: range(2, 4, false),
                },
                SectionRule {
                    kind: SectionKind::Bridge,
                    rule: range(4, 6, true),
                },
                SectionRule {
                    kind: SectionKind::Intro,
                    rule: range(0, 4, true),
                },
                SectionRule {
                    kind: SectionKind::Outro,
                    rule: range(0, 4, true),
                },
            ],
            unstacked_word_limit: 12,
        }
    }
}

/// Prosody configuration for one genre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreConfig {
    pub name: String,
    pub budget: SyllableBudget,
    #[serde(default)]
    pub shape: SectionShape,
}

impl GenreConfig {
    pub fn new(name: impl Into<String>, budget: SyllableBudget) -> Self {
        Self {
            name: name.into(),
            budget,
            shape: SectionShape::default(),
        }
    }

    pub fn with_shape(mut self, shape: SectionShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(LetraError::InvalidConfig(
                "genre name must not be empty".to_string(),
            ));
        }
        self.budget.validate()?;
        for r in &self.shape.rules {
            if r.rule.min() > r.rule.max() {
                return Err(LetraError::InvalidConfig(format!(
                    "genre {}: {} rule has min > max",
                    self.name, r.kind
                )));
            }
        }
        Ok(())
    }
}

impl Default for GenreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_GENRE, SyllableBudget::default())
    }
}

/// Name of the fallback genre.
pub const DEFAULT_GENRE: &str = "padrao";

const BUILTIN_BUDGETS: &[(&str, SyllableBudget)] = &[
    ("sertanejo", SyllableBudget::new(7, 10, 12)),
    ("mpb", SyllableBudget::new(6, 9, 12)),
    ("pagode", SyllableBudget::new(6, 8, 11)),
    ("samba", SyllableBudget::new(6, 8, 11)),
    ("forro", SyllableBudget::new(6, 8, 10)),
    ("funk", SyllableBudget::new(4, 7, 10)),
    ("gospel", SyllableBudget::new(6, 9, 12)),
    ("pop", SyllableBudget::new(6, 9, 12)),
    ("rock", SyllableBudget::new(5, 8, 12)),
    ("bossa_nova", SyllableBudget::new(6, 9, 12)),
];

/// Normalize a genre name for lookup (`"Bossa Nova"` -> `"bossa_nova"`).
pub fn genre_key(name: &str) -> String {
    fold_accents(name.trim())
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Read-only lookup table of genre configurations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreCatalog {
    pub default: GenreConfig,
    pub genres: Vec<GenreConfig>,
}

impl GenreCatalog {
    /// The built-in Brazilian genres.
    pub fn builtin() -> Self {
        Self {
            default: GenreConfig::default(),
            genres: BUILTIN_BUDGETS
                .iter()
                .map(|(name, budget)| GenreConfig::new(*name, *budget))
                .collect(),
        }
    }

    /// Look up a genre, falling back to the default.
    pub fn get(&self, name: &str) -> &GenreConfig {
        let key = genre_key(name);
        match self.genres.iter().find(|g| genre_key(&g.name) == key) {
            Some(genre) => genre,
            None => {
                tracing::debug!(genre = %name, fallback = %self.default.name, "unknown genre, using default");
                &self.default
            }
        }
    }

    /// Whether `name` resolves to a configured (non-fallback) genre.
    pub fn contains(&self, name: &str) -> bool {
        let key = genre_key(name);
        self.genres.iter().any(|g| genre_key(&g.name) == key)
    }

    /// Replace or add genres by name.
    pub fn with_overrides(mut self, overrides: Vec<GenreConfig>) -> Self {
        for genre in overrides {
            let key = genre_key(&genre.name);
            if key == genre_key(&self.default.name) {
                self.default = genre;
            } else if let Some(existing) =
                self.genres.iter_mut().find(|g| genre_key(&g.name) == key)
            {
                *existing = genre;
            } else {
                self.genres.push(genre);
            }
        }
        self
    }

    /// Every configured genre, default first.
    pub fn iter(&self) -> impl Iterator<Item = &GenreConfig> {
        std::iter::once(&self.default).chain(self.genres.iter())
    }

    pub fn validate(&self) -> Result<()> {
        self.iter().try_for_each(GenreConfig::validate)
    }
}

impl Default for GenreCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chorus_rule_describes_two_or_four() {
        let shape = SectionShape::default();
        let rule = shape.rule_for(SectionKind::Chorus).expect("chorus rule");
        assert_eq!(rule.describe(), "2 ou 4 linhas");
        assert!(rule.check(2).is_none());
        assert!(rule.check(4).is_none());
        let mismatch = rule.check(3).expect("3 lines is invalid");
        assert_eq!(mismatch.severity, Severity::Error);
    }

    #[test]
    fn test_verse_overflow_is_warning() {
        let shape = SectionShape::default();
        let rule = shape.rule_for(SectionKind::Verse).expect("verse rule");
        assert_eq!(rule.check(9).map(|m| m.severity), Some(Severity::Warning));
        assert_eq!(rule.check(4).map(|m| m.severity), Some(Severity::Error));
        assert!(rule.check(7).is_none());
    }

    #[test]
    fn test_pad_target() {
        let chorus = LineCountRule::OneOf { counts: vec![2, 4] };
        assert_eq!(chorus.pad_target(3), Some(4));
        assert_eq!(chorus.pad_target(1), Some(2));
        assert_eq!(chorus.pad_target(5), None);
    }

    #[test]
    fn test_catalog_lookup_falls_back() {
        let catalog = GenreCatalog::builtin();
        assert_eq!(catalog.get("Sertanejo").budget.max, 12);
        assert_eq!(catalog.get("Forró").name, "forro");
        assert_eq!(catalog.get("Bossa Nova").name, "bossa_nova");
        assert_eq!(catalog.get("axé").name, DEFAULT_GENRE);
        assert!(!catalog.contains("axé"));
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_overrides_replace_by_name() {
        let catalog = GenreCatalog::builtin().with_overrides(vec![
            GenreConfig::new("Funk", SyllableBudget::new(4, 6, 8)),
            GenreConfig::new("axe", SyllableBudget::new(5, 7, 9)),
        ]);
        assert_eq!(catalog.get("funk").budget.max, 8);
        assert_eq!(catalog.get("axé").budget.max, 9);
    }

    #[test]
    fn test_invalid_budget_rejected() {
        let genre = GenreConfig::new("x", SyllableBudget::new(9, 8, 12));
        assert!(genre.validate().is_err());
    }
}
