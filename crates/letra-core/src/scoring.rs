//! Composite lyric scoring.
//!
//! A [`Scorer`] turns a lyric plus its validation reports into a
//! [`ScoreBreakdown`] with a total in `0..=100`. The default
//! [`CompositeScorer`] is a weighted sum of per-component ratios; any
//! word-integrity violation multiplies the total by
//! [`ScoringWeights::integrity_factor`], so one truncated word sinks a
//! candidate instead of nudging it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::{GenreConfig, LetraError, Lyric, Result, Severity, ValidationReport, ValidatorKind};
use crate::syllable::count_line;
use crate::validators::{self, shape, ChorusAnalysis};

/// Scale of every total.
pub const MAX_SCORE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreComponentKind {
    /// Share of verse lines inside `[min, max]`.
    SyllableFit,
    /// Mean closeness of line counts to `ideal`.
    IdealProximity,
    Repetition,
    Shape,
    Completeness,
    /// Hook, chorus returning verbatim, and no clichés.
    Catchiness,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub kind: ScoreComponentKind,
    pub weight: f64,
    /// Fulfilment in `0..=1`.
    pub ratio: f64,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub total: f64,
    pub components: Vec<ScoreComponent>,
    /// Whether the word-integrity penalty was applied.
    pub integrity_penalty: bool,
}

impl ScoreBreakdown {
    pub fn component(&self, kind: ScoreComponentKind) -> Option<&ScoreComponent> {
        self.components.iter().find(|c| c.kind == kind)
    }
}

/// Component weights. Totals are normalized by the weight sum, so weights
/// are relative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub syllable_fit: f64,
    pub ideal_proximity: f64,
    pub repetition: f64,
    pub shape: f64,
    pub completeness: f64,
    pub catchiness: f64,
    /// Multiplier applied to the total when a word is truncated.
    pub integrity_factor: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            syllable_fit: 35.0,
            ideal_proximity: 5.0,
            repetition: 15.0,
            shape: 20.0,
            completeness: 10.0,
            catchiness: 15.0,
            integrity_factor: 0.1,
        }
    }
}

impl ScoringWeights {
    fn weight(&self, kind: ScoreComponentKind) -> f64 {
        match kind {
            ScoreComponentKind::SyllableFit => self.syllable_fit,
            ScoreComponentKind::IdealProximity => self.ideal_proximity,
            ScoreComponentKind::Repetition => self.repetition,
            ScoreComponentKind::Shape => self.shape,
            ScoreComponentKind::Completeness => self.completeness,
            ScoreComponentKind::Catchiness => self.catchiness,
        }
    }

    fn sum(&self) -> f64 {
        self.syllable_fit
            + self.ideal_proximity
            + self.repetition
            + self.shape
            + self.completeness
            + self.catchiness
    }

    pub fn validate(&self) -> Result<()> {
        let weights = [
            self.syllable_fit,
            self.ideal_proximity,
            self.repetition,
            self.shape,
            self.completeness,
            self.catchiness,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) || self.sum() <= 0.0 {
            return Err(LetraError::InvalidConfig(
                "scoring weights must be finite, non-negative and not all zero".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.integrity_factor) {
            return Err(LetraError::InvalidConfig(format!(
                "integrity_factor must be within 0..=1, got {}",
                self.integrity_factor
            )));
        }
        Ok(())
    }
}

/// Scores a validated lyric.
pub trait Scorer: Send + Sync {
    /// `reports` are the lyric's validation reports; a missing kind counts
    /// as clean.
    fn score(&self, lyric: &Lyric, genre: &GenreConfig, reports: &[ValidationReport]) -> ScoreBreakdown;
}

/// Weighted-sum scorer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositeScorer {
    pub weights: ScoringWeights,
}

impl CompositeScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }
}

fn error_lines(reports: &[ValidationReport], kind: ValidatorKind) -> BTreeSet<usize> {
    reports
        .iter()
        .filter(|r| r.kind == kind)
        .flat_map(|r| r.error_lines())
        .collect()
}

fn clean_ratio(flagged: usize, total: usize) -> f64 {
    1.0 - flagged.min(total) as f64 / total as f64
}

fn shape_ratio(lyric: &Lyric, genre: &GenreConfig, verse_count: usize) -> f64 {
    let ruled: Vec<f64> = lyric
        .sections()
        .iter()
        .filter(|s| genre.shape.rule_for(s.kind).is_some())
        .map(|s| match shape::section_violation(lyric, s, genre) {
            None => 1.0,
            Some(v) if v.severity == Severity::Warning => 0.5,
            Some(_) => 0.0,
        })
        .collect();
    // No ruled section means no shape violation either.
    let sections = if ruled.is_empty() {
        1.0
    } else {
        ruled.iter().sum::<f64>() / ruled.len() as f64
    };
    let unstacked = lyric
        .verse_lines()
        .filter(|(_, l)| shape::is_unstacked(l, genre))
        .count();
    sections * clean_ratio(unstacked, verse_count)
}

fn catchiness_ratio(chorus: &ChorusAnalysis) -> f64 {
    let mut ratio = 0.0;
    if chorus.has_hook {
        ratio += 0.5;
    }
    if chorus.repeated_verbatim {
        ratio += 1.0 / 3.0;
    }
    if chorus.cliches.is_empty() {
        ratio += 1.0 / 6.0;
    }
    ratio
}

impl Scorer for CompositeScorer {
    fn score(&self, lyric: &Lyric, genre: &GenreConfig, reports: &[ValidationReport]) -> ScoreBreakdown {
        let counts: Vec<usize> = lyric.verse_lines().map(|(_, l)| count_line(l)).collect();
        let n = counts.len();
        if n == 0 {
            return ScoreBreakdown::default();
        }

        let budget = genre.budget;
        let ideal = budget.ideal.max(1) as f64;
        let fit = counts.iter().filter(|&&c| budget.contains(c)).count() as f64 / n as f64;
        let proximity = counts
            .iter()
            .map(|&c| 1.0 - ((c as f64 - ideal).abs() / ideal).min(1.0))
            .sum::<f64>()
            / n as f64;
        let repetition = clean_ratio(error_lines(reports, ValidatorKind::Repetition).len(), n);
        let completeness = clean_ratio(error_lines(reports, ValidatorKind::Completeness).len(), n);
        let shape = shape_ratio(lyric, genre, n);
        let catchiness = catchiness_ratio(&validators::analyze_chorus(lyric));

        let components: Vec<ScoreComponent> = [
            (ScoreComponentKind::SyllableFit, fit),
            (ScoreComponentKind::IdealProximity, proximity),
            (ScoreComponentKind::Repetition, repetition),
            (ScoreComponentKind::Shape, shape),
            (ScoreComponentKind::Completeness, completeness),
            (ScoreComponentKind::Catchiness, catchiness),
        ]
        .into_iter()
        .map(|(kind, ratio)| {
            let weight = self.weights.weight(kind);
            ScoreComponent {
                kind,
                weight,
                ratio,
                points: weight * ratio,
            }
        })
        .collect();

        let sum = self.weights.sum();
        let mut total = if sum > 0.0 {
            components.iter().map(|c| c.points).sum::<f64>() / sum * MAX_SCORE
        } else {
            0.0
        };
        let integrity_penalty = reports
            .iter()
            .any(|r| r.kind == ValidatorKind::WordIntegrity && !r.is_valid);
        if integrity_penalty {
            total *= self.weights.integrity_factor;
        }

        ScoreBreakdown {
            total: round2(total.clamp(0.0, MAX_SCORE)),
            components,
            integrity_penalty,
        }
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Validate and score with the default weights.
pub fn score_lyric(lyric: &Lyric, genre: &GenreConfig) -> ScoreBreakdown {
    let reports = validators::validate_all(lyric, genre);
    CompositeScorer::default().score(lyric, genre, &reports)
}

/// Whether `challenger` displaces `incumbent`. Ties keep the incumbent.
pub fn prefer(challenger: f64, incumbent: f64) -> bool {
    challenger > incumbent
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAN: &str = "\
[Verso 1]
A estrada abre o caminho
O vento canta devagar
Eu sigo firme o meu destino
Com a luz do teu olhar
O tempo passa sem pressa
A gente aprende a sonhar

[Refrão]
Vem dançar comigo agora
Deixa a vida nos levar
Vem dançar comigo agora
Deixa a vida nos levar";

    #[test]
    fn test_default_weights_sum_to_scale() {
        let w = ScoringWeights::default();
        assert!((w.sum() - MAX_SCORE).abs() < f64::EPSILON);
        assert!(w.validate().is_ok());
    }

    #[test]
    fn test_clean_lyric_scores_high() {
        let breakdown = score_lyric(&Lyric::parse(CLEAN), &GenreConfig::default());
        assert!(breakdown.total > 80.0, "{}", breakdown.total);
        assert!(!breakdown.integrity_penalty);
        assert_eq!(breakdown.components.len(), 6);
    }

    #[test]
    fn test_truncation_is_disqualifying() {
        let broken = CLEAN.replace("caminho", "caminh");
        let clean = score_lyric(&Lyric::parse(CLEAN), &GenreConfig::default());
        let bad = score_lyric(&Lyric::parse(&broken), &GenreConfig::default());
        assert!(bad.integrity_penalty);
        assert!(bad.total <= 10.0);
        assert!(bad.total < clean.total / 5.0);
    }

    #[test]
    fn test_empty_lyric_scores_zero() {
        assert_eq!(score_lyric(&Lyric::parse("[Refrão]\n"), &GenreConfig::default()).total, 0.0);
    }

    #[test]
    fn test_headerless_lyric_keeps_shape_points() {
        let lyric = Lyric::parse("Vem dançar comigo agora\nDeixa a vida nos levar");
        let genre = GenreConfig::default();
        assert!(shape::validate(&lyric, &genre).is_valid);
        let breakdown = score_lyric(&lyric, &genre);
        let shape = breakdown
            .component(ScoreComponentKind::Shape)
            .expect("shape component");
        assert_eq!(shape.ratio, 1.0);
    }

    #[test]
    fn test_prefer_keeps_incumbent_on_ties() {
        assert!(!prefer(70.0, 70.0));
        assert!(prefer(70.5, 70.0));
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let w = ScoringWeights {
            integrity_factor: 1.5,
            ..ScoringWeights::default()
        };
        assert!(w.validate().is_err());
        let zero = ScoringWeights {
            syllable_fit: 0.0,
            ideal_proximity: 0.0,
            repetition: 0.0,
            shape: 0.0,
            completeness: 0.0,
            catchiness: 0.0,
            integrity_factor: 0.1,
        };
        assert!(zero.validate().is_err());
    }
}
