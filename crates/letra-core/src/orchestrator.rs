//! Multi-candidate orchestrator.
//!
//! Drives generation attempts through an injected [`Generator`], corrects,
//! validates and scores each output, retries until enough candidates pass
//! or the attempt budget runs out, then selects deterministically:
//!
//! 1. best accepted candidate (highest score, first seen on ties)
//! 2. otherwise the least-bad rejected candidate that still has verses
//! 3. otherwise [`EMERGENCY_LYRIC`]
//!
//! `run` never fails: generator errors and hard validation failures become
//! rejected attempts in the audit trail.

use std::collections::HashSet;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::correction::correct;
use crate::domain::{
    text_digest, AttemptRecord, AttemptStatus, Candidate, CandidateDiagnostics, GeneratorError,
    GenreConfig, LetraError, Lyric, LyricResult, ResultDiagnostics, Result, Selection,
};
use crate::generator::Generator;
use crate::obs::{
    emit_attempt_rejected, emit_candidate_accepted, emit_generator_failed, emit_run_finished,
    emit_run_started, RunSpan,
};
use crate::scoring::{prefer, Scorer};
use crate::validators::{hard_failure_reasons, validate_all};

/// Structurally valid lyric returned when no attempt produced usable text.
/// Every line sits between 7 and 9 poetic syllables, inside every built-in
/// genre budget.
pub const EMERGENCY_LYRIC: &str = "\
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
Deixa a vida nos levar

[Verso 2]
A noite acende as estrelas
O rio corre até o mar
Teu sorriso me dá paz
A saudade vira canção
Cada passo é um recomeço
Nada vai nos separar

[Refrão]
Vem dançar comigo agora
Deixa a vida nos levar
Vem dançar comigo agora
Deixa a vida nos levar";

const DUPLICATE_REASON: &str = "saída duplicada de uma candidata já aceita";
const EMPTY_REASON: &str = "a saída corrigida não tem versos";
const MAX_FEEDBACK_REASONS: usize = 5;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Attempt budget and acceptance policy for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Accepted candidates wanted before selection.
    pub desired_count: u32,
    /// Attempt multiplier used when `max_attempts` is unset.
    pub attempts_per_candidate: u32,
    /// Hard cap on generator calls.
    pub max_attempts: Option<u32>,
    /// Reject outputs identical to an already accepted one.
    pub reject_duplicates: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            desired_count: 3,
            attempts_per_candidate: 3,
            max_attempts: None,
            reject_duplicates: true,
        }
    }
}

impl OrchestratorConfig {
    /// Effective attempt budget.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.unwrap_or_else(|| {
            self.desired_count
                .saturating_mul(self.attempts_per_candidate)
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.desired_count == 0 {
            return Err(LetraError::InvalidConfig(
                "desired_count must be >= 1".to_string(),
            ));
        }
        if self.attempts_per_candidate == 0 {
            return Err(LetraError::InvalidConfig(
                "attempts_per_candidate must be >= 1".to_string(),
            ));
        }
        if self.max_attempts() < self.desired_count {
            return Err(LetraError::InvalidConfig(format!(
                "max_attempts ({}) must be >= desired_count ({})",
                self.max_attempts(),
                self.desired_count
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Orchestrator phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Attempting,
    Validating,
    Accepted,
    Rejected,
    Selecting,
    Done,
}

impl Phase {
    /// Whether `next` may follow `self`.
    pub fn can_advance_to(self, next: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, next),
            (Idle, Attempting)
                | (Idle, Selecting)
                | (Attempting, Validating)
                | (Attempting, Rejected)
                | (Validating, Accepted)
                | (Validating, Rejected)
                | (Accepted, Attempting)
                | (Accepted, Selecting)
                | (Rejected, Attempting)
                | (Rejected, Selecting)
                | (Selecting, Done)
        )
    }
}

struct PhaseTrail {
    phases: Vec<Phase>,
}

impl PhaseTrail {
    fn new() -> Self {
        Self {
            phases: vec![Phase::Idle],
        }
    }

    fn advance(&mut self, next: Phase) {
        let current = self.phases.last().copied().unwrap_or(Phase::Idle);
        if !current.can_advance_to(next) {
            tracing::error!(from = ?current, to = ?next, "unexpected phase transition");
        }
        tracing::trace!(from = ?current, to = ?next, "phase");
        self.phases.push(next);
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Everything one `run` produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// Every attempt that returned text, in generation order.
    pub candidates: Vec<Candidate>,
    /// Index into `candidates`; `None` for the emergency lyric.
    pub best_index: Option<usize>,
    pub best_score: f64,
    pub lyrics: String,
    pub selection: Selection,
    /// Diagnostics of the selected lyric.
    pub diagnostics: CandidateDiagnostics,
    pub attempts: Vec<AttemptRecord>,
    pub phases: Vec<Phase>,
}

impl RunOutcome {
    pub fn accepted_count(&self) -> usize {
        self.candidates.iter().filter(|c| c.is_accepted()).count()
    }

    /// Caller-facing shape: lyric, score and diagnostics.
    pub fn into_result(self) -> LyricResult {
        LyricResult {
            lyrics: self.lyrics,
            score: self.best_score,
            diagnostics: ResultDiagnostics {
                selection: self.selection,
                violations: self.diagnostics.reports,
                corrections: self.diagnostics.corrections,
                attempts: self.attempts,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Pure steps
// ---------------------------------------------------------------------------

/// Correct, validate and score one raw output.
///
/// `duplicate` marks an output whose digest matches an accepted candidate.
pub fn evaluate_attempt(
    attempt: u32,
    raw: &str,
    genre: &GenreConfig,
    scorer: &dyn Scorer,
    duplicate: bool,
) -> Candidate {
    let correction = correct(raw, genre);
    let lyric = Lyric::parse(&correction.text);
    let reports = validate_all(&lyric, genre);
    let breakdown = scorer.score(&lyric, genre, &reports);

    let mut reasons = hard_failure_reasons(&reports);
    if lyric.is_empty() {
        reasons.push(EMPTY_REASON.to_string());
    }
    if duplicate {
        reasons.push(DUPLICATE_REASON.to_string());
    }
    let status = if reasons.is_empty() {
        AttemptStatus::Accepted
    } else {
        AttemptStatus::Rejected { reasons }
    };

    Candidate {
        attempt,
        raw_digest: text_digest(raw),
        text: correction.text,
        score: breakdown.total,
        status,
        diagnostics: CandidateDiagnostics {
            reports,
            corrections: correction.records,
            breakdown,
        },
    }
}

/// Prompt for the next attempt: the base prompt plus the reasons the
/// previous candidate was rejected.
pub fn retry_prompt(base: &str, reasons: &[String]) -> String {
    if reasons.is_empty() {
        return base.to_string();
    }
    let notes: Vec<String> = reasons
        .iter()
        .take(MAX_FEEDBACK_REASONS)
        .map(|r| format!("- {r}"))
        .collect();
    format!(
        "{base}\n\nA tentativa anterior foi rejeitada. Evite:\n{}",
        notes.join("\n")
    )
}

/// Best candidate among those `eligible`, first seen on ties.
fn best_where(candidates: &[Candidate], eligible: impl Fn(&Candidate) -> bool) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, c) in candidates.iter().enumerate().filter(|&(_, c)| eligible(c)) {
        match best {
            Some(b) if !prefer(c.score, candidates[b].score) => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Selection policy over a finished attempt list.
pub fn select(candidates: &[Candidate]) -> (Option<usize>, Selection) {
    if let Some(i) = best_where(candidates, Candidate::is_accepted) {
        return (Some(i), Selection::Accepted);
    }
    let has_verses = |c: &Candidate| !Lyric::parse(&c.text).is_empty();
    match best_where(candidates, has_verses) {
        Some(i) => (Some(i), Selection::LeastBadRejected),
        None => (None, Selection::Emergency),
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_millis()).unwrap_or(u64::MAX)
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Orchestrator {
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(config: OrchestratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Generate, correct, validate and score until `desired_count`
    /// candidates pass or the attempt budget is spent, then select.
    ///
    /// Generator calls are sequential. Dropping the future between attempts
    /// cancels the run.
    pub async fn run(
        &self,
        generator: &dyn Generator,
        scorer: &dyn Scorer,
        genre: &GenreConfig,
        base_prompt: &str,
    ) -> RunOutcome {
        let run_id = Uuid::new_v4().to_string();
        let _span = RunSpan::enter(&run_id);
        let started_at = Utc::now();
        let started = Instant::now();

        let desired = self.config.desired_count as usize;
        let max_attempts = self.config.max_attempts();
        emit_run_started(&run_id, &genre.name, self.config.desired_count, max_attempts);

        let mut trail = PhaseTrail::new();
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut attempts: Vec<AttemptRecord> = Vec::new();
        let mut accepted_digests: HashSet<String> = HashSet::new();
        let mut accepted = 0usize;
        let mut feedback: Vec<String> = Vec::new();

        for attempt in 1..=max_attempts {
            if accepted >= desired {
                break;
            }
            trail.advance(Phase::Attempting);
            let prompt = retry_prompt(base_prompt, &feedback);
            let attempt_started = Instant::now();

            let raw = match generator.generate(&prompt).await {
                Ok(text) if text.trim().is_empty() => Err(GeneratorError::Empty),
                other => other,
            };
            let raw = match raw {
                Ok(text) => text,
                Err(e) => {
                    trail.advance(Phase::Rejected);
                    emit_generator_failed(&run_id, attempt, &e);
                    attempts.push(AttemptRecord {
                        attempt,
                        status: AttemptStatus::GeneratorFailed {
                            error: e.to_string(),
                        },
                        score: None,
                        candidate_index: None,
                        duration_ms: elapsed_ms(attempt_started),
                    });
                    continue;
                }
            };

            trail.advance(Phase::Validating);
            let duplicate = self.config.reject_duplicates
                && accepted_digests.contains(&text_digest(&raw));
            let candidate = evaluate_attempt(attempt, &raw, genre, scorer, duplicate);

            match &candidate.status {
                AttemptStatus::Accepted => {
                    trail.advance(Phase::Accepted);
                    emit_candidate_accepted(&run_id, attempt, candidate.score);
                    accepted_digests.insert(candidate.raw_digest.clone());
                    accepted += 1;
                    feedback.clear();
                }
                AttemptStatus::Rejected { reasons } => {
                    trail.advance(Phase::Rejected);
                    emit_attempt_rejected(&run_id, attempt, reasons);
                    feedback = reasons.clone();
                }
                AttemptStatus::GeneratorFailed { .. } => trail.advance(Phase::Rejected),
            }

            attempts.push(AttemptRecord {
                attempt,
                status: candidate.status.clone(),
                score: Some(candidate.score),
                candidate_index: Some(candidates.len()),
                duration_ms: elapsed_ms(attempt_started),
            });
            candidates.push(candidate);
        }

        trail.advance(Phase::Selecting);
        let (best_index, selection) = select(&candidates);
        let (lyrics, best_score, diagnostics) = match best_index.and_then(|i| candidates.get(i)) {
            Some(best) => (best.text.clone(), best.score, best.diagnostics.clone()),
            None => {
                tracing::warn!(run_id = %run_id, "no usable generator output, using emergency lyric");
                let lyric = Lyric::parse(EMERGENCY_LYRIC);
                let reports = validate_all(&lyric, genre);
                let breakdown = scorer.score(&lyric, genre, &reports);
                (
                    EMERGENCY_LYRIC.to_string(),
                    breakdown.total,
                    CandidateDiagnostics {
                        reports,
                        corrections: Vec::new(),
                        breakdown,
                    },
                )
            }
        };
        trail.advance(Phase::Done);

        let duration_ms = elapsed_ms(started);
        let outcome = RunOutcome {
            run_id,
            started_at,
            duration_ms,
            candidates,
            best_index,
            best_score,
            lyrics,
            selection,
            diagnostics,
            attempts,
            phases: trail.phases,
        };
        emit_run_finished(
            &outcome.run_id,
            duration_ms,
            outcome.attempts.len(),
            outcome.accepted_count(),
            selection,
            best_score,
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::ScriptedGenerator;
    use crate::scoring::CompositeScorer;
    use crate::validators::all_valid;

    #[test]
    fn test_config_budget_and_validation() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.max_attempts(), 9);
        assert!(config.validate().is_ok());

        let zero = OrchestratorConfig {
            desired_count: 0,
            ..OrchestratorConfig::default()
        };
        assert!(Orchestrator::new(zero).is_err());

        let tight = OrchestratorConfig {
            desired_count: 4,
            max_attempts: Some(2),
            ..OrchestratorConfig::default()
        };
        assert!(tight.validate().is_err());
    }

    #[test]
    fn test_phase_transitions() {
        assert!(Phase::Idle.can_advance_to(Phase::Attempting));
        assert!(Phase::Attempting.can_advance_to(Phase::Rejected));
        assert!(Phase::Rejected.can_advance_to(Phase::Selecting));
        assert!(!Phase::Done.can_advance_to(Phase::Attempting));
        assert!(!Phase::Idle.can_advance_to(Phase::Accepted));
    }

    #[test]
    fn test_emergency_lyric_is_valid_for_every_builtin_genre() {
        let lyric = Lyric::parse(EMERGENCY_LYRIC);
        for genre in crate::domain::GenreCatalog::builtin().iter() {
            let reports = validate_all(&lyric, genre);
            assert!(all_valid(&reports), "{}: {:?}", genre.name, reports);
        }
    }

    #[test]
    fn test_retry_prompt_appends_reasons() {
        assert_eq!(retry_prompt("samba", &[]), "samba");
        let prompt = retry_prompt("samba", &["palavra truncada 'coraç'".to_string()]);
        assert!(prompt.starts_with("samba\n"));
        assert!(prompt.contains("- palavra truncada 'coraç'"));
    }

    #[tokio::test]
    async fn test_run_feeds_rejections_into_next_prompt() {
        let generator = ScriptedGenerator::from_texts([
            "[Refrão]\nMeu soliã bate forte agora\nMeu soliã bate forte agora",
            EMERGENCY_LYRIC,
        ]);
        let orchestrator = Orchestrator::new(OrchestratorConfig {
            desired_count: 1,
            ..OrchestratorConfig::default()
        })
        .expect("valid config");
        let outcome = orchestrator
            .run(&generator, &CompositeScorer::default(), &GenreConfig::default(), "samba")
            .await;

        let prompts = generator.prompts().await;
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0], "samba");
        assert!(prompts[1].contains("word_integrity"));
        assert_eq!(outcome.selection, Selection::Accepted);
        assert_eq!(outcome.best_index, Some(1));
        assert_eq!(outcome.phases.last(), Some(&Phase::Done));
    }
}
