//! LETRA Core Library
//!
//! Prosody validation, deterministic correction and multi-candidate
//! selection for AI-generated Brazilian Portuguese song lyrics.

pub mod config;
pub mod correction;
pub mod domain;
pub mod generator;
pub mod obs;
pub mod orchestrator;
pub mod rewrite;
pub mod scoring;
pub mod syllable;
pub mod telemetry;
pub mod text;
pub mod validators;

pub use domain::{
    AttemptRecord, AttemptStatus, Candidate, CandidateDiagnostics, CorrectionRecord,
    CorrectionStep, GeneratorError, GenreCatalog, GenreConfig, LetraError, LineKind, Lyric,
    LyricResult, Result, SectionKind, Selection, Severity, SyllableBudget, ValidationReport,
    ValidatorKind, Violation, ViolationDetail,
};

pub use config::LetraConfig;
pub use correction::{correct, CorrectionOutcome};
pub use generator::{FnGenerator, Generator, ScriptedGenerator, TimeoutGenerator};
pub use orchestrator::{
    evaluate_attempt, retry_prompt, Orchestrator, OrchestratorConfig, Phase, RunOutcome,
    EMERGENCY_LYRIC,
};
pub use rewrite::{reduce_line, suggest_rewrites};
pub use scoring::{
    score_lyric, CompositeScorer, ScoreBreakdown, ScoreComponentKind, Scorer, ScoringWeights,
    MAX_SCORE,
};
pub use syllable::{count_line, count_word, line_breakdown, WordSyllables};
pub use validators::{all_valid, has_hard_failure, validate_all, VerseCompleter};

pub use obs::RunSpan;
pub use telemetry::init_tracing;

/// LETRA version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
