//! Domain models for LETRA.
//!
//! Canonical definitions for the core entities:
//! - `LineKind`: shared line classification
//! - `Lyric` / `Section`: the text under validation
//! - `GenreConfig`: immutable syllable budget and section shape
//! - `ValidationReport`: unified validator output
//! - `Candidate`: one scored attempt of the orchestrator

pub mod candidate;
pub mod error;
pub mod genre;
pub mod line;
pub mod lyric;
pub mod report;

pub use candidate::{
    text_digest, AttemptRecord, AttemptStatus, Candidate, CandidateDiagnostics,
    CorrectionRecord, CorrectionStep, LyricResult, ResultDiagnostics, Selection,
};
pub use error::{GeneratorError, LetraError, Result};
pub use genre::{
    GenreCatalog, GenreConfig, LineCountRule, SectionRule, SectionShape, SyllableBudget,
    DEFAULT_GENRE,
};
pub use line::{classify, is_verse, LineKind};
pub use lyric::{Lyric, Section, SectionKind};
pub use report::{Severity, ValidationReport, ValidatorKind, Violation, ViolationDetail};
