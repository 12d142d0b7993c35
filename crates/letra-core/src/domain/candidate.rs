//! Candidates, attempt records and the caller-facing result.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::report::{Severity, ValidationReport, Violation};
use crate::scoring::ScoreBreakdown;

/// Correction pipeline step that produced a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionStep {
    StripArtifacts,
    Capitalize,
    SectionShape,
    WordIntegrity,
    Repetition,
    SyllableRewrite,
    SplitLine,
    Spacing,
    /// Line replaced by an external verse completer.
    Completion,
}

/// One change applied by the correction pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionRecord {
    pub step: CorrectionStep,
    /// 1-based line number at the time of the step; `None` for removals or
    /// lyric-wide changes.
    pub line: Option<usize>,
    pub before: String,
    pub after: String,
}

impl CorrectionRecord {
    pub fn new(
        step: CorrectionStep,
        index: Option<usize>,
        before: impl Into<String>,
        after: impl Into<String>,
    ) -> Self {
        Self {
            step,
            line: index.map(|i| i + 1),
            before: before.into(),
            after: after.into(),
        }
    }
}

/// Outcome of one orchestrator attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptStatus {
    Accepted,
    Rejected { reasons: Vec<String> },
    GeneratorFailed { error: String },
}

impl AttemptStatus {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Everything the pipeline learned about one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateDiagnostics {
    pub reports: Vec<ValidationReport>,
    pub corrections: Vec<CorrectionRecord>,
    pub breakdown: ScoreBreakdown,
}

impl CandidateDiagnostics {
    /// Error-severity violations across all reports.
    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.reports
            .iter()
            .flat_map(|r| r.violations.iter())
            .filter(|v| v.severity == Severity::Error)
    }
}

/// A scored, immutable attempt. A corrected lyric is a new candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// 1-based attempt number that produced this candidate.
    pub attempt: u32,
    /// SHA-256 hex digest of the raw generator output.
    pub raw_digest: String,
    /// Corrected lyric text.
    pub text: String,
    pub score: f64,
    pub status: AttemptStatus,
    pub diagnostics: CandidateDiagnostics,
}

impl Candidate {
    pub fn is_accepted(&self) -> bool {
        self.status.is_accepted()
    }
}

/// Digest used to recognise duplicate generator outputs.
pub fn text_digest(text: &str) -> String {
    hex::encode(Sha256::digest(text.trim().as_bytes()))
}

/// Audit entry for one attempt, whether or not it produced text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub attempt: u32,
    pub status: AttemptStatus,
    pub score: Option<f64>,
    /// Index into the run's candidate list when text came back.
    pub candidate_index: Option<usize>,
    pub duration_ms: u64,
}

/// How the final lyric was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// Best accepted candidate.
    Accepted,
    /// No candidate passed; the highest-scoring rejected one was used.
    LeastBadRejected,
    /// The generator never produced usable text.
    Emergency,
}

/// Diagnostics exposed to the caller next to the lyric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultDiagnostics {
    pub selection: Selection,
    pub violations: Vec<ValidationReport>,
    pub corrections: Vec<CorrectionRecord>,
    pub attempts: Vec<AttemptRecord>,
}

/// Caller-facing result: always a lyric and a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricResult {
    pub lyrics: String,
    pub score: f64,
    pub diagnostics: ResultDiagnostics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_ignores_outer_whitespace() {
        assert_eq!(text_digest("abc\n"), text_digest("  abc"));
        assert_ne!(text_digest("abc"), text_digest("abd"));
        assert_eq!(text_digest("abc").len(), 64);
    }

    #[test]
    fn test_attempt_status_tag() {
        let status = AttemptStatus::Rejected {
            reasons: vec!["palavra truncada".to_string()],
        };
        let json = serde_json::to_value(&status).expect("serialize");
        assert_eq!(json["status"], "rejected");
        assert!(!status.is_accepted());
    }

    #[test]
    fn test_correction_record_is_one_based() {
        let r = CorrectionRecord::new(CorrectionStep::Spacing, Some(0), "a  b", "a b");
        assert_eq!(r.line, Some(1));
    }
}
