//! Domain-level error taxonomy for LETRA.

/// Errors raised by an external text collaborator (generator or completer).
///
/// These never escape `Orchestrator::run`; they are recorded as rejected
/// attempts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeneratorError {
    #[error("generator failed: {0}")]
    Upstream(String),

    #[error("generator returned empty output")]
    Empty,

    #[error("generator timed out after {0} ms")]
    Timeout(u64),

    #[error("generator exhausted: no scripted output left")]
    Exhausted,
}

/// LETRA domain errors.
#[derive(Debug, thiserror::Error)]
pub enum LetraError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("unknown section kind: {0}")]
    UnknownSectionKind(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for LETRA domain operations.
pub type Result<T> = std::result::Result<T, LetraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letra_error_display() {
        let err = LetraError::InvalidConfig("desired_count must be >= 1".to_string());
        assert!(err.to_string().contains("invalid config"));

        let err = LetraError::UnknownSectionKind("coda".to_string());
        assert!(err.to_string().contains("coda"));
    }

    #[test]
    fn test_toml_serialization_error_converts() {
        let err: LetraError = <toml::ser::Error as serde::ser::Error>::custom("unsupported").into();
        assert!(matches!(err, LetraError::Serialization(_)));
        assert!(err.to_string().contains("unsupported"));
    }

    #[test]
    fn test_generator_error_display() {
        assert!(GeneratorError::Empty.to_string().contains("empty"));
        assert!(GeneratorError::Timeout(3000).to_string().contains("3000"));
        let err = GeneratorError::Upstream("503 service unavailable".to_string());
        assert!(err.to_string().contains("503"));
    }
}
