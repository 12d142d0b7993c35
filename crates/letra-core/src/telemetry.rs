//! Tracing setup for the `letra` binary.
//!
//! Log lines go to stderr so stdout carries only command output. Filtering
//! reads `LETRA_LOG`, then `RUST_LOG`, then falls back to the verbosity the
//! caller passes, scoped to LETRA's own targets.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding `EnvFilter` directives for LETRA.
pub const LOG_ENV: &str = "LETRA_LOG";

/// Directives used when neither `LETRA_LOG` nor `RUST_LOG` is set.
/// Dependencies stay at `warn`.
pub fn default_directives(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    format!("warn,letra_core={level},letra={level}")
}

fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

/// Install the global subscriber. Only the first call per process wins.
///
/// JSON output carries the enclosing `letra.run` span, so every event of an
/// orchestrator run is tagged with its `run_id`.
pub fn init_tracing(json: bool, level: Level) {
    let filter = env_filter(level);
    let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let installed = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.json().with_current_span(true).with_span_list(false))
            .try_init()
    } else {
        tracing_subscriber::registry().with(filter).with(layer).try_init()
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_scope_letra_targets() {
        let directives = default_directives(Level::DEBUG);
        assert_eq!(directives, "warn,letra_core=debug,letra=debug");
        assert!(EnvFilter::try_new(&directives).is_ok());
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_tracing(false, Level::WARN);
        init_tracing(true, Level::DEBUG);
        tracing::debug!("still alive");
    }
}
