//! TOML configuration.
//!
//! Every field has a default, so an empty file is a valid configuration:
//!
//! ```toml
//! [orchestrator]
//! desired_count = 2
//! max_attempts = 8
//!
//! [scoring]
//! catchiness = 20.0
//!
//! [[genres]]
//! name = "axe"
//! budget = { min = 5, ideal = 7, max = 9 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{GenreCatalog, GenreConfig, Result};
use crate::orchestrator::OrchestratorConfig;
use crate::scoring::ScoringWeights;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LetraConfig {
    pub orchestrator: OrchestratorConfig,
    pub scoring: ScoringWeights,
    /// Genres added to, or replacing, the built-in catalog by name.
    pub genres: Vec<GenreConfig>,
}

impl LetraConfig {
    /// Parse and validate.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading config");
        Self::from_toml_str(&raw)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Built-in catalog with this config's overrides applied.
    pub fn catalog(&self) -> GenreCatalog {
        GenreCatalog::builtin().with_overrides(self.genres.clone())
    }

    pub fn validate(&self) -> Result<()> {
        self.orchestrator.validate()?;
        self.scoring.validate()?;
        self.catalog().validate()
    }
}
