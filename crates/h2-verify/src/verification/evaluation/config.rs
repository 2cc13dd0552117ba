use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::super::domain::ProductionMethod;
use super::policy::DecisionPolicy;
use super::seasonal::SeasonalFactorTable;
use super::standards::MethodStandardsTable;

/// Reference tables and decision bounds injected into the engine at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    pub standards: MethodStandardsTable,
    pub seasonal: SeasonalFactorTable,
    #[serde(default)]
    pub policy: DecisionPolicy,
}

impl EvaluationConfig {
    /// Built-in tables used when no engine configuration file is supplied.
    pub fn standard() -> Self {
        Self {
            standards: MethodStandardsTable::standard(),
            seasonal: SeasonalFactorTable::standard(),
            policy: DecisionPolicy::default(),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigurationError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.standards.validate()?;
        self.seasonal.validate()?;
        self.policy.validate()
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Missing or invalid reference data. Fatal at startup, never defaulted.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("unable to read engine configuration {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("engine configuration is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("fallback method '{}' has no standard in the table", .0.label())]
    MissingFallbackStandard(ProductionMethod),
    #[error("standard for '{}' is invalid: {reason}", .method.label())]
    InvalidStandard {
        method: ProductionMethod,
        reason: String,
    },
    #[error("seasonal factor {factor} for month {month} is outside [0.90, 1.10]")]
    SeasonalFactorOutOfRange { month: u32, factor: f64 },
    #[error("decision policy is invalid: {0}")]
    InvalidPolicy(String),
}
