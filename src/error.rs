//! Fatal error taxonomy.
//!
//! Anything in here aborts the run with exit code 2. Per-skill problems are
//! never errors in this sense; they are [`crate::model::ValidationIssue`]s.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

/// Conditions under which the set of skills to validate cannot be established.
#[derive(Error, Debug)]
pub enum ValidatorError {
    #[error("repository root not found or not a directory: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("registry {} is not valid JSON: {source}", path.display())]
    RegistryParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("registry {} has an unsupported shape: {reason}", path.display())]
    RegistryShape { path: PathBuf, reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ValidatorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ValidatorError>;
