//! Validator configuration.
//!
//! Settings come from three layers, highest precedence first: command-line
//! flags, an optional `validate-skills.toml` at the repository root, and the
//! built-in defaults below.
//!
//! # Example Configuration
//!
//! ```toml
//! max_lines = 400
//! max_description_chars = 300
//! registry = "skills_index.json"
//! skip_dirs = ["drafts", "templates"]
//! require_registry = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up at the repository root when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "validate-skills.toml";

/// Default body line budget for `SKILL.md`.
pub const DEFAULT_MAX_LINES: usize = 500;

/// Default upper bound on `description` length, in characters.
pub const DEFAULT_MAX_DESCRIPTION_CHARS: usize = 500;

/// Default registry file name, relative to the repository root.
pub const DEFAULT_REGISTRY: &str = "skills_index.json";

/// Directory names that never hold skills.
pub const BUILTIN_SKIP_DIRS: &[&str] = &["shared", "scripts", "evals", "docs", "__pycache__", ".git"];

/// Errors that can occur when loading the validator config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Validation error: {0}")]
    Validation(String),
}

/// On-disk shape of `validate-skills.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub max_lines: Option<usize>,
    #[serde(default)]
    pub max_description_chars: Option<usize>,
    #[serde(default)]
    pub registry: Option<String>,
    #[serde(default)]
    pub skip_dirs: Vec<String>,
    #[serde(default)]
    pub require_registry: Option<bool>,
}

impl ConfigFile {
    /// Load a config file.
    ///
    /// When `explicit` is false a missing file yields the empty config; an
    /// explicitly requested file must exist.
    pub fn load(path: &Path, explicit: bool) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if !explicit && e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let parsed: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(parsed)
    }
}

/// Command-line values that override the config file when present.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub max_lines: Option<usize>,
}

/// Fully resolved settings for one validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorConfig {
    pub max_lines: usize,
    pub max_description_chars: usize,
    pub registry: String,
    pub skip_dirs: Vec<String>,
    pub require_registry: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_lines: DEFAULT_MAX_LINES,
            max_description_chars: DEFAULT_MAX_DESCRIPTION_CHARS,
            registry: DEFAULT_REGISTRY.to_string(),
            skip_dirs: BUILTIN_SKIP_DIRS.iter().map(|s| (*s).to_string()).collect(),
            require_registry: false,
        }
    }
}

impl ValidatorConfig {
    /// Merge defaults, the config file and command-line overrides.
    pub fn resolve(file: ConfigFile, overrides: &Overrides) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(max_lines) = file.max_lines {
            config.max_lines = max_lines;
        }
        if let Some(max_chars) = file.max_description_chars {
            config.max_description_chars = max_chars;
        }
        if let Some(registry) = file.registry {
            config.registry = registry;
        }
        if let Some(require) = file.require_registry {
            config.require_registry = require;
        }
        for dir in file.skip_dirs {
            if !config.skip_dirs.contains(&dir) {
                config.skip_dirs.push(dir);
            }
        }

        if let Some(max_lines) = overrides.max_lines {
            config.max_lines = max_lines;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load `validate-skills.toml` (or `explicit`) and resolve it against the overrides.
    pub fn load(
        root: &Path,
        explicit: Option<&Path>,
        overrides: &Overrides,
    ) -> Result<Self, ConfigError> {
        let file = match explicit {
            Some(path) => ConfigFile::load(path, true)?,
            None => ConfigFile::load(&root.join(CONFIG_FILE_NAME), false)?,
        };
        Self::resolve(file, overrides)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_lines == 0 {
            return Err(ConfigError::Validation("max_lines must be at least 1".into()));
        }
        if self.max_description_chars == 0 {
            return Err(ConfigError::Validation(
                "max_description_chars must be at least 1".into(),
            ));
        }
        let registry = Path::new(&self.registry);
        if self.registry.trim().is_empty() || registry.is_absolute() {
            return Err(ConfigError::Validation(
                "registry must be a path relative to the repository root".into(),
            ));
        }
        Ok(())
    }

    /// Whether a top-level directory name is excluded from scanning.
    pub fn is_skipped(&self, dir_name: &str) -> bool {
        dir_name.starts_with('.') || self.skip_dirs.iter().any(|d| d == dir_name)
    }
}
