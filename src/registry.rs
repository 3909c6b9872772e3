//! The master skill registry (`skills_index.json`) and its cross-check
//! against the discovered skill directories.
//!
//! Accepted shapes:
//!
//! ```json
//! ["playwright-skill", {"name": "cypress-skill", "category": "e2e-testing"}]
//! {"skills": ["playwright-skill", "cypress-skill"]}
//! ```

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::{Result, ValidatorError};
use crate::model::{IssueKind, RegistryDirection, ValidationIssue};

/// Skill name used when an issue concerns the registry as a whole.
pub const REGISTRY_PSEUDO_SKILL: &str = "<registry>";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RegistryDoc {
    List(Vec<RegistryEntry>),
    Object { skills: Vec<RegistryEntry> },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RegistryEntry {
    Name(String),
    Record { name: String },
}

impl RegistryEntry {
    fn into_name(self) -> String {
        match self {
            Self::Name(name) | Self::Record { name } => name,
        }
    }
}

#[derive(Serialize)]
struct RegistryOut<'a> {
    skills: &'a [String],
}

/// Registry contents in file order, duplicates preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    pub entries: Vec<String>,
}

impl Registry {
    /// Read `root/file_name`. A missing file is `Ok(None)`; anything else
    /// that prevents reading it is fatal.
    pub fn load(root: &Path, file_name: &str) -> Result<Option<Self>> {
        let path = root.join(file_name);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "registry file not found");
                return Ok(None);
            }
            Err(source) => return Err(ValidatorError::io(path, source)),
        };
        Self::parse(&path, &text).map(Some)
    }

    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|source| ValidatorError::RegistryParse {
                path: path.to_path_buf(),
                source,
            })?;

        let doc: RegistryDoc =
            serde_json::from_value(value).map_err(|_| ValidatorError::RegistryShape {
                path: PathBuf::from(path),
                reason: "expected an array of skill names or an object with a \"skills\" array"
                    .into(),
            })?;

        let entries = match doc {
            RegistryDoc::List(entries) | RegistryDoc::Object { skills: entries } => entries,
        };
        Ok(Self {
            entries: entries.into_iter().map(RegistryEntry::into_name).collect(),
        })
    }

    /// Build a registry listing exactly `names`, sorted and deduplicated.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Serialize in the `{"skills": [...]}` shape.
    pub fn to_json(&self) -> String {
        let out = RegistryOut {
            skills: &self.entries,
        };
        // A list of strings always serializes.
        serde_json::to_string_pretty(&out).unwrap_or_default()
    }

    pub fn names(&self) -> BTreeSet<&str> {
        self.entries.iter().map(String::as_str).collect()
    }
}

/// Compare the registry with the discovered directory names in both directions.
///
/// Runs once per validation, after every skill has been scanned. Issues are
/// attributed to the skill name involved and to the registry file.
pub fn cross_check(
    registry: &Registry,
    registry_file: &str,
    discovered: &BTreeSet<String>,
) -> Vec<ValidationIssue> {
    let listed = registry.names();
    let mut issues = Vec::new();

    for name in discovered {
        if !listed.contains(name.as_str()) {
            issues.push(ValidationIssue::error(
                name,
                registry_file,
                IssueKind::RegistryMismatchError {
                    direction: RegistryDirection::MissingFromRegistry,
                },
                format!("skill directory '{name}' is not listed in {registry_file}"),
            ));
        }
    }

    for name in &listed {
        if !discovered.contains(*name) {
            issues.push(ValidationIssue::error(
                *name,
                registry_file,
                IssueKind::RegistryMismatchError {
                    direction: RegistryDirection::MissingDirectory,
                },
                format!("{registry_file} lists '{name}' but no such skill directory exists"),
            ));
        }
    }

    let repeated = registry
        .entries
        .iter()
        .counts()
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .sorted();
    for (name, count) in repeated {
        issues.push(ValidationIssue::error(
            name,
            registry_file,
            IssueKind::RegistryMismatchError {
                direction: RegistryDirection::DuplicateEntry,
            },
            format!("{registry_file} lists '{name}' {count} times"),
        ));
    }

    issues
}

/// Issue raised when the registry is required but absent.
pub fn missing_registry(registry_file: &str) -> ValidationIssue {
    ValidationIssue::error(
        REGISTRY_PSEUDO_SKILL,
        registry_file,
        IssueKind::RegistryMismatchError {
            direction: RegistryDirection::MissingFromRegistry,
        },
        format!("{registry_file} not found"),
    )
}
