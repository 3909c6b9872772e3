//! Core types shared by the scanner, the checks and the report.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Closed set of skill categories known to the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Accessibility,
    ApiTesting,
    BddTesting,
    CloudTesting,
    Devops,
    E2eTesting,
    MobileTesting,
    PerformanceTesting,
    SecurityTesting,
    UnitTesting,
    VisualTesting,
}

impl Category {
    pub const ALL: &'static [Category] = &[
        Category::Accessibility,
        Category::ApiTesting,
        Category::BddTesting,
        Category::CloudTesting,
        Category::Devops,
        Category::E2eTesting,
        Category::MobileTesting,
        Category::PerformanceTesting,
        Category::SecurityTesting,
        Category::UnitTesting,
        Category::VisualTesting,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accessibility => "accessibility",
            Self::ApiTesting => "api-testing",
            Self::BddTesting => "bdd-testing",
            Self::CloudTesting => "cloud-testing",
            Self::Devops => "devops",
            Self::E2eTesting => "e2e-testing",
            Self::MobileTesting => "mobile-testing",
            Self::PerformanceTesting => "performance-testing",
            Self::SecurityTesting => "security-testing",
            Self::UnitTesting => "unit-testing",
            Self::VisualTesting => "visual-testing",
        }
    }

    /// Comma-separated list of every valid category, for diagnostics.
    pub fn valid_list() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// How bad an issue is. Only errors fail a skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which side of the registry/directory bijection is broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryDirection {
    /// A skill directory exists but the registry does not list it.
    MissingFromRegistry,
    /// The registry lists a skill that has no directory.
    MissingDirectory,
    /// The registry lists the same name more than once.
    DuplicateEntry,
}

/// Tagged issue kind, serialized flat next to the issue fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    ParseError,
    SchemaError { field: String },
    StructureError,
    BudgetError { lines: usize, max: usize },
    ReferenceError { target: String },
    RegistryMismatchError { direction: RegistryDirection },
    DuplicateNameError { paths: Vec<String> },
}

impl IssueKind {
    pub fn schema(field: impl Into<String>) -> Self {
        Self::SchemaError {
            field: field.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ParseError => "parse_error",
            Self::SchemaError { .. } => "schema_error",
            Self::StructureError => "structure_error",
            Self::BudgetError { .. } => "budget_error",
            Self::ReferenceError { .. } => "reference_error",
            Self::RegistryMismatchError { .. } => "registry_mismatch_error",
            Self::DuplicateNameError { .. } => "duplicate_name_error",
        }
    }
}

/// One detected problem. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub skill: String,
    /// File the issue pertains to, relative to the repository root.
    pub file: String,
    #[serde(flatten)]
    pub kind: IssueKind,
    pub severity: Severity,
    pub message: String,
}

impl ValidationIssue {
    pub fn error(
        skill: impl Into<String>,
        file: impl Into<String>,
        kind: IssueKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            skill: skill.into(),
            file: file.into(),
            kind,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warning(
        skill: impl Into<String>,
        file: impl Into<String>,
        kind: IssueKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(skill, file, kind, message)
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Total order used for deterministic output.
    pub fn sort_key(&self) -> (&str, &str, Severity, &'static str, &str) {
        (
            &self.skill,
            &self.file,
            self.severity,
            self.kind.name(),
            &self.message,
        )
    }
}

/// Frontmatter that passed every schema rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillMetadata {
    pub name: String,
    pub description: String,
    pub languages: Vec<String>,
    pub category: Category,
}

/// A fully validated skill package.
#[derive(Debug, Clone)]
pub struct Skill {
    pub directory_name: String,
    pub path: PathBuf,
    pub metadata: SkillMetadata,
    /// Markdown files found directly under `reference/`.
    pub reference_files: BTreeSet<PathBuf>,
    pub body_line_count: usize,
}
