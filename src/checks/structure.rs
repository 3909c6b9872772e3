//! Metadata contract and package layout rules.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::checks::references;
use crate::frontmatter::RawMetadata;
use crate::model::{Category, IssueKind, SkillMetadata, ValidationIssue};
use crate::scan::SkillDir;

/// Path every skill is expected to ship as its long-form companion.
pub const PLAYBOOK: &str = "reference/playbook.md";

static KEBAB_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("static regex"));

/// Apply the schema rules to parsed frontmatter.
///
/// Returns the typed metadata only when every rule passes. Nothing is
/// corrected: each violated rule yields one `SchemaError`.
pub fn check_metadata(
    dir: &SkillDir,
    raw: &RawMetadata,
    max_description_chars: usize,
) -> (Option<SkillMetadata>, Vec<ValidationIssue>) {
    let file = dir.display_file();
    let mut issues = Vec::new();
    let mut schema_error = |field: &str, message: String| {
        issues.push(ValidationIssue::error(
            &dir.name,
            &file,
            IssueKind::schema(field),
            message,
        ));
    };

    match raw.name.as_deref().map(str::trim) {
        None => schema_error("name", "missing required field 'name'".into()),
        Some("") => schema_error("name", "field 'name' is empty".into()),
        Some(name) => {
            if name != dir.name {
                schema_error(
                    "name",
                    format!("name '{name}' does not match directory '{}'", dir.name),
                );
            }
            if !KEBAB_CASE.is_match(name) {
                schema_error("name", format!("name '{name}' is not lowercase kebab-case"));
            }
        }
    }

    match raw.description.as_deref().map(str::trim) {
        None => schema_error("description", "missing required field 'description'".into()),
        Some("") => schema_error("description", "field 'description' is empty".into()),
        Some(description) => {
            let chars = description.chars().count();
            if chars > max_description_chars {
                schema_error(
                    "description",
                    format!("description is {chars} characters (max {max_description_chars})"),
                );
            }
        }
    }

    match raw.languages.as_deref() {
        None => schema_error("languages", "missing required field 'languages'".into()),
        Some([]) => schema_error("languages", "field 'languages' is an empty list".into()),
        Some(languages) => {
            if languages.iter().any(|l| l.trim().is_empty()) {
                schema_error("languages", "field 'languages' contains a blank entry".into());
            }
        }
    }

    let category = match raw.category.as_deref().map(str::trim) {
        None => {
            schema_error("category", "missing required field 'category'".into());
            None
        }
        Some("") => {
            schema_error("category", "field 'category' is empty".into());
            None
        }
        Some(value) => match value.parse::<Category>() {
            Ok(category) => Some(category),
            Err(_) => {
                schema_error(
                    "category",
                    format!(
                        "unknown category '{value}' (expected one of: {})",
                        Category::valid_list()
                    ),
                );
                None
            }
        },
    };

    if !issues.is_empty() {
        return (None, issues);
    }

    // Every branch above that leaves these unset pushed an issue.
    let (Some(name), Some(description), Some(languages), Some(category)) = (
        raw.name.as_deref(),
        raw.description.as_deref(),
        raw.languages.clone(),
        category,
    ) else {
        return (None, issues);
    };

    let metadata = SkillMetadata {
        name: name.trim().to_string(),
        description: description.trim().to_string(),
        languages: languages.into_iter().map(|l| l.trim().to_string()).collect(),
        category,
    };
    (Some(metadata), issues)
}

/// Check the `reference/` layout around `SKILL.md`.
///
/// A body that names the playbook is left to the reference resolver, which
/// reports a missing target exactly once. Otherwise an absent or unlinked
/// playbook is a warning. A `reference` path that is not a directory breaks
/// the package and is an error.
pub fn check_companions(dir: &SkillDir, body: &str) -> Vec<ValidationIssue> {
    let reference_dir = dir.path.join("reference");
    let reference_display = format!("{}/reference", dir.name);
    let playbook_display = format!("{}/{PLAYBOOK}", dir.name);

    if reference_dir.exists() && !reference_dir.is_dir() {
        return vec![ValidationIssue::error(
            &dir.name,
            reference_display,
            IssueKind::StructureError,
            "reference exists but is not a directory",
        )];
    }

    if references::extract_references(body).contains(PLAYBOOK) {
        return Vec::new();
    }

    if !reference_dir.exists() {
        return vec![ValidationIssue::warning(
            &dir.name,
            reference_display,
            IssueKind::StructureError,
            "no reference/ directory",
        )];
    }

    if !dir.path.join(PLAYBOOK).is_file() {
        return vec![ValidationIssue::warning(
            &dir.name,
            playbook_display,
            IssueKind::StructureError,
            "no reference/playbook.md companion",
        )];
    }

    if !body.contains("reference/") && !body.contains("playbook.md") {
        return vec![ValidationIssue::warning(
            &dir.name,
            dir.display_file(),
            IssueKind::StructureError,
            "SKILL.md does not link its playbook",
        )];
    }

    Vec::new()
}
