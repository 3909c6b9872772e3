//! Resolution of `reference/<name>.md` links in a skill body.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::PathBuf;
use walkdir::WalkDir;

use crate::model::{IssueKind, ValidationIssue};
use crate::scan::SkillDir;

static REFERENCE_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^A-Za-z0-9_./-])(?:\./)?(reference/[A-Za-z0-9_.-]*[A-Za-z0-9_-]\.md)")
        .expect("static regex")
});

/// Distinct `reference/*.md` paths mentioned in `body`, sorted.
///
/// Paths nested under another directory (`other/reference/x.md`) and
/// longer extensions (`reference/x.mdx`) are not references.
pub fn extract_references(body: &str) -> BTreeSet<String> {
    REFERENCE_LINK
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .filter(|m| {
            body[m.end()..]
                .chars()
                .next()
                .is_none_or(|c| !(c.is_ascii_alphanumeric() || c == '_'))
        })
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Markdown files directly under the skill's `reference/` directory.
pub fn reference_inventory(dir: &SkillDir) -> BTreeSet<PathBuf> {
    let reference_dir = dir.path.join("reference");
    if !reference_dir.is_dir() {
        return BTreeSet::new();
    }

    WalkDir::new(&reference_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!(skill = %dir.name, error = %err, "unreadable reference entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
        .collect()
}

/// Report every body reference that does not resolve to a file in `inventory`.
pub fn check(dir: &SkillDir, body: &str, inventory: &BTreeSet<PathBuf>) -> Vec<ValidationIssue> {
    let reference_dir = dir.path.join("reference");
    if reference_dir.exists() && !reference_dir.is_dir() {
        // Already a structure error; every link would dangle for the same reason.
        return Vec::new();
    }

    let file = dir.display_file();
    let mut issues = Vec::new();

    for target in extract_references(body) {
        let resolved = dir.path.join(&target);
        if inventory.contains(&resolved) {
            continue;
        }

        if resolved.exists() {
            issues.push(ValidationIssue::error(
                &dir.name,
                &file,
                IssueKind::StructureError,
                format!("{target} exists but is not a regular file"),
            ));
        } else {
            tracing::debug!(skill = %dir.name, target = %target, "dangling reference");
            issues.push(ValidationIssue::error(
                &dir.name,
                &file,
                IssueKind::ReferenceError {
                    target: target.clone(),
                },
                format!("references {target}, which does not exist"),
            ));
        }
    }

    issues
}
