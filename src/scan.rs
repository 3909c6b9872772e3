//! Discovery of skill directories under the repository root.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ValidatorConfig;
use crate::error::{Result, ValidatorError};

/// Name of the file that marks a directory as a skill package.
pub const SKILL_FILE: &str = "SKILL.md";

/// A top-level directory that holds a `SKILL.md`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillDir {
    pub name: String,
    pub path: PathBuf,
}

impl SkillDir {
    pub fn skill_file(&self) -> PathBuf {
        self.path.join(SKILL_FILE)
    }

    /// `SKILL.md` path relative to the repository root, as shown in reports.
    pub fn display_file(&self) -> String {
        format!("{}/{}", self.name, SKILL_FILE)
    }
}

/// List skill directories directly under `root`, sorted by name.
///
/// Hidden directories, the configured skip list and directories without a
/// `SKILL.md` are left out. Fails only if `root` is not a directory or cannot
/// be listed.
pub fn scan(root: &Path, config: &ValidatorConfig) -> Result<Vec<SkillDir>> {
    if !root.is_dir() {
        return Err(ValidatorError::RootNotFound(root.to_path_buf()));
    }

    let mut found = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            // Dangling symlinks and links back into the root are not skills.
            Err(err) if err.depth() > 0 && is_skippable(&err) => {
                tracing::warn!(
                    path = %err.path().unwrap_or(root).display(),
                    error = %err,
                    "skipping unreadable entry"
                );
                continue;
            }
            Err(err) => return Err(walk_error(root, err)),
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        let Some(name) = entry.file_name().to_str() else {
            tracing::warn!(path = %entry.path().display(), "skipping directory with non-UTF-8 name");
            continue;
        };

        if config.is_skipped(name) {
            tracing::debug!(dir = name, "skipping excluded directory");
            continue;
        }

        if !entry.path().join(SKILL_FILE).is_file() {
            tracing::debug!(dir = name, "no SKILL.md, not a skill");
            continue;
        }

        found.push(SkillDir {
            name: name.to_string(),
            path: entry.path().to_path_buf(),
        });
    }

    tracing::info!(root = %root.display(), skills = found.len(), "scan complete");
    Ok(found)
}

fn is_skippable(err: &walkdir::Error) -> bool {
    err.loop_ancestor().is_some()
        || err
            .io_error()
            .is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound)
}

fn walk_error(root: &Path, err: walkdir::Error) -> ValidatorError {
    let path = err.path().unwrap_or(root).to_path_buf();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
    ValidatorError::io(path, source)
}
