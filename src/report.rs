//! Aggregation of issues into a [`ValidationReport`] and its renderers.
//!
//! Issues may arrive in any order; the report sorts them by skill, then
//! file, so that two runs over the same corpus render byte-identical output.

use colored::Colorize;
use itertools::Itertools;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use crate::model::{Severity, ValidationIssue};

/// Exit code for a run cut short by an interrupt.
pub const EXIT_INTERRUPTED: u8 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Passed,
    Failed,
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillStatus {
    Passed,
    Failed,
}

/// Per-skill line of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillSummary {
    pub name: String,
    pub status: SkillStatus,
    pub errors: usize,
    pub warnings: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub status: RunStatus,
    pub root: String,
    pub skills_checked: usize,
    pub passed_count: usize,
    pub failed_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub skills: Vec<SkillSummary>,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Process exit code. `strict` counts warnings as failures without
    /// relabelling them.
    pub fn exit_code(&self, strict: bool) -> u8 {
        if self.status == RunStatus::Interrupted {
            EXIT_INTERRUPTED
        } else if self.has_errors() || (strict && self.warning_count > 0) {
            1
        } else {
            0
        }
    }

    /// One-line summary, e.g. `12 skills checked, 0 errors, 3 warnings`.
    pub fn summary_line(&self) -> String {
        format!(
            "{} skills checked, {} errors, {} warnings",
            self.skills_checked, self.error_count, self.warning_count
        )
    }
}

/// Collects issues from every check.
#[derive(Debug, Default)]
pub struct ReportAggregator {
    root: String,
    skills: BTreeSet<String>,
    issues: Vec<ValidationIssue>,
}

impl ReportAggregator {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Record that a skill was checked, whether or not it produced issues.
    pub fn add_skill(&mut self, name: impl Into<String>) {
        self.skills.insert(name.into());
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = ValidationIssue>) {
        self.issues.extend(issues);
    }

    /// Sort, count and freeze.
    ///
    /// Only checked skills enter `passed_count`/`failed_count`; issues about
    /// registry entries with no directory still count as errors.
    pub fn finish(mut self, interrupted: bool) -> ValidationReport {
        self.issues.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        let error_count = self.issues.iter().filter(|i| i.is_error()).count();
        let warning_count = self.issues.len() - error_count;

        let mut per_skill: BTreeMap<&str, (usize, usize)> = self
            .skills
            .iter()
            .map(|name| (name.as_str(), (0, 0)))
            .collect();
        for issue in &self.issues {
            if let Some((errors, warnings)) = per_skill.get_mut(issue.skill.as_str()) {
                match issue.severity {
                    Severity::Error => *errors += 1,
                    Severity::Warning => *warnings += 1,
                }
            }
        }

        let skills: Vec<SkillSummary> = per_skill
            .into_iter()
            .map(|(name, (errors, warnings))| SkillSummary {
                name: name.to_string(),
                status: if errors > 0 {
                    SkillStatus::Failed
                } else {
                    SkillStatus::Passed
                },
                errors,
                warnings,
            })
            .collect();

        let failed_count = skills
            .iter()
            .filter(|s| s.status == SkillStatus::Failed)
            .count();

        let status = if interrupted {
            RunStatus::Interrupted
        } else if error_count > 0 {
            RunStatus::Failed
        } else {
            RunStatus::Passed
        };

        ValidationReport {
            status,
            root: self.root,
            skills_checked: skills.len(),
            passed_count: skills.len() - failed_count,
            failed_count,
            error_count,
            warning_count,
            skills,
            issues: self.issues,
        }
    }
}

/// Machine-readable rendering for CI.
pub fn render_json(report: &ValidationReport) -> serde_json::Result<String> {
    let mut out = serde_json::to_string_pretty(report)?;
    out.push('\n');
    Ok(out)
}

/// Human-readable rendering, grouped by skill.
pub fn render_text(report: &ValidationReport, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Skills validation: {}", report.root);

    for (skill, issues) in &report.issues.iter().chunk_by(|i| i.skill.as_str()) {
        let _ = writeln!(out);
        let heading = if color {
            skill.bold().to_string()
        } else {
            skill.to_string()
        };
        let _ = writeln!(out, "{heading}");
        for issue in issues {
            let label = format!("{:<7}", issue.severity.label());
            let label = match (color, issue.severity) {
                (false, _) => label,
                (true, Severity::Error) => label.red().bold().to_string(),
                (true, Severity::Warning) => label.yellow().to_string(),
            };
            let _ = writeln!(
                out,
                "  {label} {}: {} [{}]",
                issue.file,
                issue.message,
                issue.kind.name()
            );
        }
    }

    let _ = writeln!(out);
    if report.status == RunStatus::Interrupted {
        let _ = writeln!(out, "interrupted: partial report");
    }
    let _ = writeln!(out, "{}", report.summary_line());
    out
}
