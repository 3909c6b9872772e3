//! Scan, validate, aggregate.
//!
//! Skills are validated independently on a rayon pool. Each task returns its
//! own [`SkillOutcome`]; nothing mutable is shared between tasks except the
//! interrupt flag. Duplicate-name detection and the registry cross-check need
//! the complete set of outcomes and run only after every task has finished.

use itertools::Itertools;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::checks::{budget, references, structure};
use crate::config::ValidatorConfig;
use crate::error::{Result, ValidatorError};
use crate::frontmatter;
use crate::model::{IssueKind, Skill, ValidationIssue};
use crate::registry::{self, Registry};
use crate::report::{ReportAggregator, ValidationReport};
use crate::scan::{self, SkillDir};

/// Execution knobs that do not affect results.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Worker threads; `None` uses rayon's default.
    pub jobs: Option<usize>,
}

/// Everything learned about one skill directory.
#[derive(Debug, Clone)]
pub struct SkillOutcome {
    pub directory_name: String,
    pub skill_file: String,
    /// `name` as written in the frontmatter, if it could be read.
    pub declared_name: Option<String>,
    /// Present only when the metadata passed every schema rule.
    pub skill: Option<Skill>,
    pub issues: Vec<ValidationIssue>,
}

/// Result of a full run.
#[derive(Debug, Clone)]
pub struct CorpusValidation {
    pub report: ValidationReport,
    /// Names of every directory that was validated, sorted.
    pub discovered: Vec<String>,
    /// Skills whose metadata is fully valid.
    pub skills: Vec<Skill>,
}

/// Run every check for a single skill directory.
///
/// Only an unreadable `SKILL.md` is an error; every rule violation, bad
/// encoding included, is an issue.
pub fn validate_skill(dir: &SkillDir, config: &ValidatorConfig) -> Result<SkillOutcome> {
    let _span = tracing::debug_span!("skill", name = %dir.name).entered();

    let skill_path = dir.skill_file();
    let bytes =
        std::fs::read(&skill_path).map_err(|source| ValidatorError::io(&skill_path, source))?;
    let file = dir.display_file();
    let mut issues = Vec::new();

    let content = match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(err) => {
            let offset = err.utf8_error().valid_up_to();
            tracing::debug!(offset, "SKILL.md is not valid UTF-8");
            issues.push(ValidationIssue::error(
                &dir.name,
                &file,
                IssueKind::ParseError,
                format!("SKILL.md is not valid UTF-8 (invalid byte at offset {offset})"),
            ));
            return Ok(SkillOutcome {
                directory_name: dir.name.clone(),
                skill_file: file,
                declared_name: None,
                skill: None,
                issues,
            });
        }
    };

    let (parsed, body) = match frontmatter::split(&content) {
        Ok(split) => (frontmatter::parse_yaml(split.yaml), split.body),
        Err(err) => (Err(err), content.as_str()),
    };

    let body_line_count = budget::count_body_lines(body);
    issues.extend(budget::check(&dir.name, &file, body_line_count, config.max_lines));

    let inventory = references::reference_inventory(dir);
    issues.extend(references::check(dir, body, &inventory));
    issues.extend(structure::check_companions(dir, body));

    let (declared_name, metadata) = match parsed {
        Ok(fields) => {
            let declared = fields
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string);
            let (metadata, schema_issues) =
                structure::check_metadata(dir, &fields, config.max_description_chars);
            issues.extend(schema_issues);
            (declared, metadata)
        }
        Err(err) => {
            tracing::debug!(error = %err, "frontmatter rejected");
            issues.push(ValidationIssue::error(
                &dir.name,
                &file,
                IssueKind::ParseError,
                err.to_string(),
            ));
            (None, None)
        }
    };

    let skill = metadata.map(|metadata| Skill {
        directory_name: dir.name.clone(),
        path: dir.path.clone(),
        metadata,
        reference_files: inventory,
        body_line_count,
    });

    tracing::debug!(issues = issues.len(), "skill validated");
    Ok(SkillOutcome {
        directory_name: dir.name.clone(),
        skill_file: file,
        declared_name,
        skill,
        issues,
    })
}

/// One `DuplicateNameError` per name declared by more than one skill.
pub fn find_duplicate_names(outcomes: &[SkillOutcome]) -> Vec<ValidationIssue> {
    outcomes
        .iter()
        .filter_map(|o| o.declared_name.as_deref().map(|n| (n, o.skill_file.as_str())))
        .into_group_map()
        .into_iter()
        .filter(|(_, files)| files.len() > 1)
        .sorted()
        .map(|(name, files)| {
            let paths: Vec<String> = files.into_iter().sorted().map(str::to_string).collect();
            let message = format!(
                "name '{name}' is declared by {} skills: {}",
                paths.len(),
                paths.join(", ")
            );
            ValidationIssue::error(
                name,
                paths[0].clone(),
                IssueKind::DuplicateNameError { paths },
                message,
            )
        })
        .collect()
}

/// Validate every skill under `root`.
///
/// Fatal conditions (missing root, unreadable files, a corrupt registry)
/// abort before any report exists. Once `interrupt` is set no further skills
/// are started and the global checks are skipped.
pub fn validate_corpus(
    root: &Path,
    config: &ValidatorConfig,
    options: &RunOptions,
    interrupt: &AtomicBool,
) -> Result<CorpusValidation> {
    let dirs = scan::scan(root, config)?;
    let registry = Registry::load(root, &config.registry)?;

    let run = || -> Vec<Option<Result<SkillOutcome>>> {
        dirs.par_iter()
            .map(|dir| {
                if interrupt.load(Ordering::Relaxed) {
                    None
                } else {
                    Some(validate_skill(dir, config))
                }
            })
            .collect()
    };
    let results = match options.jobs {
        Some(jobs) => rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .map_err(|e| ValidatorError::io(root, std::io::Error::other(e)))?
            .install(run),
        None => run(),
    };

    let skipped = results.iter().filter(|r| r.is_none()).count();
    let outcomes: Vec<SkillOutcome> = results.into_iter().flatten().collect::<Result<_>>()?;
    let interrupted = skipped > 0 || interrupt.load(Ordering::Relaxed);

    let mut aggregator = ReportAggregator::new(root.display().to_string());
    for outcome in &outcomes {
        aggregator.add_skill(&outcome.directory_name);
        aggregator.extend(outcome.issues.iter().cloned());
    }

    if interrupted {
        tracing::warn!(
            validated = outcomes.len(),
            skipped,
            "interrupted, skipping duplicate and registry checks"
        );
    } else {
        aggregator.extend(find_duplicate_names(&outcomes));

        let discovered: BTreeSet<String> =
            outcomes.iter().map(|o| o.directory_name.clone()).collect();
        match &registry {
            Some(registry) => {
                aggregator.extend(registry::cross_check(registry, &config.registry, &discovered))
            }
            None if config.require_registry => {
                aggregator.push(registry::missing_registry(&config.registry))
            }
            None => {}
        }
    }

    let report = aggregator.finish(interrupted);
    tracing::info!(
        checked = report.skills_checked,
        errors = report.error_count,
        warnings = report.warning_count,
        "validation finished"
    );

    let discovered = outcomes.iter().map(|o| o.directory_name.clone()).collect();
    let skills = outcomes.into_iter().filter_map(|o| o.skill).collect();
    Ok(CorpusValidation {
        report,
        discovered,
        skills,
    })
}
