//! Body length budget for `SKILL.md`.

use crate::model::{IssueKind, ValidationIssue};

/// Count the lines of a Markdown body.
///
/// Splits on `\n` and drops the single empty element produced by a trailing
/// newline, so `"a\nb\n"` and `"a\nb"` are both two lines and `""` is zero.
pub fn count_body_lines(body: &str) -> usize {
    let pieces = body.split('\n').count();
    if body.is_empty() || body.ends_with('\n') {
        pieces - 1
    } else {
        pieces
    }
}

/// Warn when the body runs past `max_lines`.
pub fn check(skill: &str, file: &str, line_count: usize, max_lines: usize) -> Option<ValidationIssue> {
    if line_count <= max_lines {
        return None;
    }
    Some(ValidationIssue::warning(
        skill,
        file,
        IssueKind::BudgetError {
            lines: line_count,
            max: max_lines,
        },
        format!("SKILL.md body is {line_count} lines (max {max_lines})"),
    ))
}
