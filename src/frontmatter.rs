//! `SKILL.md` frontmatter extraction.
//!
//! The frontmatter is the YAML block between a leading `---` line and the
//! next `---` line. Parsing yields [`RawMetadata`]: each required field is
//! `None` when absent and carries its value when present with the right
//! type. A field present with the wrong type, invalid YAML, or broken
//! delimiters is a [`FrontmatterError`]. Unknown keys are ignored.

use serde_yaml::{Mapping, Value};
use thiserror::Error;

const DELIMITER: &str = "---";

/// Why a frontmatter block could not be read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrontmatterError {
    #[error("missing opening --- delimiter on the first line")]
    MissingOpening,

    #[error("missing closing --- delimiter")]
    MissingClosing,

    #[error("invalid YAML in frontmatter: {0}")]
    InvalidYaml(String),

    #[error("frontmatter must be a key/value mapping, found {0}")]
    NotAMapping(&'static str),

    #[error("field '{field}' must be {expected}, found {found}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}

/// A `SKILL.md` split at its delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split<'a> {
    pub yaml: &'a str,
    pub body: &'a str,
}

/// Required fields as written, before schema rules run.
///
/// An explicit YAML null counts as present-but-empty, so `name:` with no
/// value is reported as empty rather than missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMetadata {
    pub name: Option<String>,
    pub description: Option<String>,
    pub languages: Option<Vec<String>>,
    pub category: Option<String>,
}

/// Parsed frontmatter plus the Markdown body that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frontmatter<'a> {
    pub fields: RawMetadata,
    pub body: &'a str,
}

/// Locate the frontmatter block.
///
/// The closing delimiter may be the last line of the file with no trailing
/// newline. Trailing `\r` and spaces on delimiter lines are tolerated.
pub fn split(content: &str) -> Result<Split<'_>, FrontmatterError> {
    let mut lines = content.split_inclusive('\n');

    let first = lines.next().ok_or(FrontmatterError::MissingOpening)?;
    if first.trim_end() != DELIMITER {
        return Err(FrontmatterError::MissingOpening);
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if line.trim_end() == DELIMITER {
            return Ok(Split {
                yaml: &content[yaml_start..offset],
                body: &content[offset + line.len()..],
            });
        }
        offset += line.len();
    }

    Err(FrontmatterError::MissingClosing)
}

/// Split `content` and deserialize its frontmatter.
pub fn parse(content: &str) -> Result<Frontmatter<'_>, FrontmatterError> {
    let split = split(content)?;
    let fields = parse_yaml(split.yaml)?;
    Ok(Frontmatter {
        fields,
        body: split.body,
    })
}

/// Extract the required fields from a frontmatter YAML block.
pub fn parse_yaml(yaml: &str) -> Result<RawMetadata, FrontmatterError> {
    let value: Value =
        serde_yaml::from_str(yaml).map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?;

    let mapping = match value {
        Value::Mapping(mapping) => mapping,
        Value::Null => Mapping::new(),
        other => return Err(FrontmatterError::NotAMapping(type_name(&other))),
    };

    Ok(RawMetadata {
        name: string_field(&mapping, "name")?,
        description: string_field(&mapping, "description")?,
        languages: list_field(&mapping, "languages")?,
        category: string_field(&mapping, "category")?,
    })
}

fn string_field(
    mapping: &Mapping,
    field: &'static str,
) -> Result<Option<String>, FrontmatterError> {
    match mapping.get(field) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(String::new())),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(FrontmatterError::WrongType {
            field,
            expected: "a string",
            found: type_name(other),
        }),
    }
}

fn list_field(
    mapping: &Mapping,
    field: &'static str,
) -> Result<Option<Vec<String>>, FrontmatterError> {
    let items = match mapping.get(field) {
        None => return Ok(None),
        Some(Value::Null) => return Ok(Some(Vec::new())),
        Some(Value::Sequence(items)) => items,
        Some(other) => {
            return Err(FrontmatterError::WrongType {
                field,
                expected: "a list of strings",
                found: type_name(other),
            });
        }
    };

    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.clone()),
            other => Err(FrontmatterError::WrongType {
                field,
                expected: "a list of strings",
                found: type_name(other),
            }),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
