//! README accuracy tests.
//!
//! The README documents flags, exit codes and categories by hand; these
//! tests keep it honest.

use regex::Regex;
use skills_validator::model::Category;
use std::collections::BTreeSet;
use std::process::Command;

fn readme() -> String {
    std::fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md")).expect("README.md")
}

#[test]
fn test_documented_flags_exist() {
    let help = Command::new(env!("CARGO_BIN_EXE_validate-skills"))
        .arg("--help")
        .output()
        .expect("run --help");
    let help = String::from_utf8_lossy(&help.stdout).into_owned();

    let flag = Regex::new(r"--[a-z][a-z-]+").unwrap();
    let text = readme();
    let documented: BTreeSet<&str> = flag.find_iter(&text).map(|m| m.as_str()).collect();
    assert!(!documented.is_empty());
    for f in documented {
        assert!(help.contains(f), "README documents {f}, which --help does not list");
    }
}

#[test]
fn test_documented_categories_match() {
    let text = readme();
    for category in Category::ALL {
        assert!(
            text.contains(&format!("`{category}`")),
            "README should list category {category}"
        );
    }
}

#[test]
fn test_documented_exit_codes() {
    let text = readme();
    for code in ["`0`", "`1`", "`2`", "`130`"] {
        assert!(text.contains(code), "README should document exit code {code}");
    }
}
