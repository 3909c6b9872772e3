use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PLAYBOOK_BODY: &str = "# Foo\n\nRead [the playbook](reference/playbook.md) first.\n";

fn frontmatter(name: &str) -> String {
    format!(
        "name: {name}\ndescription: \"Write pytest suites for Python services\"\nlanguages: [Python]\ncategory: unit-testing\n"
    )
}

fn write_skill(root: &Path, dir: &str, frontmatter: &str, body: &str, playbook: bool) {
    let path = root.join(dir);
    fs::create_dir_all(&path).unwrap();
    fs::write(path.join("SKILL.md"), format!("---\n{frontmatter}---\n{body}")).unwrap();
    if playbook {
        fs::create_dir_all(path.join("reference")).unwrap();
        fs::write(path.join("reference/playbook.md"), "# Playbook\n").unwrap();
    }
}

fn write_registry(root: &Path, names: &[&str]) {
    fs::write(
        root.join("skills_index.json"),
        serde_json::to_string(names).unwrap(),
    )
    .unwrap();
}

fn run_json(root: &Path, extra: &[&str]) -> (i32, Value) {
    let output = cargo_bin_cmd!("validate-skills")
        .arg("--root")
        .arg(root)
        .args(["--format", "json"])
        .args(extra)
        .env_remove("RUST_LOG")
        .output()
        .expect("run validate-skills");
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON output");
    (output.status.code().unwrap_or(-1), json)
}

fn issues_of_kind<'a>(json: &'a Value, kind: &str) -> Vec<&'a Value> {
    json["issues"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|i| i["kind"] == kind)
        .collect()
}

/// A clean single-skill corpus with a matching registry.
fn scenario_a() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_skill(tmp.path(), "foo-skill", &frontmatter("foo-skill"), PLAYBOOK_BODY, true);
    write_registry(tmp.path(), &["foo-skill"]);
    tmp
}

#[test]
fn help_prints_usage() {
    cargo_bin_cmd!("validate-skills")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("--root"))
        .stdout(contains("--max-lines"))
        .stdout(contains("--strict"));
}

#[test]
fn scenario_a_clean_skill_passes() {
    let tmp = scenario_a();
    let (code, json) = run_json(tmp.path(), &[]);
    assert_eq!(code, 0);
    assert_eq!(json["status"], "passed");
    assert_eq!(json["skills_checked"], 1);
    assert_eq!(json["passed_count"], 1);
    assert_eq!(json["issues"].as_array().unwrap().len(), 0);
}

#[test]
fn scenario_a_text_summary() {
    let tmp = scenario_a();
    cargo_bin_cmd!("validate-skills")
        .arg("--root")
        .arg(tmp.path())
        .env("NO_COLOR", "1")
        .assert()
        .success()
        .stdout(contains("1 skills checked, 0 errors, 0 warnings"));
}

#[test]
fn root_defaults_to_current_directory() {
    let tmp = scenario_a();
    cargo_bin_cmd!("validate-skills")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(contains("1 skills checked"));
}

#[test]
fn scenario_b_missing_languages() {
    let tmp = TempDir::new().unwrap();
    write_skill(
        tmp.path(),
        "foo-skill",
        "name: foo-skill\ndescription: \"Write pytest suites\"\ncategory: unit-testing\n",
        PLAYBOOK_BODY,
        true,
    );
    write_registry(tmp.path(), &["foo-skill"]);

    let (code, json) = run_json(tmp.path(), &[]);
    assert_eq!(code, 1);
    let issues = json["issues"].as_array().unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["kind"], "schema_error");
    assert_eq!(issues[0]["field"], "languages");
    assert_eq!(issues[0]["severity"], "error");
    assert_eq!(json["failed_count"], 1);
}

#[test]
fn scenario_c_dangling_playbook_reference() {
    let tmp = TempDir::new().unwrap();
    write_skill(tmp.path(), "foo-skill", &frontmatter("foo-skill"), PLAYBOOK_BODY, false);
    write_registry(tmp.path(), &["foo-skill"]);

    let (code, json) = run_json(tmp.path(), &[]);
    assert_eq!(code, 1);
    let refs = issues_of_kind(&json, "reference_error");
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0]["target"], "reference/playbook.md");
    assert_eq!(refs[0]["file"], "foo-skill/SKILL.md");
    assert_eq!(json["issues"].as_array().unwrap().len(), 1);
}

#[test]
fn scenario_d_registry_lists_missing_skill() {
    let tmp = scenario_a();
    write_registry(tmp.path(), &["foo-skill", "bar-skill"]);

    let (code, json) = run_json(tmp.path(), &[]);
    assert_eq!(code, 1);
    let mismatches = issues_of_kind(&json, "registry_mismatch_error");
    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0]["skill"], "bar-skill");
    assert_eq!(mismatches[0]["direction"], "missing_directory");
    assert_eq!(json["issues"].as_array().unwrap().len(), 1);
}

#[test]
fn scenario_e_duplicate_names() {
    let tmp = TempDir::new().unwrap();
    write_skill(tmp.path(), "first-skill", &frontmatter("duplicate-skill"), PLAYBOOK_BODY, true);
    write_skill(tmp.path(), "second-skill", &frontmatter("duplicate-skill"), PLAYBOOK_BODY, true);

    let (code, json) = run_json(tmp.path(), &[]);
    assert_eq!(code, 1);
    let dups = issues_of_kind(&json, "duplicate_name_error");
    assert_eq!(dups.len(), 1);
    assert_eq!(dups[0]["skill"], "duplicate-skill");
    assert_eq!(
        dups[0]["paths"],
        serde_json::json!(["first-skill/SKILL.md", "second-skill/SKILL.md"])
    );
}

#[test]
fn unregistered_skill_directory_is_reported() {
    let tmp = scenario_a();
    write_skill(tmp.path(), "new-skill", &frontmatter("new-skill"), PLAYBOOK_BODY, true);

    let (code, json) = run_json(tmp.path(), &[]);
    assert_eq!(code, 1);
    let mismatches = issues_of_kind(&json, "registry_mismatch_error");
    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0]["skill"], "new-skill");
    assert_eq!(mismatches[0]["direction"], "missing_from_registry");
}

#[test]
fn budget_boundary_and_strict() {
    let tmp = TempDir::new().unwrap();
    let at_limit = format!("{PLAYBOOK_BODY}{}", "line\n".repeat(497));
    let over = format!("{PLAYBOOK_BODY}{}", "line\n".repeat(498));
    write_skill(tmp.path(), "at-limit", &frontmatter("at-limit"), &at_limit, true);
    write_skill(tmp.path(), "over-limit", &frontmatter("over-limit"), &over, true);

    let (code, json) = run_json(tmp.path(), &[]);
    assert_eq!(code, 0, "budget overruns are warnings");
    let budget = issues_of_kind(&json, "budget_error");
    assert_eq!(budget.len(), 1);
    assert_eq!(budget[0]["skill"], "over-limit");
    assert_eq!(budget[0]["lines"], 501);
    assert_eq!(budget[0]["severity"], "warning");

    let (strict_code, strict_json) = run_json(tmp.path(), &["--strict"]);
    assert_eq!(strict_code, 1);
    assert_eq!(strict_json["issues"][0]["severity"], "warning");

    let (code, json) = run_json(tmp.path(), &["--max-lines", "600"]);
    assert_eq!(code, 0);
    assert!(issues_of_kind(&json, "budget_error").is_empty());
}

#[test]
fn json_report_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    for name in ["alpha-skill", "beta-skill", "gamma-skill", "delta-skill"] {
        write_skill(tmp.path(), name, &frontmatter(name), "reference/missing.md\n", false);
    }
    write_registry(tmp.path(), &["alpha-skill", "ghost-skill"]);

    let run = || {
        cargo_bin_cmd!("validate-skills")
            .arg("--root")
            .arg(tmp.path())
            .args(["--format", "json", "-j", "4"])
            .output()
            .unwrap()
            .stdout
    };
    let first = run();
    let second = run();
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn text_output_groups_issues_by_skill() {
    let tmp = TempDir::new().unwrap();
    write_skill(
        tmp.path(),
        "foo-skill",
        "name: foo-skill\ndescription: \"x\"\nlanguages: []\ncategory: fuzzing\n",
        PLAYBOOK_BODY,
        true,
    );

    cargo_bin_cmd!("validate-skills")
        .arg("--root")
        .arg(tmp.path())
        .env("NO_COLOR", "1")
        .assert()
        .code(1)
        .stdout(contains("\nfoo-skill\n"))
        .stdout(contains("field 'languages' is an empty list [schema_error]"))
        .stdout(contains("unknown category 'fuzzing'"))
        .stdout(contains("1 skills checked, 2 errors, 0 warnings"));
}

#[test]
fn missing_root_exits_two() {
    let tmp = TempDir::new().unwrap();
    cargo_bin_cmd!("validate-skills")
        .arg("--root")
        .arg(tmp.path().join("nope"))
        .assert()
        .code(2)
        .stdout("")
        .stderr(contains("repository root not found"));
}

#[test]
fn corrupt_registry_exits_two() {
    let tmp = scenario_a();
    fs::write(tmp.path().join("skills_index.json"), "{\"skills\": [").unwrap();
    cargo_bin_cmd!("validate-skills")
        .arg("--root")
        .arg(tmp.path())
        .assert()
        .code(2)
        .stdout("")
        .stderr(contains("not valid JSON"));
}

#[test]
fn bad_format_is_usage_error() {
    cargo_bin_cmd!("validate-skills")
        .args(["--format", "yaml"])
        .assert()
        .code(2);
}

#[test]
fn config_file_is_honoured() {
    let tmp = scenario_a();
    write_skill(tmp.path(), "drafts", "name: broken\n", "", false);
    fs::write(
        tmp.path().join("validate-skills.toml"),
        "skip_dirs = [\"drafts\"]\nmax_lines = 1\n",
    )
    .unwrap();

    let (code, json) = run_json(tmp.path(), &[]);
    assert_eq!(code, 0);
    assert_eq!(json["skills_checked"], 1);
    assert_eq!(issues_of_kind(&json, "budget_error").len(), 1);
}

#[test]
fn malformed_config_exits_two() {
    let tmp = scenario_a();
    fs::write(tmp.path().join("validate-skills.toml"), "max_lines = [").unwrap();
    cargo_bin_cmd!("validate-skills")
        .arg("--root")
        .arg(tmp.path())
        .assert()
        .code(2)
        .stderr(contains("Failed to parse config file"));
}

#[test]
fn excluded_and_hidden_directories_are_ignored() {
    let tmp = scenario_a();
    for dir in ["shared", "scripts", "evals", ".github"] {
        write_skill(tmp.path(), dir, "name: nope\n", "", false);
    }
    let (code, json) = run_json(tmp.path(), &[]);
    assert_eq!(code, 0);
    assert_eq!(json["skills_checked"], 1);
}
