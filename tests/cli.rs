use std::{
    env, fs,
    path::{Path, PathBuf},
    process::{self, Command, Output},
};

fn djinni_ast(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_djinni-ast"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to spawn djinni-ast")
}

fn fixture(name: &str) -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
        .display()
        .to_string()
}

/// Writes `src` to a fresh file in a directory owned by one test.
fn temp_source(test: &str, src: &str) -> PathBuf {
    let dir = env::temp_dir().join(format!("djinni-ast-{test}-{}", process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("input.djinni");
    fs::write(&path, src).unwrap();
    path
}

/// Twelve records, each missing the `;` after its only field.
fn many_errors() -> String {
    "a = record { x: i32 }\n".repeat(12)
}

fn rendered_errors(stderr: &str) -> Vec<&str> {
    stderr.lines().filter(|line| line.contains(": error[")).collect()
}

#[test]
fn prints_one_json_document() {
    let out = djinni_ast(&[&fixture("all_datatypes.djinni")]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["type_decls"][0]["ident"], "all_datatypes");
}

#[test]
fn prints_tree() {
    let out = djinni_ast(&["--format", "tree", &fixture("interfaces.djinni")]);
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.starts_with("import \"all_datatypes.djinni\"\n"));
    assert!(stdout.contains("record item_list\n  field items: list<string>\n"));
}

#[test]
fn fails_without_arguments() {
    let out = djinni_ast(&[]);
    assert!(!out.status.success());
    assert!(!out.stderr.is_empty());
}

#[test]
fn fails_on_missing_file() {
    let out = djinni_ast(&["does/not/exist.djinni"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("failed to read `does/not/exist.djinni`"), "{stderr}");
    assert!(out.stdout.is_empty());
}

#[test]
fn fails_on_syntax_errors() {
    let path = temp_source("syntax-errors", "a = record {\n  id: i32\n}\n");

    let out = djinni_ast(&[path.to_str().unwrap()]);
    assert!(!out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(
        stderr.contains("input.djinni:3:1: error[unexpected-token]: expected `;`, but got `}`"),
        "{stderr}"
    );
    assert!(out.stdout.is_empty());
}

#[test]
fn pretty_prints_json() {
    let out = djinni_ast(&["--pretty", &fixture("all_datatypes.djinni")]);
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.lines().count() > 1);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["imports"][0], "common/types.djinni");
}

#[test]
fn max_errors_stops_early() {
    let path = temp_source("max-errors", &many_errors());
    let out = djinni_ast(&["--max-errors", "1", path.to_str().unwrap()]);
    assert!(!out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    let errors = rendered_errors(&stderr);
    assert_eq!(errors.len(), 3, "{stderr}");
    assert!(errors[2].contains("error[too-many-errors]"), "{stderr}");
    assert!(out.stdout.is_empty());
}

#[test]
fn default_error_limit() {
    let path = temp_source("default-limit", &many_errors());
    let out = djinni_ast(&[path.to_str().unwrap()]);
    assert!(!out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    let errors = rendered_errors(&stderr);
    assert_eq!(errors.len(), 12, "{stderr}");
    assert!(errors[11].contains("error[too-many-errors]"), "{stderr}");
}

#[test]
fn no_error_limit_reports_everything() {
    let path = temp_source("no-limit", &many_errors());
    let out = djinni_ast(&["--no-error-limit", path.to_str().unwrap()]);
    assert!(!out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    let errors = rendered_errors(&stderr);
    assert_eq!(errors.len(), 12, "{stderr}");
    assert!(errors.iter().all(|e| e.contains("error[unexpected-token]")), "{stderr}");
    assert!(stderr.contains("has 12 syntax error(s)"), "{stderr}");
}

#[test]
fn max_errors_conflicts_with_no_error_limit() {
    let path = fixture("all_datatypes.djinni");
    let out = djinni_ast(&["--max-errors", "3", "--no-error-limit", &path]);
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("cannot be used with"), "{stderr}");
    assert!(out.stdout.is_empty());
}

#[test]
fn deep_nesting_is_reported() {
    let depth = 10_000;
    let src = format!(
        "r = record {{ x: {}i32{}; }}\n",
        "list<".repeat(depth),
        ">".repeat(depth)
    );
    let path = temp_source("deep-nesting", &src);
    let out = djinni_ast(&[path.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert_eq!(rendered_errors(&stderr).len(), 1, "{stderr}");
    assert!(stderr.contains("error[nesting-too-deep]"), "{stderr}");
}
