use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

fn linkmark_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_linkmark"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd
}

fn parse_index(stdout: &[u8]) -> BTreeMap<String, Vec<String>> {
    return serde_json::from_slice(stdout).unwrap();
}

fn expected(entries: Vec<(&str, Vec<&str>)>) -> BTreeMap<String, Vec<String>> {
    return entries
        .into_iter()
        .map(|(doc, targets)| {
            return (doc.to_string(), targets.into_iter().map(str::to_string).collect());
        })
        .collect();
}

#[test]
fn links_prints_relative_index() {
    let out = linkmark_cmd().args(["links", "tests/fixtures/basic"]).output().unwrap();
    assert!(out.status.success(), "links failed: {}", String::from_utf8_lossy(&out.stderr));

    assert_eq!(
        parse_index(&out.stdout),
        expected(vec![
            ("index.md", vec!["linkedto1.md", "subdir/linkedto2.md"]),
            ("linkedto1.md", vec![]),
            ("subdir/linkedto2.md", vec!["linkedto1.md"]),
        ])
    );
}

#[test]
fn links_honours_exclude_flag() {
    let out = linkmark_cmd()
        .args(["links", "tests/fixtures/basic", "--exclude", "index.md"])
        .output()
        .unwrap();
    assert!(out.status.success(), "links failed: {}", String::from_utf8_lossy(&out.stderr));

    let index = parse_index(&out.stdout);
    assert!(!index.contains_key("index.md"));
    assert_eq!(index.len(), 2);
}

#[test]
fn graph_writes_dot() {
    let dir = tempfile::tempdir().unwrap();
    let dot_path = dir.path().join("links.dot");
    let out = linkmark_cmd()
        .args(["graph", "tests/fixtures/basic", "--layout", "circo", "-o"])
        .arg(&dot_path)
        .output()
        .unwrap();
    assert!(out.status.success(), "graph failed: {}", String::from_utf8_lossy(&out.stderr));

    let dot = std::fs::read_to_string(&dot_path).unwrap();
    assert!(dot.contains("layout=\"circo\";"));
    assert!(dot.contains("\"index.md\" -> \"subdir/linkedto2.md\";"));
    assert!(dot.contains("\"subdir/linkedto2.md\" -> \"linkedto1.md\";"));
}

#[test]
fn missing_root_reports_diagnostic() {
    let out = linkmark_cmd().args(["links", "tests/fixtures/does-not-exist"]).output().unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Root Not Found"));
}

#[test]
fn exclude_commands_edit_config() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.md"), "[a](a)\n").unwrap();
    std::fs::write(dir.path().join("a.md"), "").unwrap();
    let root = dir.path().to_str().unwrap();

    let add = linkmark_cmd().args(["exclude", "--root", root, "add", "index.md"]).output().unwrap();
    assert!(add.status.success(), "add failed: {}", String::from_utf8_lossy(&add.stderr));
    assert!(Path::new(root).join(".linkmark.toml").exists());

    let links = linkmark_cmd().args(["links", root]).output().unwrap();
    assert!(links.status.success());
    let index = parse_index(&links.stdout);
    assert_eq!(index.keys().collect::<Vec<_>>(), vec!["a.md"]);

    let remove = linkmark_cmd().args(["exclude", "--root", root, "remove", "index.md"]).output().unwrap();
    assert!(remove.status.success());

    let again = linkmark_cmd().args(["exclude", "--root", root, "remove", "index.md"]).output().unwrap();
    assert_eq!(again.status.code(), Some(1));
}

#[test]
fn skipped_documents_exit_two() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("good.md"), "").unwrap();
    std::fs::write(dir.path().join("bad.md"), [0xff_u8, 0xfe]).unwrap();

    let out = linkmark_cmd()
        .arg("links")
        .arg(dir.path())
        .args(["--on-error", "continue"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("bad.md"));
    assert!(parse_index(&out.stdout).contains_key("good.md"));
}
