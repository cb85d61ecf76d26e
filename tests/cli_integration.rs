use knit::classfile::OpKind;
use knit::test_utils::ClassBytes;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn knit_binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_knit"))
}

fn write_fixture_classes(dir: &std::path::Path) {
    let cohesive = ClassBytes::new("app.Point")
        .field("x", "I")
        .field("y", "I")
        .method(
            "norm",
            "()I",
            &[("app.Point", "x", OpKind::Get), ("app.Point", "y", OpKind::Get)],
        )
        .method(
            "scale",
            "(I)V",
            &[("app.Point", "x", OpKind::Put), ("app.Point", "y", OpKind::Put)],
        )
        .build();
    let scattered = ClassBytes::new("app.Grab")
        .field("a", "I")
        .field("b", "I")
        .method("first", "()V", &[("app.Grab", "a", OpKind::Get)])
        .method("second", "()V", &[("app.Grab", "b", OpKind::Get)])
        .build();
    fs::write(dir.join("Point.class"), cohesive).unwrap();
    fs::write(dir.join("Grab.class"), scattered).unwrap();
}

#[test]
fn cli_analyzes_a_directory_of_classes() {
    let tmp = TempDir::new().unwrap();
    write_fixture_classes(tmp.path());
    let output = knit_binary().arg(tmp.path()).output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stdout: {stdout}");
    assert!(stdout.contains("app.Point"));
    assert!(stdout.contains("app.Grab"));
    assert!(stdout.contains("LCOM"));
    assert!(stdout.contains("classes analyzed"));
}

#[test]
fn cli_json_output_parses() {
    let tmp = TempDir::new().unwrap();
    write_fixture_classes(tmp.path());
    let output = knit_binary().arg(tmp.path()).arg("--json").output().unwrap();
    assert!(output.status.success());
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(doc["report"]["classes"]["app.Point"]["values"]["TCC"].is_number());
}

#[test]
fn cli_metric_subset_limits_columns() {
    let tmp = TempDir::new().unwrap();
    write_fixture_classes(tmp.path());
    let output = knit_binary()
        .arg(tmp.path())
        .args(["--metrics", "CCM,TCC"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("CCM"));
    assert!(!stdout.contains("LCOM5"));
}

#[test]
fn cli_rejects_unknown_metric_names_before_decoding() {
    let tmp = TempDir::new().unwrap();
    write_fixture_classes(tmp.path());
    let output = knit_binary()
        .arg(tmp.path())
        .args(["--metrics", "LCOM,WRONG"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("WRONG"));
}

#[test]
fn cli_skeleton_subcommand_dumps_json() {
    let tmp = TempDir::new().unwrap();
    write_fixture_classes(tmp.path());
    let output = knit_binary()
        .arg("skeleton")
        .arg(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(doc["packages"]["app"]["classes"]["app.Point"].is_object());
}

#[test]
fn cli_reports_missing_inputs_gracefully() {
    let tmp = TempDir::new().unwrap();
    let output = knit_binary().arg(tmp.path()).output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("No class files"));
}

#[test]
fn cli_keeps_going_past_corrupt_classes() {
    let tmp = TempDir::new().unwrap();
    write_fixture_classes(tmp.path());
    fs::write(tmp.path().join("Corrupt.class"), b"not a class file").unwrap();
    let output = knit_binary().arg(tmp.path()).output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success());
    assert!(stdout.contains("app.Point"));
    assert!(stderr.contains("Corrupt.class"));
}
