//! Integration tests for the dry-run plan
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn tailbuild(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tailbuild"))
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("failed to run tailbuild")
}

fn write_fake_tool(dir: &Path, log: &Path) -> PathBuf {
    let path = dir.join("fake-tool");
    let script = format!(
        "#!/bin/sh\nprintf '%s|%s\\n' \"$PWD\" \"$*\" >> \"{}\"\nexit 0\n",
        log.display()
    );
    fs::write(&path, script).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

#[test]
fn test_dry_run_prints_plan_without_invoking_tool() {
    let tmp = tempfile::tempdir().unwrap();
    for name in ["a.css", "c.css"] {
        fs::write(tmp.path().join(name), "body {}").unwrap();
    }
    fs::write(
        tmp.path().join("tailbuild.json"),
        r#"{"a.css": "b.css", "c.css": "d.css"}"#,
    )
    .unwrap();

    let log = tmp.path().join("invocations.log");
    let tool = write_fake_tool(tmp.path(), &log);

    let output = tailbuild(
        &["--dry-run", "--tool", tool.to_str().unwrap()],
        tmp.path(),
    );
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(!log.exists(), "dry run must not invoke the tool");
    assert!(stdout.contains("a.css -> b.css"), "stdout: {}", stdout);
    assert!(stdout.contains("c.css -> d.css"), "stdout: {}", stdout);
    assert!(stdout.contains("2 entries, 0 missing"), "stdout: {}", stdout);
}

#[test]
fn test_dry_run_flags_missing_sources() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("a.css"), "body {}").unwrap();
    fs::write(
        tmp.path().join("tailbuild.json"),
        r#"{"a.css": "b.css", "missing.css": "out.css"}"#,
    )
    .unwrap();

    let output = tailbuild(&["--dry-run"], tmp.path());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stdout.contains("a.css -> b.css"), "stdout: {}", stdout);
    assert!(stderr.contains("missing.css"), "stderr: {}", stderr);
    assert!(stdout.contains("2 entries, 1 missing"), "stdout: {}", stdout);
}
