//! Integration tests for the dispatch happy path
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

/// A stand-in compiler that records `$PWD|$*` per invocation, then runs `body`
fn write_fake_tool(dir: &Path, log: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-tool");
    let script = format!(
        "#!/bin/sh\nprintf '%s|%s\\n' \"$PWD\" \"$*\" >> \"{}\"\n{}\n",
        log.display(),
        body
    );
    fs::write(&path, script).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

fn read_log(log: &Path) -> Vec<(String, String)> {
    fs::read_to_string(log)
        .unwrap_or_default()
        .lines()
        .map(|line| {
            let (pwd, args) = line.split_once('|').expect("log line format");
            (pwd.to_string(), args.to_string())
        })
        .collect()
}

#[test]
fn test_single_entry_success() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("a.css"), "body {}").unwrap();
    fs::write(tmp.path().join("tailbuild.json"), r#"{"a.css": "b.css"}"#).unwrap();

    let log = tmp.path().join("invocations.log");
    let tool = write_fake_tool(tmp.path(), &log, "exit 0");

    let output = tailbuild(&["--tool", tool.to_str().unwrap()], tmp.path());
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout.trim(), "a.css -> b.css");

    let invocations = read_log(&log);
    assert_eq!(invocations.len(), 1);
    assert_eq!(invocations[0].1, "-i a.css -o b.css");
}

#[test]
fn test_child_working_directory_is_base_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let base = tmp.path().join("project");
    fs::create_dir_all(&base).unwrap();
    fs::write(base.join("a.css"), "body {}").unwrap();
    let manifest = base.join("tailbuild.json");
    fs::write(&manifest, r#"{"a.css": "b.css"}"#).unwrap();

    let log = tmp.path().join("invocations.log");
    let tool = write_fake_tool(tmp.path(), &log, "exit 0");

    // Run from outside the base directory; the manifest's directory anchors
    let output = tailbuild(
        &[manifest.to_str().unwrap(), "--tool", tool.to_str().unwrap()],
        tmp.path(),
    );
    assert!(output.status.success());

    let invocations = read_log(&log);
    assert_eq!(invocations.len(), 1);
    assert_eq!(
        PathBuf::from(&invocations[0].0),
        fs::canonicalize(&base).unwrap()
    );
}

#[test]
fn test_invokes_once_per_entry_in_manifest_order() {
    let tmp = tempfile::tempdir().unwrap();
    for name in ["z.css", "a.css", "m.css"] {
        fs::write(tmp.path().join(name), "body {}").unwrap();
    }
    fs::write(
        tmp.path().join("tailbuild.json"),
        r#"{"z.css": "out-z.css", "a.css": "out-a.css", "m.css": "out-m.css"}"#,
    )
    .unwrap();

    let log = tmp.path().join("invocations.log");
    let tool = write_fake_tool(tmp.path(), &log, "exit 0");

    let output = tailbuild(&["--tool", tool.to_str().unwrap()], tmp.path());
    assert!(output.status.success());

    let args: Vec<_> = read_log(&log).into_iter().map(|(_, args)| args).collect();
    assert_eq!(
        args,
        vec![
            "-i z.css -o out-z.css",
            "-i a.css -o out-a.css",
            "-i m.css -o out-m.css",
        ]
    );
}

#[test]
fn test_tool_args_are_passed_through() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("a.css"), "body {}").unwrap();
    fs::write(tmp.path().join("tailbuild.json"), r#"{"a.css": "b.css"}"#).unwrap();

    let log = tmp.path().join("invocations.log");
    let tool = write_fake_tool(tmp.path(), &log, "exit 0");

    let output = tailbuild(
        &["--tool", tool.to_str().unwrap(), "--tool-arg", "--minify"],
        tmp.path(),
    );
    assert!(output.status.success());

    let invocations = read_log(&log);
    assert_eq!(invocations[0].1, "-i a.css -o b.css --minify");
}

#[test]
fn test_directory_entry_expands_to_sorted_files() {
    let tmp = tempfile::tempdir().unwrap();
    let styles = tmp.path().join("styles");
    fs::create_dir_all(&styles).unwrap();
    fs::write(styles.join("main.css"), "body {}").unwrap();
    fs::write(styles.join("admin.css"), "body {}").unwrap();
    fs::write(styles.join("readme.txt"), "not css").unwrap();
    fs::write(tmp.path().join("tailbuild.json"), r#"{"styles": "dist"}"#).unwrap();

    let log = tmp.path().join("invocations.log");
    let tool = write_fake_tool(tmp.path(), &log, "exit 0");

    let output = tailbuild(&["--tool", tool.to_str().unwrap()], tmp.path());
    assert!(output.status.success());

    let args: Vec<_> = read_log(&log).into_iter().map(|(_, args)| args).collect();
    assert_eq!(
        args,
        vec![
            "-i styles/admin.css -o dist/admin.css",
            "-i styles/main.css -o dist/main.css",
        ]
    );
}
