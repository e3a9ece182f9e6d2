use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use unconvert::source::Span;
use unconvert::{EditSet, Removal};

const SOURCE: &str = "package p\n\nvar x = int(y)\n";

/// Writes the Go file and an edit set removing `int(...)` from it.
fn setup(dir: &Path, sets: &[(&str, bool)]) -> Result<(PathBuf, Vec<PathBuf>)> {
    let go = dir.join("conv.go");
    fs::write(&go, SOURCE)?;
    let mut paths = Vec::new();
    for (name, flagged) in sets {
        let mut set = EditSet::new();
        if *flagged {
            let removals: BTreeSet<_> = [Removal::strip_parens(19, 22, Span::new(23, 24), 24)].into_iter().collect();
            set.insert_file(go.clone(), removals);
        }
        let path = dir.join(name);
        set.write_json(File::create(&path)?)?;
        paths.push(path);
    }
    Ok((go, paths))
}

#[test]
fn test_cli_report() -> Result<()> {
    let temp = TempDir::new()?;
    let (_, sets) = setup(temp.path(), &[("linux.json", true)])?;

    let mut cmd = Command::cargo_bin("unconvert-bin")?;
    cmd.args(&sets)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("conv.go:3:12:"))
        .stdout(predicate::str::contains("var x = int(y)"))
        .stdout(predicate::str::ends_with("           ^\n"));
    Ok(())
}

#[test]
fn test_cli_oneliners() -> Result<()> {
    let temp = TempDir::new()?;
    let (_, sets) = setup(temp.path(), &[("linux.json", true)])?;

    let mut cmd = Command::cargo_bin("unconvert-bin")?;
    cmd.arg("--oneliners")
        .args(&sets)
        .assert()
        .code(1)
        .stdout(predicate::str::ends_with(
            "conv.go:3:12: useless conversion\n",
        ));
    Ok(())
}

#[test]
fn test_cli_oneliners_from_config() -> Result<()> {
    let temp = TempDir::new()?;
    let (_, sets) = setup(temp.path(), &[("linux.json", true)])?;
    fs::write(
        temp.path().join(".unconvert.toml"),
        "[unconvert]\noneliners = true\n",
    )?;

    let mut cmd = Command::cargo_bin("unconvert-bin")?;
    cmd.args(&sets)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("useless conversion"));
    Ok(())
}

#[test]
fn test_cli_intersects_edit_sets() -> Result<()> {
    let temp = TempDir::new()?;
    let (go, sets) = setup(temp.path(), &[("linux.json", true), ("windows.json", false)])?;

    let mut cmd = Command::cargo_bin("unconvert-bin")?;
    cmd.args(["--apply", "--no-format"])
        .args(&sets)
        .assert()
        .success();
    assert_eq!(fs::read_to_string(go)?, SOURCE);
    Ok(())
}

#[test]
fn test_cli_json() -> Result<()> {
    let temp = TempDir::new()?;
    let (_, sets) = setup(temp.path(), &[("linux.json", true), ("darwin.json", true)])?;

    let mut cmd = Command::cargo_bin("unconvert-bin")?;
    let output = cmd.arg("--json").args(&sets).output()?;
    assert_eq!(output.status.code(), Some(1));
    let merged = EditSet::read_json(output.stdout.as_slice())?;
    assert_eq!(merged.len(), 1);
    Ok(())
}

#[test]
fn test_cli_apply() -> Result<()> {
    let temp = TempDir::new()?;
    let (go, sets) = setup(temp.path(), &[("linux.json", true)])?;

    let mut cmd = Command::cargo_bin("unconvert-bin")?;
    cmd.args(["--apply", "--no-format"])
        .args(&sets)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("(1 removed)"));
    assert_eq!(fs::read_to_string(go)?, "package p\n\nvar x = y\n");
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_cli_apply_formatter_failure() -> Result<()> {
    let temp = TempDir::new()?;
    let (go, sets) = setup(temp.path(), &[("linux.json", true)])?;

    let mut cmd = Command::cargo_bin("unconvert-bin")?;
    cmd.args(["--apply", "--formatter", "false"])
        .args(&sets)
        .assert()
        .failure()
        .stderr(predicate::str::contains("false"));
    assert_eq!(fs::read_to_string(go)?, SOURCE);
    Ok(())
}

#[test]
fn test_cli_missing_edit_set() -> Result<()> {
    let mut cmd = Command::cargo_bin("unconvert-bin")?;
    cmd.arg("/nonexistent/linux.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to open"));
    Ok(())
}

#[test]
fn test_cli_list_platforms() -> Result<()> {
    let temp = TempDir::new()?;
    let mut cmd = Command::cargo_bin("unconvert-bin")?;
    let output = cmd
        .current_dir(temp.path())
        .arg("--list-platforms")
        .output()?;
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout)?;
    assert_eq!(text.lines().count(), 30);
    assert!(text.lines().any(|l| l == "linux/amd64"));
    Ok(())
}

#[test]
fn test_cli_help() -> Result<()> {
    let mut cmd = Command::cargo_bin("unconvert-bin")?;
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("EDIT_SET"))
        .stdout(predicate::str::contains(".unconvert.toml"));
    Ok(())
}
