//! End-to-end tests: detect, merge and rewrite files on disk.

use anyhow::Result;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use unconvert::ast::BinaryOp;
use unconvert::commands::{apply_edit_set, run_apply};
use unconvert::formatter::Verbatim;
use unconvert::source::SourceUnit;
use unconvert::test_utils::{Fixture, FixtureFrontEnd};
use unconvert::types::BasicKind;
use unconvert::{BuildConfig, Unconvert};

/// A file mixing redundant, required-paren and genuine conversions.
fn mixed_unit(path: &Path) -> SourceUnit {
    let fx = Fixture::new();

    let v = fx.var("v", BasicKind::Int64);
    let plain = fx.conv(fx.basic_type(BasicKind::Int64), v);

    let a = fx.var("a", BasicKind::Int);
    let b = fx.var("b", BasicKind::Int);
    let c = fx.var("c", BasicKind::Int);
    let sum = fx.binary(b, BinaryOp::Add, c);
    let conv = fx.conv(fx.basic_type(BasicKind::Int), sum);
    let product = fx.binary(a, BinaryOp::Mul, conv);

    let i = fx.var("i", BasicKind::Int32);
    let genuine = fx.conv(fx.basic_type(BasicKind::Int64), i);

    let body = vec![fx.blank(plain), fx.blank(product), fx.blank(genuine)];
    fx.finish(path, vec![fx.func_decl("f", body)])
}

#[test]
fn test_apply_rewrites_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("mixed.go");
    let unit = mixed_unit(&path);
    fs::write(&path, &*unit.source)?;

    let config = BuildConfig::new("linux", "amd64", false);
    let front_end = FixtureFrontEnd::new().with_units(config.clone(), vec![unit]);
    let set = Unconvert::new()
        .with_configs(vec![config])
        .merge_edits(&front_end)?;
    assert_eq!(set.len(), 2);

    let mut out = Vec::new();
    let results = run_apply(&set, &Verbatim, false, &mut out)?;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].conversions_removed, 2);
    assert!(String::from_utf8(out)?.contains("(2 removed)"));

    assert_eq!(
        fs::read_to_string(&path)?,
        "package p\n\nfunc f() {\n\t_ = v\n\t_ = a * (b + c)\n\t_ = int64(i)\n}\n"
    );
    Ok(())
}

#[test]
fn test_report_mode_leaves_files_alone() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("mixed.go");
    let unit = mixed_unit(&path);
    let original = unit.source.to_string();
    fs::write(&path, &original)?;

    let config = BuildConfig::new("linux", "amd64", false);
    let front_end = FixtureFrontEnd::new().with_units(config.clone(), vec![unit]);
    let set = Unconvert::new()
        .with_configs(vec![config])
        .merge_edits(&front_end)?;

    let mut out = Vec::new();
    unconvert::commands::run_report(&set, true, &mut out)?;
    let report = String::from_utf8(out)?;
    assert_eq!(report.lines().count(), 2);
    assert!(report.lines().all(|l| l.ends_with(": useless conversion")));
    assert_eq!(fs::read_to_string(&path)?, original);
    Ok(())
}

#[test]
fn test_stale_edits_fail_without_writing() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("mixed.go");
    let unit = mixed_unit(&path);
    let config = BuildConfig::new("linux", "amd64", false);
    let front_end = FixtureFrontEnd::new().with_units(config.clone(), vec![unit]);
    let set = Unconvert::new()
        .with_configs(vec![config])
        .merge_edits(&front_end)?;

    // The file on disk is shorter than the one that was analyzed.
    fs::write(&path, "package p\n")?;
    assert!(apply_edit_set(&set, &Verbatim).is_err());
    assert_eq!(fs::read_to_string(&path)?, "package p\n");
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_apply_through_external_formatter() -> Result<()> {
    use unconvert::formatter::CommandFormatter;

    let dir = TempDir::new()?;
    let path = dir.path().join("mixed.go");
    let unit = mixed_unit(&path);
    fs::write(&path, &*unit.source)?;

    let config = BuildConfig::new("linux", "amd64", false);
    let front_end = FixtureFrontEnd::new().with_units(config.clone(), vec![unit]);
    let set = Unconvert::new()
        .with_configs(vec![config])
        .merge_edits(&front_end)?;

    apply_edit_set(&set, &CommandFormatter::new("cat", Vec::new()))?;
    assert!(fs::read_to_string(&path)?.contains("\t_ = v\n"));

    fs::write(&path, &*mixed_unit(&path).source)?;
    let failing = CommandFormatter::new("false", Vec::new());
    assert!(apply_edit_set(&set, &failing).is_err());
    assert!(fs::read_to_string(&path)?.contains("int64(v)"));
    Ok(())
}
