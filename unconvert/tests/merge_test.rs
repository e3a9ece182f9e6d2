//! Test suite for the cross-configuration merge.

use unconvert::config::{Config, PlatformConfig};
use unconvert::error::FrontEndError;
use unconvert::source::SourceUnit;
use unconvert::test_utils::{Fixture, FixtureFrontEnd};
use unconvert::types::BasicKind;
use unconvert::untyped::UntypedMode;
use unconvert::{BuildConfig, Error, Unconvert};

fn amd64() -> BuildConfig {
    BuildConfig::new("linux", "amd64", false)
}

fn i386() -> BuildConfig {
    BuildConfig::new("linux", "386", false)
}

/// `_ = int64(n)` where `n` has the given type under the configuration.
fn width_unit(path: &str, width: BasicKind) -> SourceUnit {
    let fx = Fixture::new();
    let n = fx.var("n", width);
    let conv = fx.conv(fx.basic_type(BasicKind::Int64), n);
    fx.finish(path, vec![fx.func_decl("f", vec![fx.blank(conv)])])
}

fn two_configs() -> FixtureFrontEnd {
    FixtureFrontEnd::new()
        .with_units(amd64(), vec![width_unit("p/width.go", BasicKind::Int64)])
        .with_units(i386(), vec![width_unit("p/width.go", BasicKind::Int32)])
}

#[test]
fn test_single_configuration_flags() {
    let front_end = two_configs();
    let amd = Unconvert::new()
        .with_configs(vec![amd64()])
        .merge_edits(&front_end)
        .unwrap();
    assert_eq!(amd.len(), 1);

    let x86 = Unconvert::new()
        .with_configs(vec![i386()])
        .merge_edits(&front_end)
        .unwrap();
    assert!(x86.is_empty());
}

#[test]
fn test_configuration_dependent_conversion_is_kept() {
    let front_end = two_configs();
    let merged = Unconvert::new()
        .with_configs(vec![amd64(), i386()])
        .merge_edits(&front_end)
        .unwrap();
    assert!(merged.is_empty());
}

/// `_ = int64(v)` for each of `x`, `y` and `z`; the names in `wide` are
/// already `int64`, the others `int32`.
fn widths_unit(wide: &[&str]) -> SourceUnit {
    let fx = Fixture::new();
    let body = ["x", "y", "z"]
        .into_iter()
        .map(|name| {
            let kind = if wide.contains(&name) {
                BasicKind::Int64
            } else {
                BasicKind::Int32
            };
            let v = fx.var(name, kind);
            fx.blank(fx.conv(fx.basic_type(BasicKind::Int64), v))
        })
        .collect();
    fx.finish("p/widths.go", vec![fx.func_decl("f", body)])
}

#[test]
fn test_merge_is_order_independent() {
    let configs = [
        amd64(),
        BuildConfig::new("darwin", "arm64", false),
        BuildConfig::new("windows", "amd64", false),
    ];
    let flagged: [&[&str]; 3] = [&["x", "y", "z"], &["x", "y"], &["x", "z"]];
    let mut front_end = FixtureFrontEnd::new();
    for (config, wide) in configs.iter().zip(flagged) {
        front_end = front_end.with_units(config.clone(), vec![widths_unit(wide)]);
    }

    let only_x = FixtureFrontEnd::new().with_units(amd64(), vec![widths_unit(&["x"])]);
    let expected = Unconvert::new().compute_edits(&only_x, &amd64()).unwrap();
    assert_eq!(expected.len(), 1);

    let orders = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];
    for order in orders {
        let analyzer =
            Unconvert::new().with_configs(order.iter().map(|&i| configs[i].clone()).collect());
        assert_eq!(analyzer.merge_edits(&front_end).unwrap(), expected, "{order:?}");
        assert_eq!(
            analyzer.merge_edits_sequential(&front_end).unwrap(),
            expected,
            "{order:?}"
        );
    }
}

#[test]
fn test_file_absent_from_a_configuration_is_dropped() {
    let front_end = FixtureFrontEnd::new()
        .with_units(
            amd64(),
            vec![
                width_unit("p/width.go", BasicKind::Int64),
                width_unit("p/width_amd64.go", BasicKind::Int64),
            ],
        )
        .with_units(i386(), vec![width_unit("p/width.go", BasicKind::Int64)]);

    let merged = Unconvert::new()
        .with_configs(vec![amd64(), i386()])
        .merge_edits(&front_end)
        .unwrap();
    let files: Vec<_> = merged.files().map(|(path, _)| path.to_path_buf()).collect();
    assert_eq!(files, vec![std::path::PathBuf::from("p/width.go")]);
}

#[test]
fn test_file_in_two_packages_is_intersected() {
    let front_end = FixtureFrontEnd::new().with_units(
        amd64(),
        vec![
            width_unit("p/shared.go", BasicKind::Int64),
            width_unit("p/shared.go", BasicKind::Int32),
        ],
    );
    let set = Unconvert::new()
        .with_configs(vec![amd64()])
        .compute_edits(&front_end, &amd64())
        .unwrap();
    assert!(set.is_empty());

    let empty_first = FixtureFrontEnd::new().with_units(
        amd64(),
        vec![
            width_unit("p/shared.go", BasicKind::Int32),
            width_unit("p/shared.go", BasicKind::Int64),
        ],
    );
    let set = Unconvert::new()
        .compute_edits(&empty_first, &amd64())
        .unwrap();
    assert!(set.is_empty());
}

#[test]
fn test_front_end_failure_aborts() {
    let front_end = two_configs().with_failure(i386(), "undefined: n");
    let err = Unconvert::new()
        .with_configs(vec![amd64(), i386()])
        .merge_edits(&front_end)
        .unwrap_err();
    match err {
        Error::FrontEnd { config, source } => {
            assert_eq!(config, i386());
            assert!(matches!(source, FrontEndError::TypeCheck { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unexpected_import_is_an_error() {
    let front_end = two_configs().with_import("fmt");
    let err = Unconvert::new()
        .with_configs(vec![amd64()])
        .merge_edits_sequential(&front_end)
        .unwrap_err();
    assert!(err.to_string().contains("linux/amd64"));
    assert!(matches!(
        err,
        Error::FrontEnd {
            source: FrontEndError::UnexpectedImport { .. },
            ..
        }
    ));
}

#[test]
fn test_no_configurations_is_empty() {
    let front_end = two_configs();
    let analyzer = Unconvert::new().with_configs(Vec::new());
    assert!(analyzer.merge_edits(&front_end).unwrap().is_empty());
    assert!(analyzer.merge_edits_sequential(&front_end).unwrap().is_empty());
}

#[test]
fn test_all_platforms() {
    let analyzer = Unconvert::new().with_all_platforms();
    assert_eq!(analyzer.configs.len(), 30);

    let mut front_end = FixtureFrontEnd::new();
    for config in &analyzer.configs {
        front_end = front_end.with_units(
            config.clone(),
            vec![width_unit("p/width.go", BasicKind::Int64)],
        );
    }
    assert_eq!(analyzer.merge_edits(&front_end).unwrap().len(), 1);

    // A platform without the file drops it.
    let partial = two_configs();
    assert!(analyzer.merge_edits(&partial).unwrap().is_empty());
}

#[test]
fn test_from_config() {
    let mut config = Config::default();
    config.unconvert.fast_math = Some(true);
    config.unconvert.untyped = Some(UntypedMode::Strict);
    config.unconvert.platforms = Some(vec![PlatformConfig {
        os: "plan9".to_owned(),
        arch: "arm".to_owned(),
        cgo: false,
    }]);

    let analyzer = Unconvert::from_config(&config);
    assert!(analyzer.options.fast_math);
    assert_eq!(analyzer.options.untyped, UntypedMode::Strict);
    assert_eq!(analyzer.configs, vec![BuildConfig::new("plan9", "arm", false)]);

    let defaults = Unconvert::from_config(&Config::default());
    assert_eq!(defaults.configs, vec![BuildConfig::host()]);
}
