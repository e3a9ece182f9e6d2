use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::CONFIG_FILENAME;
use crate::untyped::UntypedMode;

#[derive(Debug, Deserialize, Default, Clone)]
/// Top-level configuration struct.
pub struct Config {
    #[serde(default)]
    /// The `[unconvert]` section.
    pub unconvert: UnconvertConfig,
    /// The path to the configuration file this was loaded from.
    /// Set during `load_from_path`, `None` if using defaults.
    #[serde(skip)]
    pub config_file_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
/// Configuration options for unconvert.
pub struct UnconvertConfig {
    /// Allow removing float conversions that prevent fused multiply-add.
    pub fast_math: Option<bool>,
    /// How untyped values are classified.
    pub untyped: Option<UntypedMode>,
    /// Print one line per finding.
    pub oneliners: Option<bool>,
    /// Command (program and arguments) used to reformat applied files.
    pub formatter: Option<Vec<String>>,
    /// Configurations to merge over, replacing the host configuration.
    pub platforms: Option<Vec<PlatformConfig>>,
}

/// One target platform.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Operating system, e.g. `linux`.
    pub os: String,
    /// Architecture, e.g. `amd64`.
    pub arch: String,
    /// Whether cgo is enabled.
    #[serde(default)]
    pub cgo: bool,
}

impl Config {
    /// Loads configuration starting from a specific path and traversing up.
    ///
    /// A file that cannot be read or parsed is skipped and the search
    /// continues in the parent directory.
    #[must_use]
    pub fn load_from_path(path: &Path) -> Self {
        let mut current = path.to_path_buf();
        if current.is_file() {
            current.pop();
        }

        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                match fs::read_to_string(&candidate)
                    .map_err(|e| e.to_string())
                    .and_then(|content| toml::from_str::<Config>(&content).map_err(|e| e.to_string()))
                {
                    Ok(mut config) => {
                        config.config_file_path = Some(candidate);
                        return config;
                    }
                    Err(e) => log::warn!("ignoring {}: {e}", candidate.display()),
                }
            }

            if !current.pop() {
                break;
            }
        }

        Config::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_section() {
        let content = r#"
[unconvert]
fast_math = true
untyped = "strict"
oneliners = true
formatter = ["gofmt", "-s"]
platforms = [{ os = "linux", arch = "amd64" }, { os = "darwin", arch = "arm64", cgo = true }]
"#;
        let config = toml::from_str::<Config>(content).unwrap();
        let settings = config.unconvert;
        assert_eq!(settings.fast_math, Some(true));
        assert_eq!(settings.untyped, Some(UntypedMode::Strict));
        assert_eq!(settings.oneliners, Some(true));
        assert_eq!(
            settings.formatter,
            Some(vec!["gofmt".to_owned(), "-s".to_owned()])
        );
        let platforms = settings.platforms.unwrap();
        assert_eq!(platforms.len(), 2);
        assert!(!platforms[0].cgo);
        assert!(platforms[1].cgo);
    }

    #[test]
    fn test_load_from_path_no_config() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from_path(dir.path());
        assert!(config.config_file_path.is_none());
        assert_eq!(config.unconvert, UnconvertConfig::default());
    }

    #[test]
    fn test_load_from_path_traverses_up() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("cmd").join("tool");
        std::fs::create_dir_all(&nested).unwrap();

        let mut file = std::fs::File::create(dir.path().join(CONFIG_FILENAME)).unwrap();
        writeln!(
            file,
            r"[unconvert]
oneliners = true
"
        )
        .unwrap();

        let config = Config::load_from_path(&nested);
        assert_eq!(config.unconvert.oneliners, Some(true));
        assert_eq!(
            config.config_file_path,
            Some(dir.path().join(CONFIG_FILENAME))
        );
    }

    #[test]
    fn test_load_from_file_path() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILENAME),
            "[unconvert]\nfast_math = true\n",
        )
        .unwrap();
        let edits = dir.path().join("linux.json");
        std::fs::write(&edits, "{\"files\":{}}").unwrap();

        let config = Config::load_from_path(&edits);
        assert_eq!(config.unconvert.fast_math, Some(true));
    }

    #[test]
    fn test_invalid_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("sub");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "[unconvert]\noneliners = true\n")
            .unwrap();
        std::fs::write(nested.join(CONFIG_FILENAME), "[unconvert]\nuntyped = \"loose\"\n")
            .unwrap();

        let config = Config::load_from_path(&nested);
        assert_eq!(config.unconvert.oneliners, Some(true));
    }
}
