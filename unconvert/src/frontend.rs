//! Boundary to the parser and type checker.
//!
//! Parsing, package resolution and type checking are not done here. A
//! [`FrontEnd`] hands over fully checked [`SourceUnit`]s for one build
//! configuration at a time.

use crate::error::FrontEndError;
use crate::source::SourceUnit;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Target platform and cgo setting a package is checked under.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Operating system (`GOOS`).
    pub os: CompactString,
    /// Architecture (`GOARCH`).
    pub arch: CompactString,
    /// Whether cgo files take part.
    #[serde(default)]
    pub cgo_enabled: bool,
}

/// Platforms checked when every configuration must agree.
pub const PLATFORMS: &[(&str, &str)] = &[
    ("linux", "386"),
    ("linux", "amd64"),
    ("linux", "arm"),
    ("linux", "arm64"),
    ("linux", "mips64"),
    ("linux", "mips64le"),
    ("linux", "ppc64"),
    ("linux", "ppc64le"),
    ("nacl", "386"),
    ("nacl", "amd64p32"),
    ("nacl", "arm"),
    ("android", "386"),
    ("android", "amd64"),
    ("darwin", "386"),
    ("darwin", "amd64"),
    ("dragonfly", "amd64"),
    ("freebsd", "386"),
    ("freebsd", "amd64"),
    ("freebsd", "arm"),
    ("netbsd", "386"),
    ("netbsd", "amd64"),
    ("netbsd", "arm"),
    ("openbsd", "386"),
    ("openbsd", "amd64"),
    ("openbsd", "arm"),
    ("plan9", "386"),
    ("plan9", "amd64"),
    ("solaris", "amd64"),
    ("windows", "386"),
    ("windows", "amd64"),
];

impl BuildConfig {
    /// Configuration for `os`/`arch`.
    #[must_use]
    pub fn new(os: &str, arch: &str, cgo_enabled: bool) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
            cgo_enabled,
        }
    }

    /// Every entry of [`PLATFORMS`], with cgo disabled.
    #[must_use]
    pub fn platforms() -> Vec<Self> {
        PLATFORMS
            .iter()
            .map(|(os, arch)| Self::new(os, arch, false))
            .collect()
    }

    /// The platform this process runs on, with cgo enabled.
    #[must_use]
    pub fn host() -> Self {
        let os = match std::env::consts::OS {
            "macos" => "darwin",
            other => other,
        };
        let arch = match std::env::consts::ARCH {
            "x86_64" => "amd64",
            "x86" => "386",
            "aarch64" => "arm64",
            "powerpc64" => "ppc64",
            other => other,
        };
        Self::new(os, arch, true)
    }
}

impl fmt::Display for BuildConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

/// A package made available to the type checker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Import path.
    pub path: String,
    /// Package name.
    pub name: CompactString,
}

/// Resolves imports on behalf of the type checker.
pub trait Importer: Sync {
    /// Returns the package imported as `path`.
    fn import(&self, path: &str) -> Result<Package, FrontEndError>;
}

/// Importer for front ends that load every dependency from source.
///
/// Any call is a front-end bug and is reported as
/// [`FrontEndError::UnexpectedImport`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImporter;

impl Importer for NoImporter {
    fn import(&self, path: &str) -> Result<Package, FrontEndError> {
        Err(FrontEndError::UnexpectedImport {
            path: path.to_owned(),
        })
    }
}

/// Produces checked source files for a build configuration.
pub trait FrontEnd: Sync {
    /// Loads every file of the requested packages under `config`.
    fn load(
        &self,
        config: &BuildConfig,
        importer: &dyn Importer,
    ) -> Result<Vec<SourceUnit>, FrontEndError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_list() {
        let platforms = BuildConfig::platforms();
        assert_eq!(platforms.len(), 30);
        assert!(platforms.iter().all(|p| !p.cgo_enabled));
        assert_eq!(platforms[1].to_string(), "linux/amd64");
    }

    #[test]
    fn test_host_uses_go_names() {
        let host = BuildConfig::host();
        assert!(host.cgo_enabled);
        assert_ne!(host.arch, "x86_64");
        assert_ne!(host.os, "macos");
    }

    #[test]
    fn test_no_importer_is_typed_error() {
        let err = NoImporter.import("fmt").unwrap_err();
        assert!(matches!(err, FrontEndError::UnexpectedImport { ref path } if path == "fmt"));
        assert_eq!(err.to_string(), "unexpected import of \"fmt\"");
    }
}
