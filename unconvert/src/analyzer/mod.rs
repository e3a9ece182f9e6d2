//! Unconvert analysis engine.
//!
//! - `processing`: per-configuration detection and the cross-configuration merge
//! - Core [`Unconvert`] struct and its builder methods

mod processing;

use crate::config::Config;
use crate::detector::DetectOptions;
use crate::frontend::BuildConfig;
use crate::untyped::UntypedMode;

/// The main analyzer struct.
/// Configuration options for the analysis are stored here.
#[derive(Debug, Clone)]
pub struct Unconvert {
    /// Detector settings.
    pub options: DetectOptions,
    /// Configurations that must all agree before a removal is kept.
    pub configs: Vec<BuildConfig>,
    /// Whether to enable verbose logging.
    pub verbose: bool,
}

impl Default for Unconvert {
    fn default() -> Self {
        Self {
            options: DetectOptions::default(),
            configs: vec![BuildConfig::host()],
            verbose: false,
        }
    }
}

impl Unconvert {
    /// Analyzer for the host configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyzer using the settings of a loaded `.unconvert.toml`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let settings = &config.unconvert;
        let analyzer = Self::new()
            .with_fast_math(settings.fast_math.unwrap_or(false))
            .with_untyped_mode(settings.untyped.unwrap_or_default());
        match &settings.platforms {
            Some(platforms) => analyzer.with_configs(
                platforms
                    .iter()
                    .map(|p| BuildConfig::new(&p.os, &p.arch, p.cgo))
                    .collect(),
            ),
            None => analyzer,
        }
    }

    /// Builder-style method to set the configurations to merge.
    #[must_use]
    pub fn with_configs(mut self, configs: Vec<BuildConfig>) -> Self {
        self.configs = configs;
        self
    }

    /// Builder-style method to merge over every platform.
    #[must_use]
    pub fn with_all_platforms(self) -> Self {
        self.with_configs(BuildConfig::platforms())
    }

    /// Builder-style method to set the untyped-value classifier.
    #[must_use]
    pub fn with_untyped_mode(mut self, mode: UntypedMode) -> Self {
        self.options.untyped = mode;
        self
    }

    /// Builder-style method to allow removing fusion-guarding float conversions.
    #[must_use]
    pub fn with_fast_math(mut self, enabled: bool) -> Self {
        self.options.fast_math = enabled;
        self
    }

    /// Builder-style method to set verbose mode.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}
