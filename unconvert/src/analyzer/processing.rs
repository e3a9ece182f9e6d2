//! Detection per configuration and the intersection merge.

use super::Unconvert;
use crate::detector::detect;
use crate::edits::EditSet;
use crate::error::{Result, UnconvertError};
use crate::frontend::{BuildConfig, FrontEnd, NoImporter};
use log::debug;
use rayon::prelude::*;

impl Unconvert {
    /// Finds the redundant conversions of every file loaded for `config`.
    ///
    /// Files are processed in parallel. A path loaded twice (the same file in
    /// two packages) keeps only the removals both loads agree on.
    pub fn compute_edits(&self, front_end: &dyn FrontEnd, config: &BuildConfig) -> Result<EditSet> {
        let units = front_end
            .load(config, &NoImporter)
            .map_err(|source| UnconvertError::FrontEnd {
                config: config.clone(),
                source,
            })?;

        let per_file = units
            .par_iter()
            .map(|unit| detect(unit, self.options).map(|removals| (unit.path.clone(), removals)))
            .collect::<Result<Vec<_>>>()?;

        let mut set = EditSet::new();
        for (path, removals) in per_file {
            set.insert_file(path, removals);
        }
        if self.verbose {
            eprintln!(
                "[VERBOSE] {config}: {} file(s), {} removal(s)",
                units.len(),
                set.len()
            );
        }
        debug!("{config}: {} removal(s) in {} file(s)", set.len(), units.len());
        Ok(set)
    }

    /// Computes every configured configuration in parallel and keeps the
    /// removals found under all of them.
    ///
    /// With no configurations the result is empty. The first front-end
    /// failure aborts the merge.
    pub fn merge_edits(&self, front_end: &dyn FrontEnd) -> Result<EditSet> {
        let merged = self
            .configs
            .par_iter()
            .map(|config| self.compute_edits(front_end, config))
            .try_reduce_with(|a, b| Ok(a.intersection(&b)));
        merged.unwrap_or_else(|| Ok(EditSet::new()))
    }

    /// Sequential fold over the configurations, in order.
    ///
    /// Holds at most two sets at a time; produces the same result as
    /// [`merge_edits`](Self::merge_edits).
    pub fn merge_edits_sequential(&self, front_end: &dyn FrontEnd) -> Result<EditSet> {
        let mut configs = self.configs.iter();
        let Some(first) = configs.next() else {
            return Ok(EditSet::new());
        };
        let mut merged = self.compute_edits(front_end, first)?;
        for config in configs {
            merged = merged.intersection(&self.compute_edits(front_end, config)?);
        }
        Ok(merged)
    }
}
