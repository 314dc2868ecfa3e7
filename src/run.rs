//! End-to-end run: load, filter, discover, apply, report.

use crate::applicator::{apply_pairs, check_pairs, ApplicationError, ApplyOptions, StatusReport};
use crate::config::Settings;
use crate::discovery::{discover_targets, Discovery};
use crate::experimental::{filter_pairs, ExperimentalSet, FilteredPairs};
use crate::report::RunReport;
use crate::safety::{SafetyError, TreeGuard};
use crate::snippet::{load_pairs, LoadError, PairValidationReport};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("target directory {} is not usable: {source}", path.display())]
    TargetDir {
        path: PathBuf,
        #[source]
        source: SafetyError,
    },

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Apply(#[from] ApplicationError),
}

/// Loaded, filtered pairs and the discovered targets, ready to apply.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub pairs_loaded: usize,
    pub validation: PairValidationReport,
    pub filtered: FilteredPairs,
    pub discovery: Discovery,
}

pub fn prepare(settings: &Settings, experimental: &ExperimentalSet) -> Result<Prepared, RunError> {
    let loaded = load_pairs(
        &settings.original_dir(),
        &settings.patched_dir(),
        &settings.snippet_extension,
    )?;
    let pairs_loaded = loaded.pairs.len();
    let filtered = filter_pairs(loaded.pairs, experimental, settings.experimental);

    let guard = TreeGuard::new(&settings.target_dir)
        .map_err(|source| RunError::TargetDir {
            path: settings.target_dir.clone(),
            source,
        })?
        .forbid(&settings.patches_dir);
    let discovery = discover_targets(&guard, &settings.target_extension);
    log::debug!(
        "discovered {} target(s) under {}",
        discovery.files.len(),
        guard.root().display()
    );

    Ok(Prepared {
        pairs_loaded,
        validation: loaded.report,
        filtered,
        discovery,
    })
}

/// Apply the active pairs and build the run report.
///
/// Only a failed write is returned as an error once preparation succeeded;
/// a run with zero substitutions is an unsuccessful report, not an error.
pub fn run(
    settings: &Settings,
    experimental: &ExperimentalSet,
    options: &ApplyOptions,
) -> Result<RunReport, RunError> {
    let prepared = prepare(settings, experimental)?;
    let outcome = apply_pairs(
        &prepared.filtered.pairs,
        &prepared.discovery.files,
        options,
    )?;

    Ok(RunReport::new(
        prepared.pairs_loaded,
        prepared.validation,
        prepared.filtered.audit,
        &prepared.filtered.pairs,
        outcome,
    )
    .with_skipped_outside(prepared.discovery.skipped_outside)
    .with_dry_run(options.dry_run))
}

/// Read-only status of every active pair.
pub fn status(settings: &Settings, experimental: &ExperimentalSet) -> Result<StatusReport, RunError> {
    let prepared = prepare(settings, experimental)?;
    Ok(check_pairs(
        &prepared.filtered.pairs,
        &prepared.discovery.files,
    ))
}
