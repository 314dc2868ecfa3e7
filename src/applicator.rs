//! Patch applicator - applies snippet pairs across the target corpus
//!
//! For every target the active pairs are tried in order against the
//! in-memory content. A later pair sees the output of every earlier pair on
//! the same file, so application order is part of the contract. Each file is
//! persisted at most once, and only when its content changed.

use crate::edit::{EditError, Rewrite, RewriteResult};
use crate::snippet::SnippetPair;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Knobs for [`apply_pairs`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Compute everything but leave files on disk untouched
    pub dry_run: bool,
    /// Keep before/after text of modified files in the outcome
    pub keep_changes: bool,
}

/// A target that could not be read and was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Before/after text of one modified target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: PathBuf,
    pub before: String,
    pub after: String,
}

/// Counters accumulated over one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplicationOutcome {
    /// Targets read successfully
    pub files_scanned: usize,
    /// Targets whose content changed (written unless dry run)
    pub files_modified: usize,
    /// One per (file, pair) where the pair's original block was found
    pub total_applications: usize,
    pub per_pair: BTreeMap<String, usize>,
    /// Pairs that matched at least once
    pub used: BTreeSet<String>,
    pub read_failures: Vec<ReadFailure>,
    #[serde(skip)]
    pub changes: Vec<FileChange>,
}

impl ApplicationOutcome {
    /// Active pairs that never matched, in their original order.
    pub fn unused<'a>(&self, pairs: &'a [SnippetPair]) -> Vec<&'a str> {
        pairs
            .iter()
            .map(SnippetPair::name)
            .filter(|name| !self.used.contains(*name))
            .collect()
    }
}

/// Fatal errors during application. Everything recoverable ends up in
/// [`ApplicationOutcome`] instead.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("could not write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: EditError,
    },
}

/// Apply `pairs` in order to `content`.
///
/// Returns the rewritten text and the names of pairs that matched, in the
/// order they were applied. Matching is exact, case- and
/// whitespace-sensitive substring equality.
pub fn apply_to_text<'a>(pairs: &'a [SnippetPair], content: &str) -> (String, Vec<&'a str>) {
    let mut current = content.to_string();
    let mut applied = Vec::new();

    for pair in pairs {
        if current.contains(pair.original()) {
            current = current.replace(pair.original(), pair.patched());
            applied.push(pair.name());
        }
    }

    (current, applied)
}

/// Apply every pair to every target, rewriting targets that changed.
///
/// Unreadable targets are skipped and counted. A failed write aborts the
/// whole run immediately.
pub fn apply_pairs(
    pairs: &[SnippetPair],
    targets: &[PathBuf],
    options: &ApplyOptions,
) -> Result<ApplicationOutcome, ApplicationError> {
    apply_pairs_with(pairs, targets, options, |path, text| {
        Rewrite::new(path, text).apply()
    })
}

/// [`apply_pairs`] with the persistence step supplied by the caller.
fn apply_pairs_with<W>(
    pairs: &[SnippetPair],
    targets: &[PathBuf],
    options: &ApplyOptions,
    mut write: W,
) -> Result<ApplicationOutcome, ApplicationError>
where
    W: FnMut(&Path, &str) -> Result<RewriteResult, EditError>,
{
    let mut outcome = ApplicationOutcome::default();

    for target in targets {
        let content = match fs::read_to_string(target) {
            Ok(content) => content,
            Err(err) => {
                log::debug!("could not read {}: {err}", target.display());
                outcome.read_failures.push(ReadFailure {
                    path: target.clone(),
                    message: err.to_string(),
                });
                continue;
            }
        };
        outcome.files_scanned += 1;

        let (patched, applied) = apply_to_text(pairs, &content);
        for name in applied {
            log::debug!("found match for '{name}' in '{}'", display_name(target));
            outcome.total_applications += 1;
            *outcome.per_pair.entry(name.to_string()).or_default() += 1;
            outcome.used.insert(name.to_string());
        }

        if patched == content {
            continue;
        }
        outcome.files_modified += 1;

        if options.dry_run {
            log::info!("would write changes to {}", target.display());
        } else {
            log::info!("writing changes to {}", target.display());
            let written = write(target.as_path(), patched.as_str()).map_err(|source| {
                ApplicationError::Write {
                    path: target.clone(),
                    source,
                }
            })?;
            log::debug!("{written:?}");
        }

        if options.keep_changes {
            outcome.changes.push(FileChange {
                path: target.clone(),
                before: content,
                after: patched,
            });
        }
    }

    Ok(outcome)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read-only state of one pair against the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum PairStatus {
    /// Original block present; applying would change `files` targets
    Pending { files: usize },
    /// Original block absent, patched block present in `files` targets.
    /// Deletions cannot be observed, so an absent deletion reports zero.
    Applied { files: usize },
    /// Neither block present anywhere
    Missing,
}

/// Output of [`check_pairs`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub pairs: Vec<(String, PairStatus)>,
    pub read_failures: Vec<ReadFailure>,
}

/// Classify every pair against the targets without mutating anything.
///
/// Each pair is checked against the unpatched corpus independently, so
/// chained pairs whose original only appears after an earlier pair runs
/// show as missing here.
pub fn check_pairs(pairs: &[SnippetPair], targets: &[PathBuf]) -> StatusReport {
    let mut report = StatusReport::default();
    let mut original_hits = vec![0usize; pairs.len()];
    let mut patched_hits = vec![0usize; pairs.len()];

    for target in targets {
        let content = match fs::read_to_string(target) {
            Ok(content) => content,
            Err(err) => {
                report.read_failures.push(ReadFailure {
                    path: target.clone(),
                    message: err.to_string(),
                });
                continue;
            }
        };

        for (i, pair) in pairs.iter().enumerate() {
            if content.contains(pair.original()) {
                original_hits[i] += 1;
            } else if !pair.is_deletion() && content.contains(pair.patched()) {
                patched_hits[i] += 1;
            }
        }
    }

    for (i, pair) in pairs.iter().enumerate() {
        let status = if original_hits[i] > 0 {
            PairStatus::Pending {
                files: original_hits[i],
            }
        } else if patched_hits[i] > 0 || pair.is_deletion() {
            PairStatus::Applied {
                files: patched_hits[i],
            }
        } else {
            PairStatus::Missing
        };
        report.pairs.push((pair.name().to_string(), status));
    }

    report
}
