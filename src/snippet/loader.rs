//! Snippet repository loader
//!
//! Pairs `<name>.<ext>` files from an "original" directory with the
//! same-named files of a "patched" directory. Every anomaly is recorded in
//! a [`PairValidationReport`]; only directory-level problems abort a load.

use crate::snippet::closest_name;
use crate::snippet::pair::SnippetPair;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Which side of a pair a snippet file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Original,
    Patched,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Original => write!(f, "original"),
            Side::Patched => write!(f, "patched"),
        }
    }
}

/// A snippet file that could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnippetReadError {
    pub name: String,
    pub side: Side,
    pub path: PathBuf,
    pub message: String,
}

/// A patched snippet with no original counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Orphan {
    pub name: String,
    /// Closest original-side name, when one looks like a typo of this one.
    pub suggestion: Option<String>,
}

/// Anomalies found while pairing snippets. Diagnostic only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PairValidationReport {
    pub missing_patched: Vec<String>,
    pub orphan_patched: Vec<Orphan>,
    pub empty_original: Vec<String>,
    /// Accepted pairs whose patched block is blank (deletions).
    pub empty_patched: Vec<String>,
    pub read_errors: Vec<SnippetReadError>,
}

impl PairValidationReport {
    /// True when nothing was skipped or flagged.
    pub fn is_clean(&self) -> bool {
        self.missing_patched.is_empty()
            && self.orphan_patched.is_empty()
            && self.empty_original.is_empty()
            && self.empty_patched.is_empty()
            && self.read_errors.is_empty()
    }
}

/// Output of [`load_pairs`].
#[derive(Debug, Clone, Default)]
pub struct LoadedPairs {
    /// Valid pairs in lexicographic name order.
    pub pairs: Vec<SnippetPair>,
    pub report: PairValidationReport,
}

#[derive(Debug)]
pub enum LoadError {
    MissingDirectory { side: Side, path: PathBuf },
    Walk { path: PathBuf, source: walkdir::Error },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::MissingDirectory { side, path } => write!(
                f,
                "{} snippet directory not found: {}",
                side,
                path.display()
            ),
            LoadError::Walk { path, source } => {
                write!(f, "failed to list snippets in {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::MissingDirectory { .. } => None,
            LoadError::Walk { source, .. } => Some(source),
        }
    }
}

/// Load and validate snippet pairs.
///
/// `extension` is matched without the leading dot (`"smali-snippet"`).
pub fn load_pairs(
    original_dir: &Path,
    patched_dir: &Path,
    extension: &str,
) -> Result<LoadedPairs, LoadError> {
    let originals = list_snippets(original_dir, Side::Original, extension)?;
    let patched = list_snippets(patched_dir, Side::Patched, extension)?;

    let mut loaded = LoadedPairs::default();

    for (name, original_path) in &originals {
        let original = match read_snippet(name, Side::Original, original_path) {
            Ok(text) => text,
            Err(err) => {
                loaded.report.read_errors.push(err);
                continue;
            }
        };

        if original.trim().is_empty() {
            log::debug!("original snippet '{name}' is empty, skipping");
            loaded.report.empty_original.push(name.clone());
            continue;
        }

        let Some(patched_path) = patched.get(name) else {
            log::debug!("matching patched snippet not found for '{name}'");
            loaded.report.missing_patched.push(name.clone());
            continue;
        };

        let patched_text = match read_snippet(name, Side::Patched, patched_path) {
            Ok(text) => text,
            Err(err) => {
                loaded.report.read_errors.push(err);
                continue;
            }
        };

        let pair = SnippetPair::new(name.clone(), original, patched_text);
        if pair.is_deletion() {
            log::debug!("patched snippet '{name}' is empty, matched blocks will be deleted");
            loaded.report.empty_patched.push(name.clone());
        }
        loaded.pairs.push(pair);
    }

    for name in patched.keys().filter(|name| !originals.contains_key(*name)) {
        let suggestion = closest_name(name, originals.keys().map(String::as_str));
        log::debug!("patched snippet '{name}' has no original counterpart");
        loaded.report.orphan_patched.push(Orphan {
            name: name.clone(),
            suggestion,
        });
    }

    Ok(loaded)
}

/// Map snippet name -> path for every `*.<extension>` file directly in `dir`.
fn list_snippets(
    dir: &Path,
    side: Side,
    extension: &str,
) -> Result<BTreeMap<String, PathBuf>, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::MissingDirectory {
            side,
            path: dir.to_path_buf(),
        });
    }

    let suffix = format!(".{extension}");
    let mut snippets = BTreeMap::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| LoadError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_dir() {
            continue;
        }

        let Some(file_name) = entry.file_name().to_str() else {
            log::warn!("skipping non UTF-8 snippet name {}", entry.path().display());
            continue;
        };
        let name = match file_name.strip_suffix(&suffix) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };
        snippets.insert(name, entry.into_path());
    }

    Ok(snippets)
}

fn read_snippet(name: &str, side: Side, path: &Path) -> Result<String, SnippetReadError> {
    fs::read_to_string(path).map_err(|source| {
        log::debug!("could not read {side} snippet {}: {source}", path.display());
        SnippetReadError {
            name: name.to_string(),
            side,
            path: path.to_path_buf(),
            message: source.to_string(),
        }
    })
}
