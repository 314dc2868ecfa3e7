//! Experimental pair filtering
//!
//! A fixed set of pair names is tagged as experimental. Those pairs only take
//! part in a run when explicitly enabled; everything else always does.

use crate::snippet::{closest_name, SnippetPair};
use serde::Serialize;
use std::collections::BTreeSet;

/// Pair names that are higher-risk and applied only on request.
pub const EXPERIMENTAL_PATCHES: &[&str] = &[
    "bypass_signature_check",
    "disable_integrity_probe",
    "enable_debug_menu",
    "force_offline_mode",
    "hide_update_prompt",
    "skip_splash_ads",
    "unlock_hidden_settings",
];

/// Exact-match set of experimental pair names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentalSet {
    names: BTreeSet<String>,
}

impl Default for ExperimentalSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ExperimentalSet {
    /// The built-in set from [`EXPERIMENTAL_PATCHES`].
    pub fn builtin() -> Self {
        Self::from_names(EXPERIMENTAL_PATCHES.iter().copied())
    }

    /// Duplicates collapse; blank entries are dropped.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = names
            .into_iter()
            .map(|name| -> String { name.into() })
            .filter(|name| !name.trim().is_empty())
            .collect();
        Self { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// An experimental name that matched no loaded pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmatchedName {
    pub name: String,
    pub suggestion: Option<String>,
}

/// What the filter did with the experimental set this run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExperimentalAudit {
    pub enabled: bool,
    /// Experimental pairs that stay active.
    pub included: Vec<String>,
    /// Experimental pairs removed from the run.
    pub excluded: Vec<String>,
    /// Set members with no loaded pair of that name.
    pub unmatched: Vec<UnmatchedName>,
}

/// Output of [`filter_pairs`].
#[derive(Debug, Clone, Default)]
pub struct FilteredPairs {
    /// Active pairs, in input order.
    pub pairs: Vec<SnippetPair>,
    pub audit: ExperimentalAudit,
}

/// Keep every non-experimental pair, and experimental pairs only when
/// `enabled` is set. Input order is preserved.
pub fn filter_pairs(
    pairs: Vec<SnippetPair>,
    experimental: &ExperimentalSet,
    enabled: bool,
) -> FilteredPairs {
    let mut audit = ExperimentalAudit {
        enabled,
        ..ExperimentalAudit::default()
    };

    let unmatched = experimental
        .iter()
        .filter(|name| !pairs.iter().any(|pair| pair.name() == *name))
        .map(|name| UnmatchedName {
            name: name.to_string(),
            suggestion: closest_name(name, pairs.iter().map(SnippetPair::name)),
        })
        .collect();
    audit.unmatched = unmatched;

    let mut kept = Vec::with_capacity(pairs.len());
    for pair in pairs {
        if !experimental.contains(pair.name()) {
            kept.push(pair);
        } else if enabled {
            log::info!("including experimental pair '{}'", pair.name());
            audit.included.push(pair.name().to_string());
            kept.push(pair);
        } else {
            log::info!("excluding experimental pair '{}'", pair.name());
            audit.excluded.push(pair.name().to_string());
        }
    }

    FilteredPairs { pairs: kept, audit }
}
