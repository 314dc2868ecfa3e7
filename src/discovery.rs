//! Recursive target discovery by file extension.

use crate::safety::{SafetyError, TreeGuard};
use std::path::PathBuf;
use walkdir::WalkDir;

/// Target files found under the tree root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Targets in sorted path order.
    pub files: Vec<PathBuf>,
    /// Matching files refused by the tree guard.
    pub skipped_outside: Vec<PathBuf>,
}

/// Find every `*.<extension>` file below the guard's root.
///
/// Symlinks are followed and each target is recorded by its resolved path,
/// so a link and the file it points at are patched once, through the link.
/// Anything resolving outside the root or into a forbidden directory is
/// skipped. Unreadable directories are logged and skipped.
pub fn discover_targets(guard: &TreeGuard, extension: &str) -> Discovery {
    let mut discovery = Discovery::default();

    for entry in WalkDir::new(guard.root()).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("skipping unreadable path during discovery: {err}");
                continue;
            }
        };

        if !entry.file_type().is_file()
            || entry.path().extension().and_then(|s| s.to_str()) != Some(extension)
        {
            continue;
        }

        match guard.resolve_target(entry.path()) {
            Ok(canonical) => discovery.files.push(canonical),
            Err(err @ (SafetyError::OutsideTree { .. } | SafetyError::ForbiddenPath { .. })) => {
                log::debug!("refusing target {}: {err}", entry.path().display());
                discovery.skipped_outside.push(entry.into_path());
            }
            Err(err) => {
                log::warn!("skipping target {}: {err}", entry.path().display());
            }
        }
    }

    discovery.files.sort();
    discovery.files.dedup();
    discovery.skipped_outside.sort();
    discovery
}
