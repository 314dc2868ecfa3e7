//! Smali Patcher: literal snippet-pair patching for decompiled trees
//!
//! A patch is a pair of snippet files sharing a name: an "original" block and
//! the "patched" block that replaces it. Every target file in the decompiled
//! tree is scanned for each original block, and every occurrence is replaced.
//!
//! # Architecture
//!
//! - [`snippet`] pairs original/patched snippet files and reports anomalies
//! - [`experimental`] drops opt-in pairs unless they are enabled
//! - [`applicator`] applies pairs in order and rewrites changed targets
//! - [`report`] aggregates everything and decides success
//!
//! Matching is exact substring equality. Nothing parses the target format.
//!
//! # Ordering
//!
//! Pairs are applied in lexicographic name order, and each pair sees the
//! output of the pairs before it on the same file:
//!
//! ```
//! use smali_patcher::{apply_to_text, SnippetPair};
//!
//! let pairs = vec![
//!     SnippetPair::new("p1", "A", "B"),
//!     SnippetPair::new("p2", "B", "C"),
//! ];
//! let (patched, applied) = apply_to_text(&pairs, "A");
//! assert_eq!(patched, "C");
//! assert_eq!(applied, vec!["p1", "p2"]);
//! ```

pub mod applicator;
pub mod config;
pub mod discovery;
pub mod edit;
pub mod experimental;
pub mod report;
pub mod run;
pub mod safety;
pub mod snippet;

// Re-exports
pub use applicator::{
    apply_pairs, apply_to_text, check_pairs, ApplicationError, ApplicationOutcome, ApplyOptions,
    FileChange, PairStatus, StatusReport,
};
pub use config::{parse_flag, ConfigError, Overrides, Settings, SettingsFile};
pub use discovery::{discover_targets, Discovery};
pub use edit::{EditError, Rewrite, RewriteResult};
pub use experimental::{filter_pairs, ExperimentalAudit, ExperimentalSet, FilteredPairs};
pub use report::{Level, ReportLine, RunReport};
pub use run::{prepare, run, status, Prepared, RunError};
pub use safety::{SafetyError, TreeGuard};
pub use snippet::{load_pairs, LoadError, LoadedPairs, PairValidationReport, SnippetPair};
