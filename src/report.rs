//! Run reporter
//!
//! Folds loader anomalies, the experimental audit and application counters
//! into one summary, and decides whether the run succeeded. A run succeeds
//! if and only if at least one substitution happened anywhere.

use crate::applicator::ApplicationOutcome;
use crate::experimental::ExperimentalAudit;
use crate::snippet::{PairValidationReport, SnippetPair};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warning,
    Error,
}

/// One line of the console summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportLine {
    pub level: Level,
    pub message: String,
}

impl ReportLine {
    fn info(message: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            level: Level::Warning,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            Level::Info => write!(f, "{}", self.message),
            Level::Warning => write!(f, "Warning: {}", self.message),
            Level::Error => write!(f, "Error: {}", self.message),
        }
    }
}

/// Everything known about a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub success: bool,
    pub pairs_loaded: usize,
    pub pairs_active: usize,
    pub validation: PairValidationReport,
    pub experimental: ExperimentalAudit,
    pub outcome: ApplicationOutcome,
    pub unused_pairs: Vec<String>,
    pub skipped_outside: Vec<PathBuf>,
    pub dry_run: bool,
}

impl RunReport {
    pub fn new(
        pairs_loaded: usize,
        validation: PairValidationReport,
        experimental: ExperimentalAudit,
        active: &[SnippetPair],
        outcome: ApplicationOutcome,
    ) -> Self {
        let unused_pairs = outcome
            .unused(active)
            .into_iter()
            .map(str::to_string)
            .collect();
        Self {
            success: outcome.total_applications > 0,
            pairs_loaded,
            pairs_active: active.len(),
            validation,
            experimental,
            outcome,
            unused_pairs,
            skipped_outside: Vec::new(),
            dry_run: false,
        }
    }

    pub fn with_skipped_outside(mut self, skipped: Vec<PathBuf>) -> Self {
        self.skipped_outside = skipped;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Summary lines in display order.
    pub fn lines(&self) -> Vec<ReportLine> {
        let mut lines = Vec::new();
        self.push_loader_lines(&mut lines);
        self.push_experimental_lines(&mut lines);
        self.push_outcome_lines(&mut lines);
        lines
    }

    fn push_loader_lines(&self, lines: &mut Vec<ReportLine>) {
        let v = &self.validation;

        lines.push(ReportLine::info(format!(
            "Snippet pairs loaded: {} ({} active)",
            self.pairs_loaded, self.pairs_active
        )));
        for name in &v.empty_original {
            lines.push(ReportLine::warning(format!(
                "original snippet '{name}' is empty and was skipped"
            )));
        }
        for name in &v.missing_patched {
            lines.push(ReportLine::warning(format!(
                "matching patched snippet not found for '{name}'"
            )));
        }
        for orphan in &v.orphan_patched {
            let hint = orphan
                .suggestion
                .as_ref()
                .map(|s| format!(" (did you mean '{s}'?)"))
                .unwrap_or_default();
            lines.push(ReportLine::warning(format!(
                "patched snippet '{}' has no original counterpart{hint}",
                orphan.name
            )));
        }
        for name in &v.empty_patched {
            lines.push(ReportLine::warning(format!(
                "pair '{name}' has an empty patched snippet and deletes every match"
            )));
        }
        for err in &v.read_errors {
            lines.push(ReportLine::error(format!(
                "could not read {} snippet '{}' ({}): {}",
                err.side,
                err.name,
                err.path.display(),
                err.message
            )));
        }
    }

    fn push_experimental_lines(&self, lines: &mut Vec<ReportLine>) {
        let audit = &self.experimental;

        lines.push(ReportLine::info(format!(
            "Experimental patches: {}",
            if audit.enabled { "enabled" } else { "disabled" }
        )));
        if !audit.included.is_empty() {
            lines.push(ReportLine::info(format!(
                "  included: {}",
                audit.included.join(", ")
            )));
        }
        if !audit.excluded.is_empty() {
            lines.push(ReportLine::info(format!(
                "  excluded: {}",
                audit.excluded.join(", ")
            )));
        }
        for unmatched in &audit.unmatched {
            let hint = unmatched
                .suggestion
                .as_ref()
                .map(|s| format!(" (closest loaded pair: '{s}')"))
                .unwrap_or_default();
            lines.push(ReportLine::info(format!(
                "  experimental name '{}' matches no loaded pair{hint}",
                unmatched.name
            )));
        }
    }

    fn push_outcome_lines(&self, lines: &mut Vec<ReportLine>) {
        let outcome = &self.outcome;

        for path in &self.skipped_outside {
            lines.push(ReportLine::warning(format!(
                "refused target outside the target tree: {}",
                path.display()
            )));
        }
        for failure in &outcome.read_failures {
            lines.push(ReportLine::warning(format!(
                "could not read {}: {}",
                failure.path.display(),
                failure.message
            )));
        }

        lines.push(ReportLine::info(format!(
            "Files scanned: {}",
            outcome.files_scanned
        )));
        lines.push(ReportLine::info(format!(
            "Files {}: {}",
            if self.dry_run { "that would change" } else { "modified" },
            outcome.files_modified
        )));
        for (name, count) in &outcome.per_pair {
            lines.push(ReportLine::info(format!("  {name}: {count} file(s)")));
        }
        for name in &self.unused_pairs {
            lines.push(ReportLine::warning(format!(
                "pair '{name}' matched nothing"
            )));
        }

        if self.success {
            lines.push(ReportLine::info(format!(
                "Patching process finished. Total patches applied: {}",
                outcome.total_applications
            )));
        } else {
            lines.push(ReportLine::error(
                "No patches were applied. The target was probably updated upstream \
                 and the original snippets no longer match",
            ));
        }
    }
}
