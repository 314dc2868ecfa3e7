use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Whole-file replacement of a target with its patched text.
///
/// Every modified target is persisted through this primitive exactly once
/// per run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Rewrite does nothing until apply() is called"]
pub struct Rewrite {
    /// Path to the file to replace
    pub file: PathBuf,
    /// Full new contents
    pub new_text: String,
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("Path has no parent directory: {0}")]
    NoParent(PathBuf),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of applying a rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "RewriteResult should be checked"]
pub enum RewriteResult {
    /// New contents were written
    Written { file: PathBuf, bytes: usize },
    /// File on disk already held the new contents
    Unchanged { file: PathBuf },
}

impl Rewrite {
    pub fn new(file: impl Into<PathBuf>, new_text: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            new_text: new_text.into(),
        }
    }

    /// Persist the new contents atomically.
    ///
    /// Uses tempfile + fsync + rename, then bumps mtime so downstream
    /// rebuild tools notice the change.
    pub fn apply(&self) -> Result<RewriteResult, EditError> {
        if let Ok(current) = fs::read(&self.file) {
            if current == self.new_text.as_bytes() {
                return Ok(RewriteResult::Unchanged {
                    file: self.file.clone(),
                });
            }
        }

        atomic_write(&self.file, self.new_text.as_bytes())?;

        let now = filetime::FileTime::now();
        filetime::set_file_mtime(&self.file, now)?;

        Ok(RewriteResult::Written {
            file: self.file.clone(),
            bytes: self.new_text.len(),
        })
    }
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Either the full write succeeds or the original file is left untouched.
fn atomic_write(path: &Path, content: &[u8]) -> Result<(), EditError> {
    // Same directory keeps the rename on one filesystem
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    if !parent.is_dir() {
        return Err(EditError::NoParent(path.to_path_buf()));
    }

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;

    // Keep the target's permissions across the rename
    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file().set_permissions(metadata.permissions())?;
    }

    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
