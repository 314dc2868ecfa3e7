//! Containment for patch targets.
//!
//! Targets are rewritten through their resolved path, so a symlink inside
//! the decompiled tree is patched once and survives as a link, while one
//! leading out of the tree or into the snippet repository is refused.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// The decompiled tree plus the directories inside it that are off limits.
#[derive(Debug, Clone)]
pub struct TreeGuard {
    root: PathBuf,
    /// Snippet directories, which may sit inside the tree
    forbidden_paths: Vec<PathBuf>,
}

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("{} resolves outside the target tree {}", .path.display(), .root.display())]
    OutsideTree { path: PathBuf, root: PathBuf },

    #[error("{} lies in the snippet directory {}", .path.display(), .forbidden.display())]
    ForbiddenPath { path: PathBuf, forbidden: PathBuf },

    #[error("cannot resolve target path: {0}")]
    Canonicalize(#[from] std::io::Error),
}

impl TreeGuard {
    /// Guard the tree at `root`, which must exist.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, SafetyError> {
        Ok(Self {
            root: root.as_ref().canonicalize()?,
            forbidden_paths: Vec::new(),
        })
    }

    /// Refuse targets under `path`. Missing directories forbid nothing.
    pub fn forbid(mut self, path: impl AsRef<Path>) -> Self {
        if let Ok(canonical) = path.as_ref().canonicalize() {
            self.forbidden_paths.push(canonical);
        }
        self
    }

    /// Resolve a target to the file that would actually be rewritten.
    ///
    /// Relative paths are taken from the tree root.
    pub fn resolve_target(&self, path: impl AsRef<Path>) -> Result<PathBuf, SafetyError> {
        let resolved = self.root.join(path).canonicalize()?;

        if !resolved.starts_with(&self.root) {
            return Err(SafetyError::OutsideTree {
                path: resolved,
                root: self.root.clone(),
            });
        }
        if let Some(forbidden) = self
            .forbidden_paths
            .iter()
            .find(|forbidden| resolved.starts_with(forbidden))
        {
            return Err(SafetyError::ForbiddenPath {
                path: resolved,
                forbidden: forbidden.clone(),
            });
        }

        Ok(resolved)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_resolve_inside_tree() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        let guard = TreeGuard::new(root).unwrap();

        let file = root.join("smali/com/app/Main.smali");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, b"").unwrap();

        assert!(guard.resolve_target(&file).is_ok());
        assert!(guard.resolve_target("smali/com/app/Main.smali").is_ok());
    }

    #[test]
    fn test_resolve_outside_tree() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("apk_workdir");
        fs::create_dir_all(&root).unwrap();
        let guard = TreeGuard::new(&root).unwrap();

        let outside = temp_dir.path().join("Outside.smali");
        fs::write(&outside, b"").unwrap();

        let result = guard.resolve_target(&outside);
        assert!(matches!(result, Err(SafetyError::OutsideTree { .. })));
    }

    #[test]
    fn test_resolve_forbidden() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        let patches = root.join("patches");
        fs::create_dir_all(&patches).unwrap();
        let guard = TreeGuard::new(root).unwrap().forbid(&patches);

        let file = patches.join("Fake.smali");
        fs::write(&file, b"").unwrap();

        let result = guard.resolve_target(&file);
        assert!(matches!(result, Err(SafetyError::ForbiddenPath { .. })));
    }

    #[test]
    #[cfg(unix)]
    fn test_resolve_symlink_escape() {
        use std::os::unix::fs::symlink;

        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("apk_workdir");
        fs::create_dir_all(&root).unwrap();

        let outside = temp_dir.path().join("Outside.smali");
        fs::write(&outside, b"").unwrap();

        let link = root.join("Escape.smali");
        symlink(&outside, &link).unwrap();

        let guard = TreeGuard::new(&root).unwrap();
        let result = guard.resolve_target(&link);

        assert!(matches!(result, Err(SafetyError::OutsideTree { .. })));
    }
}
