//! Reading `smali-patcher.toml`.

use crate::config::schema::{SettingsFile, ValidationError};
use crate::config::settings::DEFAULT_SETTINGS_FILE;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read settings from {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings TOML{}: {source}", origin_suffix(.path))]
    Toml {
        path: Option<PathBuf>,
        #[source]
        source: toml_edit::de::Error,
    },

    #[error("invalid settings{}: {source}", origin_suffix(.path))]
    Validation {
        path: Option<PathBuf>,
        #[source]
        source: ValidationError,
    },
}

fn origin_suffix(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|path| format!(" ({})", path.display()))
        .unwrap_or_default()
}

/// Parse settings text that did not come from a file.
pub fn load_from_str(input: &str) -> Result<SettingsFile, ConfigError> {
    parse(input, None)
}

/// Read a settings file.
///
/// Relative `target_dir` and `patches_dir` entries are anchored at the
/// directory holding the file, so a settings file describes the same tree
/// whatever directory the patcher is started from.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<SettingsFile, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut settings = parse(&contents, Some(path))?;
    if let Some(base) = path.parent() {
        anchor(&mut settings.paths.target_dir, base);
        anchor(&mut settings.paths.patches_dir, base);
    }
    Ok(settings)
}

/// The settings file for a run: `explicit` when given (it must exist),
/// otherwise `smali-patcher.toml` in `dir` when present.
pub fn find_settings(
    explicit: Option<&Path>,
    dir: &Path,
) -> Result<Option<SettingsFile>, ConfigError> {
    if let Some(path) = explicit {
        return load_from_path(path).map(Some);
    }

    let default = dir.join(DEFAULT_SETTINGS_FILE);
    if !default.is_file() {
        log::debug!("no {} in {}", DEFAULT_SETTINGS_FILE, dir.display());
        return Ok(None);
    }
    log::debug!("using settings from {}", default.display());
    load_from_path(&default).map(Some)
}

fn parse(input: &str, origin: Option<&Path>) -> Result<SettingsFile, ConfigError> {
    let path = || origin.map(Path::to_path_buf);
    let settings: SettingsFile = toml_edit::de::from_str(input).map_err(|source| {
        ConfigError::Toml {
            path: path(),
            source,
        }
    })?;
    settings
        .validate()
        .map_err(|source| ConfigError::Validation {
            path: path(),
            source,
        })?;
    Ok(settings)
}

fn anchor(entry: &mut Option<PathBuf>, base: &Path) {
    if let Some(path) = entry.as_mut() {
        if path.is_relative() {
            *path = base.join(&*path);
        }
    }
}
