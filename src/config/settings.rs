//! Effective run settings
//!
//! Each value is taken from the first source that provides it: command
//! line, environment, settings file, then the built-in default.

use crate::config::schema::SettingsFile;
use std::path::PathBuf;

pub const DEFAULT_TARGET_DIR: &str = "apk_workdir";
pub const DEFAULT_PATCHES_DIR: &str = "patches";
pub const DEFAULT_ORIGINAL_DIR: &str = "original";
pub const DEFAULT_PATCHED_DIR: &str = "patched";
pub const DEFAULT_TARGET_EXTENSION: &str = "smali";
pub const DEFAULT_SNIPPET_EXTENSION: &str = "smali-snippet";
pub const DEFAULT_SETTINGS_FILE: &str = "smali-patcher.toml";

pub const ENV_TARGET_DIR: &str = "SMALI_PATCHER_TARGET_DIR";
pub const ENV_PATCHES_DIR: &str = "SMALI_PATCHER_PATCHES_DIR";
pub const ENV_EXPERIMENTAL: &str = "ENABLE_EXPERIMENTAL_PATCHES";

const TRUTHY: &[&str] = &["1", "true", "yes", "y", "on"];

/// Coerce a flag string: a small set of case-insensitive tokens are true,
/// everything else is false.
///
/// ```
/// use smali_patcher::config::parse_flag;
///
/// assert!(parse_flag(" Yes "));
/// assert!(parse_flag("ON"));
/// assert!(!parse_flag("enabled"));
/// assert!(!parse_flag(""));
/// ```
pub fn parse_flag(value: &str) -> bool {
    let value = value.trim();
    TRUTHY.iter().any(|token| value.eq_ignore_ascii_case(token))
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub target_dir: Option<PathBuf>,
    pub patches_dir: Option<PathBuf>,
    /// Raw flag text, coerced with [`parse_flag`]
    pub experimental: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub target_dir: PathBuf,
    pub patches_dir: PathBuf,
    pub original_subdir: PathBuf,
    pub patched_subdir: PathBuf,
    pub target_extension: String,
    pub snippet_extension: String,
    pub experimental: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_dir: PathBuf::from(DEFAULT_TARGET_DIR),
            patches_dir: PathBuf::from(DEFAULT_PATCHES_DIR),
            original_subdir: PathBuf::from(DEFAULT_ORIGINAL_DIR),
            patched_subdir: PathBuf::from(DEFAULT_PATCHED_DIR),
            target_extension: DEFAULT_TARGET_EXTENSION.to_string(),
            snippet_extension: DEFAULT_SNIPPET_EXTENSION.to_string(),
            experimental: true,
        }
    }
}

impl Settings {
    /// Resolve settings from all sources. `env` looks up an environment
    /// variable by name.
    pub fn resolve<F>(file: Option<&SettingsFile>, overrides: &Overrides, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(file) = file {
            if let Some(dir) = &file.paths.target_dir {
                settings.target_dir = dir.clone();
            }
            if let Some(dir) = &file.paths.patches_dir {
                settings.patches_dir = dir.clone();
            }
            if let Some(dir) = &file.paths.original_dir {
                settings.original_subdir = dir.clone();
            }
            if let Some(dir) = &file.paths.patched_dir {
                settings.patched_subdir = dir.clone();
            }
            if let Some(ext) = &file.extensions.target {
                settings.target_extension = ext.clone();
            }
            if let Some(ext) = &file.extensions.snippet {
                settings.snippet_extension = ext.clone();
            }
            if let Some(enabled) = file.experimental.enabled {
                settings.experimental = enabled;
            }
        }

        if let Some(dir) = env(ENV_TARGET_DIR).filter(|v| !v.is_empty()) {
            settings.target_dir = PathBuf::from(dir);
        }
        if let Some(dir) = env(ENV_PATCHES_DIR).filter(|v| !v.is_empty()) {
            settings.patches_dir = PathBuf::from(dir);
        }
        if let Some(flag) = env(ENV_EXPERIMENTAL) {
            settings.experimental = parse_flag(&flag);
        }

        if let Some(dir) = &overrides.target_dir {
            settings.target_dir = dir.clone();
        }
        if let Some(dir) = &overrides.patches_dir {
            settings.patches_dir = dir.clone();
        }
        if let Some(flag) = &overrides.experimental {
            settings.experimental = parse_flag(flag);
        }

        settings
    }

    pub fn original_dir(&self) -> PathBuf {
        self.patches_dir.join(&self.original_subdir)
    }

    pub fn patched_dir(&self) -> PathBuf {
        self.patches_dir.join(&self.patched_subdir)
    }
}
