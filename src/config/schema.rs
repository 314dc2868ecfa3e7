use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// Contents of an optional `smali-patcher.toml`.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub extensions: Extensions,
    #[serde(default)]
    pub experimental: Experimental,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Paths {
    pub target_dir: Option<PathBuf>,
    pub patches_dir: Option<PathBuf>,
    /// Original-side directory, relative to `patches_dir`
    pub original_dir: Option<PathBuf>,
    /// Patched-side directory, relative to `patches_dir`
    pub patched_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Extensions {
    pub target: Option<String>,
    pub snippet: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Experimental {
    pub enabled: Option<bool>,
}

impl SettingsFile {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        for (field, value) in [
            ("extensions.target", &self.extensions.target),
            ("extensions.snippet", &self.extensions.snippet),
        ] {
            let Some(value) = value else { continue };
            if value.trim().is_empty() {
                issues.push(ValidationIssue::EmptyField { field });
            } else if value.starts_with('.') {
                issues.push(ValidationIssue::InvalidValue {
                    field,
                    message: format!("'{value}' must not start with a dot"),
                });
            }
        }

        for (field, value) in [
            ("paths.target_dir", &self.paths.target_dir),
            ("paths.patches_dir", &self.paths.patches_dir),
            ("paths.original_dir", &self.paths.original_dir),
            ("paths.patched_dir", &self.paths.patched_dir),
        ] {
            if value.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
                issues.push(ValidationIssue::EmptyField { field });
            }
        }

        if let (Some(original), Some(patched)) = (&self.paths.original_dir, &self.paths.patched_dir)
        {
            if original == patched {
                issues.push(ValidationIssue::InvalidValue {
                    field: "paths.patched_dir",
                    message: "original and patched directories must differ".to_string(),
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyField {
        field: &'static str,
    },
    InvalidValue {
        field: &'static str,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyField { field } => write!(f, "'{field}' must not be empty"),
            ValidationIssue::InvalidValue { field, message } => {
                write!(f, "invalid value for '{field}': {message}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SettingsFile::default().validate().is_ok());
    }

    #[test]
    fn test_collects_all_issues() {
        let file = SettingsFile {
            paths: Paths {
                original_dir: Some(PathBuf::from("same")),
                patched_dir: Some(PathBuf::from("same")),
                ..Paths::default()
            },
            extensions: Extensions {
                target: Some(".smali".to_string()),
                snippet: Some("  ".to_string()),
            },
            ..SettingsFile::default()
        };

        let err = file.validate().unwrap_err();
        assert_eq!(err.issues.len(), 3);
        let text = err.to_string();
        assert!(text.contains("extensions.target"));
        assert!(text.contains("extensions.snippet"));
        assert!(text.contains("must differ"));
    }
}
