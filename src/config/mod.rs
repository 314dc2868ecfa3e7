pub mod loader;
pub mod schema;
pub mod settings;

pub use loader::{find_settings, load_from_path, load_from_str, ConfigError};
pub use schema::{
    Experimental, Extensions, Paths, SettingsFile, ValidationError, ValidationIssue,
};
pub use settings::{parse_flag, Overrides, Settings};
