pub mod loader;
pub mod schema;

pub use loader::{load_from_path, load_from_str, resolve, ConfigError, CONFIG_ENV_VAR, CONFIG_FILE_NAME};
pub use schema::{
    ApplySettings, DefaultLineEnding, OutputSettings, ParseSettings, PatcherConfig,
    ValidationError, ValidationIssue,
};
