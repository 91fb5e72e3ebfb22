use crate::config::schema::{PatcherConfig, ValidationError};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "UDIFF_PATCHER_CONFIG";
/// Config file picked up from the base directory when nothing else is given.
pub const CONFIG_FILE_NAME: &str = ".udiff-patcher.toml";

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },
    Validation {
        path: Option<PathBuf>,
        source: ValidationError,
    },
}

impl ConfigError {
    fn with_path(self, path: &Path) -> Self {
        let path = path.to_path_buf();
        match self {
            ConfigError::Toml { path: None, source } => ConfigError::Toml {
                path: Some(path),
                source,
            },
            ConfigError::Validation { path: None, source } => ConfigError::Validation {
                path: Some(path),
                source,
            },
            other => other,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read config from {}: {}", path.display(), source)
            }
            ConfigError::Toml { path, source } => match path {
                Some(path) => write!(
                    f,
                    "failed to parse config TOML ({}): {}",
                    path.display(),
                    source
                ),
                None => write!(f, "failed to parse config TOML: {}", source),
            },
            ConfigError::Validation { path, source } => match path {
                Some(path) => write!(f, "invalid config ({}): {}", path.display(), source),
                None => write!(f, "invalid config: {}", source),
            },
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Toml { source, .. } => Some(source),
            ConfigError::Validation { source, .. } => Some(source),
        }
    }
}

pub fn load_from_str(input: &str) -> Result<PatcherConfig, ConfigError> {
    let config: PatcherConfig = toml_edit::de::from_str(input)
        .map_err(|source| ConfigError::Toml { path: None, source })?;
    config
        .validate()
        .map_err(|source| ConfigError::Validation { path: None, source })?;
    Ok(config)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<PatcherConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents).map_err(|error| error.with_path(path))
}

/// Locate and load the configuration for a run.
///
/// Priority order:
/// 1. Explicit path (the `--config` flag)
/// 2. `UDIFF_PATCHER_CONFIG` environment variable
/// 3. `.udiff-patcher.toml` in the base directory
/// 4. Built-in defaults
///
/// Returns the config and the file it came from, if any.
pub fn resolve(
    explicit: Option<&Path>,
    base_dir: &Path,
) -> Result<(PatcherConfig, Option<PathBuf>), ConfigError> {
    let from_env = env::var_os(CONFIG_ENV_VAR)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from);
    let candidate = explicit.map(Path::to_path_buf).or(from_env).or_else(|| {
        let local = base_dir.join(CONFIG_FILE_NAME);
        local.is_file().then_some(local)
    });

    match candidate {
        Some(path) => Ok((load_from_path(&path)?, Some(path))),
        None => Ok((PatcherConfig::default(), None)),
    }
}
