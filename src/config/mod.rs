//! Configuration loading and validation.
//!
//! Config lives in a single file (YAML by default, JSON/TOML behind
//! feature flags), auto-detected in the working directory or given via
//! `--config`. Every field has a default, so [`resolve`] falls back to
//! a built-in [`Config`] when no file exists. Submodules provide the
//! data model and validation logic.

pub mod model;
pub mod validation;

use std::path::{Path, PathBuf};

use crate::error::RelayError;
use model::Config;

/// Parse a config string based on file extension.
pub fn parse_config_str(ext: &str, content: &str, path_display: &str) -> Result<Config, RelayError> {
    match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => serde_yml::from_str(content).map_err(|e| RelayError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "json")]
        "json" => serde_json::from_str(content).map_err(|e| RelayError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "toml")]
        "toml" => toml::from_str(content).map_err(|e| RelayError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        other => Err(RelayError::UnsupportedFormat(other.to_string())),
    }
}

/// Read, parse, and validate a config file.
pub async fn load_file(path: &Path) -> Result<Config, RelayError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RelayError::ConfigFileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            RelayError::Io(e)
        }
    })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let config = parse_config_str(ext, &content, &path.display().to_string())?;

    if let Err(errors) = validation::validate(&config) {
        return Err(RelayError::ConfigValidation { errors });
    }

    Ok(config)
}

/// Resolve the effective configuration: an explicit `--config` path, an
/// auto-detected file in the working directory, or built-in defaults.
///
/// Returns the config together with a label naming where it came from.
pub async fn resolve(explicit: Option<&Path>) -> Result<(Config, String), RelayError> {
    if let Some(path) = explicit {
        let config = load_file(path).await?;
        return Ok((config, path.display().to_string()));
    }

    let candidates = [
        "cors-relay.yaml",
        "cors-relay.yml",
        "cors-relay.json",
        "cors-relay.toml",
    ];

    for name in &candidates {
        let path = PathBuf::from(name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!(path = %path.display(), "auto-detected config file");
            let config = load_file(&path).await?;
            return Ok((config, name.to_string()));
        }
    }

    Ok((Config::default(), "builtin defaults".to_string()))
}
