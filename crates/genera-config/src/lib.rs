#![forbid(unsafe_code)]

//! `genera.toml` configuration and tracing setup.
//!
//! ```toml
//! tables = ["types/core.toml", "types/codecs.toml"]
//!
//! [logging]
//! level = "debug"
//! json = false
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Environment variable that overrides config discovery.
pub const GENERA_CONFIG_ENV_VAR: &str = "GENERA_CONFIG";

const CONFIG_FILE_NAMES: [&str; 2] = ["genera.toml", ".genera.toml"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneraConfig {
    pub logging: LoggingConfig,
    /// Type tables loaded before every query. Relative paths are resolved against the
    /// directory holding the config file.
    pub tables: Vec<PathBuf>,
}

impl GeneraConfig {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::load_from_str(&text)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_paths(base);
        }
        Ok(config)
    }

    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    fn resolve_relative_paths(&mut self, base: &Path) {
        for table in &mut self.tables {
            if table.is_relative() {
                *table = base.join(&*table);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// A level (`info`, `debug`, ...) or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs as JSON lines.
    #[serde(default)]
    pub json: bool,

    /// Write logs to this file instead of stderr. Falls back to stderr if it cannot be opened.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    fn default_level() -> String {
        "warn".to_owned()
    }

    pub(crate) fn normalize_level_directives(input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::default_level();
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "trace" => "trace".to_owned(),
            "debug" => "debug".to_owned(),
            "info" => "info".to_owned(),
            "warn" | "warning" => "warn".to_owned(),
            "error" => "error".to_owned(),
            "off" | "none" => "off".to_owned(),
            _ => trimmed.to_owned(),
        }
    }

    fn config_env_filter(&self) -> tracing_subscriber::EnvFilter {
        let directives = Self::normalize_level_directives(&self.level);
        tracing_subscriber::EnvFilter::try_new(directives).unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::default()
                .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        })
    }

    /// The effective filter: the configured level merged with `RUST_LOG`, if set.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        let env_directives = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        match env_directives {
            Some(env_directives) => {
                let config_directives = Self::normalize_level_directives(&self.level);
                tracing_subscriber::EnvFilter::try_new(format!(
                    "{config_directives},{env_directives}"
                ))
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(env_directives))
                .unwrap_or_else(|_| self.config_env_filter())
            }
            None => self.config_env_filter(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            file: None,
        }
    }
}

/// Locate the config file for `dir`.
///
/// Order:
/// 1) `$GENERA_CONFIG` (relative paths are resolved against `dir`)
/// 2) `genera.toml` in `dir`
/// 3) `.genera.toml` in `dir`
pub fn discover_config_path(dir: &Path) -> Option<PathBuf> {
    if let Some(value) = std::env::var_os(GENERA_CONFIG_ENV_VAR) {
        let candidate = PathBuf::from(value);
        return Some(if candidate.is_absolute() {
            candidate
        } else {
            dir.join(candidate)
        });
    }

    CONFIG_FILE_NAMES
        .into_iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Load the configuration for `dir`, or the default one if none is found.
///
/// Also returns the path the configuration was read from.
pub fn load_for_dir(dir: &Path) -> Result<(GeneraConfig, Option<PathBuf>), ConfigError> {
    match discover_config_path(dir) {
        Some(path) => {
            let config = GeneraConfig::load_from_path(&path)?;
            Ok((config, Some(path)))
        }
        None => Ok((GeneraConfig::default(), None)),
    }
}

static TRACING_INIT: Once = Once::new();

/// Install the global `tracing` subscriber.
///
/// Only the first call has an effect.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        let file = config.file.as_ref().and_then(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });
        let file_requested = config.file.is_some();
        let file_opened = file.is_some();

        let writer = match file {
            Some(file) => BoxMakeWriter::new(Mutex::new(file)),
            None => BoxMakeWriter::new(std::io::stderr),
        };

        let builder = tracing_subscriber::fmt()
            .with_env_filter(config.env_filter())
            .with_writer(writer)
            .with_target(true);
        let installed = if config.json {
            builder.json().try_init()
        } else {
            builder.try_init()
        };

        if installed.is_ok() && file_requested && !file_opened {
            tracing::warn!(path = ?config.file, "failed to open log file; logging to stderr");
        }
    });
}
