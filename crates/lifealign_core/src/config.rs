//! Engine configuration.
//!
//! # Responsibility
//! - Hold the tunables shared by the service layer and the CLI.
//! - Load them from an optional JSON file.
//!
//! # Invariants
//! - A missing file yields defaults; a malformed file is an error.
//! - `event_channel_capacity` is never zero.

use crate::logging::default_log_level;
use crate::schedule::conflict::ConflictScope;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Default capacity of the task event broadcast channel.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 64;

/// Configuration load failure.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "malformed config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    pub conflict_scope: ConflictScope,
    pub event_channel_capacity: usize,
    /// Overrides the build-mode default level when set.
    pub log_level: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            conflict_scope: ConflictScope::default(),
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            log_level: None,
        }
    }
}

impl CoreConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::from_json_str(&raw),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Effective log level: the configured one, else the build-mode default.
    pub fn effective_log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.event_channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "event_channel_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, DEFAULT_EVENT_CHANNEL_CAPACITY};
    use crate::schedule::conflict::ConflictScope;

    #[test]
    fn empty_object_yields_defaults() {
        let config = CoreConfig::from_json_str("{}").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.conflict_scope, ConflictScope::SameDay);
        assert_eq!(config.event_channel_capacity, DEFAULT_EVENT_CHANNEL_CAPACITY);
    }

    #[test]
    fn parses_scope_and_level() {
        let config = CoreConfig::from_json_str(
            r#"{"conflict_scope":"any_date","event_channel_capacity":8,"log_level":"warn"}"#,
        )
        .unwrap();
        assert_eq!(config.conflict_scope, ConflictScope::AnyDate);
        assert_eq!(config.event_channel_capacity, 8);
        assert_eq!(config.effective_log_level(), "warn");
    }

    #[test]
    fn rejects_zero_capacity_and_unknown_fields() {
        let zero = CoreConfig::from_json_str(r#"{"event_channel_capacity":0}"#).unwrap_err();
        assert!(matches!(zero, ConfigError::Invalid(_)));

        let unknown = CoreConfig::from_json_str(r#"{"colour":"red"}"#).unwrap_err();
        assert!(matches!(unknown, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CoreConfig::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(config, CoreConfig::default());
    }
}
