//! Session options loaded from TOML.
//!
//! ```toml
//! decode_errors = "surface"      # or "skip" (default)
//! include_system_tables = false
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::executor::DecodeErrorPolicy;

/// Options for a [`Session`](crate::session::Session).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// What a scan does with a row that cannot be decoded.
    pub decode_errors: DecodeErrorPolicy,

    /// Whether `MSys*` tables can be queried and are listed.
    pub include_system_tables: bool,
}

/// Errors loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read config {path}: {source}")]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or has unknown keys.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl SessionConfig {
    /// Loads configuration from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_empty_is_default() {
        let config = SessionConfig::from_toml_str("").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.decode_errors, DecodeErrorPolicy::Skip);
        assert!(!config.include_system_tables);
    }

    #[test]
    fn test_full_config() {
        let config = SessionConfig::from_toml_str(
            "decode_errors = \"surface\"\ninclude_system_tables = true\n",
        )
        .unwrap();
        assert_eq!(config.decode_errors, DecodeErrorPolicy::Surface);
        assert!(config.include_system_tables);
    }

    #[test]
    fn test_rejects_unknown_keys_and_values() {
        assert!(matches!(
            SessionConfig::from_toml_str("decode_error = \"skip\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SessionConfig::from_toml_str("decode_errors = \"panic\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "decode_errors = \"surface\"").unwrap();
        let config = SessionConfig::from_file(file.path()).unwrap();
        assert_eq!(config.decode_errors, DecodeErrorPolicy::Surface);

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            SessionConfig::from_file(&missing),
            Err(ConfigError::Io { path, .. }) if path == missing
        ));
    }
}
