use serde::{Deserialize, Serialize};

use crate::error::StoreResult;

/// Configuration for a [`PackageStore`](crate::PackageStore).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// Ask the filestore to pin every file written.
    pub pin: bool,
    /// Refuse to save a dataset whose `previous_path` does not load.
    pub check_previous: bool,
    /// Maximum number of versions returned by a history walk.
    pub max_history: usize,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            pin: true,
            check_previous: false,
            max_history: 100,
        }
    }
}

impl PackageConfig {
    /// Parse a configuration from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> StoreResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Settings for histories that must not have dangling links.
    pub fn strict() -> Self {
        Self {
            check_previous: true,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PackageConfig::default();
        assert!(config.pin);
        assert!(!config.check_previous);
        assert_eq!(config.max_history, 100);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = PackageConfig::from_toml_str("check_previous = true\nmax_history = 5\n").unwrap();
        assert!(config.pin);
        assert!(config.check_previous);
        assert_eq!(config.max_history, 5);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(PackageConfig::from_toml_str("").unwrap(), PackageConfig::default());
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = PackageConfig::from_toml_str("pin = \"yes\"").unwrap_err();
        assert!(err.to_string().starts_with("invalid package config"));
    }
}
