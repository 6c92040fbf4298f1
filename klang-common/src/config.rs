//! Configuration loading
//!
//! Resolves the klang configuration file with ENV → platform config dir
//! priority and deserializes it with per-field defaults, so a partial (or
//! absent) file always yields a usable configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "KLANG_CONFIG";

/// Library interpretation settings.
///
/// Every field is independently optional in the TOML file; missing fields
/// take the documented default. The indexer snapshots this at load start, so
/// edits never affect an in-flight load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KlangConfig {
    /// Characters that split a single multi-value tag string into several
    /// values. Empty disables splitting entirely.
    pub separators: String,

    /// Strip leading English articles ("the", "a", "an") when deriving sort
    /// keys for names without an explicit sort tag.
    pub intelligent_sort_names: bool,

    /// Ask the record source to filter out non-music audio (podcasts,
    /// notification sounds). Interpretation is up to the source.
    pub exclude_non_music: bool,
}

impl Default for KlangConfig {
    fn default() -> Self {
        Self {
            separators: String::new(),
            intelligent_sort_names: true,
            exclude_non_music: false,
        }
    }
}

impl KlangConfig {
    /// Load configuration following the resolution priority:
    /// 1. Environment variable `KLANG_CONFIG` (explicit file path)
    /// 2. Platform config directory (`<config_dir>/klang/config.toml`)
    /// 3. Compiled defaults (no file found)
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Self::load_from(Path::new(&path));
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// True if a character is one of the configured multi-value separators.
    pub fn is_separator(&self, c: char) -> bool {
        self.separators.contains(c)
    }
}

/// Default configuration file path for the platform.
fn default_config_path() -> Option<PathBuf> {
    match dirs::config_dir() {
        Some(dir) => Some(dir.join("klang").join("config.toml")),
        None => {
            warn!("Could not determine platform config directory");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = KlangConfig::default();
        assert_eq!(config.separators, "");
        assert!(config.intelligent_sort_names);
        assert!(!config.exclude_non_music);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "separators = \";,\"").unwrap();

        let config = KlangConfig::load_from(file.path()).unwrap();
        assert_eq!(config.separators, ";,");
        // Unspecified fields keep their defaults.
        assert!(config.intelligent_sort_names);
        assert!(!config.exclude_non_music);
    }

    #[test]
    fn test_load_rejects_malformed_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "separators = [not toml").unwrap();

        assert!(KlangConfig::load_from(file.path()).is_err());
    }

    #[test]
    fn test_is_separator() {
        let config = KlangConfig {
            separators: ";/".to_string(),
            ..Default::default()
        };
        assert!(config.is_separator(';'));
        assert!(config.is_separator('/'));
        assert!(!config.is_separator(','));
    }
}
