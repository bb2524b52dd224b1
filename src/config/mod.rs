//! Configuration for memprobe
//!
//! TOML-backed settings with sensible defaults: a missing file is not an
//! error, it just means defaults. Loaded values are validated before use.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Configuration-related error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scanner: ScannerConfig,
    pub maps: MapsConfig,
    pub logging: LoggingConfig,
}

/// Pattern scanner settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Bytes read per scan window
    pub window_size: usize,
    /// Carry window tails forward so boundary-straddling matches are found
    pub carry_over: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            window_size: crate::memory::scanner::DEFAULT_WINDOW_SIZE,
            carry_over: false,
        }
    }
}

/// Map reader settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapsConfig {
    /// Optional cap on regions per snapshot; hitting it marks the
    /// snapshot truncated. No cap by default.
    pub max_regions: Option<usize>,
}

/// Logging settings, consumed by the embedding binary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Checks internal consistency of the loaded values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.scanner.window_size == 0 {
            return Err(ConfigError::Invalid(
                "scanner.window_size must be at least 1".to_string(),
            ));
        }
        if self.maps.max_regions == Some(0) {
            return Err(ConfigError::Invalid(
                "maps.max_regions must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Loads configuration from a TOML file.
///
/// An absent file yields the defaults; a present but unparsable or
/// invalid file is an error.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Config> {
    let path = path.as_ref();
    if !path.exists() {
        debug!(path = %path.display(), "no configuration file, using defaults");
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    config.validate()?;
    debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.scanner.window_size, 4096);
        assert!(!config.scanner.carry_over);
        assert_eq!(config.maps.max_regions, None);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_is_defaults() {
        let config = load_config("/nonexistent/memprobe.toml").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[scanner]\nwindow_size = 8192\ncarry_over = true").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.scanner.window_size, 8192);
        assert!(config.scanner.carry_over);
        // Unmentioned sections keep their defaults
        assert_eq!(config.maps.max_regions, None);
    }

    #[test]
    fn test_load_full_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[scanner]\nwindow_size = 1024\ncarry_over = false\n\n\
             [maps]\nmax_regions = 512\n\n\
             [logging]\nlevel = \"debug\""
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.maps.max_regions, Some(512));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[scanner]\nwindow_size = 0").unwrap();
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Invalid(_))
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[maps]\nmax_regions = 0").unwrap();
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not toml at all [[").unwrap();
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_scan_options_from_config() {
        use crate::memory::ScanOptions;

        let cfg = ScannerConfig {
            window_size: 2048,
            carry_over: true,
        };
        let options = ScanOptions::from(&cfg);
        assert_eq!(options.window_size, 2048);
        assert!(options.carry_over);
    }
}
