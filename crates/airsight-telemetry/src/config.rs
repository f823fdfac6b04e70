//! Logging configuration

use crate::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::Level;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub level: LogLevel,
    pub format: LogFormat,

    /// Mirror events to stderr
    pub console_enabled: bool,

    /// Write daily rolling files into `log_dir`
    pub file_enabled: bool,
    pub log_dir: PathBuf,
    pub log_file_name: String,

    /// Include source file and line in each event
    pub include_location: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            other => Err(Error::Config {
                message: format!("unknown log level '{other}'"),
            }),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Level::from(*self))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Structured JSON format
    Json,
    /// Human-readable multi-line format
    Pretty,
    /// Compact single-line format
    Compact,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            other => Err(Error::Config {
                message: format!("unknown log format '{other}'"),
            }),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            console_enabled: false,
            file_enabled: true,
            log_dir: Self::default_log_dir().unwrap_or_else(|_| PathBuf::from("./logs")),
            log_file_name: "airsight.log".to_string(),
            include_location: false,
        }
    }
}

impl TelemetryConfig {
    /// Apply `AIRSIGHT_LOG_*` environment overrides. Unparseable values are
    /// ignored.
    pub fn load_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("AIRSIGHT_LOG_LEVEL") {
            self.level = level.parse().unwrap_or(self.level);
        }
        if let Ok(format) = std::env::var("AIRSIGHT_LOG_FORMAT") {
            self.format = format.parse().unwrap_or(self.format);
        }
        if let Ok(enabled) = std::env::var("AIRSIGHT_FILE_LOGGING") {
            self.file_enabled = enabled.parse().unwrap_or(self.file_enabled);
        }
        if let Ok(dir) = std::env::var("AIRSIGHT_LOG_DIR") {
            self.log_dir = PathBuf::from(dir);
        }
    }

    fn default_log_dir() -> Result<PathBuf> {
        let project_dirs =
            ProjectDirs::from("com", "airsight", "airsight").ok_or_else(|| Error::Config {
                message: "Could not determine log directory".to_string(),
            })?;

        Ok(project_dirs.data_dir().join("logs"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.file_enabled && self.log_file_name.trim().is_empty() {
            return Err(Error::Config {
                message: "log_file_name must not be empty when file logging is on".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_defaults_keep_stdout_free() {
        let config = TelemetryConfig::default();
        assert!(!config.console_enabled);
        assert!(config.file_enabled);
        assert_eq!(config.level, LogLevel::Info);
    }

    #[test]
    fn test_config_serialization() {
        let config = TelemetryConfig::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        assert!(serialized.contains("level = \"info\""));
        let deserialized: TelemetryConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(config.format, deserialized.format);
    }

    #[test]
    fn test_parse_level_and_format() {
        assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var("AIRSIGHT_LOG_LEVEL", "DEBUG");
        std::env::set_var("AIRSIGHT_LOG_FORMAT", "json");
        std::env::set_var("AIRSIGHT_FILE_LOGGING", "false");
        std::env::set_var("AIRSIGHT_LOG_DIR", "/tmp/airsight-logs");

        let mut config = TelemetryConfig::default();
        config.load_env_overrides();

        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Json);
        assert!(!config.file_enabled);
        assert_eq!(config.log_dir, PathBuf::from("/tmp/airsight-logs"));

        std::env::remove_var("AIRSIGHT_LOG_LEVEL");
        std::env::remove_var("AIRSIGHT_LOG_FORMAT");
        std::env::remove_var("AIRSIGHT_FILE_LOGGING");
        std::env::remove_var("AIRSIGHT_LOG_DIR");
    }

    #[test]
    #[serial]
    fn test_bad_env_values_are_ignored() {
        std::env::set_var("AIRSIGHT_LOG_LEVEL", "chatty");
        let mut config = TelemetryConfig::default();
        config.load_env_overrides();
        assert_eq!(config.level, LogLevel::Info);
        std::env::remove_var("AIRSIGHT_LOG_LEVEL");
    }

    #[test]
    fn test_validation() {
        let mut config = TelemetryConfig::default();
        config.log_file_name = " ".to_string();
        assert!(config.validate().is_err());
        config.file_enabled = false;
        assert!(config.validate().is_ok());
    }
}
