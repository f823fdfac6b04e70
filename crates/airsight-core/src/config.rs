use crate::{AirsightError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub map: MapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is joined onto
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout; 0 leaves requests unbounded
    #[serde(default)]
    pub timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_user_agent() -> String {
    format!("airsight/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    #[serde(default = "default_toast_duration")]
    pub toast_duration_ms: u64,
    #[serde(default = "default_top_rated_page_size")]
    pub top_rated_page_size: usize,
    #[serde(default = "default_reviews_page_size")]
    pub reviews_page_size: usize,
}

fn default_theme() -> String {
    "dark".to_string()
}

fn default_tick_rate() -> u64 {
    250
}

fn default_toast_duration() -> u64 {
    4000
}

fn default_top_rated_page_size() -> usize {
    5
}

fn default_reviews_page_size() -> usize {
    10
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapConfig {
    /// Optional GeoJSON world geometry; the built-in outline is used without it
    pub geometry_path: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: 0,
            user_agent: default_user_agent(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            tick_rate_ms: default_tick_rate(),
            toast_duration_ms: default_toast_duration(),
            top_rated_page_size: default_top_rated_page_size(),
            reviews_page_size: default_reviews_page_size(),
        }
    }
}

impl Config {
    pub async fn load(config_path: Option<&Path>) -> Result<Self> {
        let config_file = match config_path {
            Some(path) => path.to_path_buf(),
            None => Self::default_config_path()?,
        };

        let mut config = if config_file.exists() {
            info!("Loading config from: {}", config_file.display());
            let content = tokio::fs::read_to_string(&config_file)
                .await
                .map_err(|e| AirsightError::FileRead {
                    path: config_file.display().to_string(),
                    source: e,
                })?;
            toml::from_str::<Config>(&content).map_err(|e| AirsightError::ConfigLoadFailed {
                path: config_file.display().to_string(),
                source: Box::new(e),
            })?
        } else {
            info!("No config file found, using defaults");
            Self::default()
        };

        config.load_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "airsight", "airsight").ok_or_else(|| {
            AirsightError::ConfigInvalid {
                issue: "Could not determine config directory".to_string(),
                suggestion: "Pass --config explicitly or ensure a home directory is set"
                    .to_string(),
            }
        })?;

        Ok(project_dirs.config_dir().join("config.toml"))
    }

    pub fn load_env_overrides(&mut self) {
        if let Ok(base_url) = std::env::var("AIRSIGHT_API_URL") {
            self.api.base_url = base_url;
        }
        if let Ok(theme) = std::env::var("AIRSIGHT_THEME") {
            self.ui.theme = theme;
        }
        if let Ok(path) = std::env::var("AIRSIGHT_MAP_GEOMETRY") {
            self.map.geometry_path = Some(PathBuf::from(path));
        }
    }

    pub fn validate(&self) -> Result<()> {
        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            return Err(AirsightError::ConfigInvalid {
                issue: "api.base_url is empty".to_string(),
                suggestion: format!("Set it to the backend address, e.g. {DEFAULT_API_URL}"),
            });
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(AirsightError::ConfigInvalid {
                issue: format!("api.base_url '{base_url}' is not an http(s) URL"),
                suggestion: "Base URL must start with http:// or https://".to_string(),
            });
        }
        if self.ui.top_rated_page_size == 0 || self.ui.reviews_page_size == 0 {
            return Err(AirsightError::ConfigInvalid {
                issue: "table page sizes must be greater than 0".to_string(),
                suggestion: "Use the defaults (5 and 10) or any positive value".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tokio::fs;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.api.base_url, DEFAULT_API_URL);
        assert_eq!(config.api.timeout_seconds, 0);
        assert!(config.api.user_agent.starts_with("airsight/"));
        assert_eq!(config.ui.theme, "dark");
        assert_eq!(config.ui.top_rated_page_size, 5);
        assert_eq!(config.ui.reviews_page_size, 10);
        assert!(config.map.geometry_path.is_none());
    }

    #[test]
    fn test_config_deserialization_fills_missing_sections() {
        let toml_str = r#"
            [api]
            base_url = "https://reviews.example.com"
            timeout_seconds = 15

            [ui]
            theme = "light"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.base_url, "https://reviews.example.com");
        assert_eq!(config.api.timeout_seconds, 15);
        assert_eq!(config.ui.theme, "light");
        assert_eq!(config.ui.reviews_page_size, 10);
        assert_eq!(config.ui.tick_rate_ms, 250);
        assert!(config.map.geometry_path.is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let serialized = toml::to_string(&config).unwrap();
        assert!(serialized.contains("base_url"));
        assert!(serialized.contains("localhost:8000"));
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let mut config = Config::default();
        config.api.base_url = "localhost:8000".to_string();
        assert!(matches!(
            config.validate(),
            Err(AirsightError::ConfigInvalid { .. })
        ));

        config.api.base_url = "   ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_page_size() {
        let mut config = Config::default();
        config.ui.reviews_page_size = 0;
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    #[serial]
    async fn test_load_with_nonexistent_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("missing.toml");
        let config = Config::load(Some(&missing)).await.unwrap();
        assert_eq!(config.ui.theme, "dark");
    }

    #[tokio::test]
    #[serial]
    async fn test_load_with_existing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let toml_content = r#"
            [api]
            base_url = "http://10.0.0.5:9000"

            [ui]
            reviews_page_size = 25

            [map]
            geometry_path = "/opt/airsight/world.json"
        "#;
        fs::write(&config_path, toml_content).await.unwrap();

        let config = Config::load(Some(&config_path)).await.unwrap();
        assert_eq!(config.api.base_url, "http://10.0.0.5:9000");
        assert_eq!(config.ui.reviews_page_size, 25);
        assert_eq!(
            config.map.geometry_path,
            Some(PathBuf::from("/opt/airsight/world.json"))
        );
    }

    #[tokio::test]
    #[serial]
    async fn test_load_with_invalid_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("invalid.toml");
        fs::write(&config_path, "invalid toml content {{{")
            .await
            .unwrap();

        let result = Config::load(Some(&config_path)).await;
        assert!(matches!(
            result.unwrap_err(),
            AirsightError::ConfigLoadFailed { .. }
        ));
    }

    #[test]
    #[serial]
    fn test_load_env_overrides() {
        env::set_var("AIRSIGHT_API_URL", "https://api.airsight.test");
        env::set_var("AIRSIGHT_THEME", "light");
        env::set_var("AIRSIGHT_MAP_GEOMETRY", "/tmp/world.json");

        let mut config = Config::default();
        config.load_env_overrides();

        assert_eq!(config.api.base_url, "https://api.airsight.test");
        assert_eq!(config.ui.theme, "light");
        assert_eq!(
            config.map.geometry_path,
            Some(PathBuf::from("/tmp/world.json"))
        );

        env::remove_var("AIRSIGHT_API_URL");
        env::remove_var("AIRSIGHT_THEME");
        env::remove_var("AIRSIGHT_MAP_GEOMETRY");
    }

    #[test]
    fn test_default_config_path() {
        if let Ok(path) = Config::default_config_path() {
            assert!(path.to_string_lossy().contains("airsight"));
            assert!(path.to_string_lossy().ends_with("config.toml"));
        }
    }
}
