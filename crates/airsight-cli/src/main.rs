use anyhow::{Context, Result};
use clap::Parser;
use airsight_client::GatewayFactory;
use airsight_core::config::Config;
use airsight_core::SelectionStore;
use airsight_telemetry::{LogFormat, LogLevel, TelemetryConfig, TelemetrySystem};
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(
    after_help = "PAGES:\n  1  Dashboard       key figures, charts, map and top rated airlines\n  2  Review Data     filterable, sortable review table\n  3  Analytics Tool  sentiment analysis of free text\n\nPress F1 inside the dashboard for all key bindings."
)]
struct Cli {
    /// Configuration file path
    #[arg(long, help = "Path to configuration file")]
    config: Option<PathBuf>,

    /// Review backend base URL
    #[arg(long, help = "Base URL of the review backend, overrides the config file")]
    api_url: Option<String>,

    /// Theme name
    #[arg(long, help = "Color theme (dark, light)")]
    theme: Option<String>,

    /// World outline for the city map
    #[arg(long, help = "GeoJSON file with the world outline for the city map")]
    geometry: Option<PathBuf>,

    /// Enable verbose logging (deprecated - use --log-level debug instead)
    #[arg(short, long, help = "Enable verbose logging (deprecated)")]
    verbose: bool,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(long, help = "Set log level")]
    log_level: Option<String>,

    /// Set log format (json, pretty, compact)
    #[arg(long, help = "Set log output format")]
    log_format: Option<String>,

    /// Disable file logging
    #[arg(long, help = "Disable logging to files")]
    no_file_logging: bool,

    /// Set log directory
    #[arg(long, help = "Directory for log files")]
    log_dir: Option<PathBuf>,
}

/// Create telemetry configuration from CLI arguments
fn create_telemetry_config(cli: &Cli) -> TelemetryConfig {
    let mut config = TelemetryConfig::default();
    config.load_env_overrides();

    // Flags win over the environment
    if let Some(level) = &cli.log_level {
        match level.parse::<LogLevel>() {
            Ok(level) => config.level = level,
            Err(e) => eprintln!("{e}, using {}", config.level),
        }
    } else if cli.verbose {
        config.level = LogLevel::Debug;
    }

    if let Some(format) = &cli.log_format {
        match format.parse::<LogFormat>() {
            Ok(format) => config.format = format,
            Err(e) => eprintln!("{e}, using the default format"),
        }
    }

    if cli.no_file_logging {
        config.file_enabled = false;
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = log_dir.clone();
    }

    config
}

/// Apply command line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(api_url) = &cli.api_url {
        config.api.base_url = api_url.clone();
    }
    if let Some(theme) = &cli.theme {
        config.ui.theme = theme.clone();
    }
    if let Some(geometry) = &cli.geometry {
        config.map.geometry_path = Some(geometry.clone());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables before parsing configuration
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let _telemetry_guard = TelemetrySystem::init(create_telemetry_config(&cli))
        .context("Telemetry initialization failed")?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting AirSight");

    let mut config = Config::load(cli.config.as_deref())
        .await
        .context("Failed to load configuration")?;
    apply_overrides(&mut config, &cli);
    config
        .validate()
        .context("Invalid configuration after command line overrides")?;

    if config.map.geometry_path.is_none() {
        warn!("No world outline configured, the city map uses the built-in outline");
    }

    let gateway =
        GatewayFactory::create(&config.api).context("Failed to create the review gateway")?;

    match airsight_tui::run_dashboard(config, gateway, SelectionStore::new()).await {
        Ok(()) => {
            info!("AirSight exited successfully");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "AirSight encountered an error");
            Err(anyhow::anyhow!("Application error: {}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "airsight",
            "--api-url",
            "http://localhost:9000",
            "--theme",
            "light",
            "--geometry",
            "world.json",
        ]);
        let mut config = Config::default();
        apply_overrides(&mut config, &cli);

        assert_eq!(config.api.base_url, "http://localhost:9000");
        assert_eq!(config.ui.theme, "light");
        assert_eq!(config.map.geometry_path, Some(PathBuf::from("world.json")));
    }

    #[test]
    fn test_log_flags() {
        let cli = Cli::parse_from([
            "airsight",
            "--log-level",
            "warn",
            "--log-format",
            "json",
            "--no-file-logging",
        ]);
        let config = create_telemetry_config(&cli);

        assert_eq!(config.level, LogLevel::Warn);
        assert_eq!(config.format, LogFormat::Json);
        assert!(!config.file_enabled);
    }

    #[test]
    fn test_verbose_means_debug() {
        let cli = Cli::parse_from(["airsight", "-v"]);
        assert_eq!(create_telemetry_config(&cli).level, LogLevel::Debug);
    }
}
