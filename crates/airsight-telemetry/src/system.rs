//! Subscriber assembly

use crate::{
    config::{LogFormat, TelemetryConfig},
    Error, Result,
};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::Directive, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
    Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Crates whose debug output would drown the dashboard's own events.
const NOISY_TARGETS: [&str; 4] = ["hyper", "reqwest", "h2", "mio"];

pub struct TelemetrySystem;

/// Keeps the background log writer alive; dropping it flushes pending lines.
pub struct TelemetryGuard {
    _file_guard: Option<WorkerGuard>,
}

impl TelemetrySystem {
    /// Install the global subscriber.
    pub fn init(config: TelemetryConfig) -> Result<TelemetryGuard> {
        config.validate()?;

        let mut layers: Vec<BoxedLayer> = Vec::new();
        if config.console_enabled {
            layers.push(Self::build_console_layer(&config));
        }
        let file_guard = if config.file_enabled {
            let (layer, guard) = Self::build_file_layer(&config)?;
            layers.push(layer);
            Some(guard)
        } else {
            None
        };

        Registry::default()
            .with(layers)
            .with(Self::build_env_filter(&config)?)
            .try_init()
            .map_err(|e| Error::System {
                message: format!("Failed to initialize tracing subscriber: {}", e),
            })?;

        tracing::info!(
            level = %config.level,
            file = config.file_enabled,
            log_dir = %config.log_dir.display(),
            "Telemetry initialized"
        );

        Ok(TelemetryGuard {
            _file_guard: file_guard,
        })
    }

    /// Configured level with noisy dependencies capped at `warn`; a set
    /// `RUST_LOG` replaces all of it.
    pub fn build_env_filter(config: &TelemetryConfig) -> Result<EnvFilter> {
        if let Ok(env_filter) = std::env::var("RUST_LOG") {
            return EnvFilter::try_new(env_filter).map_err(|e| Error::Config {
                message: format!("Invalid RUST_LOG: {}", e),
            });
        }

        let level: Level = config.level.into();
        let mut filter = EnvFilter::new(level.to_string());
        for target in NOISY_TARGETS {
            let directive: Directive =
                format!("{target}=warn").parse().map_err(|e| Error::Config {
                    message: format!("Invalid filter directive for {target}: {e}"),
                })?;
            filter = filter.add_directive(directive);
        }
        Ok(filter)
    }

    fn build_console_layer(config: &TelemetryConfig) -> BoxedLayer {
        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_file(config.include_location)
            .with_line_number(config.include_location);

        match config.format {
            LogFormat::Json => layer.json().with_current_span(true).boxed(),
            LogFormat::Pretty => layer.pretty().boxed(),
            LogFormat::Compact => layer.compact().with_target(false).boxed(),
        }
    }

    fn build_file_layer(config: &TelemetryConfig) -> Result<(BoxedLayer, WorkerGuard)> {
        std::fs::create_dir_all(&config.log_dir)?;

        let appender = tracing_appender::rolling::daily(&config.log_dir, &config.log_file_name);
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_file(config.include_location)
            .with_line_number(config.include_location);

        let layer = match config.format {
            LogFormat::Json => layer.json().with_current_span(true).boxed(),
            LogFormat::Pretty => layer.pretty().boxed(),
            LogFormat::Compact => layer.compact().boxed(),
        };
        Ok((layer, guard))
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::debug!("Telemetry shutting down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LogLevel;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_env_filter_caps_noisy_crates() {
        std::env::remove_var("RUST_LOG");
        let config = TelemetryConfig {
            level: LogLevel::Debug,
            ..Default::default()
        };
        let filter = TelemetrySystem::build_env_filter(&config).unwrap();
        let rendered = filter.to_string();
        assert!(rendered.contains("reqwest=warn"));
        assert!(rendered.contains("debug"));
    }

    #[test]
    #[serial]
    fn test_rust_log_overrides_config() {
        std::env::set_var("RUST_LOG", "airsight_tui=trace");
        let filter = TelemetrySystem::build_env_filter(&TelemetryConfig::default()).unwrap();
        assert_eq!(filter.to_string(), "airsight_tui=trace");
        std::env::remove_var("RUST_LOG");
    }

    #[test]
    #[serial]
    fn test_init_writes_into_log_dir() {
        std::env::remove_var("RUST_LOG");
        let temp_dir = TempDir::new().unwrap();
        let config = TelemetryConfig {
            log_dir: temp_dir.path().join("logs"),
            ..Default::default()
        };

        let guard = TelemetrySystem::init(config).unwrap();
        tracing::info!(test = "value", "Test log message");
        drop(guard);

        let entries: Vec<_> = std::fs::read_dir(temp_dir.path().join("logs"))
            .unwrap()
            .collect();
        assert!(!entries.is_empty());

        // The global subscriber can only be installed once per process
        let second = TelemetrySystem::init(TelemetryConfig {
            file_enabled: false,
            ..Default::default()
        });
        assert!(matches!(second, Err(Error::System { .. })));
    }
}
