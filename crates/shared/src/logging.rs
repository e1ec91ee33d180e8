//! Tracing setup driven by the `[logging]` config section.
//!
//! `RUST_LOG` overrides the per-crate defaults. The file layer rolls daily
//! and is off unless enabled.

use crate::config::Config;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Crates whose events follow the configured level
const WORKSPACE_CRATES: [&str; 3] = ["shared", "collection_stats", "bangumi_client"];

/// HTTP stack crates, kept quiet unless `RUST_LOG` says otherwise
const NOISY_CRATES: [&str; 3] = ["hyper", "reqwest", "h2"];

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Resolved logging settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub log_dir: PathBuf,
    /// Prefix of the rolling log files
    pub file_prefix: String,
    pub level: Level,
    pub console: bool,
    pub file: bool,
    /// JSON lines instead of text in the log files
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl LogConfig {
    pub fn from_config(config: &Config) -> Self {
        let logging = &config.logging;
        Self {
            log_dir: config.log_dir(),
            file_prefix: "bangumi-tracker".to_string(),
            level: parse_level(&logging.default_level),
            console: logging.console,
            file: logging.file,
            json_format: logging.json_format,
        }
    }

    /// `EnvFilter` directives used when `RUST_LOG` is unset
    pub fn directives(&self) -> String {
        let level = self.level;
        WORKSPACE_CRATES
            .iter()
            .map(|krate| format!("{krate}={level}"))
            .chain(NOISY_CRATES.iter().map(|krate| format!("{krate}=warn")))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Install the global subscriber
pub fn init(config: &LogConfig) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.directives()));

    let mut layers = Vec::new();
    if config.console {
        layers.push(console_layer());
    }
    if config.file {
        layers.push(file_layer(config)?);
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    tracing::info!(
        log_dir = %config.log_dir.display(),
        file = config.file,
        "Logging initialized"
    );

    Ok(())
}

/// Install the subscriber described by `config`'s `[logging]` section
pub fn init_from_config(config: &Config) -> Result<()> {
    init(&LogConfig::from_config(config))
}

/// Parse a configured level name, falling back to INFO
pub fn parse_level(level: &str) -> Level {
    level.parse().unwrap_or(Level::INFO)
}

fn console_layer<S>() -> BoxedLayer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::NONE)
        .with_writer(std::io::stdout)
        .boxed()
}

fn file_layer<S>(config: &LogConfig) -> Result<BoxedLayer<S>>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    std::fs::create_dir_all(&config.log_dir).with_context(|| {
        format!("Failed to create log directory: {}", config.log_dir.display())
    })?;
    let appender = tracing_appender::rolling::daily(&config.log_dir, &config.file_prefix);

    let layer = if config.json_format {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(appender)
            .boxed()
    } else {
        fmt::layer()
            .with_ansi(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(appender)
            .boxed()
    };
    Ok(layer)
}
