//! Configuration management for the tracker.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory settings
    pub data: DataConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Catalog API settings
    pub api: ApiConfig,

    /// In-memory freshness cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Statistics settings
    #[serde(default)]
    pub stats: StatsConfig,

    /// Tag preference settings
    #[serde(default)]
    pub tags: TagsConfig,

    /// Collection view settings
    #[serde(default)]
    pub view: ViewConfig,
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Root data directory path
    pub root_dir: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log directory path (relative to data directory or absolute)
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

/// Catalog API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Catalog API base URL
    pub base_url: String,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Records requested per collection page
    pub page_size: u32,

    /// Delay between consecutive full pages in milliseconds
    pub page_delay_ms: u64,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Rate limiting settings
    pub rate_limit: RateLimitConfig,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum requests per second
    pub requests_per_second: f64,

    /// Maximum requests per minute
    pub requests_per_minute: u32,
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Enable caching
    pub enabled: bool,

    /// How long a fetched collection is considered fresh
    pub freshness_seconds: u64,
}

/// Statistics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Maximum number of entries in the top-rated list
    pub top_rated_cap: usize,

    /// Show only the last N years in the year distribution (None = all years)
    pub year_window: Option<usize>,
}

/// Tag preference configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagsConfig {
    /// Minimum user rating for an entry to contribute tags
    pub rating_threshold: u8,

    /// Leading subject tags taken from each contributing entry
    pub per_entry_cap: usize,

    /// Maximum number of ranked tags returned (30-50 is typical)
    pub output_cap: usize,
}

/// Collection view configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Default sort key: "rating", "date" or "name"
    pub default_sort: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            freshness_seconds: 5 * 60,
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            top_rated_cap: 10,
            year_window: None,
        }
    }
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            rating_threshold: 7,
            per_entry_cap: 6,
            output_cap: 40,
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            default_sort: "rating".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig {
                root_dir: "data".to_string(),
            },
            logging: LoggingConfig {
                log_dir: "logs".to_string(),
                default_level: "info".to_string(),
                console: true,
                file: false,
                json_format: false,
            },
            api: ApiConfig {
                base_url: "https://api.bgm.tv".to_string(),
                user_agent: "BangumiTracker/0.1.0".to_string(),
                page_size: 50,
                page_delay_ms: 200,
                timeout_secs: 30,
                rate_limit: RateLimitConfig {
                    requests_per_second: 5.0,
                    requests_per_minute: 120,
                },
            },
            cache: CacheConfig::default(),
            stats: StatsConfig::default(),
            tags: TagsConfig::default(),
            view: ViewConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Load configuration from a TOML file or create default if not found
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::from_file(path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load config, using defaults");
            Self::default()
        })
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration saved successfully"
        );

        Ok(())
    }

    /// Get the absolute path for the data directory
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data.root_dir)
    }

    /// Get the absolute path for the log directory
    pub fn log_dir(&self) -> PathBuf {
        let log_path = Path::new(&self.logging.log_dir);
        if log_path.is_absolute() {
            log_path.to_path_buf()
        } else {
            self.data_dir().join(log_path)
        }
    }
}
