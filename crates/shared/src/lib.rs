//! Shared library for the Bangumi collection tracker.
//!
//! This crate provides common functionality used across the workspace:
//! - Collection data models and the status lookup table
//! - Configuration management
//! - Logging infrastructure
//! - Visual themes

pub mod config;
pub mod logging;
pub mod models;
pub mod theme;

// Re-export commonly used types
pub use config::Config;
pub use logging::LogConfig;
pub use models::*;
pub use theme::{apply_theme, Theme};

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
