// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Logging for the tensor bridge.
//!
//! The bridge runs inside a host process it does not control, so logging is
//! opt-in and quiet by default: a `tracing_subscriber::fmt` subscriber is
//! installed once, when the library is loaded, at the level configured here.
//!
//! ## Targets
//!
//! | Target | Events |
//! |--------|--------|
//! | `tensor_bridge::ops` | one `trace` per marshaled call |
//! | `tensor_bridge::handle` | handle creation and release |
//! | `tensor_bridge::boundary` | errors translated into host exceptions |
//! | `tensor_bridge::device` | accelerator fallback |
//!
//! ## Environment Override
//!
//! `RUST_LOG` always wins. Otherwise `TENSOR_BRIDGE_LOG` (a level name)
//! replaces the configured default level.

use std::str::FromStr;
use std::sync::Once;

use crate::error::BridgeError;

/// Environment variable holding the default log level.
pub const LOG_LEVEL_ENV: &str = "TENSOR_BRIDGE_LOG";

/// Configuration for logging initialization.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default log level when `RUST_LOG` is not set.
    pub default_level: LogLevel,
    /// Include timestamps in log output.
    pub with_timestamps: bool,
    /// Include target (module path) in log output.
    pub with_target: bool,
    /// Include source file and line numbers.
    pub with_file_line: bool,
    /// Use ANSI colors (disable for file output).
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_level: LogLevel::Warn,
            with_timestamps: true,
            with_target: true,
            with_file_line: false,
            with_ansi: false,
        }
    }
}

impl LogConfig {
    /// Create a new logging configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default log level.
    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.default_level = level;
        self
    }

    /// Enable or disable timestamps.
    #[must_use]
    pub fn with_timestamps(mut self, enable: bool) -> Self {
        self.with_timestamps = enable;
        self
    }

    /// Enable or disable ANSI colors.
    #[must_use]
    pub fn with_ansi(mut self, enable: bool) -> Self {
        self.with_ansi = enable;
        self
    }

    /// Configuration preset for development.
    ///
    /// Every marshaled call is logged, with file/line info.
    #[must_use]
    pub fn development() -> Self {
        Self {
            default_level: LogLevel::Trace,
            with_timestamps: true,
            with_target: true,
            with_file_line: true,
            with_ansi: true,
        }
    }

    /// Configuration preset for production.
    ///
    /// Clean output without colors (for structured log ingestion).
    #[must_use]
    pub fn production() -> Self {
        Self {
            default_level: LogLevel::Warn,
            with_timestamps: true,
            with_target: false,
            with_file_line: false,
            with_ansi: false,
        }
    }

    /// Configuration preset for testing.
    #[must_use]
    pub fn testing() -> Self {
        Self {
            default_level: LogLevel::Error,
            with_timestamps: false,
            with_target: false,
            with_file_line: false,
            with_ansi: false,
        }
    }

    /// Default configuration with the level taken from `TENSOR_BRIDGE_LOG`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidConfig`] if the variable is set to
    /// something other than a level name.
    pub fn from_env() -> Result<Self, BridgeError> {
        let mut config = Self::default();
        if let Ok(val) = std::env::var(LOG_LEVEL_ENV) {
            config.default_level = val.parse()?;
        }
        Ok(config)
    }
}

/// Log level enumeration.
///
/// Maps to tracing levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Errors only.
    Error,
    /// Warnings and above.
    #[default]
    Warn,
    /// Informational messages and above.
    Info,
    /// Debug messages and above.
    Debug,
    /// All messages including trace.
    Trace,
}

impl LogLevel {
    /// Convert to a tracing filter string.
    fn as_filter_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl FromStr for LogLevel {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            other => Err(BridgeError::invalid_config(format!(
                "unknown log level '{other}' in {LOG_LEVEL_ENV}"
            ))),
        }
    }
}

/// Guard ensuring logging is only initialized once.
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for the bridge.
///
/// Idempotent: only the first call has an effect. If the host process has
/// already installed a global `tracing` subscriber, that one is kept.
///
/// ## Example
///
/// ```rust
/// use rust_ai_tensor_bridge::{init_logging, LogConfig};
///
/// init_logging(&LogConfig::testing());
/// ```
pub fn init_logging(config: &LogConfig) {
    INIT_LOGGING.call_once(|| {
        let filter = std::env::var("RUST_LOG")
            .unwrap_or_else(|_| config.default_level.as_filter_str().to_string());

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(config.with_ansi)
            .with_target(config.with_target)
            .with_file(config.with_file_line)
            .with_line_number(config.with_file_line)
            .with_writer(std::io::stderr);

        let installed = if config.with_timestamps {
            builder.try_init()
        } else {
            builder.without_time().try_init()
        };
        if installed.is_err() {
            tracing::debug!("global tracing subscriber already installed, keeping it");
        }
    });
}
