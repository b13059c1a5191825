// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Process-wide bridge configuration.
//!
//! The bridge is loaded into a host process once and configured from the
//! environment at that moment. [`install`] records the configuration; every
//! later call reads it through [`active`]. If nothing was installed, the
//! first reader loads it from the environment, falling back to defaults.
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `TENSOR_BRIDGE_CPU_FALLBACK` | `1`/`true`: unavailable accelerators resolve to the CPU |
//! | `TENSOR_BRIDGE_LOG` | default log level (`error`..`trace`) |
//! | `RUST_LOG` | full `tracing` filter, overrides `TENSOR_BRIDGE_LOG` |

use std::sync::OnceLock;

use crate::device::DeviceConfig;
use crate::error::{BridgeError, Result};
use crate::logging::LogConfig;
use crate::traits::ValidatableConfig;

/// Complete bridge configuration.
#[derive(Debug, Clone, Default)]
pub struct BridgeConfig {
    /// Device resolution settings.
    pub device: DeviceConfig,
    /// Logging settings.
    pub log: LogConfig,
}

impl BridgeConfig {
    /// Create a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the device configuration.
    #[must_use]
    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.device = device;
        self
    }

    /// Set the logging configuration.
    #[must_use]
    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Load from the environment and validate.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidConfig`] for unparsable variables.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            device: DeviceConfig::from_env().with_crate_name(env!("CARGO_PKG_NAME")),
            log: LogConfig::from_env()?,
        };
        config.validate()?;
        Ok(config)
    }
}

impl ValidatableConfig for BridgeConfig {
    fn validate(&self) -> Result<()> {
        if let Some(name) = &self.device.crate_name {
            if name.trim().is_empty() {
                return Err(BridgeError::invalid_config("crate name must not be empty"));
            }
        }
        Ok(())
    }
}

static ACTIVE: OnceLock<BridgeConfig> = OnceLock::new();

/// Install the process-wide configuration.
///
/// Returns `false` (and keeps the existing one) if a configuration is
/// already active.
///
/// # Errors
///
/// Returns [`BridgeError::InvalidConfig`] if `config` fails validation.
pub fn install(config: BridgeConfig) -> Result<bool> {
    config.validate()?;
    Ok(ACTIVE.set(config).is_ok())
}

/// The process-wide configuration.
pub fn active() -> &'static BridgeConfig {
    ACTIVE.get_or_init(|| {
        BridgeConfig::from_env().unwrap_or_else(|err| {
            tracing::warn!(
                target: "tensor_bridge::config",
                error = %err,
                "ignoring invalid environment configuration, using defaults"
            );
            BridgeConfig::default()
        })
    })
}
