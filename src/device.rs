// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Device descriptors exchanged with the managed caller.
//!
//! A device crosses the boundary as the two-element integer array
//! `[device-type, device-index]`. Device-type codes follow the wrapped
//! library's numbering:
//!
//! | Code | Device |
//! |------|--------|
//! | `0`  | CPU (index is always `-1`) |
//! | `1`  | CUDA |
//! | `13` | MPS / Metal |
//!
//! ## Environment Variables
//!
//! - `TENSOR_BRIDGE_CPU_FALLBACK` - Set to `1` or `true` to let requests for an
//!   unavailable accelerator land on the CPU (with a one-time warning) instead
//!   of failing.
//!
//! ## Example
//!
//! ```rust
//! use rust_ai_tensor_bridge::{DeviceConfig, DeviceDescriptor};
//!
//! let descriptor = DeviceDescriptor::from_array([0, -1])?;
//! let device = descriptor.resolve(&DeviceConfig::default())?;
//! assert_eq!(DeviceDescriptor::of(&device).to_array(), [0, -1]);
//! # Ok::<(), rust_ai_tensor_bridge::BridgeError>(())
//! ```

use std::sync::Once;

use candle_core::{Device, DeviceLocation};

use crate::error::{BridgeError, Result};

/// Environment variable enabling CPU fallback.
pub const CPU_FALLBACK_ENV: &str = "TENSOR_BRIDGE_CPU_FALLBACK";

/// Device-type codes understood by the managed caller.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    /// Host CPU.
    Cpu = 0,
    /// NVIDIA CUDA.
    Cuda = 1,
    /// Apple Metal Performance Shaders.
    Mps = 13,
}

impl DeviceKind {
    /// Every supported device kind.
    pub const ALL: [Self; 3] = [Self::Cpu, Self::Cuda, Self::Mps];

    /// Decode a raw device-type code.
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.code() == code)
    }

    /// Raw integer value sent across the boundary.
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Decoded `[device-type, device-index]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Device type.
    pub kind: DeviceKind,
    /// Device index; `-1` for the CPU.
    pub index: i32,
}

impl DeviceDescriptor {
    /// The CPU descriptor, `[0, -1]`.
    pub const CPU: Self = Self {
        kind: DeviceKind::Cpu,
        index: -1,
    };

    /// Decode the caller's two-element array.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::UnsupportedDevice`] for unknown device-type codes.
    pub fn from_array(raw: [i32; 2]) -> Result<Self> {
        let kind =
            DeviceKind::from_code(raw[0]).ok_or(BridgeError::UnsupportedDevice { code: raw[0] })?;
        let index = if kind == DeviceKind::Cpu { -1 } else { raw[1] };
        Ok(Self { kind, index })
    }

    /// Decode from a slice, checking its length.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidArgument`] unless `raw` has exactly two
    /// elements, otherwise as [`DeviceDescriptor::from_array`].
    pub fn from_slice(raw: &[i32]) -> Result<Self> {
        let pair: [i32; 2] = raw.try_into().map_err(|_| {
            BridgeError::invalid_argument(format!(
                "device must be encoded as 2 integers, got {}",
                raw.len()
            ))
        })?;
        Self::from_array(pair)
    }

    /// Encode as the caller's two-element array.
    #[must_use]
    pub fn to_array(self) -> [i32; 2] {
        [self.kind.code(), self.index]
    }

    /// Describe the device a native tensor lives on.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn of(device: &Device) -> Self {
        match device.location() {
            DeviceLocation::Cpu => Self::CPU,
            DeviceLocation::Cuda { gpu_id } => Self {
                kind: DeviceKind::Cuda,
                index: gpu_id as i32,
            },
            DeviceLocation::Metal { gpu_id } => Self {
                kind: DeviceKind::Mps,
                index: gpu_id as i32,
            },
        }
    }

    /// Accelerator ordinal; a negative index selects ordinal 0.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn ordinal(self) -> usize {
        self.index.max(0) as usize
    }

    /// Materialize the native device.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Native`] when the accelerator is unavailable and
    /// `config.cpu_fallback` is not set.
    pub fn resolve(self, config: &DeviceConfig) -> Result<Device> {
        let crate_name = config.crate_name.as_deref().unwrap_or("tensor-bridge");
        let attempt = match self.kind {
            DeviceKind::Cpu => return Ok(Device::Cpu),
            DeviceKind::Cuda => Device::new_cuda(self.ordinal()),
            DeviceKind::Mps => Device::new_metal(self.ordinal()),
        };

        match attempt {
            Ok(device) => Ok(device),
            Err(err) if config.cpu_fallback => {
                tracing::debug!(
                    target: "tensor_bridge::device",
                    requested = ?self,
                    error = %err,
                    "accelerator unavailable, using CPU"
                );
                warn_cpu_fallback(crate_name);
                Ok(Device::Cpu)
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Configuration for device resolution.
///
/// # Fields
///
/// - `cpu_fallback`: Resolve unavailable accelerators to the CPU instead of failing
/// - `crate_name`: Name used in warnings
#[derive(Debug, Clone, Default)]
pub struct DeviceConfig {
    /// Resolve unavailable accelerators to the CPU.
    pub cpu_fallback: bool,
    /// Name for logging (appears in warnings).
    pub crate_name: Option<String>,
}

impl DeviceConfig {
    /// Create a new device configuration with defaults (strict, no fallback).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable CPU fallback.
    #[must_use]
    pub fn with_cpu_fallback(mut self, enable: bool) -> Self {
        self.cpu_fallback = enable;
        self
    }

    /// Set the name used in warnings.
    #[must_use]
    pub fn with_crate_name(mut self, name: impl Into<String>) -> Self {
        self.crate_name = Some(name.into());
        self
    }

    /// Build configuration from `TENSOR_BRIDGE_CPU_FALLBACK`.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(val) = std::env::var(CPU_FALLBACK_ENV) {
            config.cpu_fallback = val == "1" || val.eq_ignore_ascii_case("true");
        }
        config
    }
}

/// Emit the CPU fallback warning once per process.
fn warn_cpu_fallback(crate_name: &str) {
    static WARN_ONCE: Once = Once::new();

    WARN_ONCE.call_once(|| {
        tracing::warn!(
            target: "tensor_bridge::device",
            "{crate_name}: requested accelerator is unavailable, tensors are being placed \
             on the CPU. Unset {CPU_FALLBACK_ENV} to make this an error."
        );
    });
}
