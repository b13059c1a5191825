// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! # rust-ai-tensor-bridge
//!
//! A native library that exposes Candle tensors to a JVM caller through the
//! fixed JNI entry points of `ai.djl.pytorch.jni.PyTorchLibrary`: shape,
//! dtype, device and layout queries, conversion, cloning, slicing, masked
//! selection, raw byte extraction and elementwise logical operations.
//!
//! The bridge contains no tensor math. It resolves opaque handles, decodes
//! primitive arguments, calls the wrapped tensor and encodes the result.
//!
//! ## Modules
//!
//! - [`bridge`] - the marshaling operations, one per entry point
//! - [`handle`] - opaque handle lifecycle and accounting
//! - [`traits`] - the [`NativeTensor`] seam to the wrapped tensor library
//! - [`backend`] - [`NativeTensor`] for `candle_core::Tensor`
//! - [`dtype`], [`device`], [`layout`] - code tables for primitive arguments
//! - [`error`] - error taxonomy and Java exception mapping
//! - [`config`], [`logging`] - environment-driven configuration and `tracing` setup
//! - `jni` - exported JVM entry points (feature `jni`, on by default)
//!
//! ## Quick Start
//!
//! ```rust
//! use candle_core::{DType, Device, Tensor};
//! use rust_ai_tensor_bridge::{bridge, TensorHandle};
//!
//! # fn main() -> rust_ai_tensor_bridge::Result<()> {
//! let tensor = Tensor::zeros((2, 3), DType::F32, &Device::Cpu)?;
//! let handle = TensorHandle::new(tensor).into_raw();
//!
//! // SAFETY: `handle` is live until `delete` below.
//! unsafe {
//!     assert_eq!(bridge::sizes::<Tensor>(handle)?, vec![2, 3]);
//!     let bytes = bridge::data_bytes::<Tensor>(handle)?;
//!     assert_eq!(bytes.len(), 24);
//!     bridge::delete::<Tensor>(handle)?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `jni` (default) - export the `Java_ai_djl_pytorch_jni_PyTorchLibrary_*` symbols
//! - `cuda` - CUDA devices in the wrapped tensor library
//! - `metal` - Metal devices in the wrapped tensor library

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod bridge;
pub mod config;
pub mod device;
pub mod dtype;
pub mod error;
pub mod handle;
pub mod layout;
pub mod logging;
pub mod traits;

#[cfg(feature = "jni")]
#[allow(missing_docs)]
pub mod jni;

// Re-exports for convenience
pub use config::BridgeConfig;
pub use device::{DeviceConfig, DeviceDescriptor, DeviceKind};
pub use dtype::{code_from_scalar_type, scalar_type_from_code, DTypeCode, DTypeExt};
pub use error::{BridgeError, Result};
pub use handle::{HandleStats, RawHandle, TensorHandle, NULL_HANDLE};
pub use layout::StorageLayout;
pub use logging::{init_logging, LogConfig, LogLevel};
pub use traits::{NativeTensor, ValidatableConfig};
