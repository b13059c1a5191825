// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Traits at the seams of the bridge.
//!
//! - [`NativeTensor`] - the slice of the wrapped tensor library the bridge calls into
//! - [`ValidatableConfig`] - configuration validation interface
//!
//! ## Implementation Guidelines
//!
//! A `NativeTensor` implementation delegates every method to the wrapped
//! library and converts its failures into [`BridgeError::Native`]
//! (`?` does this for `candle_core::Error`). It does not re-check
//! preconditions the bridge already enforces, such as contiguity before
//! [`NativeTensor::data_bytes`].
//!
//! [`BridgeError::Native`]: crate::error::BridgeError::Native

use candle_core::{DType, Device};

use crate::error::Result;
use crate::layout::StorageLayout;

/// Configuration validation trait.
///
/// # Example
///
/// ```rust
/// use rust_ai_tensor_bridge::{BridgeError, Result, ValidatableConfig};
///
/// #[derive(Clone)]
/// struct PoolConfig {
///     max_handles: usize,
/// }
///
/// impl ValidatableConfig for PoolConfig {
///     fn validate(&self) -> Result<()> {
///         if self.max_handles == 0 {
///             return Err(BridgeError::invalid_config("max_handles must be > 0"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait ValidatableConfig: Clone + Send + Sync {
    /// Validate the configuration parameters.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::InvalidConfig` if validation fails.
    fn validate(&self) -> Result<()>;
}

/// Tensor object of the wrapped library, as seen by the bridge.
///
/// Every tensor-producing method returns a new, independently owned value;
/// the bridge boxes it behind a fresh handle. Whether that value shares
/// storage with `self` (a view) is the wrapped library's business.
///
/// Implementations must be `Send + Sync`: a handle may be used from any
/// thread the caller chooses, one call at a time.
pub trait NativeTensor: Send + Sync + Sized + 'static {
    /// Dimension sizes, one per axis.
    fn sizes(&self) -> &[usize];

    /// Element type.
    fn scalar_type(&self) -> DType;

    /// Device holding the storage.
    fn device(&self) -> Device;

    /// Storage scheme.
    fn layout(&self) -> StorageLayout;

    /// Whether elements occupy one unbroken row-major block.
    fn is_contiguous(&self) -> bool;

    /// Total byte size of the elements.
    fn nbytes(&self) -> usize {
        self.sizes().iter().product::<usize>() * self.scalar_type().size_in_bytes()
    }

    /// Move to `device`, then cast to `dtype`.
    ///
    /// Without `copy` the result may share storage with `self` when nothing
    /// changes; with `copy` it never does.
    ///
    /// # Errors
    ///
    /// Returns the wrapped library's error if the conversion fails.
    fn to(&self, device: &Device, dtype: DType, copy: bool) -> Result<Self>;

    /// Deep copy.
    ///
    /// # Errors
    ///
    /// Returns the wrapped library's error if allocation fails.
    fn deep_clone(&self) -> Result<Self>;

    /// Elements `start..end` by `step` along `dim`.
    ///
    /// # Errors
    ///
    /// Returns the wrapped library's error for an invalid dimension or step.
    fn slice(&self, dim: i64, start: i64, end: i64, step: i64) -> Result<Self>;

    /// Flattened elements where `mask` is non-zero.
    ///
    /// # Errors
    ///
    /// Returns the wrapped library's error on shape or dtype mismatch.
    fn masked_select(&self, mask: &Self) -> Result<Self>;

    /// Raw little-endian element bytes of a contiguous tensor.
    ///
    /// # Errors
    ///
    /// Returns the wrapped library's error if the storage cannot be read.
    fn data_bytes(&self) -> Result<Vec<u8>>;

    /// Elementwise `(self != 0) xor (other != 0)`.
    ///
    /// # Errors
    ///
    /// Returns the wrapped library's error on shape mismatch.
    fn logical_xor(&self, other: &Self) -> Result<Self>;

    /// Elementwise `self == 0`.
    ///
    /// # Errors
    ///
    /// Returns the wrapped library's error if the comparison fails.
    fn logical_not(&self) -> Result<Self>;
}
