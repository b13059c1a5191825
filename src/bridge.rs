// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Handle marshaling layer.
//!
//! One function per operation exposed to the managed caller. Each resolves
//! its handle arguments, decodes primitive arguments, delegates to the
//! [`NativeTensor`] behind the handle and encodes the result as a primitive,
//! a primitive array or a fresh handle. Nothing here is specific to a host
//! runtime; the `jni` module wraps these functions in exported entry points.
//!
//! Every call is independent. There is no state besides the handles
//! themselves, and a failed call leaves no new handle behind.
//!
//! # Safety
//!
//! All functions take raw handles and are `unsafe` for the same reason as
//! [`handle::resolve`]: every handle argument must be live for the duration
//! of the call and must not be released concurrently.

use crate::config;
use crate::device::{DeviceConfig, DeviceDescriptor};
use crate::dtype::{code_from_scalar_type, scalar_type_from_code};
use crate::error::{BridgeError, Result};
use crate::handle::{self, RawHandle, TensorHandle};
use crate::layout::layout_code;
use crate::traits::NativeTensor;

/// Message of the error raised when reading bytes of a non-contiguous tensor.
pub const NON_CONTIGUOUS_READ: &str = "Currently data_ptr() only supports contiguous tensors";

fn trace_op(op: &'static str, handle: RawHandle) {
    tracing::trace!(target: "tensor_bridge::ops", op, handle);
}

fn wrap<T: NativeTensor>(tensor: T) -> RawHandle {
    TensorHandle::new(tensor).into_raw()
}

/// Dimension sizes, one per axis.
///
/// # Errors
///
/// Fails only for a null or foreign handle.
///
/// # Safety
///
/// See the module docs.
#[allow(clippy::cast_possible_wrap)]
pub unsafe fn sizes<T: NativeTensor>(handle: RawHandle) -> Result<Vec<i64>> {
    trace_op("sizes", handle);
    // SAFETY: forwarded to the caller.
    let tensor = unsafe { handle::resolve::<T>(handle)? };
    Ok(tensor.sizes().iter().map(|&d| d as i64).collect())
}

/// DType code of the tensor; `8` (unknown) for element types without a code.
///
/// # Errors
///
/// Fails only for a null or foreign handle.
///
/// # Safety
///
/// See the module docs.
pub unsafe fn dtype<T: NativeTensor>(handle: RawHandle) -> Result<i32> {
    trace_op("dtype", handle);
    // SAFETY: forwarded to the caller.
    let tensor = unsafe { handle::resolve::<T>(handle)? };
    Ok(code_from_scalar_type(tensor.scalar_type()))
}

/// `[device-type, device-index]` of the tensor.
///
/// # Errors
///
/// Fails only for a null or foreign handle.
///
/// # Safety
///
/// See the module docs.
pub unsafe fn device<T: NativeTensor>(handle: RawHandle) -> Result<[i32; 2]> {
    trace_op("device", handle);
    // SAFETY: forwarded to the caller.
    let tensor = unsafe { handle::resolve::<T>(handle)? };
    Ok(DeviceDescriptor::of(&tensor.device()).to_array())
}

/// Layout code: `0` strided, `1` sparse, `2` mkldnn.
///
/// # Errors
///
/// Returns [`BridgeError::InternalInvariant`] for any other layout.
///
/// # Safety
///
/// See the module docs.
pub unsafe fn layout<T: NativeTensor>(handle: RawHandle) -> Result<i32> {
    trace_op("layout", handle);
    // SAFETY: forwarded to the caller.
    let tensor = unsafe { handle::resolve::<T>(handle)? };
    layout_code(tensor.layout())
}

/// Move and cast, resolving devices with the process-wide configuration.
///
/// # Errors
///
/// As [`to_with`].
///
/// # Safety
///
/// See the module docs.
pub unsafe fn to<T: NativeTensor>(
    handle: RawHandle,
    dtype: i32,
    device: [i32; 2],
    copy: bool,
) -> Result<RawHandle> {
    // SAFETY: forwarded to the caller.
    unsafe { to_with::<T>(handle, dtype, device, copy, &config::active().device) }
}

/// Move to `device`, cast to `dtype`, and return a handle to the result.
///
/// # Errors
///
/// Returns [`BridgeError::UnsupportedDType`] / [`BridgeError::UnsupportedDevice`]
/// for unknown codes and [`BridgeError::Native`] if the conversion fails.
///
/// # Safety
///
/// See the module docs.
pub unsafe fn to_with<T: NativeTensor>(
    handle: RawHandle,
    dtype: i32,
    device: [i32; 2],
    copy: bool,
    config: &DeviceConfig,
) -> Result<RawHandle> {
    tracing::trace!(target: "tensor_bridge::ops", op = "to", handle, dtype, ?device, copy);
    // SAFETY: forwarded to the caller.
    let tensor = unsafe { handle::resolve::<T>(handle)? };
    let scalar_type = scalar_type_from_code(dtype)?;
    let target = DeviceDescriptor::from_array(device)?.resolve(config)?;
    Ok(wrap(tensor.to(&target, scalar_type, copy)?))
}

/// Deep copy behind a new handle.
///
/// # Errors
///
/// Returns [`BridgeError::Native`] if the copy fails.
///
/// # Safety
///
/// See the module docs.
pub unsafe fn clone<T: NativeTensor>(handle: RawHandle) -> Result<RawHandle> {
    trace_op("clone", handle);
    // SAFETY: forwarded to the caller.
    let tensor = unsafe { handle::resolve::<T>(handle)? };
    Ok(wrap(tensor.deep_clone()?))
}

/// Elements `start..end` by `step` along `dim`.
///
/// # Errors
///
/// Returns [`BridgeError::Native`] for an invalid dimension or step.
///
/// # Safety
///
/// See the module docs.
pub unsafe fn slice<T: NativeTensor>(
    handle: RawHandle,
    dim: i64,
    start: i64,
    end: i64,
    step: i64,
) -> Result<RawHandle> {
    tracing::trace!(target: "tensor_bridge::ops", op = "slice", handle, dim, start, end, step);
    // SAFETY: forwarded to the caller.
    let tensor = unsafe { handle::resolve::<T>(handle)? };
    Ok(wrap(tensor.slice(dim, start, end, step)?))
}

/// Elements of `handle` where `mask` is non-zero, as a 1-D tensor.
///
/// # Errors
///
/// Returns [`BridgeError::Native`] on shape or dtype mismatch.
///
/// # Safety
///
/// See the module docs; applies to both handles.
pub unsafe fn masked_select<T: NativeTensor>(
    handle: RawHandle,
    mask: RawHandle,
) -> Result<RawHandle> {
    tracing::trace!(target: "tensor_bridge::ops", op = "masked_select", handle, mask);
    // SAFETY: forwarded to the caller.
    let (tensor, mask) = unsafe { (handle::resolve::<T>(handle)?, handle::resolve::<T>(mask)?) };
    Ok(wrap(tensor.masked_select(mask)?))
}

/// Raw element bytes of a contiguous tensor.
///
/// # Errors
///
/// Returns [`BridgeError::IllegalState`] for a non-contiguous tensor, before
/// anything is read.
///
/// # Safety
///
/// See the module docs.
pub unsafe fn data_bytes<T: NativeTensor>(handle: RawHandle) -> Result<Vec<u8>> {
    trace_op("data_bytes", handle);
    // SAFETY: forwarded to the caller.
    let tensor = unsafe { handle::resolve::<T>(handle)? };
    if !tensor.is_contiguous() {
        return Err(BridgeError::illegal_state(NON_CONTIGUOUS_READ));
    }

    let bytes = tensor.data_bytes()?;
    let expected = tensor.nbytes();
    if bytes.len() != expected {
        return Err(BridgeError::internal(format!(
            "tensor library returned {} bytes for a tensor of {expected} bytes",
            bytes.len()
        )));
    }
    Ok(bytes)
}

/// Free the tensor behind `handle`.
///
/// # Errors
///
/// Returns [`BridgeError::NullPointer`] for the null handle.
///
/// # Safety
///
/// `handle` must not be used again, by any thread, once this returns.
/// Deleting twice is undefined behavior.
pub unsafe fn delete<T: NativeTensor>(handle: RawHandle) -> Result<()> {
    trace_op("delete", handle);
    // SAFETY: forwarded to the caller.
    unsafe { handle::release::<T>(handle) }
}

/// Elementwise logical xor.
///
/// # Errors
///
/// Returns [`BridgeError::Native`] when the shapes do not broadcast.
///
/// # Safety
///
/// See the module docs; applies to both handles.
pub unsafe fn logical_xor<T: NativeTensor>(
    handle: RawHandle,
    other: RawHandle,
) -> Result<RawHandle> {
    tracing::trace!(target: "tensor_bridge::ops", op = "logical_xor", handle, other);
    // SAFETY: forwarded to the caller.
    let (lhs, rhs) = unsafe { (handle::resolve::<T>(handle)?, handle::resolve::<T>(other)?) };
    Ok(wrap(lhs.logical_xor(rhs)?))
}

/// Elementwise logical negation.
///
/// # Errors
///
/// Returns [`BridgeError::Native`] if the comparison fails.
///
/// # Safety
///
/// See the module docs.
pub unsafe fn logical_not<T: NativeTensor>(handle: RawHandle) -> Result<RawHandle> {
    trace_op("logical_not", handle);
    // SAFETY: forwarded to the caller.
    let tensor = unsafe { handle::resolve::<T>(handle)? };
    Ok(wrap(tensor.logical_not()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device, Tensor};

    fn new_handle(tensor: Tensor) -> RawHandle {
        TensorHandle::new(tensor).into_raw()
    }

    #[test]
    fn test_sizes_and_dtype() {
        let h = new_handle(Tensor::zeros((2, 3, 4), DType::F32, &Device::Cpu).unwrap());
        unsafe {
            assert_eq!(sizes::<Tensor>(h).unwrap(), vec![2, 3, 4]);
            assert_eq!(dtype::<Tensor>(h).unwrap(), 0);
            assert_eq!(device::<Tensor>(h).unwrap(), [0, -1]);
            assert_eq!(layout::<Tensor>(h).unwrap(), 0);
            delete::<Tensor>(h).unwrap();
        }
    }

    #[test]
    fn test_non_contiguous_read_fails() {
        let t = Tensor::arange(0f32, 6.0, &Device::Cpu)
            .unwrap()
            .reshape((2, 3))
            .unwrap()
            .t()
            .unwrap();
        let h = new_handle(t);
        let err = unsafe { data_bytes::<Tensor>(h) }.unwrap_err();
        assert!(matches!(err, BridgeError::IllegalState(_)));
        assert_eq!(err.to_string(), NON_CONTIGUOUS_READ);
        unsafe { delete::<Tensor>(h).unwrap() };
    }

    #[test]
    fn test_to_rejects_unknown_codes() {
        let h = new_handle(Tensor::zeros(3, DType::F32, &Device::Cpu).unwrap());
        let config = DeviceConfig::default();
        unsafe {
            assert!(matches!(
                to_with::<Tensor>(h, 7, [0, -1], false, &config),
                Err(BridgeError::UnsupportedDType { code: 7 })
            ));
            assert!(matches!(
                to_with::<Tensor>(h, 0, [5, 0], false, &config),
                Err(BridgeError::UnsupportedDevice { code: 5 })
            ));
            delete::<Tensor>(h).unwrap();
        }
    }

    #[test]
    fn test_null_handle_everywhere() {
        unsafe {
            assert!(matches!(sizes::<Tensor>(0), Err(BridgeError::NullPointer(_))));
            assert!(matches!(clone::<Tensor>(0), Err(BridgeError::NullPointer(_))));
            assert!(matches!(
                logical_xor::<Tensor>(0, 0),
                Err(BridgeError::NullPointer(_))
            ));
            assert!(matches!(delete::<Tensor>(0), Err(BridgeError::NullPointer(_))));
        }
    }
}
