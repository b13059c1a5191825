// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! JVM entry points for `ai.djl.pytorch.jni.PyTorchLibrary`.
//!
//! Each `Java_*` function is a thin shell: decode JNI arguments, call the
//! matching [`bridge`] operation on a `candle_core::Tensor` handle, encode the
//! result as a JNI value. Bodies run inside [`boundary`], which turns every
//! `Err` into the Java exception named by [`BridgeError::exception_class`]
//! and catches panics, so nothing unwinds into the JVM.
//!
//! ## API Surface
//!
//! | Java method | Returns | Operation |
//! |-------------|---------|-----------|
//! | `torchSizes(long)` | `long[]` | [`bridge::sizes`] |
//! | `torchDType(long)` | `int` | [`bridge::dtype`] |
//! | `torchDevice(long)` | `int[2]` | [`bridge::device`] |
//! | `torchLayout(long)` | `int` | [`bridge::layout`] |
//! | `torchTo(long, int, int[], boolean)` | `long` | [`bridge::to`] |
//! | `tensorClone(long)` | `long` | [`bridge::clone`] |
//! | `torchSlice(long, long, long, long, long)` | `long` | [`bridge::slice`] |
//! | `torchMaskedSelect(long, long)` | `long` | [`bridge::masked_select`] |
//! | `torchDataPtr(long)` | `byte[]` | [`bridge::data_bytes`] |
//! | `torchDeleteTensor(long)` | `void` | [`bridge::delete`] |
//! | `torchLogicalXor(long, long)` | `long` | [`bridge::logical_xor`] |
//! | `torchLogicalNot(long)` | `long` | [`bridge::logical_not`] |
//!
//! After an exception is thrown the return value is a placeholder the Java
//! side never observes: `null`, handle `0`, or code `-1`.

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::needless_pass_by_value)] // JNI passes local references by value

use std::any::Any;
use std::ffi::c_void;
use std::panic::{self, AssertUnwindSafe};
use std::ptr;

use candle_core::Tensor;
use jni::objects::{JIntArray, JObject};
use jni::sys::{jboolean, jbyteArray, jint, jintArray, jlong, jlongArray, jsize, JNI_TRUE, JNI_VERSION_1_8};
use jni::JNIEnv;

use crate::bridge;
use crate::config;
use crate::device::DeviceDescriptor;
use crate::error::{BridgeError, Result, RUNTIME_EXCEPTION};
use crate::handle::NULL_HANDLE;
use crate::logging::init_logging;

/// Returned in place of a code after an exception was thrown.
const ERROR_CODE: jint = -1;

/// Run `body`, translating errors and panics into a pending Java exception.
///
/// Returns `fallback` whenever an exception was thrown.
pub fn boundary<'local, R>(
    env: &mut JNIEnv<'local>,
    fallback: R,
    body: impl FnOnce(&mut JNIEnv<'local>) -> Result<R>,
) -> R {
    match panic::catch_unwind(AssertUnwindSafe(|| body(env))) {
        Ok(Ok(value)) => value,
        Ok(Err(err)) => {
            throw(env, &err);
            fallback
        }
        Err(payload) => {
            let message = panic_message(&*payload);
            tracing::error!(target: "tensor_bridge::boundary", %message, "panic in native call");
            throw_class(env, RUNTIME_EXCEPTION, &message);
            fallback
        }
    }
}

fn throw(env: &mut JNIEnv, err: &BridgeError) {
    // A failed JNI call already left its own Java exception pending.
    if matches!(err, BridgeError::Jni(jni::errors::Error::JavaException))
        && env.exception_check().unwrap_or(false)
    {
        tracing::debug!(target: "tensor_bridge::boundary", "keeping pending Java exception");
        return;
    }
    throw_class(env, err.exception_class(), &err.to_string());
}

fn throw_class(env: &mut JNIEnv, class: &str, message: &str) {
    tracing::debug!(target: "tensor_bridge::boundary", class, message, "throwing");
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_clear();
    }
    if env.throw_new(class, message).is_ok() {
        return;
    }

    // Class lookup failed (for instance outside the engine's class path).
    let _ = env.exception_clear();
    if let Err(err) = env.throw_new(RUNTIME_EXCEPTION, message) {
        tracing::error!(
            target: "tensor_bridge::boundary",
            error = %err,
            message,
            "unable to throw Java exception"
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic in native tensor bridge".to_string())
}

fn array_len(len: usize) -> Result<jsize> {
    jsize::try_from(len)
        .map_err(|_| BridgeError::invalid_argument(format!("{len} elements exceed a Java array")))
}

/// Called by the JVM when the library is loaded.
#[no_mangle]
pub extern "system" fn JNI_OnLoad(_vm: *mut jni::sys::JavaVM, _reserved: *mut c_void) -> jint {
    let config = config::active();
    init_logging(&config.log);
    tracing::debug!(
        target: "tensor_bridge::boundary",
        version = env!("CARGO_PKG_VERSION"),
        cpu_fallback = config.device.cpu_fallback,
        "tensor bridge loaded"
    );
    JNI_VERSION_1_8
}

#[no_mangle]
pub extern "system" fn Java_ai_djl_pytorch_jni_PyTorchLibrary_torchSizes<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    handle: jlong,
) -> jlongArray {
    boundary(&mut env, ptr::null_mut(), |env| {
        // SAFETY: the Java wrapper owns `handle` and keeps it alive for the call.
        let sizes = unsafe { bridge::sizes::<Tensor>(handle)? };
        let array = env
            .new_long_array(array_len(sizes.len())?)
            .map_err(|_| BridgeError::null_pointer("Unable to create long array"))?;
        env.set_long_array_region(&array, 0, &sizes)?;
        Ok(array.into_raw())
    })
}

#[no_mangle]
pub extern "system" fn Java_ai_djl_pytorch_jni_PyTorchLibrary_torchDType<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    handle: jlong,
) -> jint {
    boundary(&mut env, ERROR_CODE, |_| {
        // SAFETY: the Java wrapper owns `handle` and keeps it alive for the call.
        unsafe { bridge::dtype::<Tensor>(handle) }
    })
}

#[no_mangle]
pub extern "system" fn Java_ai_djl_pytorch_jni_PyTorchLibrary_torchDevice<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    handle: jlong,
) -> jintArray {
    boundary(&mut env, ptr::null_mut(), |env| {
        // SAFETY: the Java wrapper owns `handle` and keeps it alive for the call.
        let device = unsafe { bridge::device::<Tensor>(handle)? };
        let array = env
            .new_int_array(2)
            .map_err(|_| BridgeError::null_pointer("Unable to create int array"))?;
        env.set_int_array_region(&array, 0, &device)?;
        Ok(array.into_raw())
    })
}

#[no_mangle]
pub extern "system" fn Java_ai_djl_pytorch_jni_PyTorchLibrary_torchLayout<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    handle: jlong,
) -> jint {
    boundary(&mut env, ERROR_CODE, |_| {
        // SAFETY: the Java wrapper owns `handle` and keeps it alive for the call.
        unsafe { bridge::layout::<Tensor>(handle) }
    })
}

#[no_mangle]
pub extern "system" fn Java_ai_djl_pytorch_jni_PyTorchLibrary_torchTo<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    handle: jlong,
    dtype: jint,
    device: JIntArray<'local>,
    copy: jboolean,
) -> jlong {
    boundary(&mut env, NULL_HANDLE, |env| {
        if device.is_null() {
            return Err(BridgeError::null_pointer("device array is null"));
        }
        let len = usize::try_from(env.get_array_length(&device)?).unwrap_or(0);
        let mut raw = vec![0; len];
        env.get_int_array_region(&device, 0, &mut raw)?;
        let device = DeviceDescriptor::from_slice(&raw)?.to_array();
        // SAFETY: the Java wrapper owns `handle` and keeps it alive for the call.
        unsafe { bridge::to::<Tensor>(handle, dtype, device, copy == JNI_TRUE) }
    })
}

#[no_mangle]
pub extern "system" fn Java_ai_djl_pytorch_jni_PyTorchLibrary_tensorClone<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    handle: jlong,
) -> jlong {
    boundary(&mut env, NULL_HANDLE, |_| {
        // SAFETY: the Java wrapper owns `handle` and keeps it alive for the call.
        unsafe { bridge::clone::<Tensor>(handle) }
    })
}

#[no_mangle]
pub extern "system" fn Java_ai_djl_pytorch_jni_PyTorchLibrary_torchSlice<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    handle: jlong,
    dim: jlong,
    start: jlong,
    end: jlong,
    step: jlong,
) -> jlong {
    boundary(&mut env, NULL_HANDLE, |_| {
        // SAFETY: the Java wrapper owns `handle` and keeps it alive for the call.
        unsafe { bridge::slice::<Tensor>(handle, dim, start, end, step) }
    })
}

#[no_mangle]
pub extern "system" fn Java_ai_djl_pytorch_jni_PyTorchLibrary_torchMaskedSelect<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    handle: jlong,
    mask: jlong,
) -> jlong {
    boundary(&mut env, NULL_HANDLE, |_| {
        // SAFETY: the Java wrappers own both handles and keep them alive for the call.
        unsafe { bridge::masked_select::<Tensor>(handle, mask) }
    })
}

#[no_mangle]
pub extern "system" fn Java_ai_djl_pytorch_jni_PyTorchLibrary_torchDataPtr<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    handle: jlong,
) -> jbyteArray {
    boundary(&mut env, ptr::null_mut(), |env| {
        // SAFETY: the Java wrapper owns `handle` and keeps it alive for the call.
        let bytes = unsafe { bridge::data_bytes::<Tensor>(handle)? };
        array_len(bytes.len())?;
        let array = env
            .byte_array_from_slice(&bytes)
            .map_err(|_| BridgeError::null_pointer("Unable to create byte array"))?;
        Ok(array.into_raw())
    })
}

#[no_mangle]
pub extern "system" fn Java_ai_djl_pytorch_jni_PyTorchLibrary_torchDeleteTensor<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    handle: jlong,
) {
    boundary(&mut env, (), |_| {
        // SAFETY: the Java wrapper gives up `handle` with this call and never uses it again.
        unsafe { bridge::delete::<Tensor>(handle) }
    });
}

#[no_mangle]
pub extern "system" fn Java_ai_djl_pytorch_jni_PyTorchLibrary_torchLogicalXor<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    handle: jlong,
    other: jlong,
) -> jlong {
    boundary(&mut env, NULL_HANDLE, |_| {
        // SAFETY: the Java wrappers own both handles and keep them alive for the call.
        unsafe { bridge::logical_xor::<Tensor>(handle, other) }
    })
}

#[no_mangle]
pub extern "system" fn Java_ai_djl_pytorch_jni_PyTorchLibrary_torchLogicalNot<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    handle: jlong,
) -> jlong {
    boundary(&mut env, NULL_HANDLE, |_| {
        // SAFETY: the Java wrapper owns `handle` and keeps it alive for the call.
        unsafe { bridge::logical_not::<Tensor>(handle) }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message() {
        let payload = panic::catch_unwind(|| panic!("boom")).unwrap_err();
        assert_eq!(panic_message(&*payload), "boom");

        let payload = panic::catch_unwind(|| panic!("{} {}", "formatted", 1)).unwrap_err();
        assert_eq!(panic_message(&*payload), "formatted 1");

        let payload = panic::catch_unwind(|| std::panic::panic_any(7u8)).unwrap_err();
        assert_eq!(panic_message(&*payload), "panic in native tensor bridge");
    }

    #[test]
    fn test_array_len() {
        assert_eq!(array_len(3).unwrap(), 3);
        assert!(matches!(
            array_len(usize::MAX),
            Err(BridgeError::InvalidArgument(_))
        ));
    }
}
