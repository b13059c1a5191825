// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Handle accounting tests.
//!
//! The tracker is process-wide, so these run in their own test binary and
//! serialize on [`LOCK`] to keep the counters free of outside traffic.

use std::sync::Mutex;

use candle_core::{DType, Device, Tensor};
use rust_ai_tensor_bridge::{bridge, handle, RawHandle, TensorHandle};

static LOCK: Mutex<()> = Mutex::new(());

fn new_handle() -> RawHandle {
    TensorHandle::new(Tensor::zeros((2, 3), DType::F32, &Device::Cpu).unwrap()).into_raw()
}

// ============================================================================
// Tracker Tests
// ============================================================================

#[test]
fn test_failed_calls_create_no_handle() {
    let _guard = LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    let src = new_handle();
    let before = handle::stats();

    unsafe {
        assert!(bridge::slice::<Tensor>(src, 0, 0, 2, 0).is_err());
        assert!(bridge::slice::<Tensor>(src, 5, 0, 2, 1).is_err());
        assert!(bridge::to::<Tensor>(src, 5, [0, -1], false).is_err());
        assert!(bridge::to::<Tensor>(src, 0, [42, 0], false).is_err());
        assert!(bridge::logical_xor::<Tensor>(src, 0).is_err());
    }

    let after = handle::stats();
    assert_eq!(after.created, before.created);
    assert_eq!(after.live, before.live);

    unsafe { bridge::delete::<Tensor>(src) }.unwrap();
}

#[test]
fn test_live_count_returns_after_delete() {
    let _guard = LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    let before = handle::stats();

    let src = new_handle();
    let mut handles = vec![src];
    unsafe {
        handles.push(bridge::clone::<Tensor>(src).unwrap());
        handles.push(bridge::slice::<Tensor>(src, 1, 0, 2, 1).unwrap());
        handles.push(bridge::to::<Tensor>(src, 9, [0, -1], false).unwrap());
        handles.push(bridge::logical_not::<Tensor>(src).unwrap());
    }

    let during = handle::stats();
    assert_eq!(during.created, before.created + handles.len());
    assert_eq!(during.live, before.live + handles.len());
    assert!(during.peak >= during.live);

    for h in handles.drain(..) {
        unsafe { bridge::delete::<Tensor>(h) }.unwrap();
    }

    let after = handle::stats();
    assert_eq!(after.live, before.live);
    assert_eq!(after.released, before.released + 5);
}
