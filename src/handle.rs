// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Opaque handles carried across the native-call boundary.
//!
//! A handle is the address of a boxed slot holding a type tag and the native
//! object. The managed caller stores it as a plain `long` and owns it
//! exclusively: the bridge creates a handle for every tensor it returns and
//! frees it only when the caller asks.
//!
//! ## Lifecycle
//!
//! ```text
//! TensorHandle::new(value) ──into_raw──▶ RawHandle ──resolve──▶ &T   (any number of calls)
//!                                            │
//!                                            └──release──▶ freed     (exactly once)
//! ```
//!
//! ## Safety
//!
//! Resolving checks for the null handle and verifies the slot's tag and type,
//! which catches handles of the wrong kind. It cannot detect a handle that
//! has already been released: using a handle after `release` returns, or
//! releasing it twice, reads freed memory and is undefined behavior. Sharing
//! one handle between threads without external synchronization is equally
//! the caller's responsibility.

use std::any::TypeId;
use std::marker::PhantomData;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{BridgeError, Result};

/// Handle as it crosses the boundary.
pub type RawHandle = i64;

/// The null handle.
pub const NULL_HANDLE: RawHandle = 0;

/// Tag stored in every live slot.
const LIVE_TAG: u64 = 0x5445_4e53_4f52_4844;
/// Tag written into a slot just before it is freed.
const DEAD_TAG: u64 = 0;

/// Fixed-offset prefix of every slot, readable without knowing `T`.
#[repr(C)]
struct Header {
    tag: u64,
    type_id: TypeId,
}

#[repr(C)]
struct Slot<T> {
    header: Header,
    value: T,
}

/// Owned handle to a boxed native object.
///
/// Neither `Clone` nor `Copy`: ownership leaves Rust through
/// [`TensorHandle::into_raw`] and comes back through
/// [`TensorHandle::from_raw`].
pub struct TensorHandle<T: 'static> {
    slot: NonNull<Slot<T>>,
    _owns: PhantomData<T>,
}

impl<T: 'static> TensorHandle<T> {
    /// Box `value` behind a new handle.
    pub fn new(value: T) -> Self {
        let slot = Box::new(Slot {
            header: Header {
                tag: LIVE_TAG,
                type_id: TypeId::of::<T>(),
            },
            value,
        });
        TRACKER.record_create();
        Self {
            slot: NonNull::from(Box::leak(slot)),
            _owns: PhantomData,
        }
    }

    /// Give up ownership and return the raw handle.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn into_raw(self) -> RawHandle {
        let raw = self.slot.as_ptr() as usize as RawHandle;
        std::mem::forget(self);
        tracing::trace!(target: "tensor_bridge::handle", handle = raw, "handle created");
        raw
    }

    /// Take back ownership of a raw handle.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NullPointer`] for [`NULL_HANDLE`] and
    /// [`BridgeError::IllegalState`] when the slot does not hold a live `T`.
    ///
    /// # Safety
    ///
    /// `raw` must come from [`TensorHandle::into_raw`] and must not have been
    /// released; see the module docs.
    pub unsafe fn from_raw(raw: RawHandle) -> Result<Self> {
        // SAFETY: forwarded to the caller.
        let slot = unsafe { checked_slot::<T>(raw)? };
        Ok(Self {
            slot,
            _owns: PhantomData,
        })
    }

    /// Borrow the native object.
    #[must_use]
    pub fn get(&self) -> &T {
        // SAFETY: `self` owns a live slot.
        unsafe { &self.slot.as_ref().value }
    }
}

impl<T: 'static> Drop for TensorHandle<T> {
    fn drop(&mut self) {
        // SAFETY: the slot was leaked from a `Box` in `new` and is owned by `self`.
        let mut slot = unsafe { Box::from_raw(self.slot.as_ptr()) };
        // SAFETY: `slot.header.tag` is a valid, aligned `u64` owned by `slot`.
        unsafe { std::ptr::write_volatile(&mut slot.header.tag, DEAD_TAG) };
        drop(slot);
        TRACKER.record_release();
    }
}

/// Borrow the object behind a raw handle.
///
/// # Errors
///
/// As [`TensorHandle::from_raw`].
///
/// # Safety
///
/// `raw` must be live for all of `'a`: it must come from
/// [`TensorHandle::into_raw`] and must not be released while the borrow is
/// in use.
pub unsafe fn resolve<'a, T: 'static>(raw: RawHandle) -> Result<&'a T> {
    // SAFETY: forwarded to the caller.
    let slot = unsafe { checked_slot::<T>(raw)? };
    // SAFETY: live for `'a` per the contract above.
    Ok(unsafe { &(*slot.as_ptr()).value })
}

/// Free the object behind a raw handle.
///
/// # Errors
///
/// As [`TensorHandle::from_raw`]; nothing is freed on error.
///
/// # Safety
///
/// `raw` must come from [`TensorHandle::into_raw`], must not have been
/// released already and must not be used afterwards.
pub unsafe fn release<T: 'static>(raw: RawHandle) -> Result<()> {
    // SAFETY: forwarded to the caller.
    let handle = unsafe { TensorHandle::<T>::from_raw(raw)? };
    drop(handle);
    tracing::trace!(target: "tensor_bridge::handle", handle = raw, "handle released");
    Ok(())
}

#[allow(clippy::cast_sign_loss)]
unsafe fn checked_slot<T: 'static>(raw: RawHandle) -> Result<NonNull<Slot<T>>> {
    let header = NonNull::new(raw as usize as *mut Header)
        .ok_or_else(|| BridgeError::null_pointer("tensor handle is null"))?;
    if (raw as usize) % std::mem::align_of::<Header>() != 0 {
        return Err(not_a_tensor(raw));
    }

    // SAFETY: the caller guarantees `raw` addresses a live slot, and every
    // slot starts with a `Header`.
    let Header { tag, type_id } = unsafe { header.as_ptr().read() };
    if tag != LIVE_TAG || type_id != TypeId::of::<T>() {
        return Err(not_a_tensor(raw));
    }
    Ok(header.cast())
}

fn not_a_tensor(raw: RawHandle) -> BridgeError {
    BridgeError::illegal_state(format!("handle {raw:#x} is not a tensor handle"))
}

/// Process-wide handle accounting.
static TRACKER: HandleTracker = HandleTracker::new();

/// Snapshot of handle accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HandleStats {
    /// Handles created since process start.
    pub created: usize,
    /// Handles released since process start.
    pub released: usize,
    /// Handles currently alive.
    pub live: usize,
    /// Highest number of simultaneously alive handles.
    pub peak: usize,
}

/// Counts handle creations and releases. Thread-safe via atomics.
///
/// Counting is observational only; no operation consults it.
#[derive(Debug, Default)]
pub struct HandleTracker {
    created: AtomicUsize,
    released: AtomicUsize,
    live: AtomicUsize,
    peak: AtomicUsize,
}

impl HandleTracker {
    /// Create a tracker with all counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            created: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
            live: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Record a handle creation.
    pub fn record_create(&self) {
        self.created.fetch_add(1, Ordering::Relaxed);
        let live = self.live.fetch_add(1, Ordering::Relaxed) + 1;
        self.peak.fetch_max(live, Ordering::Relaxed);
    }

    /// Record a handle release.
    pub fn record_release(&self) {
        self.released.fetch_add(1, Ordering::Relaxed);
        self.live.fetch_sub(1, Ordering::Relaxed);
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> HandleStats {
        HandleStats {
            created: self.created.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            live: self.live.load(Ordering::Relaxed),
            peak: self.peak.load(Ordering::Relaxed),
        }
    }
}

/// Process-wide handle counters.
#[must_use]
pub fn stats() -> HandleStats {
    TRACKER.stats()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let raw = TensorHandle::new(vec![1u8, 2, 3]).into_raw();
        assert_ne!(raw, NULL_HANDLE);
        let value = unsafe { resolve::<Vec<u8>>(raw) }.unwrap();
        assert_eq!(value, &vec![1u8, 2, 3]);
        unsafe { release::<Vec<u8>>(raw) }.unwrap();
    }

    #[test]
    fn test_null_handle() {
        let err = unsafe { resolve::<Vec<u8>>(NULL_HANDLE) }.unwrap_err();
        assert!(matches!(err, BridgeError::NullPointer(_)));
        let err = unsafe { release::<Vec<u8>>(NULL_HANDLE) }.unwrap_err();
        assert!(matches!(err, BridgeError::NullPointer(_)));
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let raw = TensorHandle::new(7u64).into_raw();
        let err = unsafe { resolve::<String>(raw) }.unwrap_err();
        assert!(matches!(err, BridgeError::IllegalState(_)));
        // Still intact for the right type.
        assert_eq!(unsafe { resolve::<u64>(raw) }.unwrap(), &7);
        unsafe { release::<u64>(raw) }.unwrap();
    }

    #[test]
    fn test_owned_handle_drop_releases() {
        let handle = TensorHandle::new(String::from("tensor"));
        assert_eq!(handle.get(), "tensor");
        let raw = handle.into_raw();
        let handle = unsafe { TensorHandle::<String>::from_raw(raw) }.unwrap();
        drop(handle);
    }

    #[test]
    fn test_tracker_counts() {
        let tracker = HandleTracker::new();
        tracker.record_create();
        tracker.record_create();
        tracker.record_release();
        tracker.record_create();

        let stats = tracker.stats();
        assert_eq!(stats.created, 3);
        assert_eq!(stats.released, 1);
        assert_eq!(stats.live, 2);
        assert_eq!(stats.peak, 2);
    }

    #[test]
    fn test_global_stats_advance() {
        let before = stats();
        let raw = TensorHandle::new(1i32).into_raw();
        unsafe { release::<i32>(raw) }.unwrap();
        let after = stats();
        assert!(after.created > before.created);
        assert!(after.released > before.released);
    }
}
