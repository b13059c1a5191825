// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Storage layout codes.

use crate::error::{BridgeError, Result};

/// Storage scheme reported by the wrapped tensor library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageLayout {
    /// Dense, stride-addressed storage.
    Strided,
    /// COO sparse storage.
    Sparse,
    /// Compressed sparse row storage.
    SparseCsr,
    /// Library-internal blocked format.
    Mkldnn,
}

/// Caller code for a strided layout.
pub const STRIDED: i32 = 0;
/// Caller code for a sparse layout.
pub const SPARSE: i32 = 1;
/// Caller code for an mkldnn layout.
pub const MKLDNN: i32 = 2;

/// Encode a layout for the caller.
///
/// # Errors
///
/// Only strided, sparse and mkldnn layouts have codes; anything else means
/// the wrapped library handed back a tensor this bridge cannot describe and
/// is reported as [`BridgeError::InternalInvariant`].
pub fn layout_code(layout: StorageLayout) -> Result<i32> {
    match layout {
        StorageLayout::Strided => Ok(STRIDED),
        StorageLayout::Sparse => Ok(SPARSE),
        StorageLayout::Mkldnn => Ok(MKLDNN),
        StorageLayout::SparseCsr => Err(BridgeError::internal(
            "Internal tensor library error, layout should only be strided, sparse or mkldnn",
        )),
    }
}
