// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! DType codes exchanged with the managed caller.
//!
//! The caller identifies element types by a small integer. This module holds
//! the single bidirectional table between those codes and the scalar types of
//! the wrapped tensor library.
//!
//! ## Design Decisions
//!
//! - **One table, both directions**: [`DTYPE_TABLE`] is the only source of
//!   truth. Decoding and encoding both scan it, so the two directions cannot
//!   drift apart.
//!
//! - **No defaulting on input**: a code without a native scalar type is an
//!   [`BridgeError::UnsupportedDType`], never silently mapped to f32.
//!
//! - **Unknown on output**: a native scalar type with no code is reported as
//!   [`DTypeCode::Unknown`], which the caller treats as an undefined dtype.

use candle_core::DType;

use crate::error::{BridgeError, Result};

/// DType codes understood by the managed caller.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DTypeCode {
    /// 32-bit float.
    Float32 = 0,
    /// 64-bit float.
    Float64 = 1,
    /// IEEE half precision.
    Float16 = 2,
    /// Unsigned byte.
    Uint8 = 3,
    /// 32-bit signed integer.
    Int32 = 4,
    /// Signed byte.
    Int8 = 5,
    /// 64-bit signed integer.
    Int64 = 6,
    /// Boolean.
    Boolean = 7,
    /// Element type the caller cannot name.
    Unknown = 8,
    /// Brain float16.
    Bfloat16 = 9,
    /// 32-bit unsigned integer.
    Uint32 = 10,
}

impl DTypeCode {
    /// Every code, in numeric order.
    pub const ALL: [Self; 11] = [
        Self::Float32,
        Self::Float64,
        Self::Float16,
        Self::Uint8,
        Self::Int32,
        Self::Int8,
        Self::Int64,
        Self::Boolean,
        Self::Unknown,
        Self::Bfloat16,
        Self::Uint32,
    ];

    /// Decode a raw code.
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Raw integer value sent across the boundary.
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Code ↔ native scalar type table.
///
/// Codes absent from this table (int8, boolean, unknown) have no counterpart
/// in the wrapped library. Boolean results of logical operations
/// are carried as [`DType::U8`] masks and therefore report [`DTypeCode::Uint8`].
pub const DTYPE_TABLE: &[(DTypeCode, DType)] = &[
    (DTypeCode::Float32, DType::F32),
    (DTypeCode::Float64, DType::F64),
    (DTypeCode::Float16, DType::F16),
    (DTypeCode::Uint8, DType::U8),
    (DTypeCode::Int32, DType::I32),
    (DTypeCode::Int64, DType::I64),
    (DTypeCode::Bfloat16, DType::BF16),
    (DTypeCode::Uint32, DType::U32),
];

/// Decode a caller dtype code into the native scalar type.
///
/// # Errors
///
/// Returns [`BridgeError::UnsupportedDType`] for codes without a native type.
pub fn scalar_type_from_code(code: i32) -> Result<DType> {
    DTYPE_TABLE
        .iter()
        .find(|(c, _)| c.code() == code)
        .map(|(_, dtype)| *dtype)
        .ok_or(BridgeError::UnsupportedDType { code })
}

/// Encode a native scalar type as a caller dtype code.
#[must_use]
pub fn code_from_scalar_type(dtype: DType) -> i32 {
    DTYPE_TABLE
        .iter()
        .find(|(_, d)| *d == dtype)
        .map_or(DTypeCode::Unknown, |(c, _)| *c)
        .code()
}

/// Extension trait adding bridge helpers to `candle_core::DType`.
pub trait DTypeExt {
    /// Caller code for this dtype (`8` when it has none).
    fn bridge_code(&self) -> i32;

    /// Get a human-readable name for this dtype.
    ///
    /// Log events and error messages use this rather than the `Debug` form.
    fn name(&self) -> &'static str;
}

impl DTypeExt for DType {
    fn bridge_code(&self) -> i32 {
        code_from_scalar_type(*self)
    }

    fn name(&self) -> &'static str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_code_round_trips_or_is_rejected() {
        for code in DTypeCode::ALL {
            match scalar_type_from_code(code.code()) {
                Ok(dtype) => assert_eq!(code_from_scalar_type(dtype), code.code()),
                Err(BridgeError::UnsupportedDType { code: c }) => assert_eq!(c, code.code()),
                Err(other) => panic!("unexpected error {other}"),
            }
        }
    }

    #[test]
    fn test_table_is_injective() {
        for (i, (code_a, dtype_a)) in DTYPE_TABLE.iter().enumerate() {
            for (code_b, dtype_b) in &DTYPE_TABLE[i + 1..] {
                assert_ne!(code_a, code_b);
                assert_ne!(dtype_a, dtype_b);
            }
        }
    }

    #[test]
    fn test_unmapped_codes() {
        for code in [-1, 5, 7, 8, 11, 1000] {
            assert!(matches!(
                scalar_type_from_code(code),
                Err(BridgeError::UnsupportedDType { .. })
            ));
        }
    }

    #[test]
    fn test_from_code() {
        assert_eq!(DTypeCode::from_code(0), Some(DTypeCode::Float32));
        assert_eq!(DTypeCode::from_code(9), Some(DTypeCode::Bfloat16));
        assert_eq!(DTypeCode::from_code(11), None);
        assert_eq!(DTypeCode::from_code(-3), None);
    }

    #[test]
    fn test_dtype_ext() {
        assert_eq!(DType::F32.bridge_code(), 0);
        assert_eq!(DType::I64.bridge_code(), 6);
        assert_eq!(DType::U8.bridge_code(), 3);
        assert_eq!(DType::BF16.name(), "bf16");
        assert_eq!(DType::U32.name(), "u32");
    }

    #[test]
    fn test_int32_has_a_code() {
        assert_eq!(scalar_type_from_code(4).unwrap(), DType::I32);
        assert_eq!(DType::I32.bridge_code(), 4);
        assert_eq!(DType::I32.name(), "i32");
    }

    #[test]
    fn test_uncoded_dtypes_report_unknown() {
        assert_eq!(DType::I16.bridge_code(), 8);
        assert_eq!(DType::I16.name(), "i16");
        assert_eq!(DType::F8E4M3.bridge_code(), 8);
        assert_eq!(DType::F8E4M3.name(), "f8e4m3");
    }
}
