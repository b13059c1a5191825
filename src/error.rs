// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Error taxonomy for the tensor bridge.
//!
//! Every failure that can occur while marshaling a call is one of the
//! variants below. The JNI boundary turns each variant into a Java exception
//! via [`BridgeError::exception_class`] and the `Display` message, so nothing
//! ever unwinds across the native-call ABI.
//!
//! ## Error Hierarchy
//!
//! ```text
//! BridgeError
//! ├── NullPointer         - null handle, failed output array allocation
//! ├── IllegalState        - precondition violation (non-contiguous read, bad tag)
//! ├── InternalInvariant   - unexpected native enum value (layout)
//! ├── UnsupportedDType    - dtype code without a native scalar type
//! ├── UnsupportedDevice   - device-type code without a native device
//! ├── InvalidArgument     - malformed primitive argument
//! ├── InvalidConfig       - environment configuration failures
//! ├── Native              - errors raised by the wrapped tensor library
//! └── Jni                 - JNI call failures (feature `jni`)
//! ```

use thiserror::Error;

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Java exception class used for errors raised by the wrapped tensor library.
pub const ENGINE_EXCEPTION: &str = "ai/djl/engine/EngineException";
/// `java.lang.NullPointerException`.
pub const NULL_POINTER_EXCEPTION: &str = "java/lang/NullPointerException";
/// `java.lang.IllegalStateException`.
pub const ILLEGAL_STATE_EXCEPTION: &str = "java/lang/IllegalStateException";
/// `java.lang.IllegalArgumentException`.
pub const ILLEGAL_ARGUMENT_EXCEPTION: &str = "java/lang/IllegalArgumentException";
/// `java.lang.RuntimeException`, also used for panics caught at the boundary.
pub const RUNTIME_EXCEPTION: &str = "java/lang/RuntimeException";

/// Errors surfaced by the handle marshaling layer.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BridgeError {
    /// A required pointer was null.
    ///
    /// Raised for the null handle and when the host runtime cannot allocate
    /// an output array.
    #[error("{0}")]
    NullPointer(String),

    /// A precondition of the operation does not hold.
    #[error("{0}")]
    IllegalState(String),

    /// The wrapped library reported a value that should be impossible.
    #[error("{0}")]
    InternalInvariant(String),

    /// The dtype code has no counterpart in the wrapped library.
    #[error("unsupported dtype code: {code}")]
    UnsupportedDType {
        /// Code received from the caller.
        code: i32,
    },

    /// The device-type code has no counterpart in the wrapped library.
    #[error("unsupported device type code: {code}")]
    UnsupportedDevice {
        /// Code received from the caller.
        code: i32,
    },

    /// A primitive argument is malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid configuration parameter.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error raised by the wrapped tensor library; the message is kept verbatim.
    #[error("{0}")]
    Native(#[from] candle_core::Error),

    /// A JNI call failed.
    #[cfg(feature = "jni")]
    #[error("JNI error: {0}")]
    Jni(#[from] jni::errors::Error),
}

impl BridgeError {
    /// Create a null pointer error.
    pub fn null_pointer(msg: impl Into<String>) -> Self {
        Self::NullPointer(msg.into())
    }

    /// Create an illegal state error.
    pub fn illegal_state(msg: impl Into<String>) -> Self {
        Self::IllegalState(msg.into())
    }

    /// Create an internal invariant error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalInvariant(msg.into())
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a native library error from a message.
    ///
    /// Used by backends for checks the wrapped library itself does not make.
    pub fn native(msg: impl std::fmt::Display) -> Self {
        Self::Native(candle_core::Error::Msg(msg.to_string()))
    }

    /// JNI class name of the Java exception this error is thrown as.
    #[must_use]
    pub fn exception_class(&self) -> &'static str {
        match self {
            Self::NullPointer(_) => NULL_POINTER_EXCEPTION,
            Self::IllegalState(_) | Self::InternalInvariant(_) => ILLEGAL_STATE_EXCEPTION,
            Self::UnsupportedDType { .. }
            | Self::UnsupportedDevice { .. }
            | Self::InvalidArgument(_)
            | Self::InvalidConfig(_) => ILLEGAL_ARGUMENT_EXCEPTION,
            Self::Native(_) => ENGINE_EXCEPTION,
            #[cfg(feature = "jni")]
            Self::Jni(_) => RUNTIME_EXCEPTION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BridgeError::illegal_state("Currently data_ptr() only supports contiguous tensors");
        assert_eq!(
            err.to_string(),
            "Currently data_ptr() only supports contiguous tensors"
        );

        let err = BridgeError::UnsupportedDType { code: 42 };
        assert!(err.to_string().contains("42"));

        let err = BridgeError::invalid_config("bad level");
        assert_eq!(err.to_string(), "invalid configuration: bad level");
    }

    #[test]
    fn test_native_message_is_verbatim() {
        let err = BridgeError::native("shape mismatch in masked_select");
        assert_eq!(err.to_string(), "shape mismatch in masked_select");
        assert!(matches!(err, BridgeError::Native(_)));
    }

    #[test]
    fn test_exception_class_mapping() {
        assert_eq!(
            BridgeError::null_pointer("x").exception_class(),
            NULL_POINTER_EXCEPTION
        );
        assert_eq!(
            BridgeError::illegal_state("x").exception_class(),
            ILLEGAL_STATE_EXCEPTION
        );
        assert_eq!(
            BridgeError::internal("x").exception_class(),
            ILLEGAL_STATE_EXCEPTION
        );
        assert_eq!(
            BridgeError::UnsupportedDevice { code: 7 }.exception_class(),
            ILLEGAL_ARGUMENT_EXCEPTION
        );
        assert_eq!(
            BridgeError::invalid_argument("x").exception_class(),
            ILLEGAL_ARGUMENT_EXCEPTION
        );
        assert_eq!(BridgeError::native("x").exception_class(), ENGINE_EXCEPTION);
    }
}
