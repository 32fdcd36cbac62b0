//! Error types for the deferred shading core
//!
//! This module defines the error type used throughout the crate, covering
//! backend failures, start-up precondition failures, and frame protocol
//! violations.

use std::fmt;
use crate::device::TextureFormat;

/// Result type for deferred shading operations
pub type Result<T> = std::result::Result<T, Error>;

/// Deferred shading errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (Vulkan, OpenGL, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (texture, mesh, buffer set slot, etc.)
    InvalidResource(String),

    /// Initialization failed (pipeline, buffer sets)
    InitializationFailed(String),

    /// The active backend cannot render to the requested format
    UnsupportedFormat(TextureFormat),

    /// An operation was called in a state that does not allow it
    /// (wrong frame phase, use after destroy, mismatched buffer sets)
    InvalidState(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::UnsupportedFormat(format) => write!(f, "Unsupported format: {:?}", format),
            Error::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an error and build an `Error::InvalidState` from it
#[macro_export]
macro_rules! ds_state_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::log::log_detailed(
            $crate::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!()
        );
        $crate::deferred::Error::InvalidState(message)
    }};
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
