//! Error types for scrs operations

use scwrapper::Status;
use std::fmt;
use thiserror::Error;

/// Status code returned by the reflection accessors
///
/// Non-negative values are successes (the accessors report the name buffer
/// length they needed); negative values are failures.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(pub i32);

impl StatusCode {
    /// Null result, or reflection data that was already released
    pub const NO_REFLECTION: StatusCode = StatusCode(Status::NoReflection.code());
    /// Index outside the reported count
    pub const INDEX_OUT_OF_RANGE: StatusCode = StatusCode(Status::IndexOutOfRange.code());
    /// The accessor failed internally
    pub const INTERNAL: StatusCode = StatusCode(Status::Internal.code());

    /// Returns true if the code indicates success
    #[inline]
    pub fn is_success(&self) -> bool {
        self.0 >= 0
    }

    /// Returns true if the code indicates an error
    #[inline]
    pub fn is_error(&self) -> bool {
        self.0 < 0
    }

    /// Returns the raw status value
    #[inline]
    pub fn code(&self) -> i32 {
        self.0
    }
}

impl fmt::Debug for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StatusCode({})", self.0)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Status::from_code(self.0) {
            Some(status) => write!(f, "{} ({})", status, self.0),
            None => write!(f, "{}", self.0),
        }
    }
}

impl From<i32> for StatusCode {
    fn from(code: i32) -> Self {
        StatusCode(code)
    }
}

impl From<Status> for StatusCode {
    fn from(status: Status) -> Self {
        StatusCode(status.code())
    }
}

/// Error type for scrs operations
#[derive(Error, Debug)]
pub enum Error {
    /// Shader compilation failed
    #[error("Compilation failed: {message}")]
    Compilation {
        /// Diagnostics reported by the engine
        message: String,
    },

    /// Disassembly failed
    #[error("Disassembly failed: {message}")]
    Disassembly {
        /// Diagnostics reported by the engine
        message: String,
    },

    /// A reflection accessor failed
    #[error("Reflection failed (status: {status})")]
    Reflection {
        /// The status returned by the accessor
        status: StatusCode,
    },

    /// Invalid parameter provided
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// UTF-8 encoding error
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Result type for scrs operations
pub type Result<T> = std::result::Result<T, Error>;
