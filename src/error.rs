//! Error codes shared by every primitive.
//!
//! Each failure maps onto a fixed integer code so results can cross an
//! integer-only boundary unchanged; `NO_ERROR` is the success code.

use core::fmt;

pub const NO_ERROR: i32 = 0;

/// Errors produced by the bfcrypt primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Operation has no verified implementation.
    Untested,
    /// Key, IV or buffer length is outside what the operation accepts.
    InvalidLength,
    /// A required context or buffer was absent. Never produced from safe
    /// Rust, where references cannot be null.
    NullPointer,
    /// Numeric parameter out of range (zero rounds, empty salt, ...).
    InvalidParameters,
}

impl Error {
    pub fn code(self) -> i32 {
        match self {
            Error::Untested => 1,
            Error::InvalidLength => 2,
            Error::NullPointer => 3,
            Error::InvalidParameters => 4,
        }
    }

    /// Inverse of [`code`](Self::code). `NO_ERROR` and unknown codes map to `None`.
    pub fn from_code(code: i32) -> Option<Error> {
        match code {
            1 => Some(Error::Untested),
            2 => Some(Error::InvalidLength),
            3 => Some(Error::NullPointer),
            4 => Some(Error::InvalidParameters),
            _ => None,
        }
    }
}

/// Collapses a result onto the integer code table.
pub fn code_of<T>(r: &Result<T, Error>) -> i32 {
    match r {
        Ok(_) => NO_ERROR,
        Err(e) => e.code(),
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Untested => write!(f, "Operation is untested"),
            Error::InvalidLength => write!(f, "Invalid key, IV or buffer length"),
            Error::NullPointer => write!(f, "Required pointer is null"),
            Error::InvalidParameters => write!(f, "Invalid parameters"),
        }
    }
}

impl core::error::Error for Error {}
