//! Failure taxonomy shared by every layer.
//!
//! Concrete error enums live next to the port that produces them; each one
//! reports its class through [`Classify`] so callers can decide between
//! retrying, reporting and silently degrading without matching on variants.

use std::fmt;

/// Coarse failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Missing file, directory, log or metadata. Normally an empty result.
    NotFound,
    /// Content policy or grammar rejection. Aborts the current item only.
    ValidationFailed,
    /// Read, write or network hiccup. Eligible for bounded retry.
    TransientIo,
    /// Corrupt chunk or bad JSON. Degrades to a partial result.
    Malformed,
    /// Anything that should stop the current operation outright.
    Fatal,
}

impl ErrorClass {
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorClass::TransientIo)
    }

    /// Whether the failure should be shown to the user for the affected photo.
    pub fn is_user_visible(self) -> bool {
        matches!(self, ErrorClass::ValidationFailed | ErrorClass::Fatal)
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorClass::NotFound => "not_found",
            ErrorClass::ValidationFailed => "validation_failed",
            ErrorClass::TransientIo => "transient_io",
            ErrorClass::Malformed => "malformed",
            ErrorClass::Fatal => "fatal",
        };
        f.write_str(s)
    }
}

/// Implemented by every typed error that crosses a port.
pub trait Classify {
    fn class(&self) -> ErrorClass;
}
