//! Error classification shared by every layer
//!
//! Each module keeps its own error enum; `ErrorKind` is the coarse taxonomy a
//! front end uses to decide how to present a failure.

use std::fmt;

/// Message shown when a failure carries no usable detail
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong, please try again";

/// Coarse classification of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Rejected locally before any request was made
    Validation,
    /// The service does not know the requested record
    NotFound,
    /// The service refused the request
    Rejected,
    /// Transport failure, timeout or unreadable response
    Network,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Rejected => "rejected",
            ErrorKind::Network => "network",
        };
        f.write_str(s)
    }
}
