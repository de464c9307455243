#![forbid(unsafe_code)]

//! Unified error model.
//!
//! Each crate keeps its own typed error; [`Error`] wraps them so an
//! embedding page can handle every failure in one place. [`Error::recovery`]
//! says what the host should do about it.
//!
//! # Invariants
//!
//! 1. Every error raised at a controller boundary is recoverable: the
//!    controller keeps its previous snapshot.
//! 2. Only configuration errors and use of a disposed controller abort.

use std::fmt;

use vizhost_runtime::DisposeError;
use vizhost_text::RangeError;
use vizhost_web::{ConfigError, ControllerError, ValidationError};

/// Top-level error type for vizhost pages.
#[derive(Debug)]
pub enum Error {
    /// A resource failed to release.
    Dispose(DisposeError),
    /// A range or position could not be normalized.
    Range(RangeError),
    /// An inbound payload did not match its schema.
    Validation(ValidationError),
    /// A controller refused a snapshot or an update.
    Controller(ControllerError),
    /// Configuration could not be loaded or is invalid.
    Config(ConfigError),
    /// The log subscriber could not be installed.
    Logging(String),
}

/// Standard result type for vizhost APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// What the page should do when an error occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Drop the offending snapshot and keep showing the previous one.
    KeepPrevious,
    /// Log and carry on; nothing visible is affected.
    Continue,
    /// Stop mounting; the page cannot work as configured.
    Abort,
}

impl Error {
    #[must_use]
    pub fn recovery(&self) -> Recovery {
        match self {
            Self::Range(_) | Self::Validation(_) => Recovery::KeepPrevious,
            Self::Controller(ControllerError::Disposed) => Recovery::Abort,
            Self::Controller(_) => Recovery::KeepPrevious,
            Self::Dispose(_) | Self::Logging(_) => Recovery::Continue,
            Self::Config(_) => Recovery::Abort,
        }
    }

    /// Error type label for tracing fields.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Dispose(_) => "dispose",
            Self::Range(_) => "range",
            Self::Validation(_) => "validation",
            Self::Controller(_) => "controller",
            Self::Config(_) => "config",
            Self::Logging(_) => "logging",
        }
    }

    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        self.recovery() != Recovery::Abort
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dispose(err) => write!(f, "{err}"),
            Self::Range(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Controller(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "configuration: {err}"),
            Self::Logging(msg) => write!(f, "logging setup: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Dispose(err) => Some(err),
            Self::Range(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Controller(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Logging(_) => None,
        }
    }
}

impl fmt::Display for Recovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeepPrevious => write!(f, "keep_previous"),
            Self::Continue => write!(f, "continue"),
            Self::Abort => write!(f, "abort"),
        }
    }
}

impl From<DisposeError> for Error {
    fn from(err: DisposeError) -> Self {
        Self::Dispose(err)
    }
}

impl From<RangeError> for Error {
    fn from(err: RangeError) -> Self {
        Self::Range(err)
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<ControllerError> for Error {
    fn from(err: ControllerError) -> Self {
        Self::Controller(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}
