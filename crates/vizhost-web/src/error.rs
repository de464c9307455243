//! Errors surfaced at the controller boundary.
//!
//! Everything here is recoverable: a controller that hits one of these
//! keeps its previous snapshot and reports the message to the host.

use std::fmt;

use vizhost_text::RangeError;

/// An inbound payload that does not match the expected schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Formatted deserializer message.
    pub message: String,
    /// 1-based line/column in the payload text, when it was parsed from text.
    pub location: Option<(usize, usize)>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    pub(crate) fn from_serde(err: &serde_json::Error) -> Self {
        let location = (err.line() > 0).then(|| (err.line(), err.column()));
        // serde_json appends its own "at line L column C"; keep the bare message.
        let message = match err.to_string().rsplit_once(" at line ") {
            Some((head, _)) if location.is_some() => head.to_owned(),
            _ => err.to_string(),
        };
        Self { message, location }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some((line, column)) => write!(
                f,
                "invalid payload: {} (line {line}, column {column})",
                self.message
            ),
            None => write!(f, "invalid payload: {}", self.message),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Why a controller refused an inbound snapshot or an outbound update.
#[derive(Debug)]
pub enum ControllerError {
    /// The payload did not match the schema.
    Validation(ValidationError),
    /// The payload parsed but a range in it is malformed.
    Normalization(RangeError),
    /// Outbound content could not be encoded.
    Serialization(serde_json::Error),
    /// The controller was already disposed.
    Disposed,
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "{e}"),
            Self::Normalization(e) => write!(f, "malformed range: {e}"),
            Self::Serialization(e) => write!(f, "encoding failed: {e}"),
            Self::Disposed => write!(f, "controller is disposed"),
        }
    }
}

impl std::error::Error for ControllerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(e) => Some(e),
            Self::Normalization(e) => Some(e),
            Self::Serialization(e) => Some(e),
            Self::Disposed => None,
        }
    }
}

impl From<ValidationError> for ControllerError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<RangeError> for ControllerError {
    fn from(err: RangeError) -> Self {
        Self::Normalization(err)
    }
}

/// Errors that can occur when loading a [`crate::HostConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    Toml(toml::de::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
