#![forbid(unsafe_code)]

//! Log subscriber setup.
//!
//! Library crates only emit through `tracing`; the embedding binary or
//! page calls [`init`] or [`init_json`] once. `RUST_LOG` takes precedence
//! over the filter passed in.
//!
//! # Failure Modes
//!
//! - **Subscriber already installed**: returns [`Error::Logging`]; the
//!   existing subscriber stays in place.
//! - **Malformed filter**: returns [`Error::Logging`] before anything is
//!   installed.

use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

/// Filter used when neither `RUST_LOG` nor the caller says otherwise.
pub const DEFAULT_FILTER: &str = "vizhost=info";

/// Parse `directives` (e.g. `"vizhost.client=debug,info"`).
pub fn parse_filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives).map_err(|e| Error::Logging(e.to_string()))
}

/// `RUST_LOG` when set and valid, `fallback` otherwise.
pub fn env_filter(fallback: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => parse_filter(fallback),
    }
}

/// Install a human-readable subscriber.
pub fn init(filter: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(filter)?)
        .with_target(true)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}

/// Install a subscriber writing one JSON object per event.
pub fn init_json(filter: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter(filter)?)
        .with_current_span(true)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}
