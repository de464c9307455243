#![forbid(unsafe_code)]

//! Host-facing side of vizhost.
//!
//! Content arrives from the host process over a [`HostChannel`], is
//! validated against a schema ([`schema`], [`validate`]), normalized into
//! a snapshot ([`snapshot`]) and committed into observable state by one of
//! the controllers in [`controller`]. [`app`] picks the controller from
//! the page URL.
//!
//! # Failure Modes
//!
//! - **Invalid payload**: reported to the host, previous snapshot kept.
//! - **Malformed range**: same as an invalid payload; the whole snapshot
//!   is rejected.
//! - **Unknown editor id**: the help page is rendered.

pub mod app;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod schema;
pub mod snapshot;
pub mod validate;

pub use app::{App, EditorKind, UnknownEditor, query_value, render_help};
pub use client::{HostChannel, WebEditorClient};
pub use config::{HostConfig, ModifierKey};
pub use controller::ControllerContext;
pub use controller::ast_viewer::{AstComponent, AstTreeNode, AstViewer};
pub use controller::text_range_editor::{TextRangeEditor, TextRangeModel};
pub use controller::web_editor::{DiffWebEditor, TextWebEditor};
pub use error::{ConfigError, ControllerError, ValidationError};
pub use schema::{AstInput, DiffInput, TextInput, TextRangePayload};
pub use snapshot::{AstSnapshot, DiffSnapshot, TextSnapshot};
pub use validate::{JsonValidator, Validator};
