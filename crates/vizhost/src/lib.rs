#![forbid(unsafe_code)]

//! vizhost public facade crate.
//!
//! Re-exports the types an embedding page needs to mount an editor, talk
//! to its host process and handle failures, plus a prelude for everyday
//! use. The building blocks live in the member crates, which are
//! re-exported as modules.

pub mod error;
#[cfg(feature = "logging")]
pub mod logging;

pub use error::{Error, Recovery, Result};

// --- Runtime re-exports ----------------------------------------------------

pub use vizhost_runtime::{
    Autorun, Derived, Disposable, DisposableStore, DisposeError, Emitter, Listener, Observable,
    Signal, autorun, autorun_simple, transaction,
};

// --- Text re-exports -------------------------------------------------------

pub use vizhost_text::{
    AstNode, Decoration, DiffDocument, Position, PositionOffsetTransformer, RangeError,
    TextDocument, TextRange,
};

// --- Widget re-exports -----------------------------------------------------

pub use vizhost_widgets::{
    CodeEditor, Component, DiffEditor, EditorHost, ElementHandle, Size, SizedHost, StyleSheet,
    TextModel, TreeWidget,
};

// --- Web re-exports --------------------------------------------------------

pub use vizhost_web::{
    App, AstViewer, ConfigError, ControllerContext, ControllerError, DiffWebEditor, EditorKind,
    HostChannel, HostConfig, ModifierKey, TextRangeEditor, TextWebEditor, ValidationError,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        App, ControllerContext, Derived, Disposable, EditorHost, EditorKind, Error, HostChannel,
        HostConfig, Observable, Position, Result, TextRange, autorun, transaction,
    };

    pub use crate::{runtime, style, text, web, widgets};
}

pub use vizhost_runtime as runtime;
pub use vizhost_style as style;
pub use vizhost_text as text;
pub use vizhost_web as web;
pub use vizhost_widgets as widgets;

/// Load `config`, validate it and mount the editor named in `query`.
///
/// Configuration problems abort before anything is rendered.
pub fn mount(
    host: std::rc::Rc<dyn EditorHost>,
    channel: std::rc::Rc<dyn HostChannel>,
    element: ElementHandle,
    config: HostConfig,
    query: &str,
) -> Result<App> {
    let config = config.validated()?;
    let ctx = ControllerContext::new(host, channel, element, config);
    let app = App::mount(&ctx, query);
    tracing::info!(target: "vizhost", kind = ?app.kind(), "page mounted");
    Ok(app)
}
