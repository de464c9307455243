#![forbid(unsafe_code)]

//! View components for vizhost.
//!
//! # Role in vizhost
//! Components wrap the host's editor, diff editor and tree widgets and
//! keep them in sync with reactive inputs. They never hold document state
//! of their own: every input is a [`vizhost_runtime::Derived`] and every
//! update happens in an autorun.
//!
//! # This crate provides
//! - [`host`]: the capability traits the embedding page implements.
//! - [`Component`] and the composites [`DelegatingComponent`],
//!   [`DynamicDelegatingComponent`], [`HorizontalSplitView`] and
//!   [`SizedHost`].
//! - [`TextEditorComponent`], [`DiffEditorComponent`] and the switching
//!   [`EditorComponent`].
//! - [`TreeComponent`] with a data-to-row reverse lookup.
//! - [`apply_decorations`], the decoration and style synchronizer.

pub mod component;
pub mod decorations;
pub mod diff_editor;
pub mod diff_provider;
pub mod editor;
pub mod host;
pub mod split;
pub mod text_editor;
pub mod tree;

pub use component::{
    Component, DelegatingComponent, DynamicDelegatingComponent, Size, SizeBounds, SizedHost, mount,
};
pub use decorations::{apply_decorations, to_model_decorations};
pub use diff_editor::{DiffEditorComponent, DiffSources};
pub use diff_provider::MappedDiffProvider;
pub use editor::{EditorComponent, EditorMode, EditorSettings, EditorSources};
pub use host::{
    CodeEditor, DecorationOptions, DecorationsCollection, DiffEditor, DiffEditorModel,
    DiffProvider, DiffRenderOptions, DiffResult, EditorHost, EditorOptions, ElementHandle,
    KeyCode, KeyEvent, ModelDecoration, MouseEvent, RenderOptionsSource, StyleSheet, TextModel,
    TreeItemId, TreeOptions, TreeRow, TreeWidget,
};
pub use split::{DEFAULT_SPLIT_WEIGHTS, HorizontalSplitView};
pub use text_editor::TextEditorComponent;
pub use tree::{
    DEFAULT_INDENT, DEFAULT_ROW_HEIGHT, TreeComponent, TreeNodeData, TreeResolver, row_classes,
};
