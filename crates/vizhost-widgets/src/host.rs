#![forbid(unsafe_code)]

//! Capabilities the embedding page provides.
//!
//! The editor widget, its diff renderer, the tree widget, style sheets and
//! element management are all external. Components only talk to them
//! through the traits in this module, and an [`EditorHost`] is the factory
//! for all of them.
//!
//! Every resource handed out by the host is [`Disposable`]; whoever creates
//! one registers it in a scope.
//!
//! Event subscriptions return a [`Listener`]. The callback stays
//! registered only while that guard is alive.

use std::fmt;
use std::rc::Rc;

use vizhost_runtime::{Disposable, Listener, Observable};
use vizhost_text::{DetailedLineRangeMapping, Position, TextRange};

use crate::component::Size;

/// Opaque handle to a page element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementHandle(u64);

impl ElementHandle {
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Keys the components care about.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Ctrl,
    Shift,
    Alt,
    Meta,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// Text position under the pointer, if over text.
    pub position: Option<Position>,
}

/// A buffer of text owned by the editor widget.
pub trait TextModel: Disposable {
    fn value(&self) -> String;
    fn set_value(&self, value: &str);
    /// Lines without terminators.
    fn lines(&self) -> Vec<String>;
    fn language_id(&self) -> Option<String>;
    fn on_did_change_content(&self, callback: Box<dyn Fn(&())>) -> Listener;
}

/// Options for a single code editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorOptions {
    pub selection_highlight: bool,
    pub occurrences_highlight: bool,
    pub automatic_layout: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            selection_highlight: true,
            occurrences_highlight: true,
            automatic_layout: false,
        }
    }
}

/// Options for one decoration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecorationOptions {
    pub description: String,
    pub class_name: Option<String>,
    pub should_fill_line_on_line_break: bool,
    pub show_if_collapsed: bool,
}

/// A decoration as handed to the editor widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDecoration {
    pub range: TextRange,
    pub options: DecorationOptions,
}

/// A set of decorations the editor widget replaces atomically.
pub trait DecorationsCollection: Disposable {
    /// Replace the whole set in one step.
    fn set(&self, decorations: Vec<ModelDecoration>);
    fn clear(&self);
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The editor widget.
pub trait CodeEditor: Disposable {
    fn set_model(&self, model: Option<Rc<dyn TextModel>>);
    fn model(&self) -> Option<Rc<dyn TextModel>>;
    fn layout(&self, size: Size);
    fn create_decorations_collection(&self) -> Rc<dyn DecorationsCollection>;
    fn selection(&self) -> Option<TextRange>;
    fn set_selection(&self, selection: TextRange);
    fn reveal_range_in_center_if_outside_viewport(&self, range: TextRange);
    fn on_did_change_cursor_position(&self, callback: Box<dyn Fn(&Position)>) -> Listener;
    fn on_did_change_cursor_selection(&self, callback: Box<dyn Fn(&TextRange)>) -> Listener;
    fn on_key_down(&self, callback: Box<dyn Fn(&KeyEvent)>) -> Listener;
    fn on_key_up(&self, callback: Box<dyn Fn(&KeyEvent)>) -> Listener;
    fn on_mouse_down(&self, callback: Box<dyn Fn(&MouseEvent)>) -> Listener;
}

/// Rendering options of a diff editor that a diff view model needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffRenderOptions {
    pub hide_unchanged_regions: bool,
    pub render_side_by_side: bool,
}

impl Default for DiffRenderOptions {
    fn default() -> Self {
        Self {
            hide_unchanged_regions: true,
            render_side_by_side: true,
        }
    }
}

/// Narrow view of a diff editor's configuration.
pub trait RenderOptionsSource {
    fn render_options(&self) -> DiffRenderOptions;
}

/// Result of a diff computation, as the diff renderer consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiffResult {
    pub identical: bool,
    pub quit_early: bool,
    pub changes: Vec<DetailedLineRangeMapping>,
}

/// Computes the changes a diff editor displays.
pub trait DiffProvider {
    fn compute_diff(&self, original: &[String], modified: &[String]) -> DiffResult;
}

/// What a diff editor shows: two models, and optionally a provider that
/// replaces the editor's own diff computation.
#[derive(Clone)]
pub struct DiffEditorModel {
    pub original: Rc<dyn TextModel>,
    pub modified: Rc<dyn TextModel>,
    pub provider: Option<Rc<dyn DiffProvider>>,
    pub options: Option<DiffRenderOptions>,
}

impl DiffEditorModel {
    /// The editor computes the diff itself.
    #[must_use]
    pub fn computed(original: Rc<dyn TextModel>, modified: Rc<dyn TextModel>) -> Self {
        Self {
            original,
            modified,
            provider: None,
            options: None,
        }
    }

    /// The displayed changes come from `provider` only.
    #[must_use]
    pub fn with_provider(
        original: Rc<dyn TextModel>,
        modified: Rc<dyn TextModel>,
        editor: &(impl RenderOptionsSource + ?Sized),
        provider: Rc<dyn DiffProvider>,
    ) -> Self {
        Self {
            original,
            modified,
            provider: Some(provider),
            options: Some(editor.render_options()),
        }
    }
}

impl fmt::Debug for DiffEditorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffEditorModel")
            .field("provider", &self.provider.is_some())
            .field("options", &self.options)
            .finish()
    }
}

/// The side-by-side diff widget.
pub trait DiffEditor: Disposable + RenderOptionsSource {
    fn set_model(&self, model: Option<DiffEditorModel>);
    fn layout(&self, size: Size);
    fn original_editor(&self) -> Rc<dyn CodeEditor>;
    fn modified_editor(&self) -> Rc<dyn CodeEditor>;
    /// Changes currently displayed.
    fn changes(&self) -> Vec<DetailedLineRangeMapping>;
}

/// Opaque id of a row in a [`TreeWidget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeItemId(pub u64);

/// A row and its subtree, as handed to the tree widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub id: TreeItemId,
    pub label: String,
    pub description: Option<String>,
    pub extra_classes: Vec<String>,
    pub collapsible: bool,
    pub expanded: bool,
    pub children: Vec<TreeRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeOptions {
    pub row_height: u32,
    pub indent: u32,
}

/// The tree widget.
pub trait TreeWidget: Disposable {
    fn set_root(&self, root: Option<TreeRow>);
    /// Scroll `item` into view; `None` scrolls to the top.
    fn reveal(&self, item: Option<TreeItemId>);
    fn set_focus(&self, items: &[TreeItemId]);
    fn focus(&self) -> Vec<TreeItemId>;
    fn set_row_class_names(&self, item: TreeItemId, class_names: &str);
    fn layout(&self, size: Size);
    fn on_did_change_focus(&self, callback: Box<dyn Fn(&[TreeItemId])>) -> Listener;
}

/// A style element owned by one component. Disposing removes it.
pub trait StyleSheet: Disposable {
    fn set_style(&self, css: &str);
}

/// Factory for every external capability.
pub trait EditorHost {
    fn create_element(&self) -> ElementHandle;
    /// Replace the children of `parent`.
    fn set_children(&self, parent: ElementHandle, children: &[ElementHandle]);
    fn append_child(&self, parent: ElementHandle, child: ElementHandle);
    /// No-op when `child` is not a child of `parent`.
    fn remove_child(&self, parent: ElementHandle, child: ElementHandle);
    fn set_text(&self, element: ElementHandle, text: &str);
    /// A navigable link to `href` labelled `text`.
    fn create_link(&self, href: &str, text: &str) -> ElementHandle;
    /// Observed size of `element`, updated by the page.
    fn element_size(&self, element: ElementHandle) -> Observable<Size>;
    fn create_text_model(&self, value: &str, language_id: Option<&str>) -> Rc<dyn TextModel>;
    fn create_code_editor(
        &self,
        container: ElementHandle,
        options: EditorOptions,
    ) -> Rc<dyn CodeEditor>;
    fn create_diff_editor(
        &self,
        container: ElementHandle,
        options: DiffRenderOptions,
    ) -> Rc<dyn DiffEditor>;
    fn create_tree(&self, container: ElementHandle, options: TreeOptions) -> Rc<dyn TreeWidget>;
    fn create_style_sheet(&self) -> Rc<dyn StyleSheet>;
}
