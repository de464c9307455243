//! Fake text models, code editors, decoration collections and style sheets.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use vizhost_runtime::{Disposable, DisposeResult, Emitter, Listener};
use vizhost_text::{Position, TextRange};
use vizhost_widgets::{
    CodeEditor, DecorationsCollection, EditorOptions, ElementHandle, KeyCode, KeyEvent,
    ModelDecoration, MouseEvent, Size, StyleSheet, TextModel,
};

#[derive(Debug)]
pub struct FakeTextModel {
    value: RefCell<String>,
    language_id: Option<String>,
    set_count: Cell<u32>,
    disposed: Cell<bool>,
    changed: Emitter<()>,
}

impl FakeTextModel {
    #[must_use]
    pub fn new(value: &str, language_id: Option<&str>) -> Self {
        Self {
            value: RefCell::new(value.to_owned()),
            language_id: language_id.map(str::to_owned),
            set_count: Cell::new(0),
            disposed: Cell::new(false),
            changed: Emitter::new(),
        }
    }

    /// Number of `set_value` calls.
    #[must_use]
    pub fn set_count(&self) -> u32 {
        self.set_count.get()
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Edit as the user would.
    pub fn type_text(&self, value: &str) {
        self.value.replace(value.to_owned());
        self.changed.fire(&());
    }
}

impl TextModel for FakeTextModel {
    fn value(&self) -> String {
        self.value.borrow().clone()
    }

    fn set_value(&self, value: &str) {
        self.set_count.set(self.set_count.get() + 1);
        self.value.replace(value.to_owned());
        self.changed.fire(&());
    }

    fn lines(&self) -> Vec<String> {
        self.value.borrow().split('\n').map(str::to_owned).collect()
    }

    fn language_id(&self) -> Option<String> {
        self.language_id.clone()
    }

    fn on_did_change_content(&self, callback: Box<dyn Fn(&())>) -> Listener {
        self.changed.subscribe(move |e| callback(e))
    }
}

impl Disposable for FakeTextModel {
    fn dispose(&self) -> DisposeResult {
        self.disposed.set(true);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeDecorations {
    items: RefCell<Vec<ModelDecoration>>,
    set_calls: Cell<u32>,
    disposed: Cell<bool>,
}

impl FakeDecorations {
    #[must_use]
    pub fn items(&self) -> Vec<ModelDecoration> {
        self.items.borrow().clone()
    }

    /// Number of `set` calls, i.e. atomic replacements.
    #[must_use]
    pub fn set_calls(&self) -> u32 {
        self.set_calls.get()
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }
}

impl DecorationsCollection for FakeDecorations {
    fn set(&self, decorations: Vec<ModelDecoration>) {
        self.set_calls.set(self.set_calls.get() + 1);
        self.items.replace(decorations);
    }

    fn clear(&self) {
        self.items.borrow_mut().clear();
    }

    fn len(&self) -> usize {
        self.items.borrow().len()
    }
}

impl Disposable for FakeDecorations {
    fn dispose(&self) -> DisposeResult {
        self.disposed.set(true);
        self.items.borrow_mut().clear();
        Ok(())
    }
}

pub struct FakeCodeEditor {
    element: ElementHandle,
    options: EditorOptions,
    model: RefCell<Option<Rc<dyn TextModel>>>,
    size: Cell<Option<Size>>,
    layouts: Cell<u32>,
    selection: Cell<Option<TextRange>>,
    revealed: RefCell<Vec<TextRange>>,
    collections: RefCell<Vec<Rc<FakeDecorations>>>,
    disposed: Cell<bool>,
    cursor_moved: Emitter<Position>,
    selection_changed: Emitter<TextRange>,
    key_down: Emitter<KeyEvent>,
    key_up: Emitter<KeyEvent>,
    mouse_down: Emitter<MouseEvent>,
}

impl FakeCodeEditor {
    #[must_use]
    pub fn new(element: ElementHandle, options: EditorOptions) -> Self {
        Self {
            element,
            options,
            model: RefCell::new(None),
            size: Cell::new(None),
            layouts: Cell::new(0),
            selection: Cell::new(None),
            revealed: RefCell::new(Vec::new()),
            collections: RefCell::new(Vec::new()),
            disposed: Cell::new(false),
            cursor_moved: Emitter::new(),
            selection_changed: Emitter::new(),
            key_down: Emitter::new(),
            key_up: Emitter::new(),
            mouse_down: Emitter::new(),
        }
    }

    #[must_use]
    pub fn element(&self) -> ElementHandle {
        self.element
    }

    #[must_use]
    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    #[must_use]
    pub fn size(&self) -> Option<Size> {
        self.size.get()
    }

    #[must_use]
    pub fn layout_count(&self) -> u32 {
        self.layouts.get()
    }

    /// Text of the current model, empty without one.
    #[must_use]
    pub fn text(&self) -> String {
        self.model.borrow().as_ref().map(|m| m.value()).unwrap_or_default()
    }

    /// Ranges passed to `reveal_range_in_center_if_outside_viewport`.
    #[must_use]
    pub fn revealed(&self) -> Vec<TextRange> {
        self.revealed.borrow().clone()
    }

    /// Every decoration currently shown, across live collections.
    #[must_use]
    pub fn decorations(&self) -> Vec<ModelDecoration> {
        self.collections
            .borrow()
            .iter()
            .filter(|c| !c.is_disposed())
            .flat_map(|c| c.items())
            .collect()
    }

    /// Class names of every decoration currently shown.
    #[must_use]
    pub fn decoration_classes(&self) -> Vec<String> {
        self.decorations()
            .into_iter()
            .filter_map(|d| d.options.class_name)
            .collect()
    }

    #[must_use]
    pub fn collections(&self) -> Vec<Rc<FakeDecorations>> {
        self.collections.borrow().clone()
    }

    /// Move the caret as the user would.
    pub fn move_cursor(&self, position: Position) {
        self.cursor_moved.fire(&position);
    }

    /// Select as the user would: selection event, then cursor event.
    pub fn user_select(&self, range: TextRange) {
        self.selection.set(Some(range));
        self.selection_changed.fire(&range);
        self.cursor_moved.fire(&range.end);
    }

    pub fn press_key(&self, code: KeyCode) {
        self.key_down.fire(&KeyEvent { code });
    }

    pub fn release_key(&self, code: KeyCode) {
        self.key_up.fire(&KeyEvent { code });
    }

    pub fn click(&self, position: Option<Position>) {
        self.mouse_down.fire(&MouseEvent { position });
    }
}

impl CodeEditor for FakeCodeEditor {
    fn set_model(&self, model: Option<Rc<dyn TextModel>>) {
        self.model.replace(model);
    }

    fn model(&self) -> Option<Rc<dyn TextModel>> {
        self.model.borrow().clone()
    }

    fn layout(&self, size: Size) {
        self.layouts.set(self.layouts.get() + 1);
        self.size.set(Some(size));
    }

    fn create_decorations_collection(&self) -> Rc<dyn DecorationsCollection> {
        let collection = Rc::new(FakeDecorations::default());
        self.collections.borrow_mut().push(Rc::clone(&collection));
        collection
    }

    fn selection(&self) -> Option<TextRange> {
        self.selection.get()
    }

    fn set_selection(&self, selection: TextRange) {
        self.selection.set(Some(selection));
        self.selection_changed.fire(&selection);
    }

    fn reveal_range_in_center_if_outside_viewport(&self, range: TextRange) {
        self.revealed.borrow_mut().push(range);
    }

    fn on_did_change_cursor_position(&self, callback: Box<dyn Fn(&Position)>) -> Listener {
        self.cursor_moved.subscribe(move |p| callback(p))
    }

    fn on_did_change_cursor_selection(&self, callback: Box<dyn Fn(&TextRange)>) -> Listener {
        self.selection_changed.subscribe(move |s| callback(s))
    }

    fn on_key_down(&self, callback: Box<dyn Fn(&KeyEvent)>) -> Listener {
        self.key_down.subscribe(move |e| callback(e))
    }

    fn on_key_up(&self, callback: Box<dyn Fn(&KeyEvent)>) -> Listener {
        self.key_up.subscribe(move |e| callback(e))
    }

    fn on_mouse_down(&self, callback: Box<dyn Fn(&MouseEvent)>) -> Listener {
        self.mouse_down.subscribe(move |e| callback(e))
    }
}

impl Disposable for FakeCodeEditor {
    fn dispose(&self) -> DisposeResult {
        self.disposed.set(true);
        self.model.replace(None);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeStyleSheet {
    css: RefCell<String>,
    updates: Cell<u32>,
    disposed: Cell<bool>,
}

impl FakeStyleSheet {
    #[must_use]
    pub fn css(&self) -> String {
        self.css.borrow().clone()
    }

    #[must_use]
    pub fn updates(&self) -> u32 {
        self.updates.get()
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }
}

impl StyleSheet for FakeStyleSheet {
    fn set_style(&self, css: &str) {
        self.updates.set(self.updates.get() + 1);
        self.css.replace(css.to_owned());
    }
}

impl Disposable for FakeStyleSheet {
    fn dispose(&self) -> DisposeResult {
        self.disposed.set(true);
        self.css.borrow_mut().clear();
        Ok(())
    }
}
