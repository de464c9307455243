//! Fake diff editor.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use vizhost_runtime::{Disposable, DisposeResult};
use vizhost_text::{DetailedLineRangeMapping, LineRange};
use vizhost_widgets::{
    CodeEditor, DiffEditor, DiffEditorModel, DiffRenderOptions, EditorOptions, ElementHandle,
    RenderOptionsSource, Size,
};

use crate::editor::FakeCodeEditor;

/// Diff editor with two fake sides.
///
/// Without a provider in its model, [`DiffEditor::changes`] falls back to
/// [`naive_line_diff`].
pub struct FakeDiffEditor {
    element: ElementHandle,
    options: DiffRenderOptions,
    original: Rc<FakeCodeEditor>,
    modified: Rc<FakeCodeEditor>,
    model: RefCell<Option<DiffEditorModel>>,
    model_sets: Cell<u32>,
    size: Cell<Option<Size>>,
    disposed: Cell<bool>,
}

impl FakeDiffEditor {
    #[must_use]
    pub fn new(element: ElementHandle, options: DiffRenderOptions) -> Self {
        Self {
            element,
            options,
            original: Rc::new(FakeCodeEditor::new(element, EditorOptions::default())),
            modified: Rc::new(FakeCodeEditor::new(element, EditorOptions::default())),
            model: RefCell::new(None),
            model_sets: Cell::new(0),
            size: Cell::new(None),
            disposed: Cell::new(false),
        }
    }

    #[must_use]
    pub fn element(&self) -> ElementHandle {
        self.element
    }

    #[must_use]
    pub fn original(&self) -> Rc<FakeCodeEditor> {
        Rc::clone(&self.original)
    }

    #[must_use]
    pub fn modified(&self) -> Rc<FakeCodeEditor> {
        Rc::clone(&self.modified)
    }

    #[must_use]
    pub fn model(&self) -> Option<DiffEditorModel> {
        self.model.borrow().clone()
    }

    /// Whether the current model carries its own diff provider.
    #[must_use]
    pub fn has_provider(&self) -> bool {
        self.model
            .borrow()
            .as_ref()
            .is_some_and(|m| m.provider.is_some())
    }

    #[must_use]
    pub fn model_sets(&self) -> u32 {
        self.model_sets.get()
    }

    #[must_use]
    pub fn size(&self) -> Option<Size> {
        self.size.get()
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }
}

impl RenderOptionsSource for FakeDiffEditor {
    fn render_options(&self) -> DiffRenderOptions {
        self.options
    }
}

impl DiffEditor for FakeDiffEditor {
    fn set_model(&self, model: Option<DiffEditorModel>) {
        self.model_sets.set(self.model_sets.get() + 1);
        let (original, modified) = match &model {
            Some(m) => (Some(Rc::clone(&m.original)), Some(Rc::clone(&m.modified))),
            None => (None, None),
        };
        self.original.set_model(original);
        self.modified.set_model(modified);
        self.model.replace(model);
    }

    fn layout(&self, size: Size) {
        self.size.set(Some(size));
    }

    fn original_editor(&self) -> Rc<dyn CodeEditor> {
        self.original.clone()
    }

    fn modified_editor(&self) -> Rc<dyn CodeEditor> {
        self.modified.clone()
    }

    fn changes(&self) -> Vec<DetailedLineRangeMapping> {
        let model = self.model.borrow();
        let Some(model) = model.as_ref() else {
            return Vec::new();
        };
        let original = model.original.lines();
        let modified = model.modified.lines();
        match &model.provider {
            Some(provider) => provider.compute_diff(&original, &modified).changes,
            None => naive_line_diff(&original, &modified),
        }
    }
}

impl Disposable for FakeDiffEditor {
    fn dispose(&self) -> DisposeResult {
        self.disposed.set(true);
        self.original.dispose()?;
        self.modified.dispose()?;
        self.model.replace(None);
        Ok(())
    }
}

/// One change covering everything between the common prefix and suffix.
#[must_use]
pub fn naive_line_diff(original: &[String], modified: &[String]) -> Vec<DetailedLineRangeMapping> {
    let prefix = original
        .iter()
        .zip(modified)
        .take_while(|(a, b)| a == b)
        .count();
    let room = original.len().min(modified.len()) - prefix;
    let suffix = original
        .iter()
        .rev()
        .zip(modified.iter().rev())
        .take(room)
        .take_while(|(a, b)| a == b)
        .count();
    let original_end = original.len() - suffix;
    let modified_end = modified.len() - suffix;
    if original_end == prefix && modified_end == prefix {
        return Vec::new();
    }
    let line = |n: usize| u32::try_from(n + 1).unwrap_or(u32::MAX);
    vec![DetailedLineRangeMapping {
        original: LineRange::new(line(prefix), line(original_end)),
        modified: LineRange::new(line(prefix), line(modified_end)),
        inner_changes: Vec::new(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(s: &[&str]) -> Vec<String> {
        s.iter().map(|l| (*l).to_owned()).collect()
    }

    #[test]
    fn identical_has_no_changes() {
        assert!(naive_line_diff(&lines(&["a", "b"]), &lines(&["a", "b"])).is_empty());
    }

    #[test]
    fn middle_line_changed() {
        let changes = naive_line_diff(&lines(&["a", "b", "c"]), &lines(&["a", "x", "c"]));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].original, LineRange::new(2, 3));
        assert_eq!(changes[0].modified, LineRange::new(2, 3));
    }

    #[test]
    fn insertion_at_end() {
        let changes = naive_line_diff(&lines(&["a"]), &lines(&["a", "b"]));
        assert_eq!(changes[0].original, LineRange::new(2, 2));
        assert_eq!(changes[0].modified, LineRange::new(2, 3));
    }
}
