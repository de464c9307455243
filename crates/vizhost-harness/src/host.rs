//! In-memory [`EditorHost`].

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::trace;
use vizhost_runtime::Observable;
use vizhost_widgets::{
    CodeEditor, DiffEditor, DiffRenderOptions, EditorHost, EditorOptions, ElementHandle, Size,
    StyleSheet, TextModel, TreeOptions, TreeWidget,
};

use crate::diff::FakeDiffEditor;
use crate::editor::{FakeCodeEditor, FakeStyleSheet, FakeTextModel};
use crate::tree::FakeTree;

/// Records every element and widget it hands out.
///
/// Create it with [`FakeHost::new`] and coerce a clone to
/// `Rc<dyn EditorHost>` for the code under test.
#[derive(Default)]
pub struct FakeHost {
    next_element: Cell<u64>,
    children: RefCell<BTreeMap<ElementHandle, Vec<ElementHandle>>>,
    texts: RefCell<BTreeMap<ElementHandle, String>>,
    links: RefCell<BTreeMap<ElementHandle, String>>,
    sizes: RefCell<BTreeMap<ElementHandle, Observable<Size>>>,
    models: RefCell<Vec<Rc<FakeTextModel>>>,
    editors: RefCell<Vec<Rc<FakeCodeEditor>>>,
    diff_editors: RefCell<Vec<Rc<FakeDiffEditor>>>,
    trees: RefCell<Vec<Rc<FakeTree>>>,
    style_sheets: RefCell<Vec<Rc<FakeStyleSheet>>>,
}

impl FakeHost {
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Resize `element` as the page would.
    pub fn resize(&self, element: ElementHandle, size: Size) {
        self.element_size(element).set(size);
    }

    #[must_use]
    pub fn children(&self, element: ElementHandle) -> Vec<ElementHandle> {
        self.children
            .borrow()
            .get(&element)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether `descendant` is reachable from `root`.
    #[must_use]
    pub fn contains(&self, root: ElementHandle, descendant: ElementHandle) -> bool {
        let mut stack = vec![root];
        while let Some(element) = stack.pop() {
            if element == descendant {
                return true;
            }
            stack.extend(self.children(element));
        }
        false
    }

    #[must_use]
    pub fn text(&self, element: ElementHandle) -> Option<String> {
        self.texts.borrow().get(&element).cloned()
    }

    /// Link target of `element`, `None` for plain elements.
    #[must_use]
    pub fn href(&self, element: ElementHandle) -> Option<String> {
        self.links.borrow().get(&element).cloned()
    }

    /// Text of `root` and all its descendants, depth first.
    #[must_use]
    pub fn text_content(&self, root: ElementHandle) -> String {
        let mut out = self.text(root).unwrap_or_default();
        for child in self.children(root) {
            out.push_str(&self.text_content(child));
        }
        out
    }

    #[must_use]
    pub fn models(&self) -> Vec<Rc<FakeTextModel>> {
        self.models.borrow().clone()
    }

    #[must_use]
    pub fn editors(&self) -> Vec<Rc<FakeCodeEditor>> {
        self.editors.borrow().clone()
    }

    #[must_use]
    pub fn live_editors(&self) -> Vec<Rc<FakeCodeEditor>> {
        self.editors
            .borrow()
            .iter()
            .filter(|e| !e.is_disposed())
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn diff_editors(&self) -> Vec<Rc<FakeDiffEditor>> {
        self.diff_editors.borrow().clone()
    }

    #[must_use]
    pub fn live_diff_editors(&self) -> Vec<Rc<FakeDiffEditor>> {
        self.diff_editors
            .borrow()
            .iter()
            .filter(|e| !e.is_disposed())
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn trees(&self) -> Vec<Rc<FakeTree>> {
        self.trees.borrow().clone()
    }

    #[must_use]
    pub fn style_sheets(&self) -> Vec<Rc<FakeStyleSheet>> {
        self.style_sheets.borrow().clone()
    }

    #[must_use]
    pub fn live_style_sheets(&self) -> Vec<Rc<FakeStyleSheet>> {
        self.style_sheets
            .borrow()
            .iter()
            .filter(|s| !s.is_disposed())
            .cloned()
            .collect()
    }
}

impl EditorHost for FakeHost {
    fn create_element(&self) -> ElementHandle {
        let id = self.next_element.get() + 1;
        self.next_element.set(id);
        ElementHandle::from_raw(id)
    }

    fn set_children(&self, parent: ElementHandle, children: &[ElementHandle]) {
        self.children.borrow_mut().insert(parent, children.to_vec());
    }

    fn append_child(&self, parent: ElementHandle, child: ElementHandle) {
        self.children
            .borrow_mut()
            .entry(parent)
            .or_default()
            .push(child);
    }

    fn remove_child(&self, parent: ElementHandle, child: ElementHandle) {
        if let Some(children) = self.children.borrow_mut().get_mut(&parent) {
            children.retain(|c| *c != child);
        }
    }

    fn set_text(&self, element: ElementHandle, text: &str) {
        self.texts.borrow_mut().insert(element, text.to_owned());
    }

    fn create_link(&self, href: &str, text: &str) -> ElementHandle {
        let link = self.create_element();
        self.links.borrow_mut().insert(link, href.to_owned());
        self.set_text(link, text);
        link
    }

    fn element_size(&self, element: ElementHandle) -> Observable<Size> {
        self.sizes
            .borrow_mut()
            .entry(element)
            .or_insert_with(|| Observable::new(Size::ZERO))
            .clone()
    }

    fn create_text_model(&self, value: &str, language_id: Option<&str>) -> Rc<dyn TextModel> {
        let model = Rc::new(FakeTextModel::new(value, language_id));
        self.models.borrow_mut().push(Rc::clone(&model));
        model
    }

    fn create_code_editor(
        &self,
        container: ElementHandle,
        options: EditorOptions,
    ) -> Rc<dyn CodeEditor> {
        trace!(%container, "fake code editor");
        let editor = Rc::new(FakeCodeEditor::new(container, options));
        self.editors.borrow_mut().push(Rc::clone(&editor));
        editor
    }

    fn create_diff_editor(
        &self,
        container: ElementHandle,
        options: DiffRenderOptions,
    ) -> Rc<dyn DiffEditor> {
        trace!(%container, "fake diff editor");
        let editor = Rc::new(FakeDiffEditor::new(container, options));
        self.diff_editors.borrow_mut().push(Rc::clone(&editor));
        editor
    }

    fn create_tree(&self, container: ElementHandle, options: TreeOptions) -> Rc<dyn TreeWidget> {
        let tree = Rc::new(FakeTree::new(container, options));
        self.trees.borrow_mut().push(Rc::clone(&tree));
        tree
    }

    fn create_style_sheet(&self) -> Rc<dyn StyleSheet> {
        let sheet = Rc::new(FakeStyleSheet::default());
        self.style_sheets.borrow_mut().push(Rc::clone(&sheet));
        sheet
    }
}
