//! Fake tree widget.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use vizhost_runtime::{Disposable, DisposeResult, Emitter, Listener};
use vizhost_widgets::{ElementHandle, Size, TreeItemId, TreeOptions, TreeRow, TreeWidget};

pub struct FakeTree {
    element: ElementHandle,
    options: TreeOptions,
    root: RefCell<Option<TreeRow>>,
    focus: RefCell<Vec<TreeItemId>>,
    revealed: RefCell<Vec<Option<TreeItemId>>>,
    classes: RefCell<BTreeMap<TreeItemId, String>>,
    root_sets: Cell<u32>,
    size: Cell<Option<Size>>,
    disposed: Cell<bool>,
    focus_changed: Emitter<Vec<TreeItemId>>,
}

impl FakeTree {
    #[must_use]
    pub fn new(element: ElementHandle, options: TreeOptions) -> Self {
        Self {
            element,
            options,
            root: RefCell::new(None),
            focus: RefCell::new(Vec::new()),
            revealed: RefCell::new(Vec::new()),
            classes: RefCell::new(BTreeMap::new()),
            root_sets: Cell::new(0),
            size: Cell::new(None),
            disposed: Cell::new(false),
            focus_changed: Emitter::new(),
        }
    }

    #[must_use]
    pub fn element(&self) -> ElementHandle {
        self.element
    }

    #[must_use]
    pub fn options(&self) -> TreeOptions {
        self.options
    }

    #[must_use]
    pub fn root(&self) -> Option<TreeRow> {
        self.root.borrow().clone()
    }

    #[must_use]
    pub fn root_sets(&self) -> u32 {
        self.root_sets.get()
    }

    /// Labels of all rows in preorder.
    #[must_use]
    pub fn row_labels(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(root) = self.root.borrow().as_ref() {
            collect(root, &mut |row| out.push(row.label.clone()));
        }
        out
    }

    /// First row in preorder with `label`.
    #[must_use]
    pub fn find_row(&self, label: &str) -> Option<TreeItemId> {
        let mut found = None;
        if let Some(root) = self.root.borrow().as_ref() {
            collect(root, &mut |row| {
                if found.is_none() && row.label == label {
                    found = Some(row.id);
                }
            });
        }
        found
    }

    /// Class names last set on `item`.
    #[must_use]
    pub fn class_names(&self, item: TreeItemId) -> Option<String> {
        self.classes.borrow().get(&item).cloned()
    }

    /// Items passed to `reveal`, oldest first.
    #[must_use]
    pub fn revealed(&self) -> Vec<Option<TreeItemId>> {
        self.revealed.borrow().clone()
    }

    #[must_use]
    pub fn size(&self) -> Option<Size> {
        self.size.get()
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Focus a row as the user would.
    pub fn user_focus(&self, item: TreeItemId) {
        self.set_focus(&[item]);
    }
}

fn collect(row: &TreeRow, visit: &mut impl FnMut(&TreeRow)) {
    visit(row);
    for child in &row.children {
        collect(child, visit);
    }
}

impl TreeWidget for FakeTree {
    fn set_root(&self, root: Option<TreeRow>) {
        self.root_sets.set(self.root_sets.get() + 1);
        self.classes.borrow_mut().clear();
        self.root.replace(root);
    }

    fn reveal(&self, item: Option<TreeItemId>) {
        self.revealed.borrow_mut().push(item);
    }

    fn set_focus(&self, items: &[TreeItemId]) {
        let items = items.to_vec();
        self.focus.replace(items.clone());
        self.focus_changed.fire(&items);
    }

    fn focus(&self) -> Vec<TreeItemId> {
        self.focus.borrow().clone()
    }

    fn set_row_class_names(&self, item: TreeItemId, class_names: &str) {
        self.classes.borrow_mut().insert(item, class_names.to_owned());
    }

    fn layout(&self, size: Size) {
        self.size.set(Some(size));
    }

    fn on_did_change_focus(&self, callback: Box<dyn Fn(&[TreeItemId])>) -> Listener {
        self.focus_changed.subscribe(move |items| callback(items))
    }
}

impl Disposable for FakeTree {
    fn dispose(&self) -> DisposeResult {
        self.disposed.set(true);
        self.root.replace(None);
        Ok(())
    }
}
