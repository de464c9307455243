#![forbid(unsafe_code)]

//! Tree view over a data tree that is replaced wholesale.
//!
//! # Design
//!
//! Every time the root changes, the component builds a parallel tree of
//! [`TreeRow`]s, all expanded, and hands it to the tree widget in one
//! call. Row ids are fresh per build. An index maps data keys to row ids
//! and back, which is what programmatic reveal and selection go through.
//!
//! Each row's CSS classes follow the data node's `class_names`
//! observable, so highlighting a node never rebuilds the tree.

use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use ahash::AHashMap;
use tracing::debug;
use vizhost_runtime::{
    Autorun, Derived, Disposable, DisposableStore, DisposeResult, Observable, autorun,
    autorun_simple,
};

use crate::component::{Component, Size};
use crate::host::{EditorHost, ElementHandle, TreeItemId, TreeOptions, TreeRow, TreeWidget};

/// Row height used unless configured otherwise.
pub const DEFAULT_ROW_HEIGHT: u32 = 30;
/// Indent per level unless configured otherwise.
pub const DEFAULT_INDENT: u32 = 16;

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            row_height: DEFAULT_ROW_HEIGHT,
            indent: DEFAULT_INDENT,
        }
    }
}

/// What a tree needs to know about a data node.
pub trait TreeNodeData: 'static {
    type Key: Copy + Eq + Hash + fmt::Debug;

    /// Identity of the node within its tree.
    fn key(&self) -> Self::Key;
    fn label(&self) -> String;
    fn codicon(&self) -> Option<String>;
    /// Shown next to the label, e.g. `".name"` or `"[0]"`.
    fn segment(&self) -> Option<String> {
        None
    }
    fn is_marked(&self) -> bool {
        false
    }
    /// Extra classes of the row, changeable without a rebuild.
    fn class_names(&self) -> Observable<String>;
    fn children(&self) -> Vec<Rc<Self>>;
}

struct TreeIndex<T: TreeNodeData> {
    by_key: AHashMap<T::Key, TreeItemId>,
    by_item: AHashMap<TreeItemId, Rc<T>>,
    next: u64,
}

impl<T: TreeNodeData> TreeIndex<T> {
    fn new() -> Self {
        Self {
            by_key: AHashMap::new(),
            by_item: AHashMap::new(),
            next: 0,
        }
    }

    fn clear(&mut self) {
        self.by_key.clear();
        self.by_item.clear();
    }

    fn insert(&mut self, node: &Rc<T>) -> TreeItemId {
        let id = TreeItemId(self.next);
        self.next += 1;
        self.by_key.insert(node.key(), id);
        self.by_item.insert(id, Rc::clone(node));
        id
    }
}

/// Classes for the icon and marker of a row.
pub fn row_classes(codicon: Option<&str>, is_marked: bool) -> Vec<String> {
    let mut classes = Vec::new();
    if let Some(codicon) = codicon {
        classes.push(format!("codicon-{codicon}"));
        classes.push("predefined-file-icon".to_owned());
    }
    if is_marked {
        classes.push("marked".to_owned());
    }
    classes
}

pub struct TreeComponent<T: TreeNodeData> {
    element: ElementHandle,
    tree: Rc<dyn TreeWidget>,
    index: Rc<RefCell<TreeIndex<T>>>,
    store: DisposableStore,
}

impl<T: TreeNodeData> TreeComponent<T> {
    pub fn new(host: &Rc<dyn EditorHost>, root: Derived<Rc<T>>, options: TreeOptions) -> Self {
        let element = host.create_element();
        let store = DisposableStore::new();
        let tree = store.register(host.create_tree(element, options));
        let index = Rc::new(RefCell::new(TreeIndex::new()));

        let (tree_ref, index_ref) = (Rc::clone(&tree), Rc::clone(&index));
        let run: Autorun = autorun(move |r, run| {
            let root = root.read(r);
            let mut classes = Vec::new();
            let row = {
                let mut index = index_ref.borrow_mut();
                index.clear();
                build_row(&root, &mut index, &mut classes)
            };
            debug!(target: "vizhost.tree", rows = classes.len(), "tree rebuilt");
            tree_ref.set_root(Some(row));
            for (id, class_names) in classes {
                let target = Rc::clone(&tree_ref);
                run.add(autorun_simple(move |r| {
                    target.set_row_class_names(id, &row_class_names(&class_names.read(r)));
                }));
            }
        });
        store.add(run);

        Self {
            element,
            tree,
            index,
            store,
        }
    }

    #[must_use]
    pub fn tree(&self) -> &Rc<dyn TreeWidget> {
        &self.tree
    }

    /// Row currently showing the node with `key`.
    #[must_use]
    pub fn item_for(&self, key: T::Key) -> Option<TreeItemId> {
        self.index.borrow().by_key.get(&key).copied()
    }

    /// Data node behind a row.
    #[must_use]
    pub fn data_for(&self, item: TreeItemId) -> Option<Rc<T>> {
        self.index.borrow().by_item.get(&item).cloned()
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.index.borrow().by_item.len()
    }

    /// Lookup usable from event callbacks that outlive a borrow of `self`.
    #[must_use]
    pub fn resolver(&self) -> TreeResolver<T> {
        TreeResolver {
            index: Rc::clone(&self.index),
        }
    }
}

/// Shared handle to a [`TreeComponent`]'s index.
pub struct TreeResolver<T: TreeNodeData> {
    index: Rc<RefCell<TreeIndex<T>>>,
}

impl<T: TreeNodeData> Clone for TreeResolver<T> {
    fn clone(&self) -> Self {
        Self {
            index: Rc::clone(&self.index),
        }
    }
}

impl<T: TreeNodeData> TreeResolver<T> {
    #[must_use]
    pub fn item_for(&self, key: T::Key) -> Option<TreeItemId> {
        self.index.borrow().by_key.get(&key).copied()
    }

    #[must_use]
    pub fn data_for(&self, item: TreeItemId) -> Option<Rc<T>> {
        self.index.borrow().by_item.get(&item).cloned()
    }
}

/// Full class attribute of a row's contents.
fn row_class_names(extra: &str) -> String {
    if extra.is_empty() {
        "monaco-tl-contents".to_owned()
    } else {
        format!("monaco-tl-contents {extra}")
    }
}

fn build_row<T: TreeNodeData>(
    node: &Rc<T>,
    index: &mut TreeIndex<T>,
    classes: &mut Vec<(TreeItemId, Observable<String>)>,
) -> TreeRow {
    let id = index.insert(node);
    classes.push((id, node.class_names()));
    let children: Vec<TreeRow> = node
        .children()
        .iter()
        .map(|child| build_row(child, index, classes))
        .collect();

    TreeRow {
        id,
        label: node.label(),
        description: node.segment(),
        extra_classes: row_classes(node.codicon().as_deref(), node.is_marked()),
        collapsible: !children.is_empty(),
        expanded: true,
        children,
    }
}

impl<T: TreeNodeData> Component for TreeComponent<T> {
    fn element(&self) -> ElementHandle {
        self.element
    }

    fn layout(&self, size: Size) {
        self.tree.layout(size);
    }
}

impl<T: TreeNodeData> Disposable for TreeComponent<T> {
    fn dispose(&self) -> DisposeResult {
        self.store.dispose_all();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_and_marker_classes() {
        assert_eq!(
            row_classes(Some("symbol-class"), true),
            vec!["codicon-symbol-class", "predefined-file-icon", "marked"]
        );
        assert!(row_classes(None, false).is_empty());
    }

    #[test]
    fn contents_class_always_present() {
        assert_eq!(row_class_names(""), "monaco-tl-contents");
        assert_eq!(row_class_names("selected"), "monaco-tl-contents selected");
    }
}
