//! Syntax tree next to its source, kept in sync both ways.
//!
//! # Design
//!
//! [`AstComponent`] is a tree on the left and an [`EditorComponent`] on the
//! right. Moving the cursor in the editor selects the deepest node whose
//! range contains the cursor and reveals it in the tree. Focusing rows in
//! the tree decorates their ranges in the editor and scrolls the first one
//! into view. Nodes with a heat score add heat decorations to the source.
//!
//! The editor can be rebuilt (plain versus diff mode); everything attached
//! to it lives in the scope of an autorun over
//! [`EditorComponent::active_editor`] and follows the rebuild.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info};
use vizhost_runtime::{
    Autorun, Derived, Disposable, DisposableStore, DisposeResult, Observable, autorun,
    autorun_simple, map_out_none, to_disposable, transaction,
};
use vizhost_text::{AstNode, AstNodeId, TextRange};
use vizhost_widgets::{
    CodeEditor, Component, DecorationOptions, DecorationsCollection, DelegatingComponent,
    EditorComponent, EditorHost, EditorSources, ElementHandle, HorizontalSplitView,
    ModelDecoration, Size, SizeBounds, SizedHost, TreeComponent, TreeItemId, TreeNodeData,
    TreeResolver,
};

use crate::client::WebEditorClient;
use crate::config::HostConfig;
use crate::schema::AstInput;
use crate::snapshot::AstSnapshot;
use crate::validate::JsonValidator;

use super::ControllerContext;

/// Class of the row of the selected node.
pub const SELECTED_ROW_CLASS: &str = "selected";
/// Class of the editor decoration mirroring focused nodes.
pub const SELECTED_NODE_CLASS: &str = "selected-node";

/// Presentation node of the tree, one per [`AstNode`].
pub struct AstTreeNode {
    id: AstNodeId,
    label: String,
    segment: Option<String>,
    codicon: Option<String>,
    is_marked: bool,
    range: Option<TextRange>,
    class_names: Observable<String>,
    children: Vec<Rc<AstTreeNode>>,
}

impl AstTreeNode {
    #[must_use]
    pub fn new(node: &AstNode) -> Rc<Self> {
        Rc::new(Self {
            id: node.id(),
            label: node.label.clone(),
            segment: node.segment.clone(),
            codicon: node.codicon.clone(),
            is_marked: node.is_marked,
            range: node.range,
            class_names: Observable::new(String::new()),
            children: node.children.iter().map(Self::new).collect(),
        })
    }

    #[must_use]
    pub fn id(&self) -> AstNodeId {
        self.id
    }

    #[must_use]
    pub fn range(&self) -> Option<TextRange> {
        self.range
    }
}

impl TreeNodeData for AstTreeNode {
    type Key = AstNodeId;

    fn key(&self) -> AstNodeId {
        self.id
    }

    fn label(&self) -> String {
        self.label.clone()
    }

    fn codicon(&self) -> Option<String> {
        self.codicon.clone()
    }

    fn segment(&self) -> Option<String> {
        self.segment.clone()
    }

    fn is_marked(&self) -> bool {
        self.is_marked
    }

    fn class_names(&self) -> Observable<String> {
        self.class_names.clone()
    }

    fn children(&self) -> Vec<Rc<Self>> {
        self.children.clone()
    }
}

type Selected = Option<Rc<AstTreeNode>>;

fn same_node(a: &Selected, b: &Selected) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// Decorate the ranges of `nodes` and select the first one. Returns the
/// first range, if any.
fn mirror_selection(
    nodes: &[Rc<AstTreeNode>],
    collection: &dyn DecorationsCollection,
    selected: &Observable<Selected>,
) -> Option<TextRange> {
    if let Some(first) = nodes.first() {
        selected.set(Some(Rc::clone(first)));
    }
    let decorations: Vec<ModelDecoration> = nodes
        .iter()
        .filter_map(|node| node.range)
        .map(|range| ModelDecoration {
            range,
            options: DecorationOptions {
                description: "selected".to_owned(),
                class_name: Some(SELECTED_NODE_CLASS.to_owned()),
                should_fill_line_on_line_break: true,
                show_if_collapsed: false,
            },
        })
        .collect();
    let first = decorations.first().map(|d| d.range);
    collection.set(decorations);
    first
}

pub struct AstComponent {
    inner: DelegatingComponent,
    tree: Rc<TreeComponent<AstTreeNode>>,
    editor: Rc<EditorComponent>,
    selected: Observable<Selected>,
}

impl AstComponent {
    pub fn new(host: &Rc<dyn EditorHost>, document: Derived<AstSnapshot>, config: &HostConfig) -> Self {
        let source = document.clone();
        let tree_root = Derived::with_equality(
            move |r| AstTreeNode::new(&source.read(r).root),
            |a, b| Rc::ptr_eq(a, b),
        );
        let tree = Rc::new(TreeComponent::new(host, tree_root, config.tree_options()));

        let sources = EditorSources {
            text: document.map(|d| {
                let mut decorations = d.source.decorations().to_vec();
                decorations.extend(d.root.heat_decorations(d.heat_map_score_range));
                d.source.clone().with_decorations(decorations)
            }),
            original: document.map(|d| d.original.clone()),
            modified: document.map(|d| d.modified.clone()),
            mappings: document.map(|d| d.mappings.clone()),
        };
        let editor = Rc::new(EditorComponent::new(host, sources, config.editor_settings()));

        let split = HorizontalSplitView::new(
            host,
            Rc::clone(&tree) as Rc<dyn Component>,
            Rc::clone(&editor) as Rc<dyn Component>,
            config.split_weights,
        );
        let inner = DelegatingComponent::new(Rc::new(split));
        let store = inner.store();

        let selected: Observable<Selected> = Observable::with_equality(None, same_node);
        let last = RefCell::new(None::<Rc<AstTreeNode>>);
        let current = selected.clone();
        store.add(autorun_simple(move |r| {
            let node = current.read(r);
            if let Some(previous) = last.borrow_mut().take() {
                previous.class_names.set(String::new());
            }
            if let Some(node) = &node {
                node.class_names.set(SELECTED_ROW_CLASS.to_owned());
            }
            *last.borrow_mut() = node;
        }));

        let focused: Observable<Vec<TreeItemId>> = Observable::new(Vec::new());
        let sink = focused.clone();
        store.add(
            tree.tree()
                .on_did_change_focus(Box::new(move |items| sink.set(items.to_vec()))),
        );

        let sync = SelectionSync {
            document,
            resolver: tree.resolver(),
            tree: Rc::clone(&tree),
            focused,
            selected: selected.clone(),
        };
        let active = editor.active_editor();
        let binding: Autorun = autorun(move |r, run| {
            if let Some(code_editor) = active.read(r) {
                sync.bind(&code_editor, run);
            }
        });
        store.add(binding);

        Self {
            inner,
            tree,
            editor,
            selected,
        }
    }

    #[must_use]
    pub fn tree(&self) -> &Rc<TreeComponent<AstTreeNode>> {
        &self.tree
    }

    #[must_use]
    pub fn editor(&self) -> &Rc<EditorComponent> {
        &self.editor
    }

    /// Node currently selected, by cursor or by tree focus.
    #[must_use]
    pub fn selected(&self) -> Option<AstNodeId> {
        self.selected.get().map(|node| node.id)
    }
}

struct SelectionSync {
    document: Derived<AstSnapshot>,
    resolver: TreeResolver<AstTreeNode>,
    tree: Rc<TreeComponent<AstTreeNode>>,
    focused: Observable<Vec<TreeItemId>>,
    selected: Observable<Selected>,
}

impl SelectionSync {
    /// Attach cursor and focus synchronization to `editor` for one run.
    fn bind(&self, editor: &Rc<dyn CodeEditor>, run: &DisposableStore) {
        let collection = run.register(editor.create_decorations_collection());

        let (document, resolver, selected) = (
            self.document.clone(),
            self.resolver.clone(),
            self.selected.clone(),
        );
        let tree = Rc::clone(self.tree.tree());
        let target = Rc::clone(&collection);
        run.add(editor.on_did_change_cursor_position(Box::new(move |position| {
            let id = document.with(|d| d.root.find_smallest_node_at(*position).id());
            let item = resolver.item_for(id);
            debug!(target: "vizhost.ast", ?id, %position, "cursor moved");
            tree.reveal(item);
            if let Some(node) = item.and_then(|item| resolver.data_for(item)) {
                mirror_selection(&[node], &*target, &selected);
            }
        })));

        let (focused, resolver, selected) = (
            self.focused.clone(),
            self.resolver.clone(),
            self.selected.clone(),
        );
        let editor = Rc::clone(editor);
        run.add(autorun(move |r, per_run| {
            let guard = Rc::clone(&collection);
            per_run.add(to_disposable(move || guard.clear()));
            let nodes: Vec<Rc<AstTreeNode>> = focused
                .read(r)
                .into_iter()
                .filter_map(|item| resolver.data_for(item))
                .collect();
            if let Some(range) = mirror_selection(&nodes, &*collection, &selected) {
                editor.reveal_range_in_center_if_outside_viewport(range);
            }
        }));
    }
}

impl Component for AstComponent {
    fn element(&self) -> ElementHandle {
        self.inner.element()
    }

    fn layout(&self, size: Size) {
        self.inner.layout(size);
    }

    fn size_bounds(&self) -> SizeBounds {
        self.inner.size_bounds()
    }
}

impl Disposable for AstComponent {
    fn dispose(&self) -> DisposeResult {
        self.inner.dispose()
    }
}

/// The `ast-viewer` controller.
pub struct AstViewer {
    data: Observable<Option<AstSnapshot>>,
    client: Rc<WebEditorClient>,
    component: Rc<RefCell<Option<Rc<AstComponent>>>>,
    store: DisposableStore,
}

impl AstViewer {
    pub const ID: &'static str = "ast-viewer";

    pub fn new(ctx: &ControllerContext) -> Self {
        let data = Observable::new(None);
        let store = DisposableStore::new();
        let target = data.clone();
        let client = store.register(Rc::new(WebEditorClient::new(
            Rc::clone(&ctx.channel),
            JsonValidator::<AstInput>::new(),
            move |input| {
                let snapshot = AstSnapshot::from_input(&input)?;
                debug!(
                    target: "vizhost.ast",
                    nodes = snapshot.root.node_count(),
                    "ast snapshot"
                );
                transaction(|_| target.set(Some(snapshot)));
                Ok(())
            },
        )));

        let component = Rc::new(RefCell::new(None));
        let value = map_out_none(&data);
        let (host, element, config) = (Rc::clone(&ctx.host), ctx.element, Rc::clone(&ctx.config));
        let slot = Rc::clone(&component);
        let mount: Autorun = autorun(move |r, run| {
            let Some(document) = value.read(r) else {
                return;
            };
            info!(target: "vizhost.web", editor = Self::ID, "mounting");
            let ast = Rc::new(AstComponent::new(&host, document, &config));
            slot.replace(Some(Rc::clone(&ast)));
            run.add(SizedHost::new(&host, element, ast));
        });
        store.add(mount);

        Self {
            data,
            client,
            component,
            store,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<AstSnapshot> {
        self.data.get()
    }

    /// The mounted view, once the first snapshot arrived.
    #[must_use]
    pub fn component(&self) -> Option<Rc<AstComponent>> {
        self.component.borrow().clone()
    }

    #[must_use]
    pub fn client(&self) -> &WebEditorClient {
        &self.client
    }
}

impl Disposable for AstViewer {
    fn dispose(&self) -> DisposeResult {
        self.store.dispose_all();
        self.component.replace(None);
        Ok(())
    }
}
