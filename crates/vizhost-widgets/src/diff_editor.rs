#![forbid(unsafe_code)]

//! Side-by-side diff of two documents.
//!
//! When mappings are supplied the diff editor is given a
//! [`MappedDiffProvider`], so the displayed changes are exactly the
//! mappings. Without them the editor compares the texts itself.

use std::rc::Rc;

use tracing::debug;
use vizhost_runtime::{
    Autorun, Derived, Disposable, DisposableStore, DisposeResult, Reader, autorun,
};
use vizhost_text::{RangeMapping, TextDocument};

use crate::component::{Component, Size};
use crate::decorations::apply_decorations;
use crate::diff_provider::MappedDiffProvider;
use crate::host::{DiffEditor, DiffEditorModel, DiffRenderOptions, EditorHost, ElementHandle};
use crate::text_editor::synced_model;

/// Inputs of a [`DiffEditorComponent`].
#[derive(Clone)]
pub struct DiffSources {
    pub original: Derived<TextDocument>,
    pub modified: Derived<TextDocument>,
    pub mappings: Derived<Option<Vec<RangeMapping>>>,
}

pub struct DiffEditorComponent {
    element: ElementHandle,
    editor: Rc<dyn DiffEditor>,
    store: DisposableStore,
}

impl DiffEditorComponent {
    pub fn new(
        host: &Rc<dyn EditorHost>,
        sources: DiffSources,
        options: DiffRenderOptions,
        opacity: f64,
    ) -> Self {
        let element = host.create_element();
        let store = DisposableStore::new();
        let editor = store.register(host.create_diff_editor(element, options));

        let (host_ref, editor_ref) = (Rc::clone(host), Rc::clone(&editor));
        let run: Autorun = autorun(move |r, run| {
            bind_diff(&*host_ref, &*editor_ref, run, &sources, r, opacity);
        });
        store.add(run);

        Self {
            element,
            editor,
            store,
        }
    }

    #[must_use]
    pub fn editor(&self) -> &Rc<dyn DiffEditor> {
        &self.editor
    }
}

/// Create both models in `scope`, decorate both sides and hand the
/// models to `editor`. Reads the mappings through `reader`.
pub(crate) fn bind_diff(
    host: &dyn EditorHost,
    editor: &dyn DiffEditor,
    scope: &DisposableStore,
    sources: &DiffSources,
    reader: &Reader,
    opacity: f64,
) {
    let original = synced_model(host, scope, &sources.original, None);
    let modified = synced_model(host, scope, &sources.modified, None);

    scope.add(apply_decorations(
        host,
        &*editor.original_editor(),
        sources.original.map(|doc| doc.decorations().to_vec()),
        opacity,
    ));
    scope.add(apply_decorations(
        host,
        &*editor.modified_editor(),
        sources.modified.map(|doc| doc.decorations().to_vec()),
        opacity,
    ));

    let model = match sources.mappings.read(reader) {
        Some(mappings) => {
            debug!(target: "vizhost.diff", mappings = mappings.len(), "using supplied mappings");
            let provider = Rc::new(MappedDiffProvider::new(mappings));
            DiffEditorModel::with_provider(original, modified, editor, provider)
        }
        None => DiffEditorModel::computed(original, modified),
    };
    editor.set_model(Some(model));
}

impl Component for DiffEditorComponent {
    fn element(&self) -> ElementHandle {
        self.element
    }

    fn layout(&self, size: Size) {
        self.editor.layout(size);
    }
}

impl Disposable for DiffEditorComponent {
    fn dispose(&self) -> DisposeResult {
        self.store.dispose_all();
        Ok(())
    }
}
