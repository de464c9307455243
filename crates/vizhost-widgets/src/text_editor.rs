#![forbid(unsafe_code)]

//! A single editor showing one document.

use std::rc::Rc;

use tracing::debug;
use vizhost_runtime::{
    Autorun, Derived, Disposable, DisposableStore, DisposeResult, autorun, autorun_simple,
};
use vizhost_style::DEFAULT_DECORATION_OPACITY;
use vizhost_text::TextDocument;

use crate::component::{Component, Size};
use crate::decorations::apply_decorations;
use crate::host::{CodeEditor, EditorHost, EditorOptions, ElementHandle, TextModel};

/// Editor bound to a document and a language.
///
/// A change of language recreates the text model; a change of document
/// only sets the model's value and the decorations.
pub struct TextEditorComponent {
    element: ElementHandle,
    editor: Rc<dyn CodeEditor>,
    store: DisposableStore,
}

impl TextEditorComponent {
    pub fn new(
        host: &Rc<dyn EditorHost>,
        source: Derived<TextDocument>,
        language: Derived<Option<String>>,
    ) -> Self {
        Self::with_opacity(host, source, language, DEFAULT_DECORATION_OPACITY)
    }

    pub fn with_opacity(
        host: &Rc<dyn EditorHost>,
        source: Derived<TextDocument>,
        language: Derived<Option<String>>,
        opacity: f64,
    ) -> Self {
        let element = host.create_element();
        let store = DisposableStore::new();
        let editor = store.register(host.create_code_editor(element, EditorOptions::default()));

        let (host_ref, editor_ref) = (Rc::clone(host), Rc::clone(&editor));
        let run: Autorun = autorun(move |r, run| {
            let language = language.read(r);
            debug!(target: "vizhost.editor", ?language, "creating text model");
            let model = synced_model(&*host_ref, run, &source, language.as_deref());
            editor_ref.set_model(Some(model));
            run.add(apply_decorations(
                &*host_ref,
                &*editor_ref,
                source.map(|doc| doc.decorations().to_vec()),
                opacity,
            ));
        });
        store.add(run);

        Self {
            element,
            editor,
            store,
        }
    }

    #[must_use]
    pub fn editor(&self) -> &Rc<dyn CodeEditor> {
        &self.editor
    }
}

/// A text model registered in `scope` whose value follows `source`.
pub(crate) fn synced_model(
    host: &dyn EditorHost,
    scope: &DisposableStore,
    source: &Derived<TextDocument>,
    language: Option<&str>,
) -> Rc<dyn TextModel> {
    let model = scope.register(host.create_text_model("", language));
    let (target, source) = (Rc::clone(&model), source.clone());
    scope.add(autorun_simple(move |r| target.set_value(source.read(r).value())));
    model
}

impl Component for TextEditorComponent {
    fn element(&self) -> ElementHandle {
        self.element
    }

    fn layout(&self, size: Size) {
        self.editor.layout(size);
    }
}

impl Disposable for TextEditorComponent {
    fn dispose(&self) -> DisposeResult {
        self.store.dispose_all();
        Ok(())
    }
}
