#![forbid(unsafe_code)]

//! An editor that is either a plain editor or a diff editor, depending on
//! the shape of the current snapshot.
//!
//! # Design
//!
//! The choice is a [`Derived`] [`EditorMode`]: a diff editor when the
//! snapshot carries an original side, a modified side or mappings, a
//! plain editor otherwise. One autorun reads the mode and builds the whole editor into
//! its per-run scope, so a mode switch tears the old editor down before
//! the new one exists. Snapshots that keep the mode only update models
//! and decorations.
//!
//! # Invariants
//!
//! 1. At most one editor widget exists at a time.
//! 2. [`EditorComponent::active_editor`] always names the code editor of
//!    the current widget (the original side in diff mode).

use std::rc::Rc;

use tracing::info;
use vizhost_runtime::{
    Autorun, Derived, Disposable, DisposableStore, DisposeResult, Observable, Reader,
    autorun, autorun_simple, transaction,
};
use vizhost_style::DEFAULT_DECORATION_OPACITY;
use vizhost_text::{RangeMapping, TextDocument};

use crate::component::{Component, Size};
use crate::decorations::apply_decorations;
use crate::diff_editor::{DiffSources, bind_diff};
use crate::host::{CodeEditor, DiffRenderOptions, EditorHost, EditorOptions, ElementHandle};
use crate::text_editor::synced_model;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorMode {
    Text,
    Diff,
}

/// Inputs of an [`EditorComponent`]. A missing diff side falls back to
/// `text`.
#[derive(Clone)]
pub struct EditorSources {
    pub text: Derived<TextDocument>,
    pub original: Derived<Option<TextDocument>>,
    pub modified: Derived<Option<TextDocument>>,
    pub mappings: Derived<Option<Vec<RangeMapping>>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorSettings {
    pub diff: DiffRenderOptions,
    pub decoration_opacity: f64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            diff: DiffRenderOptions::default(),
            decoration_opacity: DEFAULT_DECORATION_OPACITY,
        }
    }
}

type ActiveEditor = Option<Rc<dyn CodeEditor>>;

fn same_editor(a: &ActiveEditor, b: &ActiveEditor) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

pub struct EditorComponent {
    element: ElementHandle,
    dimension: Observable<Size>,
    mode: Derived<EditorMode>,
    active: Observable<ActiveEditor>,
    store: DisposableStore,
}

impl EditorComponent {
    pub fn new(host: &Rc<dyn EditorHost>, sources: EditorSources, settings: EditorSettings) -> Self {
        let element = host.create_element();
        let dimension = Observable::new(Size::ZERO);
        let active = Observable::with_equality(None, same_editor);

        let (original, modified, mappings) = (
            sources.original.clone(),
            sources.modified.clone(),
            sources.mappings.clone(),
        );
        let mode = Derived::new(move |r| {
            let diff = original.read(r).is_some() || modified.read(r).is_some();
            if diff || mappings.read(r).is_some() {
                EditorMode::Diff
            } else {
                EditorMode::Text
            }
        });

        let store = DisposableStore::new();
        let build = Builder {
            host: Rc::clone(host),
            element,
            sources,
            settings,
            dimension: dimension.clone(),
            active: active.clone(),
        };
        let mode_ref = mode.clone();
        let run: Autorun = autorun(move |r, run| {
            let mode = mode_ref.read(r);
            info!(target: "vizhost.editor", ?mode, "building editor");
            match mode {
                EditorMode::Text => build.text(run),
                EditorMode::Diff => build.diff(run, r),
            }
        });
        store.add(run);

        Self {
            element,
            dimension,
            mode,
            active,
            store,
        }
    }

    #[must_use]
    pub fn mode(&self) -> EditorMode {
        self.mode.get()
    }

    /// Code editor of the current widget, replaced on every rebuild.
    #[must_use]
    pub fn active_editor(&self) -> Observable<ActiveEditor> {
        self.active.clone()
    }

    #[must_use]
    pub fn current_editor(&self) -> ActiveEditor {
        self.active.get()
    }
}

struct Builder {
    host: Rc<dyn EditorHost>,
    element: ElementHandle,
    sources: EditorSources,
    settings: EditorSettings,
    dimension: Observable<Size>,
    active: Observable<ActiveEditor>,
}

impl Builder {
    fn container(&self) -> ElementHandle {
        let container = self.host.create_element();
        self.host.set_children(self.element, &[container]);
        container
    }

    fn text(&self, run: &DisposableStore) {
        let host = &*self.host;
        let editor = run.register(host.create_code_editor(self.container(), EditorOptions::default()));
        let model = synced_model(host, run, &self.sources.text, None);
        editor.set_model(Some(model));
        run.add(apply_decorations(
            host,
            &*editor,
            self.sources.text.map(|doc| doc.decorations().to_vec()),
            self.settings.decoration_opacity,
        ));

        let (target, dimension) = (Rc::clone(&editor), self.dimension.clone());
        run.add(autorun_simple(move |r| target.layout(dimension.read(r))));
        self.active.set(Some(editor));
    }

    fn diff(&self, run: &DisposableStore, reader: &Reader) {
        let host = &*self.host;
        let editor = run.register(host.create_diff_editor(self.container(), self.settings.diff));
        let side = |side: &Derived<Option<TextDocument>>| {
            let (side, text) = (side.clone(), self.sources.text.clone());
            Derived::new(move |r| side.read(r).unwrap_or_else(|| text.read(r)))
        };
        let sources = DiffSources {
            original: side(&self.sources.original),
            modified: side(&self.sources.modified),
            mappings: self.sources.mappings.clone(),
        };
        bind_diff(
            host,
            &*editor,
            run,
            &sources,
            reader,
            self.settings.decoration_opacity,
        );

        let (target, dimension) = (Rc::clone(&editor), self.dimension.clone());
        run.add(autorun_simple(move |r| target.layout(dimension.read(r))));
        self.active.set(Some(editor.original_editor()));
    }
}

impl Component for EditorComponent {
    fn element(&self) -> ElementHandle {
        self.element
    }

    fn layout(&self, size: Size) {
        transaction(|_| self.dimension.set(size));
    }
}

impl Disposable for EditorComponent {
    fn dispose(&self) -> DisposeResult {
        self.store.dispose_all();
        Ok(())
    }
}
