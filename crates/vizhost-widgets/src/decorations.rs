#![forbid(unsafe_code)]

//! Keeping editor decorations and their style rules in sync.
//!
//! # Design
//!
//! [`apply_decorations`] watches a list of [`Decoration`]s. On every change
//! it builds a fresh [`DecorationClassCache`], replaces the editor's whole
//! decoration set in one call and rewrites the component's style sheet.
//! Nothing is patched incrementally, and no cache outlives its pass.
//!
//! # Invariants
//!
//! 1. After each pass the editor shows exactly the current decorations.
//! 2. The style sheet holds one rule per distinct color of the current pass.
//! 3. Disposing the returned scope clears the decorations and removes the
//!    style sheet.

use std::rc::Rc;

use tracing::debug;
use vizhost_runtime::{Derived, DisposableStore, autorun_simple, to_disposable};
use vizhost_style::{DecorationClassCache, resolve_color};
use vizhost_text::Decoration;

use crate::host::{CodeEditor, DecorationOptions, EditorHost, ModelDecoration};

/// Convert decorations for the editor, allocating classes in `cache`.
pub fn to_model_decorations(
    decorations: &[Decoration],
    cache: &mut DecorationClassCache,
) -> Vec<ModelDecoration> {
    decorations
        .iter()
        .map(|d| ModelDecoration {
            range: d.range,
            options: DecorationOptions {
                description: "selected".into(),
                class_name: resolve_color(d.color.as_deref(), d.heat)
                    .map(|color| cache.class_for(&color).to_owned()),
                ..DecorationOptions::default()
            },
        })
        .collect()
}

/// Mirror `source` onto `editor` until the returned scope is disposed.
pub fn apply_decorations(
    host: &dyn EditorHost,
    editor: &dyn CodeEditor,
    source: Derived<Vec<Decoration>>,
    opacity: f64,
) -> DisposableStore {
    let store = DisposableStore::new();
    let collection = editor.create_decorations_collection();
    store.add(Rc::clone(&collection));
    let sheet = store.register(host.create_style_sheet());

    let target = Rc::clone(&collection);
    store.add(to_disposable(move || target.clear()));

    store.add(autorun_simple(move |r| {
        let decorations = source.read(r);
        let mut cache = DecorationClassCache::new(opacity);
        let model = to_model_decorations(&decorations, &mut cache);
        debug!(
            target: "vizhost.decorations",
            decorations = model.len(),
            rules = cache.len(),
            "decorations applied"
        );
        collection.set(model);
        sheet.set_style(&cache.css_text());
    }));
    store
}
