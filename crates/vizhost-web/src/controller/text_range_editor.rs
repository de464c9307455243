//! Text plus one selected range, editable from both sides.
//!
//! # Design
//!
//! [`TextRangeModel`] holds the text model, the selection cell and a
//! signal marking selections that came from the host. Inbound snapshots
//! set all three in one transaction, so the outbound autorun sends exactly
//! one `{text, range}` per snapshot.
//!
//! [`TextRangeEditor`] renders the model. A selection made in the editor
//! only becomes the model's selection while the configured modifier key
//! is held; everything else the editor does to its selection stays local.
//!
//! # Invariants
//!
//! 1. One outbound message per committed change of text or selection,
//!    plus one for the initial state.
//! 2. A host selection is revealed in the editor but never re-captured as
//!    user input.

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, warn};
use vizhost_runtime::{
    Autorun, Disposable, DisposableStore, DisposeResult, Observable, Signal, autorun_simple,
    transaction,
};
use vizhost_text::TextRange;
use vizhost_widgets::{
    CodeEditor, DecorationOptions, EditorHost, EditorOptions, ElementHandle, ModelDecoration,
    TextModel,
};

use crate::client::WebEditorClient;
use crate::config::{HostConfig, ModifierKey};
use crate::schema::TextRangePayload;
use crate::validate::JsonValidator;

use super::ControllerContext;

/// State shared with the host.
pub struct TextRangeModel {
    text_model: Rc<dyn TextModel>,
    text: Observable<String>,
    selection: Observable<TextRange>,
    changed_externally: Signal,
    client: Rc<WebEditorClient>,
    store: DisposableStore,
}

impl TextRangeModel {
    pub fn new(ctx: &ControllerContext) -> Self {
        let store = DisposableStore::new();
        let text_model = store.register(ctx.host.create_text_model("", None));

        let text = Observable::new(text_model.value());
        let (sink, source) = (text.clone(), Rc::clone(&text_model));
        store.add(
            text_model.on_did_change_content(Box::new(move |_| sink.set(source.value()))),
        );

        let selection = Observable::new(TextRange::default());
        let changed_externally = Signal::new();

        let (model, target, signal) = (
            Rc::clone(&text_model),
            selection.clone(),
            changed_externally.clone(),
        );
        let client = store.register(Rc::new(WebEditorClient::new(
            Rc::clone(&ctx.channel),
            JsonValidator::<TextRangePayload>::new(),
            move |payload| {
                let range = payload.checked_range()?;
                transaction(|_| {
                    model.set_value(&payload.text);
                    target.set(range);
                    signal.trigger();
                });
                Ok(())
            },
        )));

        let (outbound, text_ref, selection_ref) =
            (Rc::clone(&client), text.clone(), selection.clone());
        let sync: Autorun = autorun_simple(move |r| {
            let payload = TextRangePayload::new(text_ref.read(r), selection_ref.read(r));
            debug!(target: "vizhost.selection", range = %payload.range, "sending selection");
            if let Err(err) = outbound.update_content(&payload) {
                warn!(target: "vizhost.selection", error = %err, "selection not sent");
            }
        });
        store.add(sync);

        Self {
            text_model,
            text,
            selection,
            changed_externally,
            client,
            store,
        }
    }

    #[must_use]
    pub fn text_model(&self) -> &Rc<dyn TextModel> {
        &self.text_model
    }

    #[must_use]
    pub fn text(&self) -> Observable<String> {
        self.text.clone()
    }

    #[must_use]
    pub fn selection(&self) -> Observable<TextRange> {
        self.selection.clone()
    }

    /// Triggered whenever the host sets the selection.
    #[must_use]
    pub fn changed_externally(&self) -> Signal {
        self.changed_externally.clone()
    }

    #[must_use]
    pub fn client(&self) -> &WebEditorClient {
        &self.client
    }
}

impl Disposable for TextRangeModel {
    fn dispose(&self) -> DisposeResult {
        self.store.dispose_all();
        Ok(())
    }
}

/// Decoration mirroring `selection`.
fn selection_decoration(selection: TextRange) -> ModelDecoration {
    let class_name = if selection.is_empty() {
        "selectedRange empty"
    } else {
        "selectedRange"
    };
    ModelDecoration {
        range: selection,
        options: DecorationOptions {
            description: "selection".to_owned(),
            class_name: Some(class_name.to_owned()),
            should_fill_line_on_line_break: true,
            show_if_collapsed: true,
        },
    }
}

fn hint(modifier: ModifierKey) -> String {
    let key = match modifier {
        ModifierKey::Ctrl => "ctrl",
        ModifierKey::Shift => "shift",
        ModifierKey::Alt => "alt",
        ModifierKey::Meta => "meta",
    };
    format!("Hold {key} and select text to change")
}

/// The `selection-editor` controller: a status line over an editor.
pub struct TextRangeEditor {
    model: Rc<TextRangeModel>,
    editor: Rc<dyn CodeEditor>,
    status: ElementHandle,
    store: DisposableStore,
}

impl TextRangeEditor {
    pub const ID: &'static str = "selection-editor";

    pub fn new(ctx: &ControllerContext) -> Self {
        let store = DisposableStore::new();
        let model = store.register(Rc::new(TextRangeModel::new(ctx)));
        let host = &ctx.host;

        let (header, status, help, container) = (
            host.create_element(),
            host.create_element(),
            host.create_element(),
            host.create_element(),
        );
        host.set_text(help, &hint(ctx.config.selection_modifier));
        host.set_children(header, &[status, help]);
        host.set_children(ctx.element, &[header, container]);

        let editor = store.register(host.create_code_editor(
            container,
            EditorOptions {
                selection_highlight: false,
                occurrences_highlight: false,
                automatic_layout: true,
            },
        ));
        editor.set_model(Some(Rc::clone(&model.text_model)));

        let view = View {
            host: Rc::clone(host),
            model: Rc::clone(&model),
            editor: Rc::clone(&editor),
        };
        view.status_line(&store, status);
        view.decorate(&store);
        view.reveal_external(&store, &ctx.config);
        view.capture_with_modifier(&store, ctx.config.selection_modifier);
        view.follow_size(&store, container);

        Self {
            model,
            editor,
            status,
            store,
        }
    }

    #[must_use]
    pub fn model(&self) -> &Rc<TextRangeModel> {
        &self.model
    }

    #[must_use]
    pub fn editor(&self) -> &Rc<dyn CodeEditor> {
        &self.editor
    }

    /// Element showing `Selection: <range>`.
    #[must_use]
    pub fn status_element(&self) -> ElementHandle {
        self.status
    }
}

struct View {
    host: Rc<dyn EditorHost>,
    model: Rc<TextRangeModel>,
    editor: Rc<dyn CodeEditor>,
}

impl View {
    fn status_line(&self, store: &DisposableStore, status: ElementHandle) {
        let (host, selection) = (Rc::clone(&self.host), self.model.selection());
        store.add(autorun_simple(move |r| {
            host.set_text(status, &format!("Selection: {}", selection.read(r)));
        }));
    }

    fn decorate(&self, store: &DisposableStore) {
        let collection = store.register(self.editor.create_decorations_collection());
        let (selection, text) = (self.model.selection(), self.model.text());
        store.add(autorun_simple(move |r| {
            text.read(r);
            collection.set(vec![selection_decoration(selection.read(r))]);
        }));
    }

    fn reveal_external(&self, store: &DisposableStore, config: &HostConfig) {
        if !config.reveal_external_selection {
            return;
        }
        let (signal, selection, editor) = (
            self.model.changed_externally(),
            self.model.selection(),
            Rc::clone(&self.editor),
        );
        let first = Cell::new(true);
        store.add(autorun_simple(move |r| {
            signal.read(r);
            if !first.replace(false) {
                editor.reveal_range_in_center_if_outside_viewport(selection.get());
            }
        }));
    }

    fn capture_with_modifier(&self, store: &DisposableStore, modifier: ModifierKey) {
        let held = Rc::new(Cell::new(false));

        let flag = Rc::clone(&held);
        store.add(self.editor.on_key_down(Box::new(move |e| {
            if modifier.matches(&e.code) {
                flag.set(true);
            }
        })));
        let flag = Rc::clone(&held);
        store.add(self.editor.on_key_up(Box::new(move |e| {
            if modifier.matches(&e.code) {
                flag.set(false);
            }
        })));

        let (flag, selection) = (Rc::clone(&held), self.model.selection());
        store.add(
            self.editor
                .on_did_change_cursor_selection(Box::new(move |range| {
                    if flag.get() {
                        selection.set(*range);
                    }
                })),
        );

        let (flag, selection, editor) =
            (held, self.model.selection(), Rc::downgrade(&self.editor));
        store.add(self.editor.on_mouse_down(Box::new(move |_| {
            if !flag.get() {
                return;
            }
            if let Some(range) = editor.upgrade().and_then(|e| e.selection()) {
                selection.set(range);
            }
        })));
    }

    fn follow_size(&self, store: &DisposableStore, container: ElementHandle) {
        let (size, editor) = (self.host.element_size(container), Rc::clone(&self.editor));
        store.add(autorun_simple(move |r| editor.layout(size.read(r))));
    }
}

impl Disposable for TextRangeEditor {
    fn dispose(&self) -> DisposeResult {
        self.store.dispose_all();
        Ok(())
    }
}
