//! Generic `text` and `diff` editors fed by the host.

use std::rc::Rc;

use tracing::info;
use vizhost_runtime::{
    Autorun, Disposable, DisposableStore, DisposeResult, Observable, autorun, map_out_none,
    transaction,
};
use vizhost_widgets::{DiffEditorComponent, DiffSources, SizedHost, TextEditorComponent};

use crate::client::WebEditorClient;
use crate::schema::{DiffInput, TextInput};
use crate::snapshot::{DiffSnapshot, TextSnapshot};
use crate::validate::JsonValidator;

use super::ControllerContext;

/// Commits validated snapshots into `raw`.
fn client_for<I, S>(
    ctx: &ControllerContext,
    raw: &Observable<Option<S>>,
    normalize: fn(&I) -> Result<S, vizhost_text::RangeError>,
) -> WebEditorClient
where
    I: serde::de::DeserializeOwned + 'static,
    S: Clone + PartialEq + 'static,
{
    let target = raw.clone();
    WebEditorClient::new(
        Rc::clone(&ctx.channel),
        JsonValidator::<I>::new(),
        move |input| {
            let snapshot = normalize(&input)?;
            transaction(|_| target.set(Some(snapshot)));
            Ok(())
        },
    )
}

/// One document in one editor, optionally with a language.
pub struct TextWebEditor {
    raw: Observable<Option<TextSnapshot>>,
    client: Rc<WebEditorClient>,
    store: DisposableStore,
}

impl TextWebEditor {
    pub const ID: &'static str = "text";

    pub fn new(ctx: &ControllerContext) -> Self {
        let raw = Observable::new(None);
        let store = DisposableStore::new();
        let client = store.register(Rc::new(client_for(ctx, &raw, TextSnapshot::from_input)));

        let value = map_out_none(&raw);
        let (host, element) = (Rc::clone(&ctx.host), ctx.element);
        let opacity = ctx.config.decoration_opacity;
        let mount: Autorun = autorun(move |r, run| {
            let Some(state) = value.read(r) else {
                return;
            };
            info!(target: "vizhost.web", editor = Self::ID, "mounting");
            let component = TextEditorComponent::with_opacity(
                &host,
                state.map(|s| s.document.clone()),
                state.map(|s| s.language_id.clone()),
                opacity,
            );
            run.add(SizedHost::new(&host, element, Rc::new(component)));
        });
        store.add(mount);

        Self { raw, client, store }
    }

    /// Last committed snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Option<TextSnapshot> {
        self.raw.get()
    }

    #[must_use]
    pub fn client(&self) -> &WebEditorClient {
        &self.client
    }
}

impl Disposable for TextWebEditor {
    fn dispose(&self) -> DisposeResult {
        self.store.dispose_all();
        Ok(())
    }
}

/// Two documents in a diff editor, with optional explicit mappings.
///
/// The diff editor is rebuilt only when `hideUnchangedRegions` changes.
pub struct DiffWebEditor {
    raw: Observable<Option<DiffSnapshot>>,
    client: Rc<WebEditorClient>,
    store: DisposableStore,
}

impl DiffWebEditor {
    pub const ID: &'static str = "diff";

    pub fn new(ctx: &ControllerContext) -> Self {
        let raw = Observable::new(None);
        let store = DisposableStore::new();
        let client = store.register(Rc::new(client_for(ctx, &raw, DiffSnapshot::from_input)));

        let value = map_out_none(&raw);
        let (host, element, config) = (Rc::clone(&ctx.host), ctx.element, Rc::clone(&ctx.config));
        let mount: Autorun = autorun(move |r, run| {
            let Some(state) = value.read(r) else {
                return;
            };
            let hide = state.map(|s| s.hide_unchanged_regions).read(r);
            info!(target: "vizhost.web", editor = Self::ID, ?hide, "mounting");
            let sources = DiffSources {
                original: state.map(|s| s.diff.original.clone()),
                modified: state.map(|s| s.diff.modified.clone()),
                mappings: state.map(|s| s.diff.mappings.clone()),
            };
            let component = DiffEditorComponent::new(
                &host,
                sources,
                config.diff_options(hide),
                config.decoration_opacity,
            );
            run.add(SizedHost::new(&host, element, Rc::new(component)));
        });
        store.add(mount);

        Self { raw, client, store }
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<DiffSnapshot> {
        self.raw.get()
    }

    #[must_use]
    pub fn client(&self) -> &WebEditorClient {
        &self.client
    }
}

impl Disposable for DiffWebEditor {
    fn dispose(&self) -> DisposeResult {
        self.store.dispose_all();
        Ok(())
    }
}
