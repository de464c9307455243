//! Editor selection from the page URL.
//!
//! The query parameter (`editor` by default) names the controller to
//! mount. An unknown or missing value renders a help page that links to
//! every known editor instead of failing.

use std::fmt;
use std::str::FromStr;

use tracing::{info, warn};
use vizhost_runtime::{Disposable, DisposeResult};
use vizhost_widgets::ElementHandle;

use crate::controller::ControllerContext;
use crate::controller::ast_viewer::AstViewer;
use crate::controller::text_range_editor::TextRangeEditor;
use crate::controller::web_editor::{DiffWebEditor, TextWebEditor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorKind {
    AstViewer,
    SelectionEditor,
    Text,
    Diff,
}

impl EditorKind {
    pub const ALL: [Self; 4] = [Self::AstViewer, Self::SelectionEditor, Self::Text, Self::Diff];

    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::AstViewer => AstViewer::ID,
            Self::SelectionEditor => TextRangeEditor::ID,
            Self::Text => TextWebEditor::ID,
            Self::Diff => DiffWebEditor::ID,
        }
    }

    /// Link target selecting this editor.
    #[must_use]
    pub fn href(self, query_param: &str) -> String {
        format!("?{query_param}={}", self.id())
    }
}

impl fmt::Display for EditorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// An editor id that names no editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEditor(pub String);

impl fmt::Display for UnknownEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown editor type {:?}", self.0)
    }
}

impl std::error::Error for UnknownEditor {}

impl FromStr for EditorKind {
    type Err = UnknownEditor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| UnknownEditor(s.to_owned()))
    }
}

/// Value of `key` in a URL query string, with or without the leading `?`.
#[must_use]
pub fn query_value(query: &str, key: &str) -> Option<String> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(k, _)| decode(k) == key)
        .map(|(_, v)| decode(v))
}

/// `application/x-www-form-urlencoded` decoding. Malformed escapes are
/// kept literally.
fn decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .and_then(|h| std::str::from_utf8(h).ok())
                    .and_then(|h| u8::from_str_radix(h, 16).ok());
                if let Some(byte) = hex {
                    out.push(byte);
                    i += 2;
                } else {
                    out.push(b'%');
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Help text, followed by one link per editor.
pub const HELP_TEXT: &str = "Unknown editor type. Supported types are:";

/// Render the help page into `element`. Returns the link elements.
pub fn render_help(ctx: &ControllerContext) -> Vec<ElementHandle> {
    let host = &ctx.host;
    let title = host.create_element();
    host.set_text(title, HELP_TEXT);
    let links: Vec<ElementHandle> = EditorKind::ALL
        .into_iter()
        .map(|kind| {
            let href = kind.href(&ctx.config.query_param);
            host.create_link(&href, &href)
        })
        .collect();
    let mut children = vec![title];
    children.extend(&links);
    host.set_children(ctx.element, &children);
    links
}

/// The mounted page: one controller, or the help page.
pub struct App {
    kind: Option<EditorKind>,
    controller: Option<Box<dyn Disposable>>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("kind", &self.kind)
            .field("controller", &self.controller.is_some())
            .finish()
    }
}

impl App {
    /// Pick the controller named in `query` and mount it.
    pub fn mount(ctx: &ControllerContext, query: &str) -> Self {
        let requested = query_value(query, &ctx.config.query_param);
        let kind = requested.as_deref().map(EditorKind::from_str);
        match kind {
            Some(Ok(kind)) => {
                info!(target: "vizhost.app", %kind, "mounting editor");
                let controller: Box<dyn Disposable> = match kind {
                    EditorKind::AstViewer => Box::new(AstViewer::new(ctx)),
                    EditorKind::SelectionEditor => Box::new(TextRangeEditor::new(ctx)),
                    EditorKind::Text => Box::new(TextWebEditor::new(ctx)),
                    EditorKind::Diff => Box::new(DiffWebEditor::new(ctx)),
                };
                Self {
                    kind: Some(kind),
                    controller: Some(controller),
                }
            }
            Some(Err(err)) => {
                warn!(target: "vizhost.app", error = %err, "rendering help");
                render_help(ctx);
                Self::help()
            }
            None => {
                render_help(ctx);
                Self::help()
            }
        }
    }

    fn help() -> Self {
        Self {
            kind: None,
            controller: None,
        }
    }

    /// Mounted editor, `None` on the help page.
    #[must_use]
    pub fn kind(&self) -> Option<EditorKind> {
        self.kind
    }
}

impl Disposable for App {
    fn dispose(&self) -> DisposeResult {
        match &self.controller {
            Some(controller) => controller.dispose(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for kind in EditorKind::ALL {
            assert_eq!(kind.id().parse::<EditorKind>(), Ok(kind));
        }
        assert_eq!(
            "tree".parse::<EditorKind>(),
            Err(UnknownEditor("tree".to_owned()))
        );
    }

    #[test]
    fn query_parsing() {
        assert_eq!(
            query_value("?foo=1&editor=ast-viewer", "editor").as_deref(),
            Some("ast-viewer")
        );
        assert_eq!(query_value("editor=a%2Db+c", "editor").as_deref(), Some("a-b c"));
        assert_eq!(query_value("?editor", "editor").as_deref(), Some(""));
        assert_eq!(query_value("?other=1", "editor"), None);
        assert_eq!(query_value("", "editor"), None);
    }

    #[test]
    fn malformed_escape_is_literal() {
        assert_eq!(decode("100%"), "100%");
        assert_eq!(decode("%zz"), "%zz");
    }

    #[test]
    fn hrefs() {
        assert_eq!(EditorKind::Diff.href("editor"), "?editor=diff");
        assert_eq!(EditorKind::SelectionEditor.to_string(), "selection-editor");
    }
}
