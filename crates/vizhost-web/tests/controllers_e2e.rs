#![forbid(unsafe_code)]

//! Controllers mounted on the in-memory host and driven through a
//! recording channel.
//!
//! 1. `text_editor` – mount once, update in place
//! 2. `diff_editor` – mappings and render option rebuilds
//! 3. `ast_viewer` – cursor, tree focus and heat decorations
//! 4. `selection_editor` – two-way selection without echo loops
//! 5. `app` – editor selection and the help page

use std::rc::Rc;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tracing_test::traced_test;
use vizhost_harness::{FakeHost, RecordingChannel};
use vizhost_runtime::Disposable;
use vizhost_text::{Position, TextRange};
use vizhost_web::{
    App, AstViewer, ControllerContext, DiffWebEditor, EditorKind, HostConfig, ModifierKey,
    TextRangeEditor, TextWebEditor,
};
use vizhost_widgets::{DiffEditor, EditorHost, KeyCode, RenderOptionsSource, Size, TextModel};

struct Page {
    host: Rc<FakeHost>,
    channel: Rc<RecordingChannel>,
    ctx: ControllerContext,
}

fn page_with(config: HostConfig) -> Page {
    let host = FakeHost::new();
    let channel = Rc::new(RecordingChannel::new());
    let dyn_host: Rc<dyn EditorHost> = host.clone();
    let element = dyn_host.create_element();
    let ctx = ControllerContext::new(dyn_host, channel.clone(), element, config);
    Page { host, channel, ctx }
}

fn page() -> Page {
    page_with(HostConfig::default())
}

fn range(l1: u32, c1: u32, l2: u32, c2: u32) -> TextRange {
    TextRange::new(Position::new(l1, c1), Position::new(l2, c2)).unwrap()
}

fn payload(text: &str, range: TextRange) -> Value {
    json!({
        "text": text,
        "range": {
            "start": {"lineNumber": range.start.line_number, "column": range.start.column},
            "end": {"lineNumber": range.end.line_number, "column": range.end.column},
        }
    })
}

// =========================================================================
// 1. Text editor
// =========================================================================

mod text_editor {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn nothing_mounted_before_first_snapshot() {
        let page = page();
        let editor = TextWebEditor::new(&page.ctx);
        assert!(page.host.editors().is_empty());
        assert!(editor.snapshot().is_none());
        assert_eq!(page.channel.receiver_count(), 1);
    }

    #[test]
    fn second_snapshot_updates_in_place() {
        let page = page();
        let editor = TextWebEditor::new(&page.ctx);

        page.channel
            .push(json!({"source": "fn a() {}", "languageId": "rust"}));
        assert_eq!(page.host.editors().len(), 1);
        let widget = Rc::clone(&page.host.editors()[0]);
        assert_eq!(widget.text(), "fn a() {}");
        assert_eq!(
            page.host.models()[0].language_id().as_deref(),
            Some("rust")
        );

        page.channel.push(json!({
            "source": {
                "value": "fn b() {}",
                "decorations": [{"range": [0, 2], "color": "red"}]
            },
            "languageId": "rust"
        }));
        assert_eq!(page.host.editors().len(), 1);
        assert_eq!(widget.text(), "fn b() {}");
        assert_eq!(widget.decoration_classes().len(), 1);
        assert_eq!(widget.decorations()[0].range, range(1, 1, 1, 3));
        assert_eq!(editor.client().accepted(), 2);
    }

    #[test]
    fn follows_page_size() {
        let page = page();
        let _editor = TextWebEditor::new(&page.ctx);
        page.channel.push(json!({"source": "x"}));
        page.host.resize(page.ctx.element, Size::new(1024, 768));
        assert_eq!(page.host.editors()[0].size(), Some(Size::new(1024, 768)));
    }

    #[traced_test]
    #[test]
    fn invalid_payload_keeps_state() {
        let page = page();
        let editor = TextWebEditor::new(&page.ctx);
        page.channel.push(json!({"source": "kept"}));

        page.channel.push(json!({"source": 42}));
        assert_eq!(page.channel.errors().len(), 1);
        assert!(page.channel.errors()[0].starts_with("invalid payload"));
        assert_eq!(editor.client().rejected(), 1);
        assert_eq!(page.host.editors()[0].text(), "kept");
        assert!(logs_contain("snapshot rejected"));
    }

    #[test]
    fn out_of_bounds_decoration_rejected() {
        let page = page();
        let editor = TextWebEditor::new(&page.ctx);
        page.channel.push(json!({
            "source": {"value": "abc", "decorations": [{"range": [0, 99]}]}
        }));
        assert!(page.channel.errors()[0].starts_with("malformed range"));
        assert!(editor.snapshot().is_none());
        assert!(page.host.editors().is_empty());
    }

    #[test]
    fn dispose_unmounts_and_stops_listening() {
        let page = page();
        let editor = TextWebEditor::new(&page.ctx);
        page.channel.push(json!({"source": "x"}));
        editor.dispose().unwrap();
        assert!(page.host.live_editors().is_empty());
        assert_eq!(page.channel.receiver_count(), 0);
        assert!(page.host.children(page.ctx.element).is_empty());
    }
}

// =========================================================================
// 2. Diff editor
// =========================================================================

mod diff_editor {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn computed_diff_without_mappings() {
        let page = page();
        let _editor = DiffWebEditor::new(&page.ctx);
        page.channel
            .push(json!({"original": "a\nb", "modified": "a\nc"}));

        let diff = &page.host.live_diff_editors()[0];
        assert!(!diff.has_provider());
        assert_eq!(diff.original().text(), "a\nb");
        assert_eq!(diff.modified().text(), "a\nc");
        assert!(diff.render_options().hide_unchanged_regions);
        assert_eq!(diff.changes().len(), 1);
    }

    #[test]
    fn mappings_reuse_widget() {
        let page = page();
        let _editor = DiffWebEditor::new(&page.ctx);
        page.channel
            .push(json!({"original": "same", "modified": "same"}));
        page.channel.push(json!({
            "original": "same",
            "modified": "same",
            "mappings": [{"original": [0, 2], "modified": [0, 2]}]
        }));

        assert_eq!(page.host.diff_editors().len(), 1);
        let diff = &page.host.diff_editors()[0];
        assert!(diff.has_provider());
        assert_eq!(diff.changes().len(), 1);
        assert_eq!(diff.changes()[0].inner_changes[0].original, range(1, 1, 1, 3));
    }

    #[test]
    fn hide_flag_change_rebuilds() {
        let page = page();
        let _editor = DiffWebEditor::new(&page.ctx);
        page.channel.push(json!({"original": "a", "modified": "b"}));
        page.channel.push(json!({
            "original": "a", "modified": "b", "hideUnchangedRegions": false
        }));

        let all = page.host.diff_editors();
        assert_eq!(all.len(), 2);
        assert!(all[0].is_disposed());
        assert!(!all[1].render_options().hide_unchanged_regions);
        assert_eq!(page.host.live_diff_editors().len(), 1);
    }

    #[test]
    fn bad_mapping_rejected() {
        let page = page();
        let editor = DiffWebEditor::new(&page.ctx);
        page.channel.push(json!({
            "original": "ab", "modified": "ab",
            "mappings": [{"original": [2, 0], "modified": [0, 1]}]
        }));
        assert_eq!(editor.client().rejected(), 1);
        assert!(page.host.diff_editors().is_empty());
    }
}

// =========================================================================
// 3. AST viewer
// =========================================================================

mod ast_viewer {
    use super::*;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = "let x = 1;\nlet y = 2;";

    fn input() -> Value {
        json!({
            "source": SOURCE,
            "heatMapScoreRange": [0.0, 10.0],
            "root": {
                "label": "program", "codicon": "symbol-file", "range": [0, 21],
                "children": [
                    {"label": "let x", "range": [0, 10], "heatMapScore": 5.0},
                    {
                        "label": "let y", "segment": "[1]", "range": [11, 21],
                        "children": [{"label": "y", "range": [[1, 4], [1, 5]], "isMarked": true}]
                    }
                ]
            }
        })
    }

    fn mounted() -> (Page, AstViewer) {
        let page = page();
        let viewer = AstViewer::new(&page.ctx);
        page.channel.push(input());
        (page, viewer)
    }

    #[test]
    fn mounts_tree_and_source() {
        let (page, viewer) = mounted();
        assert!(viewer.component().is_some());
        let tree = &page.host.trees()[0];
        assert_eq!(tree.row_labels(), vec!["program", "let x", "let y", "y"]);
        assert_eq!(page.host.editors()[0].text(), SOURCE);
    }

    #[test]
    fn cursor_selects_smallest_node() {
        let (page, viewer) = mounted();
        let editor = &page.host.editors()[0];
        let tree = &page.host.trees()[0];

        editor.move_cursor(Position::new(2, 5));

        let y = tree.find_row("y").unwrap();
        assert_eq!(tree.revealed().last(), Some(&Some(y)));
        assert_eq!(
            tree.class_names(y).as_deref(),
            Some("monaco-tl-contents selected")
        );
        let component = viewer.component().unwrap();
        let snapshot = viewer.snapshot().unwrap();
        let expected = snapshot.root.find_smallest_node_at(Position::new(2, 5)).id();
        assert_eq!(component.selected(), Some(expected));
        assert!(
            editor
                .decorations()
                .iter()
                .any(|d| d.options.class_name.as_deref() == Some("selected-node")
                    && d.range == range(2, 5, 2, 6))
        );
    }

    #[test]
    fn moving_on_clears_previous_row_class() {
        let (page, _viewer) = mounted();
        let editor = &page.host.editors()[0];
        let tree = &page.host.trees()[0];

        editor.move_cursor(Position::new(2, 5));
        editor.move_cursor(Position::new(1, 3));

        let (x, y) = (tree.find_row("let x").unwrap(), tree.find_row("y").unwrap());
        assert_eq!(tree.class_names(y).as_deref(), Some("monaco-tl-contents"));
        assert_eq!(
            tree.class_names(x).as_deref(),
            Some("monaco-tl-contents selected")
        );
    }

    #[test]
    fn tree_focus_decorates_and_reveals() {
        let (page, viewer) = mounted();
        let editor = &page.host.editors()[0];
        let tree = &page.host.trees()[0];

        let row = tree.find_row("let y").unwrap();
        tree.user_focus(row);

        assert_eq!(editor.revealed(), vec![range(2, 1, 2, 11)]);
        let selected: Vec<_> = editor
            .decorations()
            .into_iter()
            .filter(|d| d.options.class_name.as_deref() == Some("selected-node"))
            .collect();
        assert_eq!(selected.len(), 1);
        assert!(selected[0].options.should_fill_line_on_line_break);
        let id = viewer.component().unwrap().selected();
        assert!(id.is_some());
        assert_eq!(
            tree.class_names(row).as_deref(),
            Some("monaco-tl-contents selected")
        );
    }

    #[test]
    fn heat_scores_become_decorations() {
        let (page, _viewer) = mounted();
        let editor = &page.host.editors()[0];
        let heat: Vec<_> = editor
            .decorations()
            .into_iter()
            .filter(|d| d.options.class_name.is_some())
            .collect();
        assert_eq!(heat.len(), 1);
        assert_eq!(heat[0].range, range(1, 1, 1, 11));
        let css = page.host.live_style_sheets()[0].css();
        assert!(css.contains("hsl(120, 100%, 50%)"), "{css}");
    }

    #[test]
    fn new_snapshot_rebuilds_tree_only() {
        let (page, _viewer) = mounted();
        page.channel.push(json!({
            "source": "z",
            "root": {"label": "single", "range": [0, 1]}
        }));
        assert_eq!(page.host.trees().len(), 1);
        assert_eq!(page.host.trees()[0].root_sets(), 2);
        assert_eq!(page.host.trees()[0].row_labels(), vec!["single"]);
        assert_eq!(page.host.editors().len(), 1);
        assert_eq!(page.host.editors()[0].text(), "z");
    }

    #[test]
    fn diff_sides_switch_editor_and_keep_sync() {
        let (page, viewer) = mounted();
        let mut next = input();
        next["modified"] = json!("let x = 1;\nlet y = 3;");
        page.channel.push(next);

        assert!(page.host.live_editors().is_empty());
        let diff = &page.host.live_diff_editors()[0];
        assert_eq!(diff.original().text(), SOURCE);

        diff.original().move_cursor(Position::new(1, 2));
        let tree = &page.host.trees()[0];
        let x = tree.find_row("let x").unwrap();
        assert_eq!(tree.revealed().last(), Some(&Some(x)));
        assert!(viewer.component().unwrap().selected().is_some());
    }

    #[test]
    fn mappings_alone_select_diff_against_source() {
        let page = page();
        let viewer = AstViewer::new(&page.ctx);
        page.channel.push(json!({
            "source": "ab\ncd",
            "root": {"label": "root", "range": [0, 2]},
            "mappings": [{"original": [0, 2], "modified": [3, 5]}]
        }));
        assert_eq!(viewer.client().rejected(), 0);

        assert!(page.host.live_editors().is_empty());
        let live = page.host.live_diff_editors();
        assert_eq!(live.len(), 1);
        let diff = &live[0];
        assert_eq!(diff.original().text(), "ab\ncd");
        assert_eq!(diff.modified().text(), "ab\ncd");

        assert!(diff.has_provider());
        let changes = diff.changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].inner_changes[0].original, range(1, 1, 1, 3));
        assert_eq!(changes[0].inner_changes[0].modified, range(2, 1, 2, 3));
    }
}

// =========================================================================
// 4. Selection editor
// =========================================================================

mod selection_editor {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn initial_state_sent_once() {
        let page = page();
        let editor = TextRangeEditor::new(&page.ctx);
        assert_eq!(page.channel.sent(), vec![payload("", TextRange::default())]);
        assert_eq!(
            page.host.text(editor.status_element()).as_deref(),
            Some("Selection: [1:1 -> 1:1)")
        );
    }

    #[test]
    fn host_snapshot_echoes_once_and_reveals() {
        let page = page();
        let editor = TextRangeEditor::new(&page.ctx);
        let selection = range(1, 1, 1, 6);

        page.channel.push(payload("hello world", selection));

        assert_eq!(page.channel.sent_count(), 2);
        assert_eq!(page.channel.last_sent(), Some(payload("hello world", selection)));
        assert_eq!(editor.model().text_model().value(), "hello world");
        let widget = &page.host.editors()[0];
        assert_eq!(widget.revealed(), vec![selection]);
        assert_eq!(widget.decoration_classes(), vec!["selectedRange".to_owned()]);
        assert_eq!(
            page.host.text(editor.status_element()),
            Some(format!("Selection: {selection}"))
        );
    }

    #[test]
    fn selection_without_modifier_stays_local() {
        let page = page();
        let editor = TextRangeEditor::new(&page.ctx);
        page.channel.push(payload("hello world", range(1, 1, 1, 2)));
        let widget = &page.host.editors()[0];

        widget.user_select(range(1, 7, 1, 12));
        assert_eq!(page.channel.sent_count(), 2);
        assert_eq!(editor.model().selection().get(), range(1, 1, 1, 2));
    }

    #[test]
    fn selection_with_modifier_is_sent() {
        let page = page();
        let editor = TextRangeEditor::new(&page.ctx);
        page.channel.push(payload("hello world", range(1, 1, 1, 2)));
        let widget = &page.host.editors()[0];

        widget.press_key(KeyCode::Ctrl);
        widget.user_select(range(1, 7, 1, 12));
        widget.release_key(KeyCode::Ctrl);

        assert_eq!(editor.model().selection().get(), range(1, 7, 1, 12));
        assert_eq!(page.channel.sent_count(), 3);
        assert_eq!(
            page.channel.last_sent(),
            Some(payload("hello world", range(1, 7, 1, 12)))
        );
        assert_eq!(widget.revealed().len(), 1);

        widget.user_select(range(1, 1, 1, 1));
        assert_eq!(page.channel.sent_count(), 3);
    }

    #[test]
    fn click_while_holding_captures_current_selection() {
        let page = page();
        let editor = TextRangeEditor::new(&page.ctx);
        page.channel.push(payload("abc", range(1, 1, 1, 1)));
        let widget = &page.host.editors()[0];

        widget.user_select(range(1, 2, 1, 3));
        widget.press_key(KeyCode::Ctrl);
        widget.click(Some(Position::new(1, 3)));
        assert_eq!(editor.model().selection().get(), range(1, 2, 1, 3));
    }

    #[test]
    fn typing_is_sent() {
        let page = page();
        let _editor = TextRangeEditor::new(&page.ctx);
        page.host.models()[0].type_text("typed");
        assert_eq!(page.channel.sent_count(), 2);
        assert_eq!(page.channel.last_sent().unwrap()["text"], json!("typed"));
    }

    #[test]
    fn empty_selection_decoration() {
        let page = page();
        let _editor = TextRangeEditor::new(&page.ctx);
        page.channel.push(payload("abc", range(1, 2, 1, 2)));
        assert_eq!(
            page.host.editors()[0].decoration_classes(),
            vec!["selectedRange empty".to_owned()]
        );
    }

    #[test]
    fn out_of_bounds_range_rejected() {
        let page = page();
        let editor = TextRangeEditor::new(&page.ctx);
        page.channel.push(payload("ab", range(1, 1, 1, 9)));
        assert_eq!(page.channel.errors().len(), 1);
        assert_eq!(page.channel.sent_count(), 1);
        assert_eq!(editor.model().text().get(), "");
    }

    #[test]
    fn configured_modifier_and_reveal() {
        let config = HostConfig {
            selection_modifier: ModifierKey::Alt,
            reveal_external_selection: false,
            ..HostConfig::default()
        };
        let page = page_with(config);
        let editor = TextRangeEditor::new(&page.ctx);
        assert!(
            page.host
                .text_content(page.ctx.element)
                .contains("Hold alt and select text to change")
        );

        page.channel.push(payload("hello", range(1, 1, 1, 3)));
        let widget = &page.host.editors()[0];
        assert!(widget.revealed().is_empty());

        widget.press_key(KeyCode::Ctrl);
        widget.user_select(range(1, 2, 1, 4));
        assert_eq!(editor.model().selection().get(), range(1, 1, 1, 3));

        widget.press_key(KeyCode::Alt);
        widget.user_select(range(1, 2, 1, 4));
        assert_eq!(editor.model().selection().get(), range(1, 2, 1, 4));
    }

    #[test]
    fn dispose_stops_traffic() {
        let page = page();
        let editor = TextRangeEditor::new(&page.ctx);
        editor.dispose().unwrap();
        page.channel.push(payload("late", range(1, 1, 1, 1)));
        assert_eq!(page.channel.sent_count(), 1);
        assert!(page.channel.errors().is_empty());
        assert!(page.host.editors()[0].is_disposed());
    }
}

// =========================================================================
// 5. App
// =========================================================================

mod app {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mounts_requested_editor() {
        for kind in EditorKind::ALL {
            let page = page();
            let app = App::mount(&page.ctx, &format!("?editor={kind}"));
            assert_eq!(app.kind(), Some(kind));
            assert_eq!(page.channel.receiver_count(), 1);
            app.dispose().unwrap();
            assert_eq!(page.channel.receiver_count(), 0);
        }
    }

    #[test]
    fn other_parameters_ignored() {
        let page = page();
        let app = App::mount(&page.ctx, "?theme=dark&editor=diff");
        assert_eq!(app.kind(), Some(EditorKind::Diff));
    }

    #[traced_test]
    #[test]
    fn unknown_editor_renders_help() {
        let page = page();
        let app = App::mount(&page.ctx, "?editor=hex");
        assert_eq!(app.kind(), None);
        assert_eq!(page.channel.receiver_count(), 0);

        let text = page.host.text_content(page.ctx.element);
        assert!(text.starts_with("Unknown editor type. Supported types are:"));
        for kind in EditorKind::ALL {
            assert!(text.contains(&format!("?editor={kind}")));
        }
        assert_eq!(page.host.children(page.ctx.element).len(), 5);
        assert!(logs_contain("rendering help"));
    }

    #[test]
    fn help_entries_are_links() {
        let config = HostConfig {
            query_param: "view".to_owned(),
            ..HostConfig::default()
        };
        let page = page_with(config);
        let _app = App::mount(&page.ctx, "?view=hex");

        let children = page.host.children(page.ctx.element);
        assert_eq!(page.host.href(children[0]), None);
        let hrefs: Vec<_> = children[1..]
            .iter()
            .map(|&link| page.host.href(link))
            .collect();
        assert_eq!(
            hrefs,
            EditorKind::ALL
                .iter()
                .map(|kind| Some(format!("?view={kind}")))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn missing_parameter_renders_help() {
        let page = page();
        let app = App::mount(&page.ctx, "");
        assert_eq!(app.kind(), None);
        assert!(
            page.host
                .text_content(page.ctx.element)
                .contains("?editor=ast-viewer")
        );
    }

    #[test]
    fn custom_query_parameter() {
        let config = HostConfig {
            query_param: "view".to_owned(),
            ..HostConfig::default()
        };
        let page = page_with(config);
        let app = App::mount(&page.ctx, "?view=selection-editor");
        assert_eq!(app.kind(), Some(EditorKind::SelectionEditor));
        assert_eq!(page.channel.sent_count(), 1);
    }
}
