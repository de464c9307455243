#![forbid(unsafe_code)]

//! Whole-page flows through the facade.

use std::rc::Rc;

use pretty_assertions::assert_eq;
use serde_json::json;
use vizhost::prelude::*;
use vizhost::{ElementHandle, Recovery};
use vizhost_harness::{FakeHost, RecordingChannel};

fn parts() -> (Rc<FakeHost>, Rc<RecordingChannel>, Rc<dyn EditorHost>, ElementHandle) {
    let fake = FakeHost::new();
    let host: Rc<dyn EditorHost> = fake.clone();
    let element = host.create_element();
    (fake, Rc::new(RecordingChannel::new()), host, element)
}

#[test]
fn toml_configured_page_mounts_diff() {
    let config = HostConfig::from_toml_str(
        r#"
        query_param = "mode"
        hide_unchanged_regions = false
        "#,
    )
    .unwrap();
    let (fake, channel, host, element) = parts();
    let app = vizhost::mount(host, channel.clone(), element, config, "?mode=diff").unwrap();
    assert_eq!(app.kind(), Some(EditorKind::Diff));

    channel.push(json!({"original": "a", "modified": "b"}));
    let diff = &fake.live_diff_editors()[0];
    assert!(!vizhost::widgets::RenderOptionsSource::render_options(&**diff).hide_unchanged_regions);
    app.dispose().unwrap();
    assert!(fake.live_diff_editors().is_empty());
}

#[test]
fn invalid_config_aborts_before_render() {
    let config = HostConfig {
        decoration_opacity: 3.0,
        ..HostConfig::default()
    };
    let (fake, channel, host, element) = parts();
    let err = vizhost::mount(host, channel.clone(), element, config, "?editor=text").unwrap_err();
    assert_eq!(err.error_type(), "config");
    assert_eq!(err.recovery(), Recovery::Abort);
    assert!(fake.children(element).is_empty());
    assert_eq!(channel.receiver_count(), 0);
}

#[test]
fn rejected_snapshot_maps_to_keep_previous() {
    let (_fake, channel, host, element) = parts();
    let _app = vizhost::mount(host, channel.clone(), element, HostConfig::default(), "?editor=text")
        .unwrap();
    channel.push(json!({"source": "ok"}));
    channel.push(json!({"nope": true}));
    assert_eq!(channel.errors().len(), 1);

    let err = vizhost::Error::from(vizhost::ValidationError::new(channel.errors()[0].clone()));
    assert_eq!(err.recovery(), Recovery::KeepPrevious);
}
