#![forbid(unsafe_code)]

//! Test harness for vizhost.
//!
//! [`FakeHost`] implements every host capability in memory: elements,
//! element sizes, text models, code editors, diff editors, trees and style
//! sheets. Each fake records what was done to it and offers methods that
//! play the user's part (moving the cursor, pressing keys, focusing tree
//! rows). [`RecordingChannel`] stands in for the host process.

pub mod channel;
pub mod diff;
pub mod editor;
pub mod host;
pub mod tree;

pub use channel::RecordingChannel;
pub use diff::{FakeDiffEditor, naive_line_diff};
pub use editor::{FakeCodeEditor, FakeDecorations, FakeStyleSheet, FakeTextModel};
pub use host::FakeHost;
pub use tree::FakeTree;
