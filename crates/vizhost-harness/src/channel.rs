//! Recording stand-in for the host process.

use std::cell::RefCell;

use serde_json::Value;
use tracing::trace;
use vizhost_runtime::{Emitter, Listener};
use vizhost_web::HostChannel;

/// Delivers content with [`RecordingChannel::push`] and records everything
/// the client sends back.
#[derive(Debug, Default)]
pub struct RecordingChannel {
    incoming: Emitter<Value>,
    sent: RefCell<Vec<Value>>,
    errors: RefCell<Vec<String>>,
}

impl RecordingChannel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `content` as the host would.
    pub fn push(&self, content: Value) {
        trace!(target: "vizhost.harness", "host push");
        self.incoming.fire(&content);
    }

    #[must_use]
    pub fn sent(&self) -> Vec<Value> {
        self.sent.borrow().clone()
    }

    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.sent.borrow().len()
    }

    #[must_use]
    pub fn last_sent(&self) -> Option<Value> {
        self.sent.borrow().last().cloned()
    }

    /// Drain recorded outbound messages.
    pub fn take_sent(&self) -> Vec<Value> {
        std::mem::take(&mut *self.sent.borrow_mut())
    }

    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.errors.borrow().clone()
    }

    /// Handlers currently registered.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.incoming.listener_count()
    }
}

impl HostChannel for RecordingChannel {
    fn on_did_receive(&self, handler: Box<dyn Fn(&Value)>) -> Listener {
        self.incoming.subscribe(move |content| handler(content))
    }

    fn send(&self, content: Value) {
        self.sent.borrow_mut().push(content);
    }

    fn report_error(&self, message: &str) {
        self.errors.borrow_mut().push(message.to_owned());
    }
}
