//! The channel to the host process and the client that validates what
//! comes through it.
//!
//! # Invariants
//!
//! 1. Content that fails validation or normalization never reaches the
//!    commit callback; the host gets the formatted error instead.
//! 2. After [`WebEditorClient::dispose`] no inbound content is handled and
//!    every outbound update fails with [`ControllerError::Disposed`].

use std::cell::Cell;
use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use vizhost_runtime::{Disposable, DisposeResult, Listener};

use crate::error::ControllerError;
use crate::validate::Validator;

/// Messaging capability provided by the embedding page.
pub trait HostChannel {
    /// Register `handler` for content pushed by the host. The handler
    /// stays registered while the returned guard is alive.
    fn on_did_receive(&self, handler: Box<dyn Fn(&Value)>) -> Listener;
    /// Push content to the host.
    fn send(&self, content: Value);
    /// Tell the host its last content was rejected.
    fn report_error(&self, message: &str);
}

#[derive(Debug, Default)]
struct Counters {
    accepted: Cell<u64>,
    rejected: Cell<u64>,
    sent: Cell<u64>,
}

/// Validating client on top of a [`HostChannel`].
pub struct WebEditorClient {
    channel: Rc<dyn HostChannel>,
    listener: Listener,
    disposed: Rc<Cell<bool>>,
    counters: Rc<Counters>,
}

impl WebEditorClient {
    /// Validate every inbound message with `validator` and hand the result
    /// to `commit`. A commit error counts as a rejection.
    pub fn new<V>(
        channel: Rc<dyn HostChannel>,
        validator: V,
        commit: impl Fn(V::Output) -> Result<(), ControllerError> + 'static,
    ) -> Self
    where
        V: Validator + 'static,
    {
        let disposed = Rc::new(Cell::new(false));
        let counters = Rc::new(Counters::default());
        let (reply, gate, stats) = (
            Rc::clone(&channel),
            Rc::clone(&disposed),
            Rc::clone(&counters),
        );
        let listener = channel.on_did_receive(Box::new(move |content| {
            if gate.get() {
                return;
            }
            let outcome = validator
                .validate(content)
                .map_err(ControllerError::from)
                .and_then(&commit);
            match outcome {
                Ok(()) => {
                    stats.accepted.set(stats.accepted.get() + 1);
                    debug!(target: "vizhost.client", "snapshot committed");
                }
                Err(err) => {
                    stats.rejected.set(stats.rejected.get() + 1);
                    warn!(target: "vizhost.client", error = %err, "snapshot rejected");
                    reply.report_error(&err.to_string());
                }
            }
        }));
        Self {
            channel,
            listener,
            disposed,
            counters,
        }
    }

    /// Push `content` to the host.
    pub fn update_content(&self, content: &impl Serialize) -> Result<(), ControllerError> {
        if self.disposed.get() {
            return Err(ControllerError::Disposed);
        }
        let value = serde_json::to_value(content).map_err(ControllerError::Serialization)?;
        self.counters.sent.set(self.counters.sent.get() + 1);
        self.channel.send(value);
        Ok(())
    }

    /// Inbound snapshots committed so far.
    #[must_use]
    pub fn accepted(&self) -> u64 {
        self.counters.accepted.get()
    }

    /// Inbound snapshots rejected so far.
    #[must_use]
    pub fn rejected(&self) -> u64 {
        self.counters.rejected.get()
    }

    /// Outbound updates sent so far.
    #[must_use]
    pub fn sent(&self) -> u64 {
        self.counters.sent.get()
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }
}

impl Disposable for WebEditorClient {
    fn dispose(&self) -> DisposeResult {
        self.disposed.set(true);
        self.listener.dispose()
    }
}

impl std::fmt::Debug for WebEditorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebEditorClient")
            .field("accepted", &self.accepted())
            .field("rejected", &self.rejected())
            .field("sent", &self.sent())
            .field("disposed", &self.disposed.get())
            .finish()
    }
}
