//! Bidirectional sync controllers.
//!
//! Every controller follows the same lifecycle: it waits for the first
//! valid snapshot, commits each snapshot into observable state inside one
//! transaction, and mounts its view exactly once. Later snapshots reach
//! the view through the view's own autoruns; there is no separate update
//! path.

use std::rc::Rc;

use vizhost_widgets::{EditorHost, ElementHandle};

use crate::client::HostChannel;
use crate::config::HostConfig;

pub mod ast_viewer;
pub mod text_range_editor;
pub mod web_editor;

/// Everything a controller is mounted with.
#[derive(Clone)]
pub struct ControllerContext {
    pub host: Rc<dyn EditorHost>,
    pub channel: Rc<dyn HostChannel>,
    /// Page element the controller renders into.
    pub element: ElementHandle,
    pub config: Rc<HostConfig>,
}

impl ControllerContext {
    #[must_use]
    pub fn new(
        host: Rc<dyn EditorHost>,
        channel: Rc<dyn HostChannel>,
        element: ElementHandle,
        config: HostConfig,
    ) -> Self {
        Self {
            host,
            channel,
            element,
            config: Rc::new(config),
        }
    }
}

impl std::fmt::Debug for ControllerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerContext")
            .field("element", &self.element)
            .field("config", &self.config)
            .finish()
    }
}
