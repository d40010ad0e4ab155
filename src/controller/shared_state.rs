use crate::client::{SearchClient, Target};
use crate::controller::command_types::Mode;
use crate::document_model::{DocumentTree, NodeId};
use crate::error::Error;
use crate::search::SearchEngine;
use crate::view::layout::DEFAULT_WIDTH;
use crate::view::{TerminalLayout, View};
use crossterm::event::KeyEvent;

/// Shared state that all mode controllers need access to
pub struct SharedViewerState {
    pub engine: SearchEngine<TerminalLayout>,
    pub client: SearchClient,
    pub target: Target,
    pub view: View,
    pub status_message: String,
    pub is_error: bool,
    /// Text columns and document rows currently on screen
    pub viewport: (usize, usize),
}

impl SharedViewerState {
    pub fn new(tree: DocumentTree, target: Target, client: SearchClient) -> Self {
        let viewport = (DEFAULT_WIDTH, 24);
        Self {
            engine: SearchEngine::new(tree, TerminalLayout::new(viewport.0)),
            client,
            target,
            view: View::new(),
            status_message: String::new(),
            is_error: false,
            viewport,
        }
    }

    /// Re-wrap the document when the terminal size changes.
    pub fn set_viewport(&mut self, width: usize, rows: usize) {
        if self.viewport == (width, rows) {
            return;
        }
        let rewrap = self.viewport.0 != width;
        self.viewport = (width, rows);
        if rewrap {
            self.engine.geometry_mut().set_width(width);
            self.engine.refresh_geometry();
        }
        if let Some(marker) = self
            .engine
            .session()
            .current_index()
            .and_then(|i| self.engine.session().marker_for(i))
        {
            self.scroll_to_marker(marker);
        }
        self.view.force_redraw();
    }

    pub fn content_rows(&self) -> usize {
        self.engine.geometry().rows().len()
    }

    pub fn scroll_to_marker(&mut self, marker: NodeId) {
        if let Some((top, span)) = self.engine.geometry().marker_span(marker) {
            let content_rows = self.content_rows();
            self.view
                .scroll_to_center(top, span, content_rows, self.viewport.1);
        }
    }

    /// Honour the engine's pending scroll request, if any.
    pub fn sync_scroll(&mut self) {
        if let Some(request) = self.engine.take_scroll_request() {
            self.scroll_to_marker(request.marker);
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.is_error = false;
    }

    pub fn set_error(&mut self, error: &Error) {
        log::debug!("{} error: {error}", error.kind());
        self.status_message = error.to_string();
        self.is_error = true;
    }

    /// Any key press dismisses the previous message.
    pub fn dismiss_message(&mut self) {
        if self.is_error {
            self.client.dismiss_error();
        }
        self.status_message.clear();
        self.is_error = false;
    }
}

/// Result of handling a key event in a mode controller
#[derive(Debug, PartialEq)]
pub enum ModeTransition {
    Stay,
    ToMode(Mode),
    Quit,
}

/// Trait that all mode controllers must implement
pub trait ModeController {
    fn handle_key(&mut self, key_event: KeyEvent, shared: &mut SharedViewerState) -> ModeTransition;
}
