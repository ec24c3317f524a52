//! # Rendering Surface
//!
//! The controller never prints anything itself. It hands turns, the pending
//! indicator and turn failures to a [`ChatView`], which can be a terminal, an
//! HTTP response collector, or a recorder in tests.

use crate::{errors::ChatError, types::Turn};

/// Views are `Send` so a turn can be awaited on a multi-threaded runtime.
pub trait ChatView: Send {
    /// Displays one role-tagged turn.
    fn render_turn(&mut self, turn: &Turn);

    /// Called after the user turn is shown and before the backend call starts.
    fn show_pending(&mut self, _message: &str) {}

    /// Called when a turn fails. The error is still returned to the caller.
    fn show_error(&mut self, _error: &ChatError) {}
}

/// A view that keeps the turns it was asked to render.
#[derive(Debug, Default, Clone)]
pub struct CollectingView {
    pub turns: Vec<Turn>,
}

impl CollectingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_turns(self) -> Vec<Turn> {
        self.turns
    }
}

impl ChatView for CollectingView {
    fn render_turn(&mut self, turn: &Turn) {
        self.turns.push(turn.clone());
    }
}
