//! # Terminal View
//!
//! Renders a chat session as role-tagged lines on any `Write` sink.

use catalog_chat::{ChatError, ChatView, PageChrome, Turn};
use std::io::Write;
use tracing::warn;

pub struct TerminalView<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Prints the heading, caption and example questions.
    pub fn banner(&mut self, chrome: &PageChrome) {
        self.write(&format!("{}\n{}\n", chrome.heading(), chrome.caption));
        self.write("Example questions:");
        for question in &chrome.example_questions {
            self.write(&format!("  - {question}"));
        }
        self.write("Type /history to replay the conversation, /quit to leave.\n");
    }

    pub fn prompt(&mut self) {
        if let Err(e) = write!(self.out, "> ").and_then(|_| self.out.flush()) {
            warn!("Failed to write prompt: {e}");
        }
    }

    pub fn write(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{text}") {
            warn!("Failed to write to terminal: {e}");
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> ChatView for TerminalView<W> {
    fn render_turn(&mut self, turn: &Turn) {
        self.write(&format!("[{}] {}", turn.role(), turn.content()));
    }

    fn show_pending(&mut self, message: &str) {
        self.write(&format!("... {message}"));
    }

    fn show_error(&mut self, error: &ChatError) {
        self.write(&format!("[error] {error}"));
    }
}
