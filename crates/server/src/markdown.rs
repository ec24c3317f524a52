//! # Answer Markdown
//!
//! Catalog answers are Markdown. They are rendered to HTML here and sanitized
//! before the page inserts them, so answer text can never inject script.

use pulldown_cmark::{html, Options, Parser};

/// Renders Markdown to sanitized HTML.
pub fn render_markdown(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut unsafe_html = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut unsafe_html, Parser::new_ext(text, options));
    ammonia::clean(&unsafe_html)
}
