//! # Interactive Session
//!
//! Reads questions from stdin until `/quit` or end of input.

use crate::terminal::TerminalView;
use anyhow::Result;
use catalog_chat::{ChatSession, PageChrome};
use std::io;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

pub async fn run(mut session: ChatSession, chrome: &PageChrome) -> Result<()> {
    let session_id = session.id();
    let mut view = TerminalView::new(io::stdout());
    view.banner(chrome);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        view.prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "/quit" | "/exit" => break,
            "/history" => {
                session.render_history(&mut view);
                continue;
            }
            _ => {}
        }

        // Failures were already shown by the view; the session stays usable.
        if let Err(e) = session.handle_user_input(&line, &mut view).await {
            warn!(session_id = %session_id, "Turn failed: {e}");
        }
    }

    let transcript = session.end();
    info!(turns = transcript.len(), "Interactive session closed.");
    view.write(&format!("\nGoodbye ({} turns).", transcript.len()));
    Ok(())
}
