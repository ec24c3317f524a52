use crate::markdown::render_markdown;
use catalog_chat::{Role, Turn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Deserialize, Default)]
pub struct DebugParams {
    pub debug: Option<bool>,
}

#[derive(Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<Value>,
    pub result: T,
}

// --- Session API Payloads ---

#[derive(Serialize, Deserialize, Debug)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
}

/// A turn as sent to clients. Assistant answers also carry their Markdown
/// rendered to sanitized HTML.
#[derive(Serialize, Deserialize, Debug)]
pub struct RenderedTurn {
    #[serde(flatten)]
    pub turn: Turn,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl From<Turn> for RenderedTurn {
    fn from(turn: Turn) -> Self {
        let html = match turn.role() {
            Role::Assistant => Some(render_markdown(turn.content())),
            Role::User => None,
        };
        Self { turn, html }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MessagesResponse {
    pub messages: Vec<RenderedTurn>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PostMessageRequest {
    pub content: String,
}

/// The turns added by one submission: `[user, assistant]`, or empty for blank input.
#[derive(Serialize, Deserialize, Debug)]
pub struct PostMessageResponse {
    pub turns: Vec<RenderedTurn>,
}
