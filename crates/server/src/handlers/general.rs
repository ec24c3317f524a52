//! # General Route Handlers
//!
//! The chat page, the health check, and the page chrome as JSON.

use super::{AppError, AppState};
use crate::page::render_page;
use axum::{extract::State, response::Html, Json};
use catalog_chat::PageChrome;

/// The handler for the root (`/`) endpoint, which serves the chat page.
pub async fn root(State(app_state): State<AppState>) -> Result<Html<String>, AppError> {
    let page = render_page(&app_state.config.page)
        .map_err(|e| AppError::Internal(anyhow::Error::from(e)))?;
    Ok(Html(page))
}

/// The handler for the health check (`/health`) endpoint.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Returns the static page text so other front-ends can reuse it.
pub async fn chrome_handler(State(app_state): State<AppState>) -> Json<PageChrome> {
    Json(app_state.config.page.clone())
}
