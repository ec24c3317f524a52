//! # API Route Handlers
//!
//! This module organizes all the Axum route handlers for the `catalog-chat-server`.
//! `general` serves the page and service endpoints; `session_handlers` drives
//! the per-session chat.

pub mod general;
pub mod session_handlers;

// Re-export all handlers so the router can reach them under a single `handlers::` path.
pub use general::*;
pub use session_handlers::*;

// Shared items used by multiple handler modules.
use super::{
    errors::AppError,
    state::AppState,
    types::{ApiResponse, DebugParams},
};
use axum::{extract::Query, Json};
use serde_json::Value;

/// A shared helper function to wrap a successful result in the standard `ApiResponse`
/// format, optionally including debug information if requested.
pub(crate) fn wrap_response<T>(
    result: T,
    debug_params: Query<DebugParams>,
    debug_info: Option<Value>,
) -> Json<ApiResponse<T>> {
    let debug = if debug_params.debug.unwrap_or(false) {
        debug_info
    } else {
        None
    };
    Json(ApiResponse { debug, result })
}
