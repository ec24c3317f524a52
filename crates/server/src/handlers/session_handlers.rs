//! # Session Route Handlers
//!
//! Handlers for creating sessions, reading their transcripts, submitting
//! questions, and ending sessions.

use super::{wrap_response, ApiResponse, AppError, AppState, DebugParams};
use crate::types::{
    CreateSessionResponse, MessagesResponse, PostMessageRequest, PostMessageResponse,
    RenderedTurn,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use catalog_chat::CollectingView;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

/// Starts a new chat session with an empty transcript.
pub async fn create_session_handler(
    State(app_state): State<AppState>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), AppError> {
    let session = app_state.new_session()?;
    let session_id = app_state.sessions.insert(session).await;
    info!(%session_id, "Created chat session.");
    Ok((StatusCode::CREATED, Json(CreateSessionResponse { session_id })))
}

/// Returns the session's transcript in insertion order.
pub async fn get_messages_handler(
    State(app_state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<MessagesResponse>, AppError> {
    let session = app_state
        .sessions
        .get(&session_id)
        .await
        .ok_or(AppError::SessionNotFound(session_id))?;

    let mut view = CollectingView::new();
    session.lock().await.render_history(&mut view);

    Ok(Json(MessagesResponse {
        messages: view.into_turns().into_iter().map(RenderedTurn::from).collect(),
    }))
}

/// Submits one question to the session.
///
/// On success the response carries the user turn and the assistant turn. A
/// collaborator failure is returned as an error; the user turn stays in the
/// transcript without an answer.
pub async fn post_message_handler(
    State(app_state): State<AppState>,
    Path(session_id): Path<Uuid>,
    debug_params: Query<DebugParams>,
    Json(payload): Json<PostMessageRequest>,
) -> Result<Json<ApiResponse<PostMessageResponse>>, AppError> {
    let session = app_state
        .sessions
        .get(&session_id)
        .await
        .ok_or(AppError::SessionNotFound(session_id))?;

    // Held for the whole turn so a session never has two requests in flight.
    let mut session = session.lock().await;
    info!(%session_id, "Received question for chat session.");

    let mut view = CollectingView::new();
    session
        .handle_user_input(&payload.content, &mut view)
        .await?;

    let turns = view.into_turns();
    let debug_info = if turns.is_empty() {
        None
    } else {
        session.last_query().map(|query| {
            json!({
                "sql": query.sql,
                "bound": query.is_bound(),
            })
        })
    };

    let turns = turns.into_iter().map(RenderedTurn::from).collect();
    Ok(wrap_response(
        PostMessageResponse { turns },
        debug_params,
        debug_info,
    ))
}

/// Ends a session and drops its transcript.
pub async fn delete_session_handler(
    State(app_state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let session = app_state
        .sessions
        .remove(&session_id)
        .await
        .ok_or(AppError::SessionNotFound(session_id))?;

    // Wait for any in-flight turn before reporting the session as gone.
    let turns = session.lock().await.transcript().len();
    info!(%session_id, turns, "Ended chat session.");
    Ok(StatusCode::NO_CONTENT)
}
