use super::{handlers, state::AppState};
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/chrome", get(handlers::chrome_handler))
        .route("/sessions", post(handlers::create_session_handler))
        .route(
            "/sessions/{session_id}",
            delete(handlers::delete_session_handler),
        )
        .route(
            "/sessions/{session_id}/messages",
            get(handlers::get_messages_handler).post(handlers::post_message_handler),
        )
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}
