use catalog_chat::ChatError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

/// A custom error type for the server application.
///
/// This enum encapsulates different kinds of errors that can occur within the server,
/// allowing them to be converted into appropriate HTTP responses.
pub enum AppError {
    /// Errors originating from `catalog-chat`.
    Chat(ChatError),
    /// The requested session does not exist or has ended.
    SessionNotFound(Uuid),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

/// Conversion from `ChatError` to `AppError`.
impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        AppError::Chat(err)
    }
}

/// Conversion from `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::Chat(err) => {
                // Log the original error for debugging purposes
                error!("ChatError: {:?}", err);
                match err {
                    ChatError::ConnectionUnavailable(e) => (
                        StatusCode::SERVICE_UNAVAILABLE,
                        format!("Warehouse connection unavailable: {e}"),
                    ),
                    ChatError::ReqwestClientBuild(e) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Failed to build HTTP client: {e}"),
                    ),
                    ChatError::BindingsUnsupported(_) | ChatError::InvalidFunctionName(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Server is not configured correctly.".to_string(),
                    ),
                    ChatError::StatementTimeout(secs) => (
                        StatusCode::GATEWAY_TIMEOUT,
                        format!("Catalog query did not finish within {secs} seconds."),
                    ),
                    ChatError::ExecutorRequest(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Request to warehouse failed: {e}"),
                    ),
                    ChatError::ExecutorDeserialization(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Failed to deserialize warehouse response: {e}"),
                    ),
                    ChatError::WarehouseApi { message, .. } => (
                        StatusCode::BAD_GATEWAY,
                        format!("Catalog query failed: {message}"),
                    ),
                    ChatError::EmptyResult | ChatError::NullAnswer => (
                        StatusCode::BAD_GATEWAY,
                        "Catalog query returned no answer.".to_string(),
                    ),
                    ChatError::Regex(e) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Internal regex error: {e}"),
                    ),
                }
            }
            AppError::SessionNotFound(id) => (
                StatusCode::NOT_FOUND,
                format!("Session '{id}' not found."),
            ),
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}
