use thiserror::Error;

/// Custom error types for the chat controller and its query executors.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Query executor is not available: {0}")]
    ConnectionUnavailable(String),
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to the warehouse: {0}")]
    ExecutorRequest(reqwest::Error),
    #[error("Failed to deserialize warehouse response: {0}")]
    ExecutorDeserialization(reqwest::Error),
    #[error("Warehouse returned an error (HTTP {status}, code {code}): {message}")]
    WarehouseApi {
        status: u16,
        code: String,
        message: String,
    },
    #[error("Statement did not complete within {0} seconds")]
    StatementTimeout(u64),
    #[error("Query returned no rows")]
    EmptyResult,
    #[error("Query returned a null answer")]
    NullAnswer,
    #[error("Executor '{0}' does not support bound parameters")]
    BindingsUnsupported(String),
    #[error("Invalid catalog function name: {0}")]
    InvalidFunctionName(String),
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl ChatError {
    /// Returns `true` for errors that leave the session without a usable handle.
    ///
    /// Everything else is a failure of a single turn; the session stays usable.
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            ChatError::ConnectionUnavailable(_) | ChatError::ReqwestClientBuild(_)
        )
    }
}
