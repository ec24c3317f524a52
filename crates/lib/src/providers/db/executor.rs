use crate::{constants::CONNECTION_CHECK_SQL, errors::ChatError, types::ResultSet};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for submitting SQL to the warehouse that hosts the catalog function.
///
/// Implementations hold a pre-authenticated handle. Failures are returned
/// unchanged; callers do not retry.
#[async_trait]
pub trait QueryExecutor: Send + Sync + DynClone + Debug {
    /// Returns the name of the executor (e.g., "Snowflake").
    fn name(&self) -> &str;

    /// Executes a SQL statement and returns its rows.
    async fn execute(&self, sql: &str) -> Result<ResultSet, ChatError>;

    /// Whether `execute_bound` is supported.
    fn supports_bindings(&self) -> bool {
        false
    }

    /// Executes a statement with positional `?` parameters bound to `params`.
    async fn execute_bound(&self, sql: &str, params: &[String]) -> Result<ResultSet, ChatError> {
        let _ = (sql, params);
        Err(ChatError::BindingsUnsupported(self.name().to_string()))
    }

    /// Checks that the handle can run a trivial statement.
    async fn check_connection(&self) -> Result<(), ChatError> {
        self.execute(CONNECTION_CHECK_SQL)
            .await
            .map(|_| ())
            .map_err(|e| ChatError::ConnectionUnavailable(e.to_string()))
    }
}

dyn_clone::clone_trait_object!(QueryExecutor);
