//! # Shared Constants
//!
//! Defaults shared by the library, the server and the CLI.

/// The SQL function that answers catalog questions.
pub const DEFAULT_CATALOG_FUNCTION: &str = "ASK_TABLEAU_CATALOG";

/// The database the catalog function is deployed in.
pub const DEFAULT_DATABASE: &str = "TABLEAU_CATALOG";

/// The schema the catalog function is deployed in.
pub const DEFAULT_SCHEMA: &str = "MAIN";

/// Server-side statement timeout sent with every Snowflake request.
pub const DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 60;

/// Delay between status polls for statements still running.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Shown by views while a question is being answered.
pub const PENDING_MESSAGE: &str = "Searching catalog...";

/// Statement used to check a connection at session start.
pub const CONNECTION_CHECK_SQL: &str = "SELECT 1";
