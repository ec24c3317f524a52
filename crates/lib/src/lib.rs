//! # Catalog Chat
//!
//! This crate provides a chat session controller that forwards each user question
//! to a catalog SQL function hosted in a data warehouse (`ASK_TABLEAU_CATALOG` by
//! default) and records the returned answer in an append-only transcript.
//!
//! All semantic search happens inside the SQL function. This crate only builds the
//! statement, submits it through a [`QueryExecutor`], and renders turns through a
//! [`ChatView`].

pub mod chrome;
pub mod constants;
pub mod errors;
pub mod providers;
pub mod query;
pub mod session;
pub mod transcript;
pub mod types;
pub mod view;

pub use chrome::PageChrome;
pub use errors::ChatError;
pub use providers::db::{QueryExecutor, SnowflakeConfig, SnowflakeExecutor, TokenType};
pub use query::{escape_single_quotes, CatalogQuery, PreparedQuery, QueryMode};
pub use session::{ChatSession, ChatSessionBuilder, SessionState};
pub use transcript::Transcript;
pub use types::{Column, ResultSet, Role, Turn};
pub use view::{ChatView, CollectingView};
