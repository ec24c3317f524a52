//! # Chat Session Controller
//!
//! A `ChatSession` owns the transcript of one interactive session and the
//! executor handle acquired when the session started. It processes one user
//! turn at a time: `handle_user_input` takes `&mut self`, so a second turn
//! cannot start while a request is in flight.

use crate::{
    constants::PENDING_MESSAGE,
    errors::ChatError,
    providers::db::executor::QueryExecutor,
    query::{CatalogQuery, PreparedQuery, QueryMode},
    transcript::Transcript,
    types::{ResultSet, Turn},
    view::ChatView,
};
use std::fmt;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Where the controller is in its request/response cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingInput,
    RequestInFlight,
}

pub struct ChatSession {
    id: Uuid,
    transcript: Transcript,
    executor: Box<dyn QueryExecutor>,
    query: CatalogQuery,
    mode: QueryMode,
    state: SessionState,
    last_query: Option<PreparedQuery>,
}

impl fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatSession")
            .field("id", &self.id)
            .field("turns", &self.transcript.len())
            .field("executor", &self.executor.name())
            .field("function", &self.query.function())
            .field("mode", &self.mode)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// A builder for creating `ChatSession` instances.
#[derive(Default)]
pub struct ChatSessionBuilder {
    id: Option<Uuid>,
    executor: Option<Box<dyn QueryExecutor>>,
    query: CatalogQuery,
    mode: QueryMode,
}

impl ChatSessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the session id. A random v4 id is used otherwise.
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the executor handle the session will own.
    pub fn executor(mut self, executor: Box<dyn QueryExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn query(mut self, query: CatalogQuery) -> Self {
        self.query = query;
        self
    }

    pub fn mode(mut self, mode: QueryMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builds the session without contacting the warehouse.
    ///
    /// Fails with `ConnectionUnavailable` if no executor was supplied, or if
    /// bound mode was requested from an executor that cannot bind parameters.
    pub fn build(self) -> Result<ChatSession, ChatError> {
        let executor = self.executor.ok_or_else(|| {
            ChatError::ConnectionUnavailable("no query executor was provided".to_string())
        })?;
        if self.mode == QueryMode::Bound && !executor.supports_bindings() {
            return Err(ChatError::BindingsUnsupported(executor.name().to_string()));
        }

        let id = self.id.unwrap_or_else(Uuid::new_v4);
        info!(session_id = %id, executor = executor.name(), mode = %self.mode, "Chat session started.");
        Ok(ChatSession {
            id,
            transcript: Transcript::new(),
            executor,
            query: self.query,
            mode: self.mode,
            state: SessionState::AwaitingInput,
            last_query: None,
        })
    }

    /// Builds the session and checks the executor with a trivial statement.
    pub async fn connect(self) -> Result<ChatSession, ChatError> {
        let session = self.build()?;
        session.executor.check_connection().await?;
        Ok(session)
    }
}

impl ChatSession {
    pub fn builder() -> ChatSessionBuilder {
        ChatSessionBuilder::new()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn mode(&self) -> QueryMode {
        self.mode
    }

    /// The statement submitted for the most recent turn, if any.
    pub fn last_query(&self) -> Option<&PreparedQuery> {
        self.last_query.as_ref()
    }

    /// Renders every turn in insertion order. An empty transcript renders nothing.
    pub fn render_history(&self, view: &mut dyn ChatView) {
        for turn in &self.transcript {
            view.render_turn(turn);
        }
    }

    /// Processes one user submission.
    ///
    /// Blank input is ignored and yields `Ok(None)`. Otherwise the user turn is
    /// appended and rendered before the executor is called; the assistant turn
    /// is appended only when the call succeeds. On failure the error is
    /// returned, the user turn stays unanswered, and the session remains usable.
    pub async fn handle_user_input(
        &mut self,
        text: &str,
        view: &mut dyn ChatView,
    ) -> Result<Option<&Turn>, ChatError> {
        if text.trim().is_empty() {
            debug!(session_id = %self.id, "Ignoring blank input.");
            return Ok(None);
        }

        let user_turn = self.transcript.push(Turn::user(text));
        view.render_turn(user_turn);
        view.show_pending(PENDING_MESSAGE);

        let prepared = self
            .query
            .prepare(text, self.mode, self.executor.supports_bindings());

        self.state = SessionState::RequestInFlight;
        let result = self.submit(&prepared).await;
        self.state = SessionState::AwaitingInput;
        self.last_query = Some(prepared);

        let answer = match result.and_then(|rows| rows.first_text()) {
            Ok(answer) => answer,
            Err(e) => {
                error!(session_id = %self.id, "Catalog query failed: {e}");
                view.show_error(&e);
                return Err(e);
            }
        };

        let assistant_turn = self.transcript.push(Turn::assistant(answer));
        view.render_turn(assistant_turn);
        Ok(Some(assistant_turn))
    }

    async fn submit(&self, prepared: &PreparedQuery) -> Result<ResultSet, ChatError> {
        debug!(session_id = %self.id, sql = %prepared.sql, bound = prepared.is_bound(), "--> Sending catalog query");
        if prepared.is_bound() {
            self.executor
                .execute_bound(&prepared.sql, &prepared.params)
                .await
        } else {
            self.executor.execute(&prepared.sql).await
        }
    }

    /// Ends the session, returning its transcript.
    pub fn end(self) -> Transcript {
        info!(session_id = %self.id, turns = self.transcript.len(), "Chat session ended.");
        self.transcript
    }
}
