use async_trait::async_trait;
use catalog_chat::{ChatError, ChatView, QueryExecutor, ResultSet, Role, Turn};
use std::collections::VecDeque;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// --- Shared Event Log ---

/// Something observable that happened during a turn, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Rendered(Role, String),
    Pending(String),
    Failed(String),
    Executed { sql: String, params: Vec<String> },
}

/// An ordered log shared between a [`MockExecutor`] and a [`RecordingView`].
pub type EventLog = Arc<Mutex<Vec<Event>>>;

pub fn new_event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

// --- Mock Query Executor ---

/// A statement received by the [`MockExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedStatement {
    pub sql: String,
    pub params: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct MockExecutor {
    responses: Arc<Mutex<VecDeque<Result<ResultSet, String>>>>,
    calls: Arc<Mutex<Vec<ExecutedStatement>>>,
    events: EventLog,
    supports_bindings: bool,
    delay: Option<Duration>,
}

impl MockExecutor {
    /// A mock that only accepts literal statements.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            events: new_event_log(),
            supports_bindings: false,
            delay: None,
        }
    }

    /// A mock that also accepts bound parameters.
    pub fn with_bindings() -> Self {
        Self {
            supports_bindings: true,
            ..Self::new()
        }
    }

    /// Shares an event log with a view so their relative order can be asserted.
    pub fn with_events(mut self, events: EventLog) -> Self {
        self.events = events;
        self
    }

    /// Sleeps before answering, to stand in for backend latency.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queues a single-cell answer.
    pub fn push_answer(&self, answer: &str) {
        self.push_result(ResultSet::from_strings("ANSWER", [answer]));
    }

    pub fn push_result(&self, result: ResultSet) {
        self.responses.lock().unwrap().push_back(Ok(result));
    }

    /// Queues a failure for the next call.
    pub fn push_failure(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    /// Retrieves the recorded calls for assertion.
    pub fn get_calls(&self) -> Vec<ExecutedStatement> {
        self.calls.lock().unwrap().clone()
    }

    pub fn events(&self) -> EventLog {
        self.events.clone()
    }

    async fn respond(&self, sql: &str, params: &[String]) -> Result<ResultSet, ChatError> {
        self.calls.lock().unwrap().push(ExecutedStatement {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        self.events.lock().unwrap().push(Event::Executed {
            sql: sql.to_string(),
            params: params.to_vec(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(result)) => Ok(result),
            Some(Err(message)) => Err(ChatError::WarehouseApi {
                status: 500,
                code: "mock".to_string(),
                message,
            }),
            None => Err(ChatError::WarehouseApi {
                status: 500,
                code: "mock".to_string(),
                message: format!("MockExecutor: no response programmed for '{sql}'"),
            }),
        }
    }
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueryExecutor for MockExecutor {
    fn name(&self) -> &str {
        "Mock"
    }

    async fn execute(&self, sql: &str) -> Result<ResultSet, ChatError> {
        self.respond(sql, &[]).await
    }

    fn supports_bindings(&self) -> bool {
        self.supports_bindings
    }

    async fn execute_bound(&self, sql: &str, params: &[String]) -> Result<ResultSet, ChatError> {
        if !self.supports_bindings {
            return Err(ChatError::BindingsUnsupported(self.name().to_string()));
        }
        self.respond(sql, params).await
    }
}

// --- Recording View ---

/// A view that appends everything it is shown to an [`EventLog`].
#[derive(Clone, Debug)]
pub struct RecordingView {
    events: EventLog,
}

impl RecordingView {
    pub fn new(events: EventLog) -> Self {
        Self { events }
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Only the rendered turns, in order.
    pub fn rendered(&self) -> Vec<(Role, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Rendered(role, content) => Some((role, content)),
                _ => None,
            })
            .collect()
    }
}

impl ChatView for RecordingView {
    fn render_turn(&mut self, turn: &Turn) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Rendered(turn.role(), turn.content().to_string()));
    }

    fn show_pending(&mut self, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Pending(message.to_string()));
    }

    fn show_error(&mut self, error: &ChatError) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Failed(error.to_string()));
    }
}

/// A mock executor and a view sharing one event log.
pub fn mock_pair() -> (MockExecutor, RecordingView) {
    let events = new_event_log();
    (
        MockExecutor::new().with_events(events.clone()),
        RecordingView::new(events),
    )
}
