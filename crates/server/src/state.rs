//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup. The `AppState` holds the configuration, the
//! prototype executor handle that every new session clones, and the registry
//! of live sessions.

use crate::{config::AppConfig, sessions::SessionStore};
use catalog_chat::{
    CatalogQuery, ChatError, ChatSession, QueryExecutor, SnowflakeExecutor,
};
use std::{sync::Arc, time::Duration};
use tracing::info;

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration, loaded from `config.yml`.
    pub config: Arc<AppConfig>,
    /// The validated query template.
    pub query: CatalogQuery,
    /// The executor handle cloned into each new session.
    pub executor: Box<dyn QueryExecutor>,
    /// All live chat sessions.
    pub sessions: SessionStore,
}

impl AppState {
    /// Starts a new session with its own executor handle and an empty transcript.
    pub fn new_session(&self) -> Result<ChatSession, ChatError> {
        ChatSession::builder()
            .executor(self.executor.clone())
            .query(self.query.clone())
            .mode(self.config.catalog.mode)
            .build()
    }
}

/// Builds the shared application state from the configuration.
///
/// This creates the Snowflake executor from the `snowflake` section and,
/// if `catalog.check_on_startup` is set, checks that it can run a statement.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let executor = SnowflakeExecutor::new(config.snowflake.clone())?;
    build_app_state_with_executor(config, Box::new(executor)).await
}

/// Builds the shared application state around an already constructed executor.
///
/// Also starts the idle-session sweeper unless `sessions.idle_timeout_secs` is 0.
pub async fn build_app_state_with_executor(
    config: AppConfig,
    executor: Box<dyn QueryExecutor>,
) -> anyhow::Result<AppState> {
    let query = CatalogQuery::new(&config.catalog.function)?;

    if config.catalog.check_on_startup {
        executor.check_connection().await?;
        info!(executor = executor.name(), "Warehouse connection verified.");
    }

    info!(
        function = query.function(),
        mode = %config.catalog.mode,
        executor = executor.name(),
        "Initialized catalog query executor."
    );

    let sessions = SessionStore::new();
    let idle_timeout = config.sessions.idle_timeout_secs;
    if idle_timeout > 0 {
        let every = config.sessions.sweep_interval_secs.max(1);
        sessions.spawn_idle_sweeper(
            Duration::from_secs(idle_timeout),
            Duration::from_secs(every),
        );
        info!(idle_timeout, every, "Started idle session sweeper.");
    }

    Ok(AppState {
        config: Arc::new(config),
        query,
        executor,
        sessions,
    })
}
