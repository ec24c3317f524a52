//! # Common Test Utilities
//!
//! `TestApp` spawns the real server on a random port. By default its executor
//! talks to an `httpmock::MockServer` standing in for the Snowflake SQL API;
//! `spawn_with_executor` swaps in a `MockExecutor` instead.

// Allow unused code because this is a test utility module, and not all
// functions might be used by every test file that includes it.
#![allow(unused)]

use anyhow::Result;
use catalog_chat::QueryExecutor;
use catalog_chat_server::{
    config::{self, AppConfig},
    router,
    state::{build_app_state, build_app_state_with_executor, AppState},
};
use axum::serve;
use httpmock::MockServer;
use reqwest::Client;
use serde_json::{json, Value};
use std::{fs::File, io::Write, net::SocketAddr};
use tempfile::{tempdir, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};
use uuid::Uuid;

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub app_state: AppState,
    _config_dir: Option<TempDir>,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the server with a Snowflake executor pointed at a mock server.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with_mode("auto").await
    }

    pub async fn spawn_with_mode(mode: &str) -> Result<Self> {
        let mock_server = MockServer::start_async().await;

        let config_dir = tempdir()?;
        let config_path = config_dir.path().join("config.yml");
        let config_content = format!(
            r#"
port: 0
catalog:
  function: "ASK_TABLEAU_CATALOG"
  mode: "{mode}"
snowflake:
  account_url: "{}"
  token: "test-token"
  token_type: "OAUTH"
  warehouse: "COMPUTE_WH"
  timeout_secs: 5
  poll_interval_ms: 20
"#,
            mock_server.base_url()
        );
        let mut file = File::create(&config_path)?;
        file.write_all(config_content.as_bytes())?;

        let config = config::get_config(Some(config_path.to_str().unwrap()))?;
        let app_state = build_app_state(config).await?;

        let mut app = TestApp::spawn_with_state(app_state, mock_server).await?;
        app._config_dir = Some(config_dir);
        Ok(app)
    }

    /// Spawns the server around a ready-made executor (e.g. a `MockExecutor`).
    pub async fn spawn_with_executor(executor: Box<dyn QueryExecutor>) -> Result<Self> {
        TestApp::spawn_with_executor_and_config(executor, json!({ "port": 0 })).await
    }

    /// Like `spawn_with_executor`, with the configuration given as JSON.
    pub async fn spawn_with_executor_and_config(
        executor: Box<dyn QueryExecutor>,
        config: Value,
    ) -> Result<Self> {
        let config: AppConfig = serde_json::from_value(config)?;
        let app_state = build_app_state_with_executor(config, executor).await?;
        TestApp::spawn_with_state(app_state, MockServer::start_async().await).await
    }

    pub async fn spawn_with_state(app_state: AppState, mock_server: MockServer) -> Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let app_state_for_harness = app_state.clone();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            app_state: app_state_for_harness,
            _config_dir: None,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Creates a session through the API and returns its id.
    pub async fn create_session(&self) -> Result<Uuid> {
        let response = self
            .client
            .post(format!("{}/sessions", self.address))
            .send()
            .await?;
        assert_eq!(201, response.status().as_u16());
        let body: Value = response.json().await?;
        Ok(body["session_id"].as_str().unwrap().parse()?)
    }

    pub async fn post_message(&self, session_id: Uuid, content: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(format!("{}/sessions/{session_id}/messages", self.address))
            .json(&json!({ "content": content }))
            .send()
            .await?)
    }

    pub async fn get_messages(&self, session_id: Uuid) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(format!("{}/sessions/{session_id}/messages", self.address))
            .send()
            .await?)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// A Snowflake SQL API body for a completed single-cell result.
pub fn snowflake_answer(answer: &str) -> Value {
    json!({
        "resultSetMetaData": {
            "numRows": 1,
            "format": "jsonv2",
            "rowType": [{"name": "ANSWER", "type": "text"}]
        },
        "data": [[answer]],
        "code": "090001",
        "statementHandle": "01b2-0000",
        "message": "Statement executed successfully."
    })
}
