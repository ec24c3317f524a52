use crate::{
    constants::{
        DEFAULT_DATABASE, DEFAULT_POLL_INTERVAL_MS, DEFAULT_SCHEMA,
        DEFAULT_STATEMENT_TIMEOUT_SECS,
    },
    errors::ChatError,
    providers::db::executor::QueryExecutor,
    types::{Column, ResultSet},
};
use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    collections::BTreeMap,
    fmt::{self, Debug},
    str::FromStr,
    time::Duration,
};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

const STATEMENTS_PATH: &str = "/api/v2/statements";
const TOKEN_TYPE_HEADER: &str = "X-Snowflake-Authorization-Token-Type";

// --- Snowflake SQL API request and response structures ---

#[derive(Serialize)]
struct StatementRequest<'a> {
    statement: &'a str,
    timeout: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warehouse: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    bindings: BTreeMap<String, Binding<'a>>,
}

#[derive(Serialize)]
struct Binding<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct StatementResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    statement_handle: Option<String>,
    #[serde(default)]
    statement_status_url: Option<String>,
    #[serde(default)]
    result_set_meta_data: Option<ResultSetMetaData>,
    #[serde(default)]
    data: Vec<Vec<Value>>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct ResultSetMetaData {
    #[serde(default)]
    row_type: Vec<Column>,
}

// --- Configuration ---

/// How the bearer token in [`SnowflakeConfig`] was issued.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    #[default]
    Oauth,
    KeypairJwt,
    ProgrammaticAccessToken,
}

impl TokenType {
    pub fn header_value(&self) -> &'static str {
        match self {
            TokenType::Oauth => "OAUTH",
            TokenType::KeypairJwt => "KEYPAIR_JWT",
            TokenType::ProgrammaticAccessToken => "PROGRAMMATIC_ACCESS_TOKEN",
        }
    }
}

impl FromStr for TokenType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OAUTH" => Ok(TokenType::Oauth),
            "KEYPAIR_JWT" | "JWT" => Ok(TokenType::KeypairJwt),
            "PROGRAMMATIC_ACCESS_TOKEN" | "PAT" => Ok(TokenType::ProgrammaticAccessToken),
            other => Err(format!("unknown Snowflake token type '{other}'")),
        }
    }
}

fn default_database() -> Option<String> {
    Some(DEFAULT_DATABASE.to_string())
}

fn default_schema() -> Option<String> {
    Some(DEFAULT_SCHEMA.to_string())
}

fn default_timeout_secs() -> u64 {
    DEFAULT_STATEMENT_TIMEOUT_SECS
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

/// Connection settings for the Snowflake SQL API.
#[derive(Deserialize, Clone)]
pub struct SnowflakeConfig {
    /// e.g. `https://myorg-myaccount.snowflakecomputing.com`
    #[serde(default)]
    pub account_url: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub token_type: TokenType,
    #[serde(default = "default_database")]
    pub database: Option<String>,
    #[serde(default = "default_schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub warehouse: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    /// Statement timeout in seconds; also bounds status polling. 0 disables the client-side bound.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for SnowflakeConfig {
    fn default() -> Self {
        Self {
            account_url: String::new(),
            token: String::new(),
            token_type: TokenType::default(),
            database: default_database(),
            schema: default_schema(),
            warehouse: None,
            role: None,
            timeout_secs: default_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Debug for SnowflakeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeConfig")
            .field("account_url", &self.account_url)
            .field("token_type", &self.token_type)
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("warehouse", &self.warehouse)
            .field("role", &self.role)
            .field("timeout_secs", &self.timeout_secs)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .finish_non_exhaustive()
    }
}

// --- Snowflake executor implementation ---

/// An executor for the Snowflake SQL API (`/api/v2/statements`).
///
/// Cloning shares the underlying HTTP connection pool.
#[derive(Clone)]
pub struct SnowflakeExecutor {
    client: ReqwestClient,
    config: SnowflakeConfig,
}

impl SnowflakeExecutor {
    /// Creates a new `SnowflakeExecutor`.
    ///
    /// Fails with `ConnectionUnavailable` if the account URL or token is missing.
    pub fn new(mut config: SnowflakeConfig) -> Result<Self, ChatError> {
        let account_url = config.account_url.trim().trim_end_matches('/').to_string();
        if account_url.is_empty() {
            return Err(ChatError::ConnectionUnavailable(
                "Snowflake account URL is not configured".to_string(),
            ));
        }
        if config.token.trim().is_empty() {
            return Err(ChatError::ConnectionUnavailable(
                "Snowflake token is not configured".to_string(),
            ));
        }
        config.account_url = account_url;

        // Unset `${VAR}` substitutions arrive as empty strings.
        for field in [
            &mut config.database,
            &mut config.schema,
            &mut config.warehouse,
            &mut config.role,
        ] {
            if field.as_deref().is_some_and(|s| s.trim().is_empty()) {
                *field = None;
            }
        }

        let client = ReqwestClient::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ChatError::ReqwestClientBuild)?;

        info!(account_url = %config.account_url, "Created Snowflake executor.");
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &SnowflakeConfig {
        &self.config
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(&self.config.token)
            .header(TOKEN_TYPE_HEADER, self.config.token_type.header_value())
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn submit(&self, sql: &str, params: &[String]) -> Result<ResultSet, ChatError> {
        let bindings = params
            .iter()
            .enumerate()
            .map(|(i, value)| {
                (
                    (i + 1).to_string(),
                    Binding {
                        kind: "TEXT",
                        value: value.as_str(),
                    },
                )
            })
            .collect();

        let request_body = StatementRequest {
            statement: sql,
            timeout: self.config.timeout_secs,
            database: self.config.database.as_deref(),
            schema: self.config.schema.as_deref(),
            warehouse: self.config.warehouse.as_deref(),
            role: self.config.role.as_deref(),
            bindings,
        };

        let request_id = Uuid::new_v4().to_string();
        debug!(request_id = %request_id, statement = %sql, bindings = params.len(), "--> Submitting Snowflake statement");

        let started = Instant::now();
        let mut response = self
            .authorized(
                self.client
                    .post(format!("{}{STATEMENTS_PATH}", self.config.account_url)),
            )
            .query(&[("requestId", request_id.as_str())])
            .json(&request_body)
            .send()
            .await
            .map_err(ChatError::ExecutorRequest)?;

        loop {
            match response.status() {
                StatusCode::OK => {
                    let body: StatementResponse = response
                        .json()
                        .await
                        .map_err(ChatError::ExecutorDeserialization)?;
                    debug!(
                        statement_handle = ?body.statement_handle,
                        rows = body.data.len(),
                        "<-- Snowflake statement completed"
                    );
                    return Ok(ResultSet::new(
                        body.result_set_meta_data.unwrap_or_default().row_type,
                        body.data,
                    ));
                }
                StatusCode::ACCEPTED => {
                    let body: StatementResponse = response
                        .json()
                        .await
                        .map_err(ChatError::ExecutorDeserialization)?;
                    let status_path = Self::status_path(&body)?;

                    let limit = self.config.timeout_secs;
                    if limit > 0 && started.elapsed() >= Duration::from_secs(limit) {
                        warn!(status_path = %status_path, "Snowflake statement timed out while polling.");
                        if let Some(handle) = &body.statement_handle {
                            self.cancel(handle).await;
                        }
                        return Err(ChatError::StatementTimeout(limit));
                    }

                    debug!(status_path = %status_path, "Statement still running, polling.");
                    tokio::time::sleep(Duration::from_millis(self.config.poll_interval_ms)).await;
                    response = self
                        .authorized(
                            self.client
                                .get(format!("{}{status_path}", self.config.account_url)),
                        )
                        .send()
                        .await
                        .map_err(ChatError::ExecutorRequest)?;
                }
                _ => return Err(Self::api_error(response).await),
            }
        }
    }

    /// Asks the warehouse to stop a statement that is no longer awaited.
    /// Failures are logged; the caller already has the error it will return.
    async fn cancel(&self, handle: &str) {
        let url = format!("{}{STATEMENTS_PATH}/{handle}/cancel", self.config.account_url);
        match self.authorized(self.client.post(url)).send().await {
            Ok(response) if response.status().is_success() => {
                info!(statement_handle = %handle, "Cancelled timed-out Snowflake statement.");
            }
            Ok(response) => {
                warn!(statement_handle = %handle, status = %response.status(), "Snowflake rejected statement cancel.");
            }
            Err(e) => {
                warn!(statement_handle = %handle, "Failed to cancel Snowflake statement: {e}");
            }
        }
    }

    fn status_path(body: &StatementResponse) -> Result<String, ChatError> {
        if let Some(url) = &body.statement_status_url {
            return Ok(url.clone());
        }
        if let Some(handle) = &body.statement_handle {
            return Ok(format!("{STATEMENTS_PATH}/{handle}"));
        }
        Err(ChatError::WarehouseApi {
            status: StatusCode::ACCEPTED.as_u16(),
            code: body.code.clone().unwrap_or_default(),
            message: "statement accepted without a handle to poll".to_string(),
        })
    }

    async fn api_error(response: Response) -> ChatError {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<StatementResponse>(&text) {
            Ok(body) if body.message.is_some() => ChatError::WarehouseApi {
                status,
                code: body.code.unwrap_or_default(),
                message: body.message.unwrap_or_default(),
            },
            _ => ChatError::WarehouseApi {
                status,
                code: String::new(),
                message: text,
            },
        }
    }
}

impl Debug for SnowflakeExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeExecutor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl QueryExecutor for SnowflakeExecutor {
    fn name(&self) -> &str {
        "Snowflake"
    }

    async fn execute(&self, sql: &str) -> Result<ResultSet, ChatError> {
        self.submit(sql, &[]).await
    }

    fn supports_bindings(&self) -> bool {
        true
    }

    async fn execute_bound(&self, sql: &str, params: &[String]) -> Result<ResultSet, ChatError> {
        self.submit(sql, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_account_and_token() {
        let err = SnowflakeExecutor::new(SnowflakeConfig::default()).unwrap_err();
        assert!(err.is_connection_failure());

        let err = SnowflakeExecutor::new(SnowflakeConfig {
            account_url: "https://acme.snowflakecomputing.com".to_string(),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ChatError::ConnectionUnavailable(_)));
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let executor = SnowflakeExecutor::new(SnowflakeConfig {
            account_url: "https://acme.snowflakecomputing.com/".to_string(),
            token: "t".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            executor.config().account_url,
            "https://acme.snowflakecomputing.com"
        );
    }

    #[test]
    fn test_new_drops_blank_optional_fields() {
        let executor = SnowflakeExecutor::new(SnowflakeConfig {
            account_url: "https://acme.snowflakecomputing.com".to_string(),
            token: "t".to_string(),
            warehouse: Some(String::new()),
            role: Some("  ".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(executor.config().warehouse, None);
        assert_eq!(executor.config().role, None);
        assert_eq!(executor.config().database.as_deref(), Some("TABLEAU_CATALOG"));
    }

    #[test]
    fn test_debug_hides_token() {
        let config = SnowflakeConfig {
            token: "super-secret".to_string(),
            ..Default::default()
        };
        assert!(!format!("{config:?}").contains("super-secret"));
    }

    #[test]
    fn test_token_type_parsing() {
        assert_eq!("oauth".parse::<TokenType>().unwrap(), TokenType::Oauth);
        assert_eq!("pat".parse::<TokenType>().unwrap(), TokenType::ProgrammaticAccessToken);
        assert_eq!(TokenType::KeypairJwt.header_value(), "KEYPAIR_JWT");
        assert!("basic".parse::<TokenType>().is_err());
    }

    #[test]
    fn test_bindings_serialize_as_numbered_text() {
        let mut bindings = BTreeMap::new();
        bindings.insert(
            "1".to_string(),
            Binding {
                kind: "TEXT",
                value: "it's",
            },
        );
        let request = StatementRequest {
            statement: "SELECT F(?)",
            timeout: 60,
            database: Some("DB"),
            schema: None,
            warehouse: None,
            role: None,
            bindings,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "statement": "SELECT F(?)",
                "timeout": 60,
                "database": "DB",
                "bindings": {"1": {"type": "TEXT", "value": "it's"}}
            })
        );
    }
}
