//! # Snowflake Executor Tests
//!
//! Runs `SnowflakeExecutor` against an `httpmock` stand-in for the Snowflake
//! SQL API to check request shape, result decoding, polling and error mapping.

use catalog_chat::{
    ChatError, ChatSession, QueryExecutor, QueryMode, SnowflakeConfig, SnowflakeExecutor,
    TokenType,
};
use catalog_chat_test_utils::RecordingView;
use httpmock::{Method, MockServer};
use serde_json::json;

fn executor_for(server: &MockServer, timeout_secs: u64) -> SnowflakeExecutor {
    SnowflakeExecutor::new(SnowflakeConfig {
        account_url: server.base_url(),
        token: "test-token".to_string(),
        token_type: TokenType::ProgrammaticAccessToken,
        warehouse: Some("COMPUTE_WH".to_string()),
        timeout_secs,
        poll_interval_ms: 20,
        ..Default::default()
    })
    .expect("executor should build")
}

fn completed_body(answer: &str) -> serde_json::Value {
    json!({
        "resultSetMetaData": {
            "numRows": 1,
            "format": "jsonv2",
            "rowType": [{"name": "ASK_TABLEAU_CATALOG('...')", "type": "text", "nullable": true}]
        },
        "data": [[answer]],
        "code": "090001",
        "statementStatusUrl": "/api/v2/statements/01b2-0000?requestId=abc",
        "sqlState": "00000",
        "statementHandle": "01b2-0000",
        "message": "Statement executed successfully."
    })
}

#[tokio::test]
async fn test_execute_sends_statement_and_decodes_rows() {
    // Arrange
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(Method::POST)
                .path("/api/v2/statements")
                .query_param_exists("requestId")
                .header("authorization", "Bearer test-token")
                .header("x-snowflake-authorization-token-type", "PROGRAMMATIC_ACCESS_TOKEN")
                .json_body(json!({
                    "statement": "SELECT ASK_TABLEAU_CATALOG('What sales reports do we have?')",
                    "timeout": 60,
                    "database": "TABLEAU_CATALOG",
                    "schema": "MAIN",
                    "warehouse": "COMPUTE_WH"
                }));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(completed_body("Here are 3 sales reports: ..."));
        })
        .await;
    let executor = executor_for(&server, 60);

    // Act
    let result = executor
        .execute("SELECT ASK_TABLEAU_CATALOG('What sales reports do we have?')")
        .await
        .unwrap();

    // Assert
    mock.assert_async().await;
    assert_eq!(result.columns.len(), 1);
    assert_eq!(result.columns[0].data_type, "text");
    assert_eq!(result.first_text().unwrap(), "Here are 3 sales reports: ...");
}

#[tokio::test]
async fn test_execute_bound_sends_text_bindings() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(Method::POST)
                .path("/api/v2/statements")
                .json_body_partial(
                    r#"{
                        "statement": "SELECT ASK_TABLEAU_CATALOG(?)",
                        "bindings": {"1": {"type": "TEXT", "value": "O'Brien's report"}}
                    }"#,
                );
            then.status(200).json_body(completed_body("found it"));
        })
        .await;
    let executor = executor_for(&server, 60);
    assert!(executor.supports_bindings());

    let result = executor
        .execute_bound(
            "SELECT ASK_TABLEAU_CATALOG(?)",
            &["O'Brien's report".to_string()],
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.first_text().unwrap(), "found it");
}

#[tokio::test]
async fn test_accepted_statement_is_polled_until_complete() {
    let server = MockServer::start_async().await;
    let submit = server
        .mock_async(|when, then| {
            when.method(Method::POST).path("/api/v2/statements");
            then.status(202).json_body(json!({
                "code": "333334",
                "message": "Asynchronous execution in progress.",
                "statementHandle": "01b2-1111",
                "statementStatusUrl": "/api/v2/statements/01b2-1111"
            }));
        })
        .await;
    let status = server
        .mock_async(|when, then| {
            when.method(Method::GET)
                .path("/api/v2/statements/01b2-1111")
                .header("authorization", "Bearer test-token");
            then.status(200).json_body(completed_body("polled answer"));
        })
        .await;
    let executor = executor_for(&server, 60);

    let result = executor.execute("SELECT 1").await.unwrap();

    submit.assert_async().await;
    status.assert_async().await;
    assert_eq!(result.first_text().unwrap(), "polled answer");
}

#[tokio::test]
async fn test_polling_gives_up_after_statement_timeout() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::POST).path("/api/v2/statements");
            then.status(202)
                .json_body(json!({"code": "333334", "statementHandle": "slow"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(Method::GET).path("/api/v2/statements/slow");
            then.status(202)
                .json_body(json!({"code": "333334", "statementHandle": "slow"}));
        })
        .await;
    let cancel_mock = server
        .mock_async(|when, then| {
            when.method(Method::POST)
                .path("/api/v2/statements/slow/cancel")
                .header("authorization", "Bearer test-token");
            then.status(200)
                .json_body(json!({"code": "000604", "message": "SQL execution canceled"}));
        })
        .await;
    let executor = executor_for(&server, 1);

    let err = executor.execute("SELECT 1").await.unwrap_err();

    assert!(matches!(err, ChatError::StatementTimeout(1)));
    // The abandoned statement is cancelled in the warehouse.
    cancel_mock.assert_async().await;
}

#[tokio::test]
async fn test_failed_cancel_still_reports_timeout() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::POST).path("/api/v2/statements");
            then.status(202)
                .json_body(json!({"code": "333334", "statementHandle": "stuck"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(Method::GET).path("/api/v2/statements/stuck");
            then.status(202)
                .json_body(json!({"code": "333334", "statementHandle": "stuck"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(Method::POST).path("/api/v2/statements/stuck/cancel");
            then.status(500).body("internal error");
        })
        .await;
    let executor = executor_for(&server, 1);

    let err = executor.execute("SELECT 1").await.unwrap_err();

    assert!(matches!(err, ChatError::StatementTimeout(1)));
}

#[tokio::test]
async fn test_warehouse_error_payload_is_mapped() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::POST).path("/api/v2/statements");
            then.status(422).json_body(json!({
                "code": "002141",
                "message": "SQL compilation error:\nUnknown function ASK_TABLEAU_CATALOG",
                "sqlState": "42601",
                "statementHandle": "01b2-2222"
            }));
        })
        .await;
    let executor = executor_for(&server, 60);

    let err = executor.execute("SELECT ASK_TABLEAU_CATALOG('x')").await.unwrap_err();

    match err {
        ChatError::WarehouseApi {
            status,
            code,
            message,
        } => {
            assert_eq!(status, 422);
            assert_eq!(code, "002141");
            assert!(message.contains("Unknown function"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_error_body_is_kept_verbatim() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::POST).path("/api/v2/statements");
            then.status(401).body("Unauthorized");
        })
        .await;
    let executor = executor_for(&server, 60);

    let err = executor.execute("SELECT 1").await.unwrap_err();

    assert!(
        matches!(err, ChatError::WarehouseApi { status: 401, ref message, .. } if message == "Unauthorized")
    );
}

#[tokio::test]
async fn test_session_over_snowflake_uses_bindings_by_default() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(Method::POST)
                .path("/api/v2/statements")
                .json_body_partial(
                    r#"{"bindings": {"1": {"type": "TEXT", "value": "Who owns the customer churn dashboard?"}}}"#,
                );
            then.status(200)
                .json_body(completed_body("The churn dashboard is owned by Analytics."));
        })
        .await;
    let mut session = ChatSession::builder()
        .executor(Box::new(executor_for(&server, 60)))
        .mode(QueryMode::Auto)
        .build()
        .unwrap();
    let mut view = RecordingView::new(catalog_chat_test_utils::new_event_log());

    let turn = session
        .handle_user_input("Who owns the customer churn dashboard?", &mut view)
        .await
        .unwrap()
        .cloned()
        .unwrap();

    mock.assert_async().await;
    assert_eq!(turn.content(), "The churn dashboard is owned by Analytics.");
    assert_eq!(session.transcript().len(), 2);
}
