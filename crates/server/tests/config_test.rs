//! # Configuration Tests
//!
//! Tests for loading `AppConfig` from YAML with `${VAR}` substitution and
//! environment overrides. Environment variables are process-global, so every
//! test here runs under `#[serial]`.

use catalog_chat::{QueryMode, TokenType};
use catalog_chat_server::config::{get_config, ConfigError};
use serial_test::serial;
use std::env;
use std::fs::File;
use std::io::Write;
use tempfile::{tempdir, TempDir};

/// Clears every variable these tests touch so each starts from a clean slate.
fn clear_env_vars() {
    for var in [
        "PORT",
        "TEST_SNOWFLAKE_ACCOUNT_URL",
        "TEST_SNOWFLAKE_TOKEN",
        "CATALOG_CHAT_SNOWFLAKE__WAREHOUSE",
        "CATALOG_CHAT_CATALOG__MODE",
    ] {
        env::remove_var(var);
    }
}

fn write_config(content: &str) -> (TempDir, String) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yml");
    let mut file = File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    let path = path.to_str().unwrap().to_string();
    (dir, path)
}

#[test]
#[serial]
fn test_get_config_substitutes_env_vars() {
    clear_env_vars();
    env::set_var("TEST_SNOWFLAKE_ACCOUNT_URL", "https://acme.snowflakecomputing.com");
    env::set_var("TEST_SNOWFLAKE_TOKEN", "secret-token");

    let (_dir, path) = write_config(
        r#"
port: 8181
catalog:
  function: "CATALOG.PUBLIC.ASK_TABLEAU_CATALOG"
  mode: "escaped"
snowflake:
  account_url: "${TEST_SNOWFLAKE_ACCOUNT_URL}"
  token: "${TEST_SNOWFLAKE_TOKEN}"
  token_type: "KEYPAIR_JWT"
  warehouse: "COMPUTE_WH"
"#,
    );

    let config = get_config(Some(&path)).expect("Configuration should load successfully");

    assert_eq!(config.port, 8181);
    assert_eq!(config.catalog.function, "CATALOG.PUBLIC.ASK_TABLEAU_CATALOG");
    assert_eq!(config.catalog.mode, QueryMode::Escaped);
    assert_eq!(
        config.snowflake.account_url,
        "https://acme.snowflakecomputing.com"
    );
    assert_eq!(config.snowflake.token, "secret-token");
    assert_eq!(config.snowflake.token_type, TokenType::KeypairJwt);
    assert_eq!(config.snowflake.warehouse.as_deref(), Some("COMPUTE_WH"));

    clear_env_vars();
}

#[test]
#[serial]
fn test_get_config_defaults() {
    clear_env_vars();
    let (_dir, path) = write_config("snowflake:\n  token: \"abc\"\n");

    let config = get_config(Some(&path)).unwrap();

    assert_eq!(config.port, 9090);
    assert_eq!(config.catalog.function, "ASK_TABLEAU_CATALOG");
    assert_eq!(config.catalog.mode, QueryMode::Auto);
    assert!(!config.catalog.check_on_startup);
    assert_eq!(config.snowflake.token_type, TokenType::Oauth);
    assert_eq!(config.snowflake.database.as_deref(), Some("TABLEAU_CATALOG"));
    assert_eq!(config.snowflake.schema.as_deref(), Some("MAIN"));
    assert_eq!(config.snowflake.timeout_secs, 60);
    assert_eq!(config.page.title, "Tableau Catalog AI");
    assert_eq!(config.sessions.idle_timeout_secs, 1800);
    assert_eq!(config.sessions.sweep_interval_secs, 60);
}

#[test]
#[serial]
fn test_env_overrides_file_values() {
    clear_env_vars();
    env::set_var("PORT", "9999");
    env::set_var("CATALOG_CHAT_SNOWFLAKE__WAREHOUSE", "REPORTING_WH");
    env::set_var("CATALOG_CHAT_CATALOG__MODE", "bound");

    let (_dir, path) = write_config(
        r#"
port: 8181
snowflake:
  warehouse: "COMPUTE_WH"
"#,
    );

    let config = get_config(Some(&path)).unwrap();

    assert_eq!(config.port, 9999);
    assert_eq!(config.snowflake.warehouse.as_deref(), Some("REPORTING_WH"));
    assert_eq!(config.catalog.mode, QueryMode::Bound);

    clear_env_vars();
}

#[test]
#[serial]
fn test_get_config_missing_file() {
    clear_env_vars();
    let dir = tempdir().unwrap();
    let path = dir.path().join("does-not-exist.yml");

    let result = get_config(Some(path.to_str().unwrap()));

    match result {
        Err(ConfigError::NotFound(msg)) => assert!(msg.contains("does-not-exist.yml")),
        other => panic!("Expected NotFound, got {other:?}"),
    }
}

#[test]
#[serial]
fn test_shipped_default_config_loads() {
    clear_env_vars();
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config.default.yml");

    let config = get_config(Some(path)).unwrap();

    assert_eq!(config.port, 9090);
    // Unset `${VAR}` references expand to empty strings.
    assert_eq!(config.snowflake.account_url, "");
}
