//! Asks the catalog a single question using connection settings from the environment.
//!
//! ```sh
//! SNOWFLAKE_ACCOUNT_URL=https://myorg-myaccount.snowflakecomputing.com \
//! SNOWFLAKE_TOKEN=... \
//! cargo run -p catalog-chat --example ask -- "What sales reports do we have?"
//! ```

use catalog_chat::{ChatSession, CollectingView, SnowflakeConfig, SnowflakeExecutor};
use dotenvy::dotenv;
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    dotenv().ok();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} '<question>'", args[0]);
        return Ok(());
    }

    let config = SnowflakeConfig {
        account_url: env::var("SNOWFLAKE_ACCOUNT_URL").unwrap_or_default(),
        token: env::var("SNOWFLAKE_TOKEN").unwrap_or_default(),
        warehouse: env::var("SNOWFLAKE_WAREHOUSE").ok(),
        role: env::var("SNOWFLAKE_ROLE").ok(),
        ..Default::default()
    };
    let executor = SnowflakeExecutor::new(config)?;

    let mut session = ChatSession::builder()
        .executor(Box::new(executor))
        .build()?;
    let mut view = CollectingView::new();

    match session.handle_user_input(&args[1], &mut view).await {
        Ok(Some(turn)) => println!("{}", turn.content()),
        Ok(None) => eprintln!("Nothing to ask."),
        Err(e) => eprintln!("Error: {e}"),
    }

    Ok(())
}
