//! # catalog-chat: A terminal client for the report catalog
//!
//! This is the main entry point for the `catalog-chat` command-line interface.
//! It asks the catalog SQL function questions one at a time (`ask`), in an
//! interactive session (`chat`), or prints the statement a question would be
//! sent as (`sql`).

mod repl;
mod terminal;

use anyhow::{bail, Result};
use catalog_chat::{
    constants::{
        DEFAULT_CATALOG_FUNCTION, DEFAULT_DATABASE, DEFAULT_SCHEMA,
        DEFAULT_STATEMENT_TIMEOUT_SECS,
    },
    CatalogQuery, ChatSession, ChatSessionBuilder, CollectingView, PageChrome, QueryMode,
    SnowflakeConfig, SnowflakeExecutor, TokenType,
};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start an interactive chat session
    Chat(ChatArgs),
    /// Ask a single question and print the answer
    Ask(AskArgs),
    /// Print the statement a question would be sent as, without running it
    Sql(SqlArgs),
}

#[derive(Args, Debug)]
struct ConnectionArgs {
    /// Snowflake account URL, e.g. https://myorg-myaccount.snowflakecomputing.com
    #[arg(long, env = "SNOWFLAKE_ACCOUNT_URL")]
    account_url: Option<String>,
    /// Bearer token for the Snowflake SQL API
    #[arg(long, env = "SNOWFLAKE_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// OAUTH, KEYPAIR_JWT or PROGRAMMATIC_ACCESS_TOKEN
    #[arg(long, env = "SNOWFLAKE_TOKEN_TYPE", default_value = "OAUTH")]
    token_type: TokenType,
    #[arg(long, env = "SNOWFLAKE_WAREHOUSE")]
    warehouse: Option<String>,
    #[arg(long, env = "SNOWFLAKE_DATABASE", default_value = DEFAULT_DATABASE)]
    database: String,
    #[arg(long, env = "SNOWFLAKE_SCHEMA", default_value = DEFAULT_SCHEMA)]
    schema: String,
    #[arg(long, env = "SNOWFLAKE_ROLE")]
    role: Option<String>,
    /// Statement timeout in seconds
    #[arg(long, default_value_t = DEFAULT_STATEMENT_TIMEOUT_SECS)]
    timeout_secs: u64,
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// The catalog SQL function, optionally database/schema qualified
    #[arg(long, env = "CATALOG_FUNCTION", default_value = DEFAULT_CATALOG_FUNCTION)]
    function: String,
    /// How the question is passed: auto, escaped or bound
    #[arg(long, env = "CATALOG_QUERY_MODE", default_value = "auto")]
    mode: QueryMode,
}

#[derive(Parser, Debug)]
struct ChatArgs {
    #[command(flatten)]
    connection: ConnectionArgs,
    #[command(flatten)]
    query: QueryArgs,
    /// Skip the `SELECT 1` connection check at startup
    #[arg(long)]
    no_check: bool,
}

#[derive(Parser, Debug)]
struct AskArgs {
    /// The question to ask
    question: String,
    #[command(flatten)]
    connection: ConnectionArgs,
    #[command(flatten)]
    query: QueryArgs,
}

#[derive(Parser, Debug)]
struct SqlArgs {
    /// The question to prepare
    question: String,
    #[command(flatten)]
    query: QueryArgs,
}

impl ConnectionArgs {
    fn executor(&self) -> Result<SnowflakeExecutor> {
        let config = SnowflakeConfig {
            account_url: self.account_url.clone().unwrap_or_default(),
            token: self.token.clone().unwrap_or_default(),
            token_type: self.token_type,
            database: Some(self.database.clone()),
            schema: Some(self.schema.clone()),
            warehouse: self.warehouse.clone(),
            role: self.role.clone(),
            timeout_secs: self.timeout_secs,
            ..Default::default()
        };
        Ok(SnowflakeExecutor::new(config)?)
    }
}

impl QueryArgs {
    fn session(&self, connection: &ConnectionArgs) -> Result<ChatSessionBuilder> {
        Ok(ChatSession::builder()
            .executor(Box::new(connection.executor()?))
            .query(CatalogQuery::new(&self.function)?)
            .mode(self.mode))
    }
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging to a file
    let log_file = File::create("catalog-chat.log")?;
    let subscriber = fmt::Subscriber::builder()
        .with_writer(log_file)
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Chat(args) => handle_chat(args).await,
        Commands::Ask(args) => handle_ask(args).await,
        Commands::Sql(args) => handle_sql(args),
    }
}

// --- Command Handlers ---

async fn handle_chat(args: &ChatArgs) -> Result<()> {
    let builder = args.query.session(&args.connection)?;
    let session = if args.no_check {
        builder.build()?
    } else {
        builder.connect().await?
    };
    repl::run(session, &PageChrome::default()).await
}

async fn handle_ask(args: &AskArgs) -> Result<()> {
    if args.question.trim().is_empty() {
        bail!("The question must not be blank.");
    }
    let mut session = args.query.session(&args.connection)?.build()?;
    let mut view = CollectingView::new();

    if let Some(turn) = session.handle_user_input(&args.question, &mut view).await? {
        println!("{}", turn.content());
    }
    info!(turns = session.transcript().len(), "Question answered.");
    Ok(())
}

/// The Snowflake executor binds parameters, so `auto` resolves to the bound form.
fn handle_sql(args: &SqlArgs) -> Result<()> {
    let query = CatalogQuery::new(&args.query.function)?;
    let prepared = query.prepare(&args.question, args.query.mode, true);

    println!("{}", prepared.sql);
    for (i, param) in prepared.params.iter().enumerate() {
        println!("-- binding {} (TEXT): {param}", i + 1);
    }
    Ok(())
}
