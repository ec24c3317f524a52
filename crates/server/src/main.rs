//! # catalog-chat-server
//!
//! Serves the catalog chat page and its session API.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    catalog_chat_server::start().await
}
