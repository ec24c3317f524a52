pub mod executor;
pub mod snowflake;

pub use executor::QueryExecutor;
pub use snowflake::{SnowflakeConfig, SnowflakeExecutor, TokenType};
