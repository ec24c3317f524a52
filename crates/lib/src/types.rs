use crate::errors::ChatError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The speaker of a turn in the transcript.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
        }
    }
}

/// One message in the transcript, tagged by speaker role.
///
/// Fields are private so a turn cannot be edited once it has been created.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Column metadata for a result set.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type", default)]
    pub data_type: String,
}

/// The rows returned by a query executor.
///
/// Every value is a JSON scalar. The Snowflake SQL API reports all values as
/// strings (or null), other executors may use numbers or booleans.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<Column>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Builds a single-column result set from string rows.
    pub fn from_strings<I, S>(column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: vec![Column {
                name: column.to_string(),
                data_type: "text".to_string(),
            }],
            rows: values
                .into_iter()
                .map(|v| vec![Value::String(v.into())])
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the first column of the first row as text.
    ///
    /// Non-string scalars are rendered with their JSON representation.
    pub fn first_text(&self) -> Result<String, ChatError> {
        let value = self
            .rows
            .first()
            .and_then(|row| row.first())
            .ok_or(ChatError::EmptyResult)?;

        match value {
            Value::Null => Err(ChatError::NullAnswer),
            Value::String(s) => Ok(s.clone()),
            other => Ok(other.to_string()),
        }
    }
}
