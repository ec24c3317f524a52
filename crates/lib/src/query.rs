//! # Catalog Query Construction
//!
//! Builds the statement that forwards a question to the catalog SQL function.
//! Two forms exist: a literal with embedded single quotes doubled, and a bound
//! form that passes the question as a positional parameter.
//!
//! Quote doubling is not a complete injection defense (it does nothing for
//! dialects with backslash escapes), so the bound form is preferred whenever
//! the executor supports it.

use crate::{constants::DEFAULT_CATALOG_FUNCTION, errors::ChatError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, sync::OnceLock};

/// Doubles every single-quote character. Nothing else is altered.
pub fn escape_single_quotes(text: &str) -> String {
    text.replace('\'', "''")
}

/// How the question reaches the SQL function.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// Bound when the executor supports it, escaped otherwise.
    #[default]
    Auto,
    /// Always interpolate an escaped literal.
    Escaped,
    /// Always pass the question as a bound parameter.
    Bound,
}

impl FromStr for QueryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(QueryMode::Auto),
            "escaped" => Ok(QueryMode::Escaped),
            "bound" => Ok(QueryMode::Bound),
            other => Err(format!(
                "unknown query mode '{other}', expected auto, escaped or bound"
            )),
        }
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QueryMode::Auto => "auto",
            QueryMode::Escaped => "escaped",
            QueryMode::Bound => "bound",
        };
        f.write_str(s)
    }
}

/// A statement ready for submission, with its positional parameters.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PreparedQuery {
    pub sql: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
}

impl PreparedQuery {
    pub fn is_bound(&self) -> bool {
        !self.params.is_empty()
    }
}

fn function_name_regex() -> Result<&'static Regex, ChatError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    if let Some(re) = RE.get() {
        return Ok(re);
    }
    let re = Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*(\.[A-Za-z_][A-Za-z0-9_$]*){0,2}$")?;
    Ok(RE.get_or_init(|| re))
}

/// The fixed query template around a validated function name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    function: String,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            function: DEFAULT_CATALOG_FUNCTION.to_string(),
        }
    }
}

impl CatalogQuery {
    /// Creates a template for `function`, which may be database/schema qualified.
    pub fn new(function: &str) -> Result<Self, ChatError> {
        let function = function.trim();
        if !function_name_regex()?.is_match(function) {
            return Err(ChatError::InvalidFunctionName(function.to_string()));
        }
        Ok(Self {
            function: function.to_string(),
        })
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    /// `SELECT <FN>('<escaped question>')`
    pub fn literal(&self, question: &str) -> String {
        format!(
            "SELECT {}('{}')",
            self.function,
            escape_single_quotes(question)
        )
    }

    /// `SELECT <FN>(?)`, to be executed with the question as binding 1.
    pub fn bound(&self) -> String {
        format!("SELECT {}(?)", self.function)
    }

    /// Prepares the statement for `question`.
    ///
    /// `supports_bindings` resolves [`QueryMode::Auto`].
    pub fn prepare(
        &self,
        question: &str,
        mode: QueryMode,
        supports_bindings: bool,
    ) -> PreparedQuery {
        let bind = match mode {
            QueryMode::Auto => supports_bindings,
            QueryMode::Escaped => false,
            QueryMode::Bound => true,
        };
        if bind {
            PreparedQuery {
                sql: self.bound(),
                params: vec![question.to_string()],
            }
        } else {
            PreparedQuery {
                sql: self.literal(question),
                params: Vec::new(),
            }
        }
    }
}
