//! # Page Chrome
//!
//! Static text around the transcript: title, caption, input placeholder and
//! the sidebar panels. None of it carries state.

use serde::{Deserialize, Serialize};

fn default_title() -> String {
    "Tableau Catalog AI".to_string()
}

fn default_icon() -> String {
    "📊".to_string()
}

fn default_caption() -> String {
    "Ask questions about our Tableau reports in natural language".to_string()
}

fn default_placeholder() -> String {
    "Ask about Tableau reports...".to_string()
}

fn default_example_questions() -> Vec<String> {
    [
        "What sales reports do we have?",
        "Who owns the customer churn dashboard?",
        "Is there a report for tracking marketing ROI?",
        "What finance dashboards refresh daily?",
        "Are there duplicate reports for pipeline?",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_about() -> String {
    "This app uses semantic search to find relevant reports by meaning, not just keywords."
        .to_string()
}

fn default_powered_by() -> Vec<String> {
    ["Snowflake Cortex", "Claude 3.5 Sonnet", "e5-base-v2 embeddings"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PageChrome {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default = "default_caption")]
    pub caption: String,
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
    #[serde(default = "default_example_questions")]
    pub example_questions: Vec<String>,
    #[serde(default = "default_about")]
    pub about: String,
    #[serde(default = "default_powered_by")]
    pub powered_by: Vec<String>,
}

impl Default for PageChrome {
    fn default() -> Self {
        Self {
            title: default_title(),
            icon: default_icon(),
            caption: default_caption(),
            placeholder: default_placeholder(),
            example_questions: default_example_questions(),
            about: default_about(),
            powered_by: default_powered_by(),
        }
    }
}

impl PageChrome {
    /// `"📊 Tableau Catalog AI"`
    pub fn heading(&self) -> String {
        if self.icon.is_empty() {
            self.title.clone()
        } else {
            format!("{} {}", self.icon, self.title)
        }
    }
}
