use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One line of the rolling result panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub title: String,
    pub at: DateTime<Local>,
    pub payload: Value,
}

impl ResultEntry {
    pub fn new(title: impl Into<String>, payload: Value) -> Self {
        Self {
            title: title.into(),
            at: Local::now(),
            payload,
        }
    }

    /// Entries recorded for failed calls carry an `(ERR)` suffix
    pub fn is_error(&self) -> bool {
        self.title.ends_with("(ERR)")
    }
}
