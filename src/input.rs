//! Request parsing for the CLI surface
//!
//! One evaluation request is a JSON object carrying the raw command text.

use serde::Deserialize;

/// A command evaluation request
#[derive(Debug, Clone, Deserialize)]
pub struct CommandRequest {
    /// The raw shell command to evaluate
    pub command_text: String,
}

impl CommandRequest {
    /// Parse a request from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
