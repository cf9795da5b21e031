//! Outbound wire framing: newline-delimited `{"content": ...}` objects.
//!
//! Upstream failures are folded into the same content stream as a single
//! `[Error: ...]` frame, so clients render every frame the same way.
//!
//! ```rust
//! use rchat::Frame;
//!
//! assert_eq!(Frame::content("Hi").to_line(), "{\"content\":\"Hi\"}\n");
//! assert_eq!(Frame::error("timed out").content, "[Error: timed out]");
//! ```

use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub content: String,
}

impl Frame {
    pub fn content(text: impl Into<String>) -> Self {
        Self {
            content: text.into(),
        }
    }

    pub fn error(description: impl Display) -> Self {
        Self {
            content: format!("[Error: {description}]"),
        }
    }

    /// One NDJSON line, newline included.
    pub fn to_line(&self) -> String {
        let mut line = serde_json::to_string(self)
            .unwrap_or_else(|_| String::from("{\"content\":\"\"}"));
        line.push('\n');
        line
    }

    pub fn parse_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line.trim_end())
    }
}
