use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

// ---- Responses endpoint wire types ----

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InputItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub role: Role,
    pub content: String,
}

impl InputItem {
    pub fn message(role: Role, content: impl Into<String>) -> Self {
        Self {
            kind: "message".into(),
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Tool {
    #[serde(rename = "type")]
    pub kind: String,
}

impl Tool {
    pub fn web_search_preview() -> Self {
        Self {
            kind: "web_search_preview".into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResponseRequest {
    pub model: String,
    pub input: Vec<InputItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub model: String,
    pub input: String,
    pub voice: String,
    pub response_format: String,
}

// ---- Domain types ----

/// A web source referenced by the summary. Two citations are the same source
/// when their `url`s are equal; see `SearchResult::citations`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Citation {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Outcome of one search: the streamed summary and the sources it cited.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SearchResult {
    pub query: String,
    /// First-seen order, unique by `url`.
    pub citations: Vec<Citation>,
    pub summary: String,
    pub timestamp: DateTime<Utc>,
}

impl SearchResult {
    pub fn empty(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            citations: Vec::new(),
            summary: String::new(),
            timestamp: Utc::now(),
        }
    }
}
