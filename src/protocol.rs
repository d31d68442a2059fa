//! Wire types for the assistant backend's HTTP API
//!
//! Only the fields the client reads are modelled; anything else the backend
//! sends is ignored on decode.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Endpoint paths, relative to the configured base URL
pub mod endpoints {
    pub const CHAT: &str = "/api/chat";
    pub const CLEAR_HISTORY: &str = "/api/clear-history";
    pub const RESOURCES: &str = "/api/resources";
    pub const HEALTH: &str = "/api/health";
    pub const SEARCH: &str = "/api/search";
    pub const FEEDBACK: &str = "/api/feedback";
}

// ─── Requests ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub session_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ClearHistoryRequest<'a> {
    pub session_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    pub k: usize,
}

#[derive(Debug, Serialize)]
pub struct FeedbackRequest<'a> {
    pub rating: u8,
    pub comment: &'a str,
    pub session_id: &'a str,
}

// ─── Responses ───────────────────────────────────────────────────────

/// Reply to a chat turn
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SourceDoc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_crisis: Option<bool>,
    /// Server clock, ISO-8601
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ChatReply {
    /// A plain reply with no sources and no risk flag
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// A reply the backend marked high-risk
    pub fn crisis(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_crisis: Some(true),
            ..Self::default()
        }
    }

    pub fn is_crisis(&self) -> bool {
        self.is_crisis.unwrap_or(false)
    }
}

/// A retrieved document chunk cited by a reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDoc {
    #[serde(default = "unknown_source")]
    pub source: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default = "unknown_chunk_type")]
    pub chunk_type: String,
    /// Either a page number or a label such as "N/A"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<Value>,
}

fn unknown_source() -> String {
    "Unknown".to_string()
}

fn unknown_chunk_type() -> String {
    "unknown".to_string()
}

/// Render a `page` value the way it should be shown to people.
pub fn page_label(page: &Value) -> Option<String> {
    match page {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Generic acknowledgement body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Support resources served by `GET /api/resources`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceBundle {
    #[serde(default)]
    pub crisis: BTreeMap<String, String>,
    #[serde(default)]
    pub general: BTreeMap<String, String>,
}

/// Body of `GET /api/health`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub rag_initialized: Option<bool>,
    #[serde(default)]
    pub vector_store_docs: Option<u64>,
    #[serde(default)]
    pub active_sessions: Option<u64>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// One retrieval hit from `POST /api/search`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub content: String,
    #[serde(default = "unknown_source")]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<Value>,
    #[serde(default = "unknown_chunk_type")]
    pub chunk_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub results: Vec<SearchHit>,
    #[serde(default)]
    pub count: usize,
}

/// Error body returned on non-2xx statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

/// Pull a short human-readable detail out of an error response body.
pub fn extract_error_detail(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(trimmed) {
        match (parsed.error, parsed.details) {
            (Some(error), Some(details)) => return format!("{error} ({details})"),
            (Some(error), None) => return error,
            (None, Some(details)) => return details,
            (None, None) => {}
        }
    }

    trimmed.to_string()
}
