//! Conversation turns

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::protocol::{page_label, ChatReply, SourceDoc};

pub const WELCOME_TEXT: &str =
    "Hello! I'm here to provide mental health support and information. How can I help you today?";

/// Shown in place of a reply when the backend call failed
pub const APOLOGY_TEXT: &str =
    "I'm sorry, I'm having trouble responding right now. Please try again in a moment.";

/// Conversation starters offered while the log holds only the welcome message
pub const SAMPLE_PROMPTS: [&str; 5] = [
    "What is anxiety?",
    "How can I manage stress?",
    "Tell me about depression",
    "What are coping strategies?",
    "How to improve sleep?",
];

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    User,
    Assistant,
}

/// A document chunk the assistant drew on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub source_name: String,
    pub snippet: String,
    pub chunk_type: String,
    pub page: Option<String>,
}

impl From<SourceDoc> for SourceRef {
    fn from(doc: SourceDoc) -> Self {
        Self {
            page: doc.page.as_ref().and_then(page_label),
            source_name: doc.source,
            snippet: doc.snippet,
            chunk_type: doc.chunk_type,
        }
    }
}

/// One turn in the conversation log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub origin: Origin,
    /// ISO-8601; the server's clock when it supplied one, ours otherwise
    pub timestamp: String,
    pub sources: Vec<SourceRef>,
    pub is_crisis_flagged: bool,
    pub is_transport_error: bool,
}

/// Current client time as an ISO-8601 UTC string
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl Message {
    fn assistant(text: impl Into<String>, timestamp: String) -> Self {
        Self {
            text: text.into(),
            origin: Origin::Assistant,
            timestamp,
            sources: Vec::new(),
            is_crisis_flagged: false,
            is_transport_error: false,
        }
    }

    /// The greeting that opens every conversation
    pub fn welcome() -> Self {
        Self::assistant(WELCOME_TEXT, now_timestamp())
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: Origin::User,
            timestamp: now_timestamp(),
            sources: Vec::new(),
            is_crisis_flagged: false,
            is_transport_error: false,
        }
    }

    /// Build the assistant turn for a backend reply.
    pub fn from_reply(reply: ChatReply) -> Self {
        let is_crisis_flagged = reply.is_crisis();
        let timestamp = reply
            .timestamp
            .filter(|ts| !ts.trim().is_empty())
            .unwrap_or_else(now_timestamp);
        let sources = reply
            .sources
            .unwrap_or_default()
            .into_iter()
            .map(SourceRef::from)
            .collect();

        Self {
            sources,
            is_crisis_flagged,
            ..Self::assistant(reply.message, timestamp)
        }
    }

    /// Stand-in assistant turn recorded when the backend call failed
    pub fn transport_error() -> Self {
        Self {
            is_transport_error: true,
            ..Self::assistant(APOLOGY_TEXT, now_timestamp())
        }
    }

    pub fn is_user(&self) -> bool {
        self.origin == Origin::User
    }

    pub fn is_assistant(&self) -> bool {
        self.origin == Origin::Assistant
    }

    pub fn is_welcome(&self) -> bool {
        self.is_assistant() && !self.is_transport_error && self.text == WELCOME_TEXT
    }
}
