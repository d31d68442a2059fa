//! Conversation module
//!
//! The session controller, the message store it owns, the turn model and the
//! fault taxonomy applied to backend failures.

mod controller;
mod errors;
mod message;
mod store;

pub use controller::ChatController;
pub use errors::{notices, ChatError};
pub use message::{
    now_timestamp, Message, Origin, SourceRef, APOLOGY_TEXT, SAMPLE_PROMPTS, WELCOME_TEXT,
};
pub use store::ConversationState;
