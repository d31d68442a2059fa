//! Mindful Chat - conversation client for a mental-health support assistant
//!
//! - Owns the conversation for one session and talks to the assistant backend
//! - Classifies backend failures into user-facing notices
//! - Switches to crisis mode when the backend flags a reply as high-risk

pub mod config;
pub mod console;
pub mod conversation;
pub mod crisis;
pub mod gateway;
pub mod health;
pub mod protocol;
pub mod session;

pub use config::ClientConfig;
pub use conversation::{ChatController, ChatError, ConversationState, Message, Origin};
pub use gateway::{ChatGateway, GatewayError, GatewayObserver, HttpGateway};
pub use health::HealthMonitor;
pub use session::SessionId;

/// Result type for Mindful Chat operations
pub type Result<T> = std::result::Result<T, MindfulError>;

/// Errors that can occur in Mindful Chat
#[derive(Debug, thiserror::Error)]
pub enum MindfulError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to build HTTP client: {0}")]
    Http(String),

    #[error("Backend error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
