//! Chat fault taxonomy and the user-facing notices for each fault.

use crate::gateway::GatewayError;

/// User-facing notice strings
pub mod notices {
    pub const EMPTY_MESSAGE: &str = "Please enter a message.";
    pub const NETWORK_ERROR: &str =
        "Unable to connect to the server. Please check your connection.";
    pub const RATE_LIMIT: &str = "Too many requests. Please wait a moment.";
    pub const SERVER_ERROR: &str = "Something went wrong. Please try again.";
    pub const CLEAR_FAILED: &str = "Failed to clear chat history";
}

/// A classified conversation fault.
///
/// `Display` renders the notice shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    /// Empty or whitespace-only input; never reaches the network
    #[error("{}", notices::EMPTY_MESSAGE)]
    EmptyMessage,

    /// Connectivity failure or timeout
    #[error("{}", notices::NETWORK_ERROR)]
    Network,

    /// HTTP 429
    #[error("{}", notices::RATE_LIMIT)]
    RateLimited,

    /// Any other backend fault
    #[error("{}", notices::SERVER_ERROR)]
    Server,

    /// The backend refused or failed to discard session history
    #[error("{}", notices::CLEAR_FAILED)]
    HistoryClearFailed,
}

impl ChatError {
    /// Classify a failed chat call.
    pub fn classify(err: &GatewayError) -> Self {
        if err.is_network() {
            ChatError::Network
        } else if err.is_rate_limited() {
            ChatError::RateLimited
        } else {
            ChatError::Server
        }
    }

    /// The notice shown in the error banner
    pub fn notice(&self) -> &'static str {
        match self {
            ChatError::EmptyMessage => notices::EMPTY_MESSAGE,
            ChatError::Network => notices::NETWORK_ERROR,
            ChatError::RateLimited => notices::RATE_LIMIT,
            ChatError::Server => notices::SERVER_ERROR,
            ChatError::HistoryClearFailed => notices::CLEAR_FAILED,
        }
    }
}
