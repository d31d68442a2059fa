//! Backend gateway
//!
//! The contract between the conversation controller and the remote assistant
//! service. The controller only ever talks to `dyn ChatGateway`, so tests and
//! alternative transports can stand in for [`HttpGateway`].

mod http;
mod observer;
#[cfg(test)]
pub(crate) mod testing;

pub use http::HttpGateway;
pub use observer::{GatewayEvent, GatewayObserver, TracingObserver};

use crate::protocol::{Ack, ChatReply, HealthStatus, ResourceBundle, SearchResults};
use crate::session::SessionId;
use async_trait::async_trait;

/// Result type for gateway calls
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// A failed backend call.
///
/// Every transport, timeout and non-2xx failure lands in one of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Connection refused, DNS failure, timeout, dropped stream
    #[error("network: {0}")]
    Network(String),

    /// The backend answered with a non-success status
    #[error("HTTP {status}: {detail}")]
    Status { status: u16, detail: String },

    /// The backend answered 2xx with a body we could not decode
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn status(status: u16, detail: impl Into<String>) -> Self {
        GatewayError::Status {
            status,
            detail: detail.into(),
        }
    }

    /// HTTP 429
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, GatewayError::Status { status: 429, .. })
    }

    pub fn is_network(&self) -> bool {
        matches!(self, GatewayError::Network(_))
    }

    /// Map a transport-level reqwest failure.
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GatewayError::Network(format!("timeout: {e}"))
        } else if e.is_connect() {
            GatewayError::Network(format!("connection failed: {e}"))
        } else if e.is_decode() {
            GatewayError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            GatewayError::status(status.as_u16(), e.to_string())
        } else {
            GatewayError::Network(e.to_string())
        }
    }
}

/// Operations the assistant backend exposes.
///
/// `send` and `clear_history` drive the conversation; `resources` and
/// `search` feed presentation; `health` feeds the liveness poller;
/// `submit_feedback` is fire-and-acknowledge.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Send one user turn and wait for the assistant's reply.
    async fn send(&self, message: &str, session_id: &SessionId) -> GatewayResult<ChatReply>;

    /// Discard server-side history for the session.
    async fn clear_history(&self, session_id: &SessionId) -> GatewayResult<Ack>;

    async fn resources(&self) -> GatewayResult<ResourceBundle>;

    async fn health(&self) -> GatewayResult<HealthStatus>;

    /// Retrieval-only lookup, no generation.
    async fn search(&self, query: &str, k: usize) -> GatewayResult<SearchResults>;

    async fn submit_feedback(
        &self,
        rating: u8,
        comment: &str,
        session_id: &SessionId,
    ) -> GatewayResult<Ack>;
}
