//! Request/response observability hook for the gateway.
//!
//! The gateway reports every call through a [`GatewayObserver`]. The default
//! observer writes structured `tracing` events; callers can install their own
//! (a closure works) to capture traffic elsewhere.

use std::time::Duration;
use tracing::{debug, warn};

use super::GatewayError;

/// One observable step of a backend call
#[derive(Debug)]
pub enum GatewayEvent<'a> {
    /// About to issue the request
    Request { method: &'a str, path: &'a str },

    /// The backend answered with a success status
    Response {
        method: &'a str,
        path: &'a str,
        status: u16,
        elapsed: Duration,
    },

    /// The call failed; `error` is what the caller will see
    Failure {
        method: &'a str,
        path: &'a str,
        error: &'a GatewayError,
        elapsed: Duration,
    },
}

impl GatewayEvent<'_> {
    pub fn path(&self) -> &str {
        match self {
            GatewayEvent::Request { path, .. }
            | GatewayEvent::Response { path, .. }
            | GatewayEvent::Failure { path, .. } => path,
        }
    }
}

/// Receives gateway events. Must not block.
pub trait GatewayObserver: Send + Sync {
    fn on_event(&self, event: &GatewayEvent<'_>);
}

impl<F> GatewayObserver for F
where
    F: Fn(&GatewayEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &GatewayEvent<'_>) {
        self(event)
    }
}

/// Logs gateway traffic through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl GatewayObserver for TracingObserver {
    fn on_event(&self, event: &GatewayEvent<'_>) {
        match event {
            GatewayEvent::Request { method, path } => {
                debug!(method = %method, path = %path, "API request");
            }
            GatewayEvent::Response {
                method,
                path,
                status,
                elapsed,
            } => {
                debug!(
                    method = %method,
                    path = %path,
                    status = *status,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "API response"
                );
            }
            GatewayEvent::Failure {
                method,
                path,
                error,
                elapsed,
            } => {
                warn!(
                    method = %method,
                    path = %path,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "API request failed: {}",
                    error
                );
            }
        }
    }
}
