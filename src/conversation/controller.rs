//! Conversation controller
//!
//! Owns the session identity and the message store, drives the
//! request/response cycle with the backend gateway, classifies failures and
//! switches crisis mode on when the backend flags a reply.
//!
//! The controller is a cheap cloneable handle. Presentation holds a clone,
//! reads [`ConversationState`] snapshots and calls the operations below; it
//! never touches the store directly.
//!
//! Sends are neither queued nor de-duplicated. Two overlapping sends each
//! append their user turn immediately and their reply whenever the network
//! returns it, so replies can land out of order. `is_loading` stays true until
//! the last in-flight send has settled.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::errors::ChatError;
use super::message::Message;
use super::store::{ConversationState, MessageStore};
use crate::crisis::CrisisScreen;
use crate::gateway::ChatGateway;
use crate::session::SessionId;

/// Handle to one conversation session
#[derive(Clone)]
pub struct ChatController {
    inner: Arc<Inner>,
}

struct Inner {
    gateway: Arc<dyn ChatGateway>,
    session_id: SessionId,
    store: RwLock<MessageStore>,
    /// Number of sends awaiting the backend
    in_flight: AtomicUsize,
    screen: CrisisScreen,
}

/// Marks one send as in flight; releases it on every exit path, including
/// cancellation of the send future.
struct InFlightGuard<'a>(&'a AtomicUsize);

impl<'a> InFlightGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ChatController {
    /// Start a session: fresh session id, log seeded with the welcome
    /// message, idle, no error, crisis mode off.
    pub fn new(gateway: Arc<dyn ChatGateway>) -> Self {
        Self::with_session(gateway, SessionId::generate())
    }

    /// Start a session under a caller-chosen identifier.
    pub fn with_session(gateway: Arc<dyn ChatGateway>, session_id: SessionId) -> Self {
        info!("Chat session started: {}", session_id);
        Self {
            inner: Arc::new(Inner {
                gateway,
                session_id,
                store: RwLock::new(MessageStore::new()),
                in_flight: AtomicUsize::new(0),
                screen: CrisisScreen::new(),
            }),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.inner.session_id
    }

    pub fn is_loading(&self) -> bool {
        self.inner.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Snapshot of the conversation for presentation
    pub async fn state(&self) -> ConversationState {
        let store = self.inner.store.read().await;
        store.snapshot(self.is_loading())
    }

    /// Send one user turn.
    ///
    /// Empty input sets the empty-message notice and returns without touching
    /// the log or the network. Otherwise the user turn is appended before the
    /// backend is called, and exactly one assistant turn follows: the reply,
    /// or a transport-error apology when the call fails. The returned error
    /// is the classification already written to `error`.
    pub async fn send_message(&self, text: &str) -> Result<(), ChatError> {
        if text.trim().is_empty() {
            self.inner
                .store
                .write()
                .await
                .set_error(ChatError::EmptyMessage.notice());
            debug!("Rejected empty message");
            return Err(ChatError::EmptyMessage);
        }

        if self.inner.screen.mentions_crisis_language(text) {
            debug!("Outgoing message contains crisis language; awaiting backend classification");
        }

        let _in_flight = {
            let mut store = self.inner.store.write().await;
            store.push(Message::user(text));
            let guard = InFlightGuard::enter(&self.inner.in_flight);
            store.clear_error();
            guard
        };

        let result = self.inner.gateway.send(text, &self.inner.session_id).await;

        let mut store = self.inner.store.write().await;
        match result {
            Ok(reply) => {
                if reply.is_crisis() {
                    warn!(session = %self.inner.session_id, "Reply flagged as crisis; crisis mode on");
                    store.enter_crisis_mode();
                }
                store.push(Message::from_reply(reply));
                debug!("Conversation now has {} messages", store.len());
                Ok(())
            }
            Err(e) => {
                let fault = ChatError::classify(&e);
                error!("Error sending message: {}", e);
                store.set_error(fault.notice());
                store.push(Message::transport_error());
                Err(fault)
            }
        }
    }

    /// Discard the conversation here and on the server.
    ///
    /// Local state is only reset once the backend confirms; on failure the
    /// log is left exactly as it was and the clear-failed notice is set.
    pub async fn clear_chat(&self) -> Result<(), ChatError> {
        let result = self
            .inner
            .gateway
            .clear_history(&self.inner.session_id)
            .await;

        let mut store = self.inner.store.write().await;
        match result {
            Ok(_) => {
                store.reset();
                info!("Cleared chat history for session {}", self.inner.session_id);
                Ok(())
            }
            Err(e) => {
                error!("Error clearing chat: {}", e);
                store.set_error(ChatError::HistoryClearFailed.notice());
                Err(ChatError::HistoryClearFailed)
            }
        }
    }

    pub async fn dismiss_error(&self) {
        self.inner.store.write().await.clear_error();
    }

    /// Turn crisis mode off. Flagged messages keep their own flag.
    pub async fn close_crisis_mode(&self) {
        self.inner.store.write().await.close_crisis_mode();
    }
}
