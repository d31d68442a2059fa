//! Message store and the conversation state snapshot handed to presentation.

use super::message::Message;

/// Ordered conversation log plus its user-facing flags.
///
/// Owned by the controller behind a lock; presentation only ever sees a
/// [`ConversationState`] snapshot.
#[derive(Debug, Clone)]
pub(crate) struct MessageStore {
    messages: Vec<Message>,
    error: Option<String>,
    is_crisis_mode: bool,
}

impl MessageStore {
    /// A log holding just the welcome message
    pub(crate) fn new() -> Self {
        Self {
            messages: vec![Message::welcome()],
            error: None,
            is_crisis_mode: false,
        }
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub(crate) fn len(&self) -> usize {
        self.messages.len()
    }

    pub(crate) fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
    }

    pub(crate) fn clear_error(&mut self) {
        self.error = None;
    }

    /// Sticky: only `close_crisis_mode` or `reset` turn it off again.
    pub(crate) fn enter_crisis_mode(&mut self) {
        self.is_crisis_mode = true;
    }

    pub(crate) fn close_crisis_mode(&mut self) {
        self.is_crisis_mode = false;
    }

    /// Truncate back to a fresh welcome message and clear both flags.
    pub(crate) fn reset(&mut self) {
        *self = Self::new();
    }

    pub(crate) fn snapshot(&self, is_loading: bool) -> ConversationState {
        ConversationState {
            messages: self.messages.clone(),
            is_loading,
            error: self.error.clone(),
            is_crisis_mode: self.is_crisis_mode,
        }
    }
}

/// Point-in-time view of the conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationState {
    /// Display order is insertion order
    pub messages: Vec<Message>,
    /// True while at least one send is in flight
    pub is_loading: bool,
    /// The single active user-facing error, if any
    pub error: Option<String>,
    pub is_crisis_mode: bool,
}

impl ConversationState {
    /// Offer conversation starters only on an untouched, idle conversation.
    pub fn shows_sample_prompts(&self) -> bool {
        self.messages.len() == 1 && !self.is_loading
    }

    /// Clearing is pointless while only the welcome message is present.
    pub fn can_clear(&self) -> bool {
        self.messages.len() > 1
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}
