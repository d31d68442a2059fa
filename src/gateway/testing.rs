//! In-memory gateway double for unit tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Notify;

use super::{ChatGateway, GatewayError, GatewayResult};
use crate::protocol::{Ack, ChatReply, HealthStatus, ResourceBundle, SearchHit, SearchResults};
use crate::session::SessionId;

/// Replays scripted outcomes in order and records every call
#[derive(Default)]
pub(crate) struct ScriptedGateway {
    replies: Mutex<VecDeque<GatewayResult<ChatReply>>>,
    clears: Mutex<VecDeque<GatewayResult<Ack>>>,
    sent: Mutex<Vec<(String, String)>>,
    cleared: Mutex<Vec<String>>,
    feedback: Mutex<Vec<(u8, String, String)>>,
    resources: Option<ResourceBundle>,
    unhealthy: AtomicBool,
    /// When set, the first send waits for `release` before answering
    hold_first: bool,
    pub(crate) entered: Notify,
    pub(crate) release: Notify,
}

impl ScriptedGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn held() -> Self {
        Self {
            hold_first: true,
            ..Self::default()
        }
    }

    pub(crate) fn reply(self, reply: GatewayResult<ChatReply>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub(crate) fn clear(self, result: GatewayResult<Ack>) -> Self {
        self.clears.lock().unwrap().push_back(result);
        self
    }

    pub(crate) fn with_resources(mut self, resources: ResourceBundle) -> Self {
        self.resources = Some(resources);
        self
    }

    pub(crate) fn set_healthy(&self, healthy: bool) {
        self.unhealthy.store(!healthy, Ordering::SeqCst);
    }

    pub(crate) fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn cleared(&self) -> Vec<String> {
        self.cleared.lock().unwrap().clone()
    }

    pub(crate) fn feedback(&self) -> Vec<(u8, String, String)> {
        self.feedback.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatGateway for ScriptedGateway {
    async fn send(&self, message: &str, session_id: &SessionId) -> GatewayResult<ChatReply> {
        let call_index = {
            let mut sent = self.sent.lock().unwrap();
            sent.push((message.to_string(), session_id.to_string()));
            sent.len() - 1
        };
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Network("no scripted reply".into())));
        if self.hold_first && call_index == 0 {
            self.entered.notify_one();
            self.release.notified().await;
        }
        reply
    }

    async fn clear_history(&self, session_id: &SessionId) -> GatewayResult<Ack> {
        self.cleared.lock().unwrap().push(session_id.to_string());
        self.clears
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Ack::default()))
    }

    async fn resources(&self) -> GatewayResult<ResourceBundle> {
        self.resources
            .clone()
            .ok_or_else(|| GatewayError::status(500, "no resources scripted"))
    }

    async fn health(&self) -> GatewayResult<HealthStatus> {
        if self.unhealthy.load(Ordering::SeqCst) {
            return Err(GatewayError::Network("connection refused".into()));
        }
        Ok(HealthStatus {
            status: "healthy".to_string(),
            ..HealthStatus::default()
        })
    }

    async fn search(&self, query: &str, k: usize) -> GatewayResult<SearchResults> {
        let results: Vec<SearchHit> = (1..=k.min(2))
            .map(|i| SearchHit {
                content: format!("passage {i} about {query}"),
                source: format!("doc{i}.pdf"),
                page: None,
                chunk_type: "paragraph".to_string(),
            })
            .collect();
        Ok(SearchResults {
            query: query.to_string(),
            count: results.len(),
            results,
        })
    }

    async fn submit_feedback(
        &self,
        rating: u8,
        comment: &str,
        session_id: &SessionId,
    ) -> GatewayResult<Ack> {
        self.feedback
            .lock()
            .unwrap()
            .push((rating, comment.to_string(), session_id.to_string()));
        Ok(Ack {
            message: Some("Thank you for your feedback!".to_string()),
            status: Some("success".to_string()),
        })
    }
}
