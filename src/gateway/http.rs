//! HTTP implementation of the backend gateway (reqwest + JSON)

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{ChatGateway, GatewayError, GatewayEvent, GatewayObserver, GatewayResult, TracingObserver};
use crate::config::ClientConfig;
use crate::protocol::{
    endpoints, extract_error_detail, Ack, ChatReply, ChatRequest, ClearHistoryRequest,
    FeedbackRequest, HealthStatus, ResourceBundle, SearchRequest, SearchResults,
};
use crate::session::SessionId;
use crate::{MindfulError, Result};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Longest error detail kept from a non-2xx body
const MAX_ERROR_DETAIL_CHARS: usize = 300;

/// Talks to the assistant backend over HTTP
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    observer: Arc<dyn GatewayObserver>,
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpGateway {
    /// Build a gateway for the configured backend. Traffic is logged through
    /// [`TracingObserver`] until another observer is installed.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("mindful-chat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MindfulError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            observer: Arc::new(TracingObserver),
        })
    }

    /// Replace the observability hook.
    pub fn with_observer(mut self, observer: Arc<dyn GatewayObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        self.call::<(), T>(Method::GET, path, None).await
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> GatewayResult<T> {
        self.call(Method::POST, path, Some(body)).await
    }

    async fn call<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> GatewayResult<T> {
        let method_name = method.as_str().to_string();
        self.observer.on_event(&GatewayEvent::Request {
            method: &method_name,
            path,
        });

        let started = Instant::now();
        let result = self.execute(method, path, body).await;
        let elapsed = started.elapsed();

        match &result {
            Ok((status, _)) => self.observer.on_event(&GatewayEvent::Response {
                method: &method_name,
                path,
                status: *status,
                elapsed,
            }),
            Err(error) => self.observer.on_event(&GatewayEvent::Failure {
                method: &method_name,
                path,
                error,
                elapsed,
            }),
        }

        result.map(|(_, value)| value)
    }

    async fn execute<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> GatewayResult<(u16, T)> {
        let mut request = self.client.request(method, self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(GatewayError::from_reqwest)?;
        let status = response.status();
        let text = response.text().await.map_err(GatewayError::from_reqwest)?;

        if !status.is_success() {
            let detail = truncate_detail(&extract_error_detail(&text), MAX_ERROR_DETAIL_CHARS);
            return Err(GatewayError::status(status.as_u16(), detail));
        }

        let value = serde_json::from_str::<T>(&text)
            .map_err(|e| GatewayError::Decode(format!("{path}: {e}")))?;
        Ok((status.as_u16(), value))
    }
}

fn truncate_detail(detail: &str, max_chars: usize) -> String {
    if detail.chars().count() <= max_chars {
        return detail.to_string();
    }
    let mut truncated: String = detail.chars().take(max_chars).collect();
    truncated.push_str("... [truncated]");
    truncated
}

#[async_trait]
impl ChatGateway for HttpGateway {
    async fn send(&self, message: &str, session_id: &SessionId) -> GatewayResult<ChatReply> {
        let body = ChatRequest {
            message,
            session_id: session_id.as_str(),
        };
        self.post_json(endpoints::CHAT, &body).await
    }

    async fn clear_history(&self, session_id: &SessionId) -> GatewayResult<Ack> {
        let body = ClearHistoryRequest {
            session_id: session_id.as_str(),
        };
        self.post_json(endpoints::CLEAR_HISTORY, &body).await
    }

    async fn resources(&self) -> GatewayResult<ResourceBundle> {
        self.get_json(endpoints::RESOURCES).await
    }

    async fn health(&self) -> GatewayResult<HealthStatus> {
        self.get_json(endpoints::HEALTH).await
    }

    async fn search(&self, query: &str, k: usize) -> GatewayResult<SearchResults> {
        let body = SearchRequest { query, k };
        self.post_json(endpoints::SEARCH, &body).await
    }

    async fn submit_feedback(
        &self,
        rating: u8,
        comment: &str,
        session_id: &SessionId,
    ) -> GatewayResult<Ack> {
        let body = FeedbackRequest {
            rating,
            comment,
            session_id: session_id.as_str(),
        };
        self.post_json(endpoints::FEEDBACK, &body).await
    }
}
