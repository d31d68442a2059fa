//! Integration tests for the chat client against a mock assistant backend

use std::sync::{Arc, Mutex};
use std::time::Duration;

use mindful_chat::conversation::{notices, APOLOGY_TEXT, WELCOME_TEXT};
use mindful_chat::gateway::{GatewayEvent, GatewayObserver};
use mindful_chat::{
    ChatController, ChatError, ChatGateway, ClientConfig, GatewayError, HealthMonitor,
    HttpGateway, SessionId,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway_for(server: &MockServer) -> Arc<HttpGateway> {
    let config = ClientConfig::new(server.uri()).with_request_timeout(Duration::from_secs(5));
    Arc::new(HttpGateway::new(&config).unwrap())
}

/// A chat turn carries the session id and the reply's sources come back
#[tokio::test]
async fn test_send_message_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({
            "message": "How can I manage stress?",
            "session_id": "session_test"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Regular exercise and breathing exercises can help.",
            "sources": [
                {"source": "stress.pdf", "snippet": "Exercise reduces...", "chunk_type": "tip", "page": 4},
                {"snippet": "Breathing..."}
            ],
            "is_crisis": false,
            "timestamp": "2026-10-16T10:00:00.000000",
            "session_id": "session_test",
            "status": "success"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let controller =
        ChatController::with_session(gateway_for(&server), SessionId::from("session_test"));
    controller.send_message("How can I manage stress?").await.unwrap();

    let state = controller.state().await;
    assert_eq!(state.messages.len(), 3);
    assert_eq!(state.messages[0].text, WELCOME_TEXT);
    assert!(state.messages[1].is_user());

    let reply = &state.messages[2];
    assert_eq!(reply.text, "Regular exercise and breathing exercises can help.");
    assert_eq!(reply.timestamp, "2026-10-16T10:00:00.000000");
    assert_eq!(reply.sources.len(), 2);
    assert_eq!(reply.sources[0].source_name, "stress.pdf");
    assert_eq!(reply.sources[0].page.as_deref(), Some("4"));
    assert_eq!(reply.sources[1].source_name, "Unknown");
    assert!(!state.is_crisis_mode);
    assert!(state.error.is_none());
    assert!(!state.is_loading);
}

#[tokio::test]
async fn test_crisis_reply_turns_on_crisis_mode() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "I'm really concerned about what you're sharing.",
            "is_crisis": true,
            "resources": {"988 Suicide & Crisis Lifeline": "Call or text 988"},
            "status": "crisis"
        })))
        .mount(&server)
        .await;

    let controller = ChatController::new(gateway_for(&server));
    controller.send_message("I can't go on").await.unwrap();

    let state = controller.state().await;
    assert!(state.is_crisis_mode);
    assert!(state.last_message().unwrap().is_crisis_flagged);

    controller.close_crisis_mode().await;
    let state = controller.state().await;
    assert!(!state.is_crisis_mode);
    assert!(state.last_message().unwrap().is_crisis_flagged);
}

#[tokio::test]
async fn test_crisis_reply_with_unexpected_resource_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Please reach out to someone you trust.",
            "is_crisis": true,
            "resources": {"hotline": 988, "text": ["HELLO", 741741]}
        })))
        .mount(&server)
        .await;

    let controller = ChatController::new(gateway_for(&server));
    controller.send_message("I want to die").await.unwrap();

    let state = controller.state().await;
    assert!(state.is_crisis_mode);
    assert!(state.error.is_none());
    let last = state.last_message().unwrap();
    assert!(last.is_crisis_flagged);
    assert!(!last.is_transport_error);
    assert_eq!(last.text, "Please reach out to someone you trust.");
}

#[tokio::test]
async fn test_rate_limited_send() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(json!({"error": "Rate limit exceeded"})),
        )
        .mount(&server)
        .await;

    let controller = ChatController::new(gateway_for(&server));
    let err = controller.send_message("hello").await.unwrap_err();
    assert_eq!(err, ChatError::RateLimited);

    let state = controller.state().await;
    assert_eq!(state.error.as_deref(), Some(notices::RATE_LIMIT));
    let last = state.last_message().unwrap();
    assert!(last.is_transport_error);
    assert_eq!(last.text, APOLOGY_TEXT);
}

#[tokio::test]
async fn test_server_error_detail_is_extracted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": "Chatbot is not ready",
            "details": "RAG system not initialized"
        })))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let err = gateway
        .send("hello", &SessionId::from("session_x"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        GatewayError::status(503, "Chatbot is not ready (RAG system not initialized)")
    );

    let controller = ChatController::new(gateway);
    assert_eq!(
        controller.send_message("hello").await.unwrap_err(),
        ChatError::Server
    );
}

#[tokio::test]
async fn test_malformed_success_body_is_a_server_fault() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let controller = ChatController::new(gateway_for(&server));
    assert_eq!(
        controller.send_message("hello").await.unwrap_err(),
        ChatError::Server
    );
    assert_eq!(
        controller.state().await.error.as_deref(),
        Some(notices::SERVER_ERROR)
    );
}

#[tokio::test]
async fn test_timeout_is_a_network_fault() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"message": "too late"}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = ClientConfig::new(server.uri()).with_request_timeout(Duration::from_millis(200));
    let controller = ChatController::new(Arc::new(HttpGateway::new(&config).unwrap()));

    assert_eq!(
        controller.send_message("hello").await.unwrap_err(),
        ChatError::Network
    );
    let state = controller.state().await;
    assert_eq!(state.error.as_deref(), Some(notices::NETWORK_ERROR));
    assert!(!state.is_loading);
}

#[tokio::test]
async fn test_unreachable_backend() {
    // Grab a free port and release it so nothing is listening there
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let config = ClientConfig::new(format!("http://127.0.0.1:{port}"))
        .with_request_timeout(Duration::from_secs(2));
    let controller = ChatController::new(Arc::new(HttpGateway::new(&config).unwrap()));

    assert_eq!(
        controller.send_message("anyone there?").await.unwrap_err(),
        ChatError::Network
    );
}

#[tokio::test]
async fn test_clear_chat_resets_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Hi there"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/clear-history"))
        .and(body_json(json!({"session_id": "session_clear"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Chat history cleared",
            "status": "success"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let controller =
        ChatController::with_session(gateway_for(&server), SessionId::from("session_clear"));
    controller.send_message("hello").await.unwrap();
    controller.clear_chat().await.unwrap();

    let state = controller.state().await;
    assert_eq!(state.messages.len(), 1);
    assert!(state.messages[0].is_welcome());
    assert!(state.shows_sample_prompts());
}

#[tokio::test]
async fn test_clear_chat_failure_keeps_log() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Hi there"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/clear-history"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
        .mount(&server)
        .await;

    let controller = ChatController::new(gateway_for(&server));
    controller.send_message("hello").await.unwrap();
    let before = controller.state().await.messages;

    assert_eq!(
        controller.clear_chat().await.unwrap_err(),
        ChatError::HistoryClearFailed
    );
    let state = controller.state().await;
    assert_eq!(state.messages, before);
    assert_eq!(state.error.as_deref(), Some(notices::CLEAR_FAILED));
}

#[tokio::test]
async fn test_auxiliary_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/resources"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "crisis": {"988 Suicide & Crisis Lifeline": "Call or text 988"},
            "general": {"NAMI": "nami.org"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/search"))
        .and(body_json(json!({"query": "sleep", "k": 3})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": "sleep",
            "results": [{"content": "Keep a regular schedule.", "source": "sleep.pdf", "page": "2"}],
            "count": 1
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/feedback"))
        .and(body_json(json!({"rating": 5, "comment": "helpful", "session_id": "session_fb"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Thank you for your feedback!",
            "status": "success"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);

    let resources = gateway.resources().await.unwrap();
    assert_eq!(
        resources.crisis.get("988 Suicide & Crisis Lifeline").map(String::as_str),
        Some("Call or text 988")
    );
    assert_eq!(resources.general.len(), 1);

    let results = gateway.search("sleep", 3).await.unwrap();
    assert_eq!(results.count, 1);
    assert_eq!(results.results[0].source, "sleep.pdf");
    assert_eq!(results.results[0].chunk_type, "unknown");

    let ack = gateway
        .submit_feedback(5, "helpful", &SessionId::from("session_fb"))
        .await
        .unwrap();
    assert_eq!(ack.message.as_deref(), Some("Thank you for your feedback!"));
}

#[tokio::test]
async fn test_health_monitor_against_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "rag_initialized": true,
            "vector_store_docs": 120,
            "active_sessions": 2
        })))
        .mount(&server)
        .await;

    let (monitor, online) = HealthMonitor::new(gateway_for(&server), Duration::from_secs(60));
    assert!(monitor.check_once().await);
    assert!(*online.borrow());

    server.reset().await;
    assert!(!monitor.check_once().await);
    assert!(!*online.borrow());
}

#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<String>>,
}

impl GatewayObserver for Recorder {
    fn on_event(&self, event: &GatewayEvent<'_>) {
        let label = match event {
            GatewayEvent::Request { method, path } => format!("request {method} {path}"),
            GatewayEvent::Response { status, path, .. } => format!("response {status} {path}"),
            GatewayEvent::Failure { path, .. } => format!("failure {path}"),
        };
        self.seen.lock().unwrap().push(label);
    }
}

#[tokio::test]
async fn test_observer_sees_every_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .mount(&server)
        .await;

    let recorder = Arc::new(Recorder::default());
    let config = ClientConfig::new(server.uri());
    let gateway = HttpGateway::new(&config)
        .unwrap()
        .with_observer(recorder.clone());

    gateway
        .send("hello", &SessionId::from("session_obs"))
        .await
        .unwrap();
    // Nothing is mounted for clear-history, so the mock server answers 404
    gateway
        .clear_history(&SessionId::from("session_obs"))
        .await
        .unwrap_err();

    assert_eq!(
        *recorder.seen.lock().unwrap(),
        vec![
            "request POST /api/chat".to_string(),
            "response 200 /api/chat".to_string(),
            "request POST /api/clear-history".to_string(),
            "failure /api/clear-history".to_string(),
        ]
    );
}

/// Two sends in flight at once each get their own user turn and reply
#[tokio::test]
async fn test_concurrent_sends_both_complete() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"message": "noted"}))
                .set_delay(Duration::from_millis(50)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let controller = ChatController::new(gateway_for(&server));
    let (a, b) = futures::future::join(
        controller.send_message("first"),
        controller.send_message("second"),
    )
    .await;
    a.unwrap();
    b.unwrap();

    let state = controller.state().await;
    assert_eq!(state.messages.len(), 5);
    assert_eq!(state.messages.iter().filter(|m| m.is_user()).count(), 2);
    assert!(!state.is_loading);
}
