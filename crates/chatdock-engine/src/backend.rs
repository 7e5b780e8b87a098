//! Backends that turn a [`ChatRequest`] into a [`ChatResponse`].
//!
//! [`HttpBackend`] talks to the real service. [`ScriptedBackend`] replays
//! canned outcomes and records what it was asked, for tests and headless runs.

use crate::protocol::{parse_answer, ChatError, ChatRequest, ChatResponse, HealthStatus};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Url;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// Something that can answer a question.
///
/// Implementations must report every failure as a [`ChatError`]; they never
/// panic on bad input from the server.
pub trait ChatBackend: Send + Sync {
    /// Perform one round trip.
    fn ask(
        &self,
        request: ChatRequest,
    ) -> impl Future<Output = Result<ChatResponse, ChatError>> + Send;
}

/// Transport settings for [`HttpBackend`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HttpOptions {
    /// Whole-request timeout. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
    /// Connection establishment timeout.
    pub connect_timeout: Option<Duration>,
}

/// JSON-over-HTTP backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpBackend {
    /// Create a backend posting to `endpoint`.
    pub fn new(endpoint: &str, options: HttpOptions) -> Result<Self, BackendError> {
        let endpoint = parse_endpoint(endpoint)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = options.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| BackendError::Client(e.to_string()))?;

        Ok(Self { http, endpoint })
    }

    /// The chat endpoint URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The health probe URL: the chat endpoint's last segment replaced by `health`.
    ///
    /// A trailing slash is ignored, so `/api/chat/` also maps to `/api/health`.
    pub fn health_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        // http(s) URLs always have a path, so `path_segments_mut` succeeds.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().pop().push("health");
        }
        url.set_query(None);
        url.set_fragment(None);
        url
    }

    /// Probe the service's health route.
    pub async fn health(&self) -> Result<HealthStatus, ChatError> {
        let url = self.health_url();
        debug!(%url, "Probing backend health");

        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(ChatError::Server {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|e| ChatError::Malformed(e.to_string()))
    }

    async fn post_question(&self, request: ChatRequest) -> Result<ChatResponse, ChatError> {
        let request_id = Uuid::new_v4();
        debug!(
            %request_id,
            endpoint = %self.endpoint,
            session_id = %request.session_id,
            question = %request.question,
            "Sending chat request"
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(%request_id, error = %e, "Chat request did not reach the server");
                ChatError::Transport(e.to_string())
            })?;

        let status = response.status();
        debug!(%request_id, status = status.as_u16(), "Received chat response");

        let body = response.text().await.map_err(|e| {
            warn!(%request_id, error = %e, "Failed to read chat response body");
            ChatError::Transport(e.to_string())
        })?;

        if !status.is_success() {
            warn!(%request_id, status = status.as_u16(), body = %body, "Chat request failed");
            return Err(ChatError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let parsed = parse_answer(&body).inspect_err(|e| {
            warn!(%request_id, error = %e, "Chat response had no usable answer");
        })?;
        debug!(%request_id, answer_len = parsed.answer.len(), "Parsed chat answer");
        Ok(parsed)
    }
}

impl ChatBackend for HttpBackend {
    fn ask(
        &self,
        request: ChatRequest,
    ) -> impl Future<Output = Result<ChatResponse, ChatError>> + Send {
        self.post_question(request)
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, BackendError> {
    let url = Url::parse(raw).map_err(|e| BackendError::InvalidEndpoint {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(BackendError::InvalidEndpoint {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

/// Errors constructing a backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Endpoint is not an absolute http(s) URL.
    #[error("Invalid endpoint {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// The HTTP client could not be initialised.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

#[derive(Debug, Default)]
struct Script {
    outcomes: VecDeque<Result<ChatResponse, ChatError>>,
    requests: Vec<ChatRequest>,
}

/// Replays queued outcomes in order and records every request.
///
/// Clones share the same script. When the queue is empty, `ask` fails with a
/// transport error.
#[derive(Debug, Clone, Default)]
pub struct ScriptedBackend {
    script: Arc<Mutex<Script>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful answer.
    #[must_use]
    pub fn answer(self, answer: impl Into<String>) -> Self {
        self.push(Ok(ChatResponse::new(answer)));
        self
    }

    /// Queue a failure.
    #[must_use]
    pub fn fail(self, error: ChatError) -> Self {
        self.push(Err(error));
        self
    }

    /// Queue an outcome.
    pub fn push(&self, outcome: Result<ChatResponse, ChatError>) {
        self.lock().outcomes.push_back(outcome);
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.lock().requests.clone()
    }

    /// Number of requests received so far.
    pub fn call_count(&self) -> usize {
        self.lock().requests.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn next_outcome(&self, request: ChatRequest) -> Result<ChatResponse, ChatError> {
        let mut script = self.lock();
        script.requests.push(request);
        script
            .outcomes
            .pop_front()
            .unwrap_or_else(|| Err(ChatError::Transport("no scripted response".into())))
    }
}

impl ChatBackend for ScriptedBackend {
    fn ask(
        &self,
        request: ChatRequest,
    ) -> impl Future<Output = Result<ChatResponse, ChatError>> + Send {
        let outcome = self.next_outcome(request);
        async move { outcome }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::DEFAULT_SESSION_ID;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend_for(server: &MockServer) -> HttpBackend {
        HttpBackend::new(&format!("{}/chat", server.uri()), HttpOptions::default()).unwrap()
    }

    fn question(text: &str) -> ChatRequest {
        ChatRequest::new(text, DEFAULT_SESSION_ID)
    }

    #[tokio::test]
    async fn test_ask_posts_json_and_returns_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(header("content-type", "application/json"))
            .and(header("accept", "application/json"))
            .and(body_json(serde_json::json!({
                "question": "What plans do you offer?",
                "session_id": "default"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "answer": "We offer auto, home, and life insurance."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = backend_for(&server)
            .ask(question("What plans do you offer?"))
            .await
            .unwrap();
        assert_eq!(response.answer, "We offer auto, home, and life insurance.");
    }

    #[tokio::test]
    async fn test_ask_maps_500_to_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(500).set_body_string("{\"detail\":\"boom\"}"))
            .mount(&server)
            .await;

        let err = backend_for(&server).ask(question("hi")).await.unwrap_err();
        assert_eq!(
            err,
            ChatError::Server {
                status: 500,
                body: "{\"detail\":\"boom\"}".into()
            }
        );
    }

    #[tokio::test]
    async fn test_ask_maps_404_to_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = backend_for(&server).ask(question("hi")).await.unwrap_err();
        assert!(matches!(err, ChatError::Server { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_ask_maps_missing_answer_to_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"reply": "hi"})),
            )
            .mount(&server)
            .await;

        let err = backend_for(&server).ask(question("hi")).await.unwrap_err();
        assert!(matches!(err, ChatError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_ask_maps_refused_connection_to_transport() {
        // Bind then drop to get a port nothing listens on.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let backend = HttpBackend::new(
            &format!("http://127.0.0.1:{port}/chat"),
            HttpOptions::default(),
        )
        .unwrap();

        let err = backend.ask(question("hi")).await.unwrap_err();
        assert!(matches!(err, ChatError::Transport(_)));
    }

    #[tokio::test]
    async fn test_request_timeout_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"answer": "late"}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let backend = HttpBackend::new(
            &format!("{}/chat", server.uri()),
            HttpOptions {
                request_timeout: Some(Duration::from_millis(200)),
                connect_timeout: None,
            },
        )
        .unwrap();

        let err = backend.ask(question("hi")).await.unwrap_err();
        assert!(matches!(err, ChatError::Transport(_)));
    }

    #[tokio::test]
    async fn test_health_probe() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "healthy"})),
            )
            .mount(&server)
            .await;

        let status = backend_for(&server).health().await.unwrap();
        assert!(status.is_healthy());
    }

    #[test]
    fn test_health_url_replaces_last_segment() {
        let backend =
            HttpBackend::new("https://qa.example.com/api/chat", HttpOptions::default()).unwrap();
        assert_eq!(
            backend.health_url().as_str(),
            "https://qa.example.com/api/health"
        );
    }

    #[test]
    fn test_health_url_ignores_trailing_slash_and_query() {
        for endpoint in [
            "https://qa.example.com/api/chat/",
            "https://qa.example.com/api/chat?lang=en",
        ] {
            let backend = HttpBackend::new(endpoint, HttpOptions::default()).unwrap();
            assert_eq!(
                backend.health_url().as_str(),
                "https://qa.example.com/api/health",
                "endpoint {endpoint}"
            );
        }

        let root = HttpBackend::new("http://localhost:8000/", HttpOptions::default()).unwrap();
        assert_eq!(root.health_url().as_str(), "http://localhost:8000/health");
    }

    #[test]
    fn test_invalid_endpoints_rejected() {
        assert!(matches!(
            HttpBackend::new("not a url", HttpOptions::default()),
            Err(BackendError::InvalidEndpoint { .. })
        ));
        assert!(matches!(
            HttpBackend::new("ftp://example.com/chat", HttpOptions::default()),
            Err(BackendError::InvalidEndpoint { .. })
        ));
    }

    #[tokio::test]
    async fn test_scripted_backend_replays_in_order() {
        let backend = ScriptedBackend::new()
            .answer("one")
            .fail(ChatError::Server {
                status: 503,
                body: String::new(),
            });

        assert_eq!(backend.ask(question("a")).await.unwrap().answer, "one");
        assert!(backend.ask(question("b")).await.is_err());
        assert!(matches!(
            backend.ask(question("c")).await,
            Err(ChatError::Transport(_))
        ));

        let asked: Vec<String> = backend.requests().into_iter().map(|r| r.question).collect();
        assert_eq!(asked, vec!["a", "b", "c"]);
    }
}
