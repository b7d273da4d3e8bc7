use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

/// Minimal HTTP method set needed by the fetch layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Default per-request timeout. The upstream endpoints have no documented
/// latency bound, so every request gets a cap to avoid unbounded loading
/// states.
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// HTTP request envelope used by transport calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
    pub timeout_ms: u64,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_json_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self.with_header("content-type", "application/json")
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// HTTP response envelope returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok_json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport-level HTTP error: the request could not be sent, timed out, or
/// the body could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    message: String,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

/// Transport contract behind the fetch layer.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;
}

/// Production HTTP client backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Arc<reqwest::Client>,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: Arc::new(
                reqwest::Client::builder()
                    .user_agent("stockdeck/0.1.0")
                    .build()
                    .unwrap_or_else(|_| reqwest::Client::new()),
            ),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let mut builder = match request.method {
                HttpMethod::Get => self.client.get(&request.url),
                HttpMethod::Post => self.client.post(&request.url),
            };

            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            builder = builder.timeout(std::time::Duration::from_millis(request.timeout_ms));

            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    HttpError::new(format!("request timeout: {e}"))
                } else if e.is_connect() {
                    HttpError::new(format!("connection failed: {e}"))
                } else {
                    HttpError::new(format!("request failed: {e}"))
                }
            })?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| HttpError::new(format!("failed to read response body: {e}")))?;

            Ok(HttpResponse { status, body })
        })
    }
}

/// Outcome a [`ScriptedHttpClient`] rule produces for a matching request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedOutcome {
    Response { status: u16, body: String },
    Transport(String),
}

struct ScriptedRule {
    url_contains: String,
    delay_ms: u64,
    outcome: ScriptedOutcome,
}

/// Deterministic offline transport for tests.
///
/// Rules match on a URL substring, first match wins; unmatched requests get
/// a 404. A rule may carry a delay, served through `tokio::time::sleep` so
/// paused-clock tests can interleave responses deliberately. Every executed
/// request URL is recorded for call-count assertions.
#[derive(Default)]
pub struct ScriptedHttpClient {
    rules: Mutex<Vec<ScriptedRule>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url_contains: impl Into<String>, status: u16, body: impl Into<String>) {
        self.push_rule(url_contains.into(), 0, ScriptedOutcome::Response {
            status,
            body: body.into(),
        });
    }

    pub fn respond_after_ms(
        &self,
        url_contains: impl Into<String>,
        delay_ms: u64,
        status: u16,
        body: impl Into<String>,
    ) {
        self.push_rule(url_contains.into(), delay_ms, ScriptedOutcome::Response {
            status,
            body: body.into(),
        });
    }

    pub fn fail(&self, url_contains: impl Into<String>, message: impl Into<String>) {
        self.push_rule(
            url_contains.into(),
            0,
            ScriptedOutcome::Transport(message.into()),
        );
    }

    fn push_rule(&self, url_contains: String, delay_ms: u64, outcome: ScriptedOutcome) {
        self.rules.lock().unwrap().push(ScriptedRule {
            url_contains,
            delay_ms,
            outcome,
        });
    }

    /// URLs of every request executed so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(request.url.clone());

            let matched = {
                let rules = self.rules.lock().unwrap();
                rules
                    .iter()
                    .find(|rule| request.url.contains(&rule.url_contains))
                    .map(|rule| (rule.delay_ms, rule.outcome.clone()))
            };

            let Some((delay_ms, outcome)) = matched else {
                return Ok(HttpResponse {
                    status: 404,
                    body: String::new(),
                });
            };

            if delay_ms > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
            }

            match outcome {
                ScriptedOutcome::Response { status, body } => Ok(HttpResponse { status, body }),
                ScriptedOutcome::Transport(message) => Err(HttpError::new(message)),
            }
        })
    }
}
