//! HTTP request/response types and the transport seam.
//!
//! # Design
//! Requests and responses are plain data. `GithubApi` builds `HttpRequest`
//! values and parses `HttpResponse` values without touching the network; a
//! `Transport` performs the actual round-trip. Non-2xx statuses come back as
//! ordinary responses so status interpretation stays with the operation that
//! knows which code it expects.

use tracing::debug;

use crate::error::ApiError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
///
/// `url` is absolute: either the base URL joined with an endpoint path, or a
/// continuation URL taken verbatim from a `Link` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// First header value whose name matches `name`, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Executes a single `HttpRequest`.
///
/// Implementations must return non-2xx responses as `Ok`, reserving `Err`
/// for failures where no response was received.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a shared `ureq::Agent`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Agent that returns every status as data and never follows redirects,
    /// so a 3xx reaches the operation's status check.
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .max_redirects_will_error(false)
            .build()
            .new_agent();
        Self::with_agent(agent)
    }

    /// Wrap an existing agent. It must be configured with
    /// `http_status_as_error(false)`, otherwise error statuses surface as
    /// transport failures, and with `max_redirects(0)` plus
    /// `max_redirects_will_error(false)`, otherwise redirects are followed
    /// and a 302 can be reported as the target's status.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (key, value) in headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    builder
}

/// Copy response headers into owned pairs.
///
/// Values that are not visible ASCII are skipped, except `Link`: dropping it
/// would silently end pagination early, so it fails the call instead.
fn collect_headers(map: &ureq::http::HeaderMap) -> Result<Vec<(String, String)>, ApiError> {
    let mut headers = Vec::with_capacity(map.len());
    for (name, value) in map {
        match value.to_str() {
            Ok(value) => headers.push((name.as_str().to_string(), value.to_string())),
            Err(_) if *name == ureq::http::header::LINK => {
                return Err(ApiError::Transport {
                    message: "Link header is not valid ASCII".to_string(),
                });
            }
            Err(_) => debug!(header = name.as_str(), "skipping non-ASCII header value"),
        }
    }
    Ok(headers)
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), url = %request.url, "sending request");

        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let result = match (method, body) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(&url), &headers).call(),
            (HttpMethod::Delete, _) => with_headers(self.agent.delete(&url), &headers).call(),
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(&url), &headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => with_headers(self.agent.post(&url), &headers).send_empty(),
        };

        let mut response = result.map_err(|e| ApiError::Transport {
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        let headers = collect_headers(response.headers())?;
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport {
                message: e.to_string(),
            })?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
