//! `Http` capability: the core describes a call to the scoring service as an
//! [`HttpRequest`], the shell carries it out and resolves it with an
//! [`HttpResult`].

use std::time::Duration;

use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const MAX_TIMEOUT_MS: u64 = 300_000;
/// Scoring replies are a few hundred bytes; anything near this is not one.
pub const MAX_RESPONSE_BODY_SIZE: usize = 256 * 1024;

const JSON: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// One call to the scoring service. Always JSON in, JSON out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    method: HttpMethod,
    url: String,
    host: String,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    timeout_ms: u64,
    trace_id: String,
}

impl HttpRequest {
    fn to(method: HttpMethod, url: &str) -> Result<Self, HttpError> {
        let bad_url = |reason: String| HttpError::InvalidUrl {
            url: url.to_string(),
            reason,
        };

        let parsed = Url::parse(url).map_err(|e| bad_url(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(bad_url(format!("unsupported scheme {}", parsed.scheme())));
        }
        let host = parsed
            .host_str()
            .ok_or_else(|| bad_url("no host".to_string()))?
            .to_string();

        Ok(Self {
            method,
            url: parsed.into(),
            host,
            headers: vec![("Accept".to_string(), JSON.to_string())],
            body: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            trace_id: uuid::Uuid::new_v4().to_string(),
        })
    }

    pub fn get(url: &str) -> Result<Self, HttpError> {
        Self::to(HttpMethod::Get, url)
    }

    pub fn post(url: &str) -> Result<Self, HttpError> {
        Self::to(HttpMethod::Post, url)
    }

    /// Serializes `value` as the body and marks it as JSON. GET carries no body.
    pub fn with_json<T: Serialize>(mut self, value: &T) -> Result<Self, HttpError> {
        if self.method == HttpMethod::Get {
            return Err(HttpError::InvalidRequest {
                reason: "GET carries no body".to_string(),
            });
        }
        let body = serde_json::to_vec(value).map_err(|e| HttpError::InvalidRequest {
            reason: e.to_string(),
        })?;
        self.headers
            .retain(|(name, _)| !name.eq_ignore_ascii_case("Content-Type"));
        self.headers
            .push(("Content-Type".to_string(), JSON.to_string()));
        self.body = Some(body);
        Ok(self)
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Result<Self, HttpError> {
        if !(1..=MAX_TIMEOUT_MS).contains(&timeout_ms) {
            return Err(HttpError::InvalidRequest {
                reason: format!("timeout {timeout_ms}ms outside 1..={MAX_TIMEOUT_MS}ms"),
            });
        }
        self.timeout_ms = timeout_ms;
        Ok(self)
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Random per-call id, only used to correlate log lines.
    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum HttpError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("could not reach {host}: {message}")]
    Unreachable { host: String, message: String },

    #[error("no response within {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("response of {size} bytes exceeds the {max} byte limit")]
    ResponseTooLarge { size: usize, max: usize },

    #[error("unreadable response: {reason}")]
    InvalidResponse { reason: String },

    #[error("HTTP client could not start: {message}")]
    TransportUnavailable { message: String },
}

impl HttpError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, HttpError::Timeout { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpResponse {
    status: u16,
    body: Vec<u8>,
    duration_ms: u64,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            duration_ms: 0,
        }
    }

    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, HttpError> {
        serde_json::from_slice(&self.body).map_err(|e| HttpError::InvalidResponse {
            reason: e.to_string(),
        })
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }
}

pub type HttpResult = Result<HttpResponse, HttpError>;

impl Operation for HttpRequest {
    type Output = HttpResult;
}

pub struct Http<Ev> {
    context: CapabilityContext<HttpRequest, Ev>,
}

impl<Ev> Capability<Ev> for Http<Ev> {
    type Operation = HttpRequest;
    type MappedSelf<MappedEv> = Http<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Http::new(self.context.map_event(f))
    }
}

impl<Ev> Http<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<HttpRequest, Ev>) -> Self {
        Self { context }
    }

    /// Hands `request` to the shell; `callback` turns the outcome into the
    /// event that comes back to `update`.
    pub fn execute<F>(&self, request: HttpRequest, callback: F)
    where
        F: FnOnce(HttpResult) -> Ev + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx.request_from_shell(request).await;
            ctx.update_app(callback(result));
        });
    }
}
