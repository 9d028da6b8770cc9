use std::time::Instant;

use tracing::debug;

use super::http::{HttpError, HttpMethod, HttpRequest, HttpResponse, HttpResult, MAX_RESPONSE_BODY_SIZE};

/// Shell-side executor for the `Http` capability. Implementations honour the
/// request timeout and the response size cap, and never retry.
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> HttpResult;
}

/// Production transport over a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| HttpError::TransportUnavailable {
                message: e.to_string(),
            })?;
        Ok(Self { client })
    }

    fn classify(error: &reqwest::Error, request: &HttpRequest) -> HttpError {
        if error.is_timeout() {
            HttpError::Timeout {
                timeout_ms: request.timeout_ms(),
            }
        } else if error.is_builder() {
            HttpError::InvalidRequest {
                reason: error.to_string(),
            }
        } else {
            HttpError::Unreachable {
                host: request.host().to_string(),
                message: error.to_string(),
            }
        }
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> HttpResult {
        let started = Instant::now();

        let method = match request.method() {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        };

        let mut builder = self
            .client
            .request(method, request.url())
            .timeout(request.timeout());
        for (name, value) in request.headers() {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body() {
            builder = builder.body(body.to_vec());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Self::classify(&e, &request))?;

        let status = response.status().as_u16();
        if let Some(declared) = response.content_length() {
            let declared = usize::try_from(declared).unwrap_or(usize::MAX);
            if declared > MAX_RESPONSE_BODY_SIZE {
                return Err(HttpError::ResponseTooLarge {
                    size: declared,
                    max: MAX_RESPONSE_BODY_SIZE,
                });
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Self::classify(&e, &request))?;
        if body.len() > MAX_RESPONSE_BODY_SIZE {
            return Err(HttpError::ResponseTooLarge {
                size: body.len(),
                max: MAX_RESPONSE_BODY_SIZE,
            });
        }

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(
            method = request.method().as_str(),
            url = request.url(),
            trace_id = request.trace_id(),
            status,
            duration_ms,
            "response received"
        );

        Ok(HttpResponse::new(status, body.to_vec()).with_duration_ms(duration_ms))
    }
}
