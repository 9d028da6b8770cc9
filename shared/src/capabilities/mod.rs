//! Side-effect boundary. The core only ever asks for a render or for one HTTP
//! call; shells resolve the calls through an [`HttpTransport`].

mod http;
mod transport;

pub use self::http::{
    Http, HttpError, HttpMethod, HttpRequest, HttpResponse, HttpResult, DEFAULT_TIMEOUT_MS,
    MAX_RESPONSE_BODY_SIZE, MAX_TIMEOUT_MS,
};
pub use self::transport::{HttpTransport, ReqwestTransport};
pub use crux_core::render::Render;

use crate::event::Event;
// The derive refers to the app type as `App`.
use crate::App;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub http: Http<Event>,
}

#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    //! Scripted transport so shells can be driven without sockets.

    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Mutex, PoisonError};

    #[derive(Default)]
    pub struct ScriptedTransport {
        replies: Mutex<VecDeque<HttpResult>>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn reply_json(self, status: u16, body: &serde_json::Value) -> Self {
            let bytes = serde_json::to_vec(body).unwrap_or_default();
            self.push(Ok(HttpResponse::new(status, bytes)))
        }

        pub fn reply_status(self, status: u16) -> Self {
            self.push(Ok(HttpResponse::new(status, Vec::new())))
        }

        pub fn fail(self, error: HttpError) -> Self {
            self.push(Err(error))
        }

        fn push(self, reply: HttpResult) -> Self {
            self.replies
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push_back(reply);
            self
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.seen
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }

    #[async_trait::async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn execute(&self, request: HttpRequest) -> HttpResult {
            let reply = self
                .replies
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();
            self.seen
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(request.clone());
            reply.unwrap_or_else(|| {
                Err(HttpError::Unreachable {
                    host: request.host().to_string(),
                    message: "no scripted reply".into(),
                })
            })
        }
    }
}
