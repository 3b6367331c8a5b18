//! A chat-completion backend for OpenAI-compatible APIs.
//!
//! The backend opens one streamed HTTP request per turn and exposes the
//! response as a lazy sequence of text fragments. Failures never escape
//! as errors: a refused connection, a non-success status, or a dropped
//! stream each fold into a single visible fragment, after which the
//! sequence ends. There is no retry and no backoff.

#[macro_use]
extern crate tracing;

mod config;
mod io;
mod line;
mod proto;
mod reply;

use std::sync::Arc;

use reqwest::{Client, StatusCode, header};
use tiny_chat_model::{ChatBackend, ChatRequest};

pub use config::{OpenAIConfig, OpenAIConfigBuilder};
use io::{ByteSource, Lines};
pub use line::parse_line;
pub use reply::OpenAIReply;

/// OpenAI-compatible chat-completion backend.
#[derive(Clone, Debug)]
pub struct OpenAIBackend {
    client: Client,
    config: Arc<OpenAIConfig>,
}

impl OpenAIBackend {
    /// Creates a new `OpenAIBackend` with the given configuration.
    #[inline]
    pub fn new(config: OpenAIConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }
}

impl ChatBackend for OpenAIBackend {
    type Reply = OpenAIReply;

    fn stream_chat(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Self::Reply> + Send + 'static {
        let wire_req = proto::create_request(req, &self.config);
        let resp_fut = self
            .client
            .post(self.config.endpoint.as_str())
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.config.api_key),
            )
            .header(header::CONTENT_TYPE, "application/json")
            .json(&wire_req)
            .send();

        async move {
            let resp = match resp_fut.await {
                Ok(resp) => resp,
                Err(err) => {
                    warn!("connection failed: {err}");
                    return OpenAIReply::failed(format!(
                        "[request error: {err}]"
                    ));
                }
            };

            let status = resp.status();
            if !status.is_success() {
                // Surfaced verbatim as the turn's only fragment.
                let body = resp.text().await.unwrap_or_default();
                return OpenAIReply::failed(status_fragment(status, &body));
            }

            trace!("opened completion stream, status: {status}");
            OpenAIReply::streaming(Lines::new(ByteSource::from_response(
                resp,
            )))
        }
    }
}

#[inline]
fn status_fragment(status: StatusCode, body: &str) -> String {
    format!("Error: {}, {}", status.as_u16(), body)
}
