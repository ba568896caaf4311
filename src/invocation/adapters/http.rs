//! `reqwest` implementation of the remote agent client.

use crate::invocation::ports::{
    RemoteAgentClient, RemoteCall, RemoteFailure, RemoteResponse, RemoteResult,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde_json::{Value, json};
use std::time::Instant;
use tracing::debug;

const EVENT_STREAM: &str = "text/event-stream";

/// Remote agent client backed by a shared `reqwest` connection pool.
#[derive(Debug, Clone, Default)]
pub struct ReqwestAgentClient {
    client: reqwest::Client,
}

impl ReqwestAgentClient {
    /// Creates a client with default connection settings.
    ///
    /// # Errors
    ///
    /// Returns the `reqwest` error when the TLS backend cannot be
    /// initialized.
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
        })
    }

    /// Wraps an existing `reqwest` client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RemoteAgentClient for ReqwestAgentClient {
    async fn invoke(&self, call: &RemoteCall) -> RemoteResult<RemoteResponse> {
        let url = call.serving_url();
        let mut request = self.client.post(url).json(call.payload());
        for (name, value) in call.headers() {
            request = request.header(name.as_str(), value.as_str());
        }

        let started = Instant::now();
        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let text = response.text().await?;
            Ok::<_, reqwest::Error>((status, content_type, text))
        };

        let (status, content_type, text) = tokio::time::timeout(call.timeout(), exchange)
            .await
            .map_err(|_| RemoteFailure::timeout(url, call.timeout()))?
            .map_err(|err| {
                if err.is_timeout() {
                    RemoteFailure::timeout(url, call.timeout())
                } else {
                    RemoteFailure::unreachable(url, err.to_string())
                }
            })?;

        debug!(
            url,
            status = status.as_u16(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "remote agent answered"
        );

        let body = normalize_body(content_type.as_deref(), &text);

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(RemoteFailure::Unauthorized {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            return Err(RemoteFailure::UpstreamError {
                url: url.to_owned(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(RemoteResponse {
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

/// Turns a buffered response body into JSON.
///
/// Event streams become `{"events": [...]}` with one entry per `data:`
/// block. Other bodies are parsed as JSON, falling back to
/// `{"raw_text": ...}`. Empty bodies yield
/// `{"raw_text": "", "note": "Empty response body"}`.
#[must_use]
pub fn normalize_body(content_type: Option<&str>, text: &str) -> Value {
    if text.trim().is_empty() {
        return json!({ "raw_text": "", "note": "Empty response body" });
    }

    let is_stream = content_type.is_some_and(|value| {
        value
            .trim()
            .to_ascii_lowercase()
            .starts_with(EVENT_STREAM)
    });
    if is_stream {
        return json!({ "events": parse_event_stream(text) });
    }

    serde_json::from_str(text).unwrap_or_else(|_| json!({ "raw_text": text }))
}

fn parse_event_stream(text: &str) -> Vec<Value> {
    let mut events = Vec::new();
    let mut data: Vec<&str> = Vec::new();

    let mut flush = |pending: &mut Vec<&str>| {
        if pending.is_empty() {
            return;
        }
        let joined = pending.join("\n");
        pending.clear();
        events.push(serde_json::from_str(&joined).unwrap_or_else(|_| Value::String(joined)));
    };

    for line in text.lines() {
        if line.trim().is_empty() {
            flush(&mut data);
        } else if let Some(rest) = line.strip_prefix("data:") {
            data.push(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }
    flush(&mut data);

    events
}
