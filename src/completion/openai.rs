//! OpenAI Responses API streaming client.

use super::{CompletionClient, CompletionEvent, CompletionRequest};
use crate::error::{ClipnestError, Result};
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::warn;

/// Channel capacity for provider events.
const EVENT_BUFFER: usize = 256;

/// Streaming completion over the OpenAI Responses API.
///
/// The HTTP client carries a connect timeout only: the response body is an
/// open stream and must not be killed by an overall request deadline.
pub struct OpenAIResponsesClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl OpenAIResponsesClient {
    /// Create a client for a base URL (e.g. `https://api.openai.com/v1`).
    pub fn new(base_url: &str, model: &str) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    fn api_key() -> Result<String> {
        match std::env::var("OPENAI_API_KEY") {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err(ClipnestError::Config("OPENAI_API_KEY not set".to_string())),
        }
    }
}

/// Build the JSON payload for a streaming request.
///
/// The previous-response field is omitted entirely when absent; the provider
/// rejects an explicit null.
fn request_payload(model: &str, request: &CompletionRequest) -> Value {
    let mut payload = json!({
        "model": model,
        "instructions": request.instructions,
        "input": request.input,
        "stream": true,
    });
    if let Some(id) = &request.previous_response_id {
        payload["previous_response_id"] = json!(id);
    }
    payload
}

/// Decode one SSE data payload into a relay-visible event.
///
/// Only `response.output_text.delta` and `response.completed` are consumed;
/// every other event type maps to `None` by contract.
fn decode_event(data: &str) -> Option<CompletionEvent> {
    let value: Value = serde_json::from_str(data).ok()?;
    match value.get("type").and_then(|t| t.as_str()) {
        Some("response.output_text.delta") => value
            .get("delta")
            .and_then(|d| d.as_str())
            .map(|d| CompletionEvent::TextDelta(d.to_string())),
        Some("response.completed") => value
            .get("response")
            .and_then(|r| r.get("id"))
            .and_then(|id| id.as_str())
            .map(|id| CompletionEvent::Completed {
                response_id: id.to_string(),
            }),
        _ => None,
    }
}

#[async_trait]
impl CompletionClient for OpenAIResponsesClient {
    async fn stream(&self, request: CompletionRequest) -> Result<mpsc::Receiver<CompletionEvent>> {
        let api_key = Self::api_key()?;
        let payload = request_payload(&self.model, &request);

        let response = self
            .http
            .post(format!("{}/responses", self.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClipnestError::Completion(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        tokio::spawn(async move {
            if let Err(e) = forward_sse_events(response, &tx).await {
                warn!(error = %e, "completion stream failed mid-flight");
                let _ = tx.send(CompletionEvent::Error(e.to_string())).await;
            }
        });

        Ok(rx)
    }
}

/// Forward provider SSE events onto the channel until the stream ends.
///
/// Lines are split on newline bytes before decoding, so multi-byte content
/// split across network chunks survives intact.
async fn forward_sse_events(
    response: reqwest::Response,
    tx: &mpsc::Sender<CompletionEvent>,
) -> Result<()> {
    let mut stream = response.bytes_stream();
    let mut buffer: Vec<u8> = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        buffer.extend_from_slice(&chunk);

        while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = buffer.drain(..=newline_pos).collect();
            if !emit_line(&String::from_utf8_lossy(&line), tx).await {
                return Ok(());
            }
        }
    }

    // Flush a trailing data line that arrived without a newline.
    if !buffer.is_empty() {
        emit_line(&String::from_utf8_lossy(&buffer), tx).await;
    }

    Ok(())
}

/// Emit the event carried by one SSE line, if any. Returns false when the
/// stream is finished or the receiver has gone away.
async fn emit_line(line: &str, tx: &mpsc::Sender<CompletionEvent>) -> bool {
    let line = line.trim();
    if let Some(data) = line.strip_prefix("data: ") {
        if data == "[DONE]" {
            return false;
        }
        if let Some(event) = decode_event(data) {
            if tx.send(event).await.is_err() {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_omits_previous_response_id_when_absent() {
        let request = CompletionRequest {
            instructions: "be grounded".to_string(),
            input: "context + question".to_string(),
            previous_response_id: None,
        };
        let payload = request_payload("gpt-4o", &request);
        assert!(payload.get("previous_response_id").is_none());
        assert_eq!(payload["stream"], true);
        assert_eq!(payload["model"], "gpt-4o");
    }

    #[test]
    fn test_payload_includes_previous_response_id_when_present() {
        let request = CompletionRequest {
            instructions: String::new(),
            input: String::new(),
            previous_response_id: Some("resp_abc123".to_string()),
        };
        let payload = request_payload("gpt-4o", &request);
        assert_eq!(payload["previous_response_id"], "resp_abc123");
    }

    #[test]
    fn test_decode_text_delta() {
        let event = decode_event(r#"{"type":"response.output_text.delta","delta":"Hello"}"#);
        assert_eq!(event, Some(CompletionEvent::TextDelta("Hello".to_string())));
    }

    #[test]
    fn test_decode_completed() {
        let event =
            decode_event(r#"{"type":"response.completed","response":{"id":"resp_abc123"}}"#);
        assert_eq!(
            event,
            Some(CompletionEvent::Completed {
                response_id: "resp_abc123".to_string()
            })
        );
    }

    #[test]
    fn test_other_event_types_are_ignored() {
        assert!(decode_event(r#"{"type":"response.created","response":{"id":"resp_1"}}"#).is_none());
        assert!(decode_event(r#"{"type":"response.output_item.added"}"#).is_none());
        assert!(decode_event("not json at all").is_none());
    }
}
