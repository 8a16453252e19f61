//! Conversation client: ordered turn history, incremental stream decoding,
//! and continuation-token threading for multi-turn context.
//!
//! All turn mutation flows through [`Conversation::apply`], so the state
//! machine is testable without a network in sight.

pub mod markdown;

use crate::protocol::{self, TurnRequest};
use futures::StreamExt;
use tracing::warn;

/// Fixed message shown in place of an answer when a turn fails.
pub const FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Who said a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One turn of the conversation. User content is echoed verbatim and never
/// parsed as markup.
#[derive(Debug, Clone)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// State transitions for the turn sequence.
#[derive(Debug, Clone)]
pub enum Action {
    AppendUser(String),
    AppendAssistantPlaceholder,
    AppendDelta(String),
    FinalizeAssistant(String),
}

/// In-memory conversation state. Lost when the session ends; nothing is
/// persisted anywhere.
#[derive(Debug, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
    loading: bool,
    previous_response_id: Option<String>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Continuation id from the last successful turn, if any.
    pub fn previous_response_id(&self) -> Option<&str> {
        self.previous_response_id.as_deref()
    }

    /// Apply one action to the turn sequence.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::AppendUser(content) => self.turns.push(Turn {
                role: Role::User,
                content,
            }),
            Action::AppendAssistantPlaceholder => self.turns.push(Turn {
                role: Role::Assistant,
                content: String::new(),
            }),
            Action::AppendDelta(delta) => {
                if let Some(turn) = self.turns.last_mut() {
                    if turn.role == Role::Assistant {
                        turn.content.push_str(&delta);
                    }
                }
            }
            Action::FinalizeAssistant(content) => {
                if let Some(turn) = self.turns.last_mut() {
                    if turn.role == Role::Assistant {
                        turn.content = content;
                    }
                }
            }
        }
    }

    /// Accept a user submission, or return `None` when it must be ignored:
    /// blank input, or a turn already in flight. On acceptance the user turn
    /// and an empty assistant placeholder are appended.
    pub fn begin_turn(&mut self, input: &str) -> Option<String> {
        if self.loading {
            return None;
        }
        let message = input.trim();
        if message.is_empty() {
            return None;
        }

        self.apply(Action::AppendUser(message.to_string()));
        self.apply(Action::AppendAssistantPlaceholder);
        self.loading = true;
        Some(message.to_string())
    }

    /// Finish the in-flight turn: extract the continuation id from the
    /// accumulated buffer and strip the marker from the visible text. With
    /// no marker present, the buffer stands as-is and the stored id keeps
    /// its previous value.
    pub fn complete_turn(&mut self) {
        let buffer = self.last_assistant_content().unwrap_or_default();
        let (text, token) = protocol::split_response_marker(&buffer);
        let text = text.to_string();
        if let Some(token) = token {
            self.previous_response_id = Some(token);
        }
        self.apply(Action::FinalizeAssistant(text));
        self.loading = false;
    }

    /// Fail the in-flight turn. The session stays usable for the next one.
    pub fn fail_turn(&mut self) {
        self.apply(Action::FinalizeAssistant(FAILURE_MESSAGE.to_string()));
        self.loading = false;
    }

    fn last_assistant_content(&self) -> Option<String> {
        self.turns
            .last()
            .filter(|t| t.role == Role::Assistant)
            .map(|t| t.content.clone())
    }
}

/// Incremental UTF-8 decoder: code points split across chunk boundaries are
/// carried until the remaining bytes arrive.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    carry: Vec<u8>,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes, returning the decodable prefix as text.
    pub fn push(&mut self, bytes: &[u8]) -> String {
        self.carry.extend_from_slice(bytes);
        match std::str::from_utf8(&self.carry) {
            Ok(text) => {
                let out = text.to_string();
                self.carry.clear();
                out
            }
            Err(e) if e.error_len().is_none() => {
                // Incomplete trailing sequence: emit the valid prefix, keep
                // the rest for the next chunk.
                let valid = e.valid_up_to();
                let out = String::from_utf8_lossy(&self.carry[..valid]).into_owned();
                self.carry.drain(..valid);
                out
            }
            Err(_) => {
                let out = String::from_utf8_lossy(&self.carry).into_owned();
                self.carry.clear();
                out
            }
        }
    }

    /// Flush whatever is left at end of stream.
    pub fn finish(&mut self) -> String {
        if self.carry.is_empty() {
            return String::new();
        }
        let out = String::from_utf8_lossy(&self.carry).into_owned();
        self.carry.clear();
        out
    }
}

/// HTTP client for the conversation relay.
pub struct ChatClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ChatClient {
    /// Point the client at a relay base URL, e.g. `http://127.0.0.1:3000`.
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}/api/chat", base_url.trim_end_matches('/')),
        }
    }

    /// Send the in-flight turn and stream the reply into the conversation.
    ///
    /// `on_delta` fires once per decoded chunk for live display; the marker
    /// may pass through it transiently and is stripped at completion. Any
    /// failure is absorbed as the fixed failure message — the session stays
    /// usable either way. Returns whether the turn completed.
    pub async fn send_turn(
        &self,
        conversation: &mut Conversation,
        message: &str,
        mut on_delta: impl FnMut(&str),
    ) -> bool {
        let request = TurnRequest {
            message: message.to_string(),
            previous_response_id: conversation.previous_response_id().map(str::to_string),
        };

        let response = match self.http.post(&self.endpoint).json(&request).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "turn request failed");
                conversation.fail_turn();
                return false;
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), "relay rejected turn");
            conversation.fail_turn();
            return false;
        }

        let mut decoder = StreamDecoder::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(error = %e, "stream read failed");
                    conversation.fail_turn();
                    return false;
                }
            };
            let text = decoder.push(&chunk);
            if !text.is_empty() {
                conversation.apply(Action::AppendDelta(text.clone()));
                on_delta(&text);
            }
        }

        let tail = decoder.finish();
        if !tail.is_empty() {
            conversation.apply(Action::AppendDelta(tail.clone()));
            on_delta(&tail);
        }

        conversation.complete_turn();
        true
    }
}
