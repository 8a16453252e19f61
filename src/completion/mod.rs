//! Streaming chat-completion collaborator.
//!
//! The relay consumes a deliberately narrow slice of the provider's event
//! stream: incremental text deltas, plus the terminal completed event that
//! carries the response id used to continue the conversation next turn.
//! Every other provider event type is ignored by contract.

mod openai;

pub use openai::OpenAIResponsesClient;

use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Input for one streaming completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System instructions: grounding policy and formatting rules.
    pub instructions: String,
    /// Composed input: grounding block plus the user message.
    pub input: String,
    /// Continuation id from the previous turn, if any. Omitted from the
    /// serialized request entirely when absent.
    pub previous_response_id: Option<String>,
}

/// Events surfaced from the provider stream.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionEvent {
    /// Incremental output text.
    TextDelta(String),
    /// Terminal event carrying the id for the next turn.
    Completed { response_id: String },
    /// The stream failed mid-flight.
    Error(String),
}

/// Trait for streaming completion backends.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Open a streaming completion; events arrive on the returned channel
    /// in provider order. The channel closes when the stream ends.
    async fn stream(&self, request: CompletionRequest) -> Result<mpsc::Receiver<CompletionEvent>>;
}
