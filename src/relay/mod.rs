//! Conversation relay: the server-side core of a chat turn.
//!
//! A turn runs embed -> search -> stream completion, strictly in that
//! order, with no retries. Text deltas are forwarded to the caller as raw
//! chunks in arrival order; after the upstream stream ends, exactly one
//! continuation marker is appended — provided a response id was captured.

pub mod prompt;

use crate::completion::{CompletionClient, CompletionEvent, CompletionRequest};
use crate::embedding::Embedder;
use crate::error::{ClipnestError, Result};
use crate::protocol;
use crate::search::MatchIndex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Fixed body returned when the search produces no matches. The language
/// model is not invoked in that case.
pub const NO_MATCH_MESSAGE: &str =
    "No matching content found in the ClipNest database for your query.";

/// Channel capacity for outgoing chunks.
const CHUNK_BUFFER: usize = 64;

/// Outcome of opening a turn.
#[derive(Debug)]
pub enum TurnOutcome {
    /// Search returned nothing; respond with [`NO_MATCH_MESSAGE`].
    NoMatch,
    /// Live completion. Chunks arrive in order; the continuation marker,
    /// when issued, is the final chunk.
    Stream(mpsc::Receiver<String>),
}

/// Server-side relay between the conversation client and the collaborators.
///
/// Holds no per-request state; safe to share across concurrent requests.
pub struct ConversationRelay {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn MatchIndex>,
    completion: Arc<dyn CompletionClient>,
    match_count: usize,
}

impl ConversationRelay {
    /// Create a relay over the three collaborators.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn MatchIndex>,
        completion: Arc<dyn CompletionClient>,
        match_count: usize,
    ) -> Self {
        Self {
            embedder,
            index,
            completion,
            match_count,
        }
    }

    /// Run one turn: validate, embed, search, then open the completion
    /// stream. Any collaborator failure is terminal for the turn.
    #[instrument(skip(self, message, previous_response_id), fields(message = %message))]
    pub async fn open_turn(
        &self,
        message: &str,
        previous_response_id: Option<String>,
    ) -> Result<TurnOutcome> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ClipnestError::InvalidInput("Message is required".to_string()));
        }

        info!(
            previous = previous_response_id.as_deref().unwrap_or("none"),
            "opening turn"
        );

        let embedding = self.embedder.embed(message).await?;
        debug!(dimensions = embedding.len(), "query embedded");

        let matches = self.index.top_matches(&embedding, self.match_count).await?;
        info!(matches = matches.len(), "similarity search returned");

        if matches.is_empty() {
            return Ok(TurnOutcome::NoMatch);
        }

        let grounding = prompt::build_grounding_block(&matches);
        let request = CompletionRequest {
            instructions: prompt::SYSTEM_INSTRUCTIONS.to_string(),
            input: prompt::compose_input(&grounding, message),
            previous_response_id,
        };

        let mut events = self.completion.stream(request).await?;
        let (tx, rx) = mpsc::channel(CHUNK_BUFFER);

        tokio::spawn(async move {
            let mut response_id: Option<String> = None;
            while let Some(event) = events.recv().await {
                if let Some(chunk) = outgoing_chunk(&event) {
                    if tx.send(chunk).await.is_err() {
                        return; // caller hung up
                    }
                }
                match event {
                    CompletionEvent::Completed { response_id: id } => {
                        debug!(response_id = %id, "completion finished");
                        response_id = Some(id);
                    }
                    CompletionEvent::Error(e) => {
                        warn!(error = %e, "upstream stream error, closing turn");
                        break;
                    }
                    CompletionEvent::TextDelta(_) => {}
                }
            }
            if let Some(id) = response_id {
                let _ = tx.send(protocol::format_response_marker(&id)).await;
            }
        });

        Ok(TurnOutcome::Stream(rx))
    }
}

/// Map one provider event to an outgoing chunk, if it carries any.
fn outgoing_chunk(event: &CompletionEvent) -> Option<String> {
    match event {
        CompletionEvent::TextDelta(text) => Some(text.clone()),
        CompletionEvent::Completed { .. } | CompletionEvent::Error(_) => None,
    }
}
