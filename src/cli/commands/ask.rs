//! Ask command implementation.
//!
//! One-shot question: runs the relay pipeline in-process and renders the
//! finished answer as markdown.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::client::markdown;
use crate::completion::OpenAIResponsesClient;
use crate::config::Settings;
use crate::embedding::OpenAIEmbedder;
use crate::protocol;
use crate::relay::{ConversationRelay, TurnOutcome, NO_MATCH_MESSAGE};
use crate::search::SupabaseIndex;
use anyhow::Result;
use std::sync::Arc;

/// Run the ask command.
pub async fn run_ask(question: &str, model: Option<String>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask) {
        Output::error(&format!("{}", e));
        Output::info("Run 'clipnest doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let model = model.unwrap_or_else(|| settings.completion.model.clone());

    let embedder = Arc::new(OpenAIEmbedder::with_config(
        &settings.embedding.model,
        settings.embedding.dimensions as usize,
    ));
    let index = Arc::new(SupabaseIndex::from_env(&settings.search.rpc_function)?);
    let completion = Arc::new(OpenAIResponsesClient::new(
        &settings.completion.base_url,
        &model,
    ));
    let relay = ConversationRelay::new(
        embedder,
        index,
        completion,
        settings.search.match_count as usize,
    );

    let spinner = Output::spinner("Searching the ClipNest index...");

    match relay.open_turn(question, None).await {
        Ok(TurnOutcome::NoMatch) => {
            spinner.finish_and_clear();
            println!("\n{}\n", NO_MATCH_MESSAGE);
        }
        Ok(TurnOutcome::Stream(mut chunks)) => {
            let mut answer = String::new();
            while let Some(chunk) = chunks.recv().await {
                answer.push_str(&chunk);
            }
            spinner.finish_and_clear();

            let (text, _) = protocol::split_response_marker(&answer);
            println!("\n{}", markdown::render(text));
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
