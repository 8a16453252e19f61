//! ClipNest - Retrieval-Augmented Chat for Video Content
//!
//! A chat front end over a precomputed index of video-content embeddings:
//! each question is embedded, matched against the index, and answered by a
//! streaming language model grounded strictly in the matched content.
//!
//! # Overview
//!
//! ClipNest lets you:
//! - Run a streaming chat relay over an existing video-embedding index
//! - Hold a multi-turn conversation from the terminal with live token output
//! - Ask one-shot questions and get grounded, sourced answers
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `protocol` - Wire contract between relay and client
//! - `embedding` - Query embedding generation
//! - `search` - Similarity search against the content index
//! - `completion` - Streaming language-model collaborator
//! - `relay` - Server-side conversation relay
//! - `client` - Conversation state machine and streaming HTTP client
//!
//! # Example
//!
//! ```rust,no_run
//! use clipnest::client::{ChatClient, Conversation};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ChatClient::new("http://127.0.0.1:3000");
//!     let mut conversation = Conversation::new();
//!
//!     if let Some(message) = conversation.begin_turn("Find videos about React hooks") {
//!         client.send_turn(&mut conversation, &message, |delta| print!("{delta}")).await;
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod client;
pub mod completion;
pub mod config;
pub mod embedding;
pub mod error;
pub mod protocol;
pub mod relay;
pub mod search;

pub use error::{ClipnestError, Result};
