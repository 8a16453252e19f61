//! CLI module for ClipNest.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// ClipNest - retrieval-augmented chat for video content discovery
///
/// Ask questions about indexed video content and get grounded, streamed
/// answers with sources.
#[derive(Parser, Debug)]
#[command(name = "clipnest")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize ClipNest and verify credentials
    Init,

    /// Check credentials and configuration
    Doctor,

    /// Ask a one-shot question against the index
    Ask {
        /// The question to ask
        question: String,

        /// Model to use for answer generation
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Start an interactive chat session against a running relay
    Chat {
        /// Base URL of the relay server
        #[arg(long, default_value = "http://127.0.0.1:3000")]
        url: String,
    },

    /// Start the relay HTTP server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
