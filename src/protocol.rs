//! Wire contract shared by the relay and the conversation client.
//!
//! One request per turn, one streamed plain-text reply. The only encoded
//! state in the system is the continuation marker appended as the final
//! bytes of a successful stream: `\n[CLIPNEST_ID:<token>]`, where the token
//! is the provider's response id for the turn just completed.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Request body for one conversation turn.
///
/// `previous_response_id` is `null` on the first turn of a session and the
/// token extracted from the prior stream on every later turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    pub message: String,
    #[serde(default)]
    pub previous_response_id: Option<String>,
}

/// Build the marker appended after the final text chunk of a stream.
pub fn format_response_marker(response_id: &str) -> String {
    format!("\n[CLIPNEST_ID:{}]", response_id)
}

fn marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        Regex::new(r"\n?\[CLIPNEST_ID:([A-Za-z0-9_-]+)\]$").expect("Invalid marker regex")
    })
}

/// Split a finished stream buffer into visible text and the continuation id.
///
/// The marker is only recognized anchored at the end of the buffer; marker
/// lookalikes anywhere earlier are left in the text untouched. A missing
/// leading newline is tolerated.
pub fn split_response_marker(buffer: &str) -> (&str, Option<String>) {
    match marker_regex().captures(buffer) {
        Some(caps) => match (caps.get(0), caps.get(1)) {
            (Some(full), Some(id)) => (&buffer[..full.start()], Some(id.as_str().to_string())),
            _ => (buffer, None),
        },
        None => (buffer, None),
    }
}
