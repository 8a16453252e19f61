//! Similarity search against the precomputed video-content embeddings.
//!
//! The index is an external collaborator reached through a narrow contract:
//! a query embedding and a match cap go in, an ordered list of matches comes
//! back. The relay never re-ranks.

mod supabase;

pub use supabase::SupabaseIndex;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One match returned by the similarity-search procedure.
///
/// Read-only once received; consumed only to build the grounding prompt for
/// a single turn. Field names mirror the `match_clipnest_embeddings` row
/// shape, nullable columns included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipMatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub transcript_preview: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    /// Similarity score in 0.0..=1.0, higher is better.
    #[serde(default)]
    pub similarity: f32,
}

/// Trait for similarity-search backends.
#[async_trait]
pub trait MatchIndex: Send + Sync {
    /// Return the closest matches for a query embedding, best first.
    async fn top_matches(
        &self,
        query_embedding: &[f32],
        match_count: usize,
    ) -> Result<Vec<ClipMatch>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_deserializes_null_and_missing_fields() {
        let row = r#"{
            "title": "React Hooks Deep Dive",
            "creator": null,
            "platform": "YouTube",
            "video_url": "https://youtube.com/watch?v=abc",
            "similarity": 0.873
        }"#;

        let m: ClipMatch = serde_json::from_str(row).unwrap();
        assert_eq!(m.title.as_deref(), Some("React Hooks Deep Dive"));
        assert!(m.creator.is_none());
        assert!(m.summary.is_none());
        assert!(m.venue.is_none());
        assert!((m.similarity - 0.873).abs() < 1e-6);
    }

    #[test]
    fn test_empty_result_set_parses() {
        let matches: Vec<ClipMatch> = serde_json::from_str("[]").unwrap();
        assert!(matches.is_empty());
    }
}
