//! Supabase-backed match index.
//!
//! Calls the stored similarity-search procedure through the PostgREST RPC
//! endpoint using the service role key. Server-side only — the key bypasses
//! row-level security.

use super::{ClipMatch, MatchIndex};
use crate::error::{ClipnestError, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument};

/// Timeout for RPC requests.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Serialize)]
struct RpcParams<'a> {
    query_embedding: &'a [f32],
    match_count: usize,
}

/// Similarity search over a Supabase RPC function.
pub struct SupabaseIndex {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
    rpc_function: String,
}

impl SupabaseIndex {
    /// Create an index client for a project URL and service role key.
    pub fn new(base_url: &str, service_key: &str, rpc_function: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
            rpc_function: rpc_function.to_string(),
        }
    }

    /// Build the index from `SUPABASE_URL` and `SUPABASE_SERVICE_ROLE_KEY`.
    pub fn from_env(rpc_function: &str) -> Result<Self> {
        let url = std::env::var("SUPABASE_URL")
            .map_err(|_| ClipnestError::Config("SUPABASE_URL not set".to_string()))?;
        let key = std::env::var("SUPABASE_SERVICE_ROLE_KEY")
            .map_err(|_| ClipnestError::Config("SUPABASE_SERVICE_ROLE_KEY not set".to_string()))?;
        Ok(Self::new(&url, &key, rpc_function))
    }

    fn rpc_url(&self) -> String {
        format!("{}/rest/v1/rpc/{}", self.base_url, self.rpc_function)
    }
}

#[async_trait]
impl MatchIndex for SupabaseIndex {
    #[instrument(skip(self, query_embedding))]
    async fn top_matches(
        &self,
        query_embedding: &[f32],
        match_count: usize,
    ) -> Result<Vec<ClipMatch>> {
        let response = self
            .http
            .post(self.rpc_url())
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .json(&RpcParams {
                query_embedding,
                match_count,
            })
            .send()
            .await
            .map_err(|e| ClipnestError::Search(format!("RPC request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClipnestError::Search(format!(
                "RPC returned {}: {}",
                status, body
            )));
        }

        let matches: Vec<ClipMatch> = response
            .json()
            .await
            .map_err(|e| ClipnestError::Search(format!("Malformed RPC response: {}", e)))?;

        debug!(returned = matches.len(), "similarity search complete");
        Ok(matches)
    }
}
