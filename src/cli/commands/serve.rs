//! Relay HTTP server.
//!
//! Exposes the conversation relay over a single streaming chat endpoint.
//! Each request is independent; the relay holds no shared mutable state.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::completion::OpenAIResponsesClient;
use crate::config::Settings;
use crate::embedding::OpenAIEmbedder;
use crate::error::ClipnestError;
use crate::protocol::TurnRequest;
use crate::relay::{ConversationRelay, TurnOutcome, NO_MATCH_MESSAGE};
use crate::search::SupabaseIndex;
use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::StreamExt;
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

/// Fixed body for validation failures.
const VALIDATION_BODY: &str = "Message is required";

/// Fixed body for upstream failures. The cause is logged, never echoed.
const UPSTREAM_BODY: &str = "Request failed";

/// Shared application state.
struct AppState {
    relay: ConversationRelay,
}

/// Run the relay HTTP server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Serve) {
        Output::error(&format!("{}", e));
        Output::info("Run 'clipnest doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let embedder = Arc::new(OpenAIEmbedder::with_config(
        &settings.embedding.model,
        settings.embedding.dimensions as usize,
    ));
    let index = Arc::new(SupabaseIndex::from_env(&settings.search.rpc_function)?);
    let completion = Arc::new(OpenAIResponsesClient::new(
        &settings.completion.base_url,
        &settings.completion.model,
    ));
    let relay = ConversationRelay::new(
        embedder,
        index,
        completion,
        settings.search.match_count as usize,
    );

    let app = router(Arc::new(AppState { relay }));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("ClipNest Relay");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Chat", "POST /api/chat");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .layer(cors)
        .with_state(state)
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn chat(State(state): State<Arc<AppState>>, Json(request): Json<TurnRequest>) -> Response {
    match state
        .relay
        .open_turn(&request.message, request.previous_response_id)
        .await
    {
        Ok(TurnOutcome::NoMatch) => plain_text(StatusCode::OK, NO_MATCH_MESSAGE),
        Ok(TurnOutcome::Stream(chunks)) => {
            let stream = ReceiverStream::new(chunks).map(Ok::<_, Infallible>);
            (
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                Body::from_stream(stream),
            )
                .into_response()
        }
        Err(ClipnestError::InvalidInput(_)) => plain_text(StatusCode::BAD_REQUEST, VALIDATION_BODY),
        Err(e) => {
            error!(error = %e, "turn failed upstream");
            plain_text(StatusCode::INTERNAL_SERVER_ERROR, UPSTREAM_BODY)
        }
    }
}

fn plain_text(status: StatusCode, body: &'static str) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::{CompletionClient, CompletionEvent, CompletionRequest};
    use crate::embedding::Embedder;
    use crate::error::Result;
    use crate::search::{ClipMatch, MatchIndex};
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    struct FixedEmbedder;

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![0.1, 0.2, 0.3])
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    struct FixedIndex {
        matches: Vec<ClipMatch>,
        fail: bool,
    }

    #[async_trait]
    impl MatchIndex for FixedIndex {
        async fn top_matches(
            &self,
            _query_embedding: &[f32],
            _match_count: usize,
        ) -> Result<Vec<ClipMatch>> {
            if self.fail {
                return Err(ClipnestError::Search("boom".to_string()));
            }
            Ok(self.matches.clone())
        }
    }

    struct ScriptedCompletion {
        events: Vec<CompletionEvent>,
    }

    #[async_trait]
    impl CompletionClient for ScriptedCompletion {
        async fn stream(
            &self,
            _request: CompletionRequest,
        ) -> Result<mpsc::Receiver<CompletionEvent>> {
            let (tx, rx) = mpsc::channel(16);
            let events = self.events.clone();
            tokio::spawn(async move {
                for event in events {
                    if tx.send(event).await.is_err() {
                        return;
                    }
                }
            });
            Ok(rx)
        }
    }

    fn one_match() -> ClipMatch {
        ClipMatch {
            title: Some("React Hooks Deep Dive".to_string()),
            creator: Some("Ada".to_string()),
            platform: Some("YouTube".to_string()),
            summary: Some("Hooks explained".to_string()),
            transcript_preview: Some("useEffect runs after...".to_string()),
            video_url: Some("https://youtube.com/watch?v=abc".to_string()),
            venue: None,
            address: None,
            city: None,
            similarity: 0.91,
        }
    }

    async fn spawn_relay(
        matches: Vec<ClipMatch>,
        events: Vec<CompletionEvent>,
        search_fails: bool,
    ) -> String {
        let relay = ConversationRelay::new(
            Arc::new(FixedEmbedder),
            Arc::new(FixedIndex {
                matches,
                fail: search_fails,
            }),
            Arc::new(ScriptedCompletion { events }),
            4,
        );
        let app = router(Arc::new(AppState { relay }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn post_chat(base: &str, message: &str) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/api/chat", base))
            .json(&serde_json::json!({ "message": message, "previousResponseId": null }))
            .send()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_whitespace_message_is_rejected_with_400() {
        let base = spawn_relay(vec![one_match()], Vec::new(), false).await;

        let response = post_chat(&base, "   ").await;
        assert_eq!(response.status(), 400);
        assert_eq!(response.text().await.unwrap(), VALIDATION_BODY);
    }

    #[tokio::test]
    async fn test_no_match_returns_fixed_body() {
        let base = spawn_relay(Vec::new(), Vec::new(), false).await;

        let response = post_chat(&base, "anything at all").await;
        assert_eq!(response.status(), 200);
        assert_eq!(response.text().await.unwrap(), NO_MATCH_MESSAGE);
    }

    #[tokio::test]
    async fn test_matched_turn_streams_text_with_marker_suffix() {
        let base = spawn_relay(
            vec![one_match()],
            vec![
                CompletionEvent::TextDelta("Hello ".to_string()),
                CompletionEvent::TextDelta("world".to_string()),
                CompletionEvent::Completed {
                    response_id: "resp_test".to_string(),
                },
            ],
            false,
        )
        .await;

        let response = post_chat(&base, "Find videos about React hooks").await;
        assert_eq!(response.status(), 200);
        let content_type = response
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert_eq!(content_type, "text/plain; charset=utf-8");

        let body = response.text().await.unwrap();
        assert_eq!(body, "Hello world\n[CLIPNEST_ID:resp_test]");
    }

    #[tokio::test]
    async fn test_search_failure_returns_500_with_generic_body() {
        let base = spawn_relay(vec![one_match()], Vec::new(), true).await;

        let response = post_chat(&base, "hi").await;
        assert_eq!(response.status(), 500);
        assert_eq!(response.text().await.unwrap(), UPSTREAM_BODY);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let base = spawn_relay(Vec::new(), Vec::new(), false).await;

        let response = reqwest::get(format!("{}/health", base)).await.unwrap();
        assert_eq!(response.status(), 200);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["status"], "ok");
    }
}
