//! End-to-end flow through the HTTP surface: ingest a multi-chunk
//! conversation, retrieve context both ways, summarize, and verify that
//! mutation invalidates what retrieval cached.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use clap::Parser;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use braid_cache::{Cache, CacheStore, MemoryStore};
use braid_context::MockLlmClient;
use braid_core::tokens::TokenCounter;
use braid_embeddings::MockEmbeddingService;
use braid_index::{IndexConfig, VectorStore};
use braid_server::{AppConfig, AppState, router};
use braid_store::open_pool;

const DIMS: usize = 16;

struct TestApp {
    _dir: TempDir,
    router: Router,
    llm: Arc<MockLlmClient>,
}

fn make_app() -> TestApp {
    let dir = TempDir::new().unwrap();
    // Small chunks so a modest conversation spans several of them
    let config = AppConfig::parse_from([
        "braid",
        "--max-chunk-messages",
        "3",
        "--overlap-messages",
        "1",
        "--top-k",
        "5",
    ]);
    let pool = open_pool(&dir.path().join("braid.db")).unwrap();
    let index = Arc::new(VectorStore::new(IndexConfig::at(dir.path().join("idx"), DIMS)).unwrap());
    let llm = Arc::new(MockLlmClient::with_response("a tidy summary"));
    let state = AppState::assemble(
        pool,
        index,
        Arc::new(MockEmbeddingService::new(DIMS)),
        llm.clone(),
        Cache::new(Arc::new(MemoryStore::default()) as Arc<dyn CacheStore>),
        Arc::new(TokenCounter::heuristic()),
        &config,
    );
    TestApp {
        _dir: dir,
        router: router(state),
        llm,
    }
}

async fn request(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn seed_batch() -> Value {
    let topics = [
        ("ada", "morning all, standup in five"),
        ("bob", "the deploy pipeline is red again"),
        ("ada", "I will look at the pipeline after standup"),
        ("cleo", "reminder, team meeting on 2026-03-20 at 15:00"),
        ("bob", "pipeline fixed, flaky integration test"),
        ("ada", "deadline by 2026-03-25 for the quarterly report"),
        ("cleo", "thanks ada, adding it to the agenda"),
    ];
    json!({
        "messages": topics
            .iter()
            .map(|(author, content)| json!({"author": author, "content": content}))
            .collect::<Vec<_>>()
    })
}

#[tokio::test]
async fn ingest_builds_overlapping_chunks() {
    let app = make_app();
    let (status, body) = request(
        &app.router,
        post("/conversations/conv_flow/messages", seed_batch()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 7);

    // 7 messages at 3-per-chunk with overlap 1 spans multiple chunks; the
    // packed context replays them oldest-first.
    let (status, body) = request(&app.router, get("/conversations/conv_flow/context")).await;
    assert_eq!(status, StatusCode::OK);
    let context = body["context"].as_str().unwrap();
    assert!(context.contains("ada: morning all, standup in five"));
    assert!(context.contains("cleo: thanks ada, adding it to the agenda"));
    let first = context.find("standup in five").unwrap();
    let last = context.find("adding it to the agenda").unwrap();
    assert!(first < last);
}

#[tokio::test]
async fn semantic_query_annotates_relevance() {
    let app = make_app();
    let _ = request(
        &app.router,
        post("/conversations/conv_flow/messages", seed_batch()),
    )
    .await;

    let (status, body) = request(
        &app.router,
        get("/conversations/conv_flow/context?query=deploy%20pipeline"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let context = body["context"].as_str().unwrap();
    assert!(context.starts_with("[Relevance: "));
}

#[tokio::test]
async fn summary_flows_through_llm_and_caches() {
    let app = make_app();
    let _ = request(
        &app.router,
        post("/conversations/conv_flow/messages", seed_batch()),
    )
    .await;

    let (status, body) = request(&app.router, get("/conversations/conv_flow/summary")).await;
    assert_eq!(status, StatusCode::OK);
    let summary = body["summary"].as_str().unwrap();
    assert!(summary.contains("a tidy summary"));
    // The seeded conversation contains a meeting and a deadline, so the
    // key-information section is prepended.
    assert!(summary.starts_with("Key Information:"));
    let calls_after_first = app.llm.call_count();

    // A second request is a cache hit
    let (status, _) = request(&app.router, get("/conversations/conv_flow/summary")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.llm.call_count(), calls_after_first);
}

#[tokio::test]
async fn mutation_invalidates_cached_context() {
    let app = make_app();
    let _ = request(
        &app.router,
        post("/conversations/conv_flow/messages", seed_batch()),
    )
    .await;

    // Prime the context cache
    let (_, before) = request(&app.router, get("/conversations/conv_flow/context")).await;
    let before = before["context"].as_str().unwrap().to_owned();
    assert!(!before.contains("a brand new message"));

    // Mutate and observe fresh context
    let _ = request(
        &app.router,
        post(
            "/conversations/conv_flow/messages",
            json!({"author": "dev", "content": "a brand new message"}),
        ),
    )
    .await;
    let (_, after) = request(&app.router, get("/conversations/conv_flow/context")).await;
    assert!(after["context"].as_str().unwrap().contains("a brand new message"));
}

#[tokio::test]
async fn calendar_reflects_seeded_key_items() {
    let app = make_app();
    let _ = request(
        &app.router,
        post("/conversations/conv_flow/messages", seed_batch()),
    )
    .await;

    let response = app
        .router
        .clone()
        .oneshot(get("/conversations/conv_flow/key-info.ics"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let ics = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(ics.contains("DTSTART:20260320T150000"));
    assert!(ics.contains("Deadline by 2026-03-25"));
}
