//! The HTTP route table and handlers.
//!
//! All handlers are thin: validate, call the injected service, map the
//! outcome. Data absence surfaces as 404 where the caller asked for a
//! derived artifact (summary, draft) and as an empty value where the empty
//! state is itself meaningful (context, message list).

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use braid_context::{DraftOutcome, SummaryOutcome, keyinfo};
use braid_core::ids;
use braid_core::message::NewMessage;
use braid_store::{MessageRepo, StoreError};

use crate::errors::ApiError;
use crate::state::AppState;

/// Build the route table.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/conversations", post(create_conversation).get(list_conversations))
        .route(
            "/conversations/{id}/messages",
            post(append_messages).get(list_messages),
        )
        .route("/conversations/{id}/context", get(get_context))
        .route("/conversations/{id}/summary", get(get_summary))
        .route("/conversations/{id}/draft", post(draft_reply))
        .route("/conversations/{id}/key-info.ics", get(key_info_calendar))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn validated_id(id: &str) -> Result<&str, ApiError> {
    if ids::is_valid_conversation_id(id) {
        Ok(id)
    } else {
        Err(ApiError::BadRequest(format!("invalid conversation id: {id}")))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// POST /conversations — mint an id.
async fn create_conversation() -> Json<serde_json::Value> {
    Json(json!({ "conversationId": ids::new_conversation_id() }))
}

/// GET /conversations — distinct ids with messages.
async fn list_conversations(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = state.pool.get().map_err(StoreError::from)?;
    let conversations = MessageRepo::conversation_ids(&conn)?;
    Ok(Json(json!({ "conversations": conversations })))
}

/// Body of a message append: one message or a batch.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AppendBody {
    /// `{"messages": [...]}`
    Batch {
        /// The batch, in order.
        messages: Vec<NewMessage>,
    },
    /// A bare message object.
    Single(NewMessage),
}

/// POST /conversations/{id}/messages — append and rebuild.
async fn append_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<AppendBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = validated_id(&id)?;

    let messages = match body {
        AppendBody::Single(message) => vec![message],
        AppendBody::Batch { messages } => messages,
    };
    if messages.is_empty() {
        return Err(ApiError::BadRequest("no messages provided".into()));
    }
    for message in &messages {
        if message.author.trim().is_empty() || message.content.is_empty() {
            return Err(ApiError::BadRequest(
                "author and content are required".into(),
            ));
        }
    }

    let inserted = state.ingest.append_messages(id, &messages).await?;
    let count = inserted.len();
    Ok(Json(json!({
        "messages": inserted,
        "count": count,
    })))
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    #[serde(default)]
    offset: i64,
    #[serde(default = "default_limit")]
    limit: i64,
}

fn default_limit() -> i64 {
    100
}

/// GET /conversations/{id}/messages
async fn list_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = validated_id(&id)?;
    let conn = state.pool.get().map_err(StoreError::from)?;
    let messages = MessageRepo::list(&conn, id, page.offset.max(0), page.limit.clamp(1, 1000))?;
    Ok(Json(json!({ "messages": messages })))
}

#[derive(Debug, Deserialize)]
struct ContextQuery {
    query: Option<String>,
}

/// GET /conversations/{id}/context — packed context, optionally focused.
///
/// An empty context is a valid response: the conversation exists but has
/// no chunks yet (or does not exist at all — indistinguishable by design).
async fn get_context(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ContextQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = validated_id(&id)?;
    let context = state
        .assembler
        .get_context(id, params.query.as_deref(), true)
        .await?;
    Ok(Json(json!({ "context": context })))
}

#[derive(Debug, Deserialize)]
struct SummaryQuery {
    query: Option<String>,
    #[serde(default)]
    force_refresh: bool,
}

/// GET /conversations/{id}/summary
async fn get_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<SummaryQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = validated_id(&id)?;
    let outcome = state
        .summarizer
        .get_or_create(id, params.query.as_deref(), true, params.force_refresh)
        .await?;
    match outcome {
        SummaryOutcome::Ready(summary) => Ok(Json(json!({ "summary": summary }))),
        SummaryOutcome::NoData => Err(ApiError::NotFound(
            "no conversation data available to summarize".into(),
        )),
    }
}

#[derive(Debug, Deserialize)]
struct DraftBody {
    #[serde(default)]
    as_author: Option<String>,
    intent: String,
}

/// POST /conversations/{id}/draft
async fn draft_reply(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<DraftBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = validated_id(&id)?;
    let outcome = state
        .drafter
        .draft(id, body.as_author.as_deref(), &body.intent, true)
        .await?;
    match outcome {
        DraftOutcome::Ready(draft) => Ok(Json(json!({ "draft": draft }))),
        DraftOutcome::NoData => Err(ApiError::NotFound(
            "nothing to draft: empty intent or conversation".into(),
        )),
    }
}

/// GET /conversations/{id}/key-info.ics — calendar file of extracted items.
async fn key_info_calendar(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = validated_id(&id)?;
    let context = state.assembler.get_context(id, None, true).await?;
    if context.is_empty() {
        return Err(ApiError::NotFound("no conversation data".into()));
    }
    let items = keyinfo::extract_key_items(&context);
    let ics = keyinfo::to_ics(&items);

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"key-info.ics\"",
            ),
        ],
        ics,
    )
        .into_response())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
