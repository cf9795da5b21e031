use std::convert::Infallible;

use axum::{
    Json,
    body::Body,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures_util::StreamExt;
use rchat::{ReasoningTier, TurnRequest};
use rcommon::{BotId, ConversationKey, SessionId};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

pub const SESSION_HEADER: &str = "x-session-id";
pub const NDJSON: &str = "application/x-ndjson";

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionQuery {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BotSummary {
    pub id: String,
    pub model: String,
    pub reasoning_tier: String,
    pub max_output_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BotsResponse {
    pub bots: Vec<BotSummary>,
}

/// Health check
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn list_bots(State(state): State<AppState>) -> Json<BotsResponse> {
    let composer = state.relay.composer();
    let bots = state
        .relay
        .profiles()
        .iter_sorted()
        .into_iter()
        .map(|profile| BotSummary {
            id: profile.id.to_string(),
            model: composer.resolve_model(profile).to_string(),
            reasoning_tier: profile.reasoning_tier.clone(),
            max_output_tokens: ReasoningTier::budget_for(&profile.reasoning_tier),
        })
        .collect();

    Json(BotsResponse { bots })
}

/// Streams one turn as NDJSON frames.
pub async fn chat(
    State(state): State<AppState>,
    Path(bot_id): Path<String>,
    headers: HeaderMap,
    body: Result<Json<ChatBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body.map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))?;
    let session = resolve_session(body.session_id.as_deref(), &headers)?;
    let request = TurnRequest::new(session, bot_id, body.message);

    let permit = state.gate.acquire(&request.key()).await;
    let frames = state.relay.start_turn(request)?;

    // The permit rides along with the body so the key stays locked until the
    // stream is finished or the client goes away.
    let lines = frames.map(move |frame| {
        let _held = &permit;
        Ok::<_, Infallible>(Bytes::from(frame.to_line()))
    });

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(NDJSON)),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
            (
                HeaderName::from_static("x-accel-buffering"),
                HeaderValue::from_static("no"),
            ),
        ],
        Body::from_stream(lines),
    )
        .into_response())
}

/// Clears a conversation when the user (re)enters a bot's page.
pub async fn reset(
    State(state): State<AppState>,
    Path(bot_id): Path<String>,
    Query(query): Query<SessionQuery>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let session = resolve_session(query.session_id.as_deref(), &headers)?;
    let key = ConversationKey::new(session, BotId::new(bot_id));

    let permit = state.gate.acquire(&key).await;
    state.relay.reset(&key)?;
    drop(permit);

    Ok(StatusCode::NO_CONTENT)
}

/// Forgets every conversation of a session once the user's session is over.
pub async fn end_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let session = resolve_session(Some(&session_id), &HeaderMap::new())?;

    // Permits are taken in sorted bot order so concurrent ends cannot deadlock.
    let mut permits = Vec::new();
    for profile in state.relay.profiles().iter_sorted() {
        let key = ConversationKey::new(session.clone(), profile.id.clone());
        permits.push(state.gate.acquire(&key).await);
    }

    let removed = state.relay.end_session(&session);
    drop(permits);
    tracing::debug!(session_id = %session, conversations = removed, "session ended");

    Ok(StatusCode::NO_CONTENT)
}

fn resolve_session(explicit: Option<&str>, headers: &HeaderMap) -> Result<SessionId, ApiError> {
    explicit
        .map(str::trim)
        .filter(|session| !session.is_empty())
        .or_else(|| {
            headers
                .get(SESSION_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|session| !session.is_empty())
        })
        .map(SessionId::new)
        .ok_or(ApiError::MissingSession)
}
