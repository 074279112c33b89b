//! Text chat handlers.
//!
//! Endpoints:
//! - GET    /api/v1/chats                - List the caller's chats
//! - POST   /api/v1/chats/{chat_id}      - Send a message, get the bot's reply
//! - GET    /api/v1/chats/{chat_id}      - The caller's chat document
//! - GET    /api/v1/chats/{chat_id}/full - Merged text and voice history
//! - PUT    /api/v1/chats/{chat_id}      - Rename
//! - DELETE /api/v1/chats/{chat_id}      - Delete, including voice records

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use chatdesk_types::chat::{ChatDocument, ChatListItem, ChatSummary, HistoryEntry};
use chatdesk_types::error::ChatError;

use crate::http::error::AppError;
use crate::http::extractors::auth::CurrentUser;
use crate::http::response::{ApiResponse, RequestContext};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub new_title: String,
}

/// GET /api/v1/chats
pub async fn list_chats(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<ApiResponse<Vec<ChatListItem>>>, AppError> {
    let ctx = RequestContext::start();
    let chats = state.projection.list_chats(identity.user_id).await?;
    Ok(Json(ctx.respond(chats).with_link("self", "/api/v1/chats")))
}

/// POST /api/v1/chats/{chat_id}
pub async fn send_message(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(chat_id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<Json<ApiResponse<ChatSummary>>, AppError> {
    let ctx = RequestContext::start();
    let summary = state
        .chat_service
        .handle_text(&chat_id, &identity, &body.message)
        .await?;
    let href = format!("/api/v1/chats/{}", summary.chat_id);
    Ok(Json(ctx.respond(summary).with_link("chat", &href)))
}

/// GET /api/v1/chats/{chat_id}
pub async fn get_chat(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(chat_id): Path<String>,
) -> Result<Json<ApiResponse<ChatDocument>>, AppError> {
    let ctx = RequestContext::start();
    let chat = state
        .chat_service
        .find_chat(&chat_id, &identity)
        .await?
        .ok_or(ChatError::NotFound)?;
    let full = format!("/api/v1/chats/{chat_id}/full");
    Ok(Json(ctx.respond(chat).with_link("full", &full)))
}

/// GET /api/v1/chats/{chat_id}/full
pub async fn full_history(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(chat_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<HistoryEntry>>>, AppError> {
    let ctx = RequestContext::start();
    let entries = state.history.full_history(&chat_id, identity.user_id).await?;
    Ok(Json(ctx.respond(entries)))
}

/// PUT /api/v1/chats/{chat_id}
pub async fn rename_chat(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(chat_id): Path<String>,
    Json(body): Json<RenameRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let ctx = RequestContext::start();
    state
        .chat_service
        .rename(&chat_id, &identity, &body.new_title)
        .await?;
    Ok(Json(ctx.respond(serde_json::json!({
        "chat_id": chat_id,
        "title": body.new_title.trim(),
    }))))
}

/// DELETE /api/v1/chats/{chat_id}
pub async fn delete_chat(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(chat_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let ctx = RequestContext::start();
    state.chat_service.delete(&chat_id, &identity).await?;
    Ok(Json(ctx.respond(serde_json::json!({ "deleted": true }))))
}
