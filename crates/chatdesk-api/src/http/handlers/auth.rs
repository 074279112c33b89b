//! Account and session handlers.
//!
//! Endpoints:
//! - POST /api/v1/auth/register - Create a `user`-role account and sign it in
//! - POST /api/v1/auth/login    - Exchange credentials for a token
//! - POST /api/v1/auth/logout   - Mark the caller offline
//! - GET  /api/v1/auth/current  - The caller's account
//! - POST /api/v1/auth/last-chat - Remember the caller's active chat

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use chatdesk_core::repository::user::UserRepository;
use chatdesk_types::error::AuthError;
use chatdesk_types::user::{AuthSession, User, UserRole};

use crate::http::error::AppError;
use crate::http::extractors::auth::CurrentUser;
use crate::http::response::{ApiResponse, RequestContext};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LastChatRequest {
    pub chat_id: String,
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<ApiResponse<AuthSession>>, AppError> {
    let ctx = RequestContext::start();
    let session = state
        .auth_service
        .register(&body.username, &body.password, UserRole::User)
        .await?;
    Ok(Json(ctx.respond(session).with_link("current", "/api/v1/auth/current")))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<ApiResponse<AuthSession>>, AppError> {
    let ctx = RequestContext::start();
    let session = state.auth_service.login(&body.username, &body.password).await?;
    Ok(Json(ctx.respond(session).with_link("chats", "/api/v1/chats")))
}

/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let ctx = RequestContext::start();
    state.auth_service.logout(&identity).await?;
    Ok(Json(ctx.respond(serde_json::json!({ "logged_out": true }))))
}

/// GET /api/v1/auth/current
///
/// A valid token whose account was since removed is rejected like a bad token.
pub async fn current(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let ctx = RequestContext::start();
    let user = state
        .auth_service
        .users()
        .get(identity.user_id)
        .await
        .map_err(AuthError::from)?
        .ok_or_else(|| AuthError::InvalidToken("account no longer exists".to_string()))?;
    Ok(Json(ctx.respond(user)))
}

/// POST /api/v1/auth/last-chat
///
/// The account comes from the token; the chat need not exist yet.
pub async fn set_last_chat(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Json(body): Json<LastChatRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let ctx = RequestContext::start();
    let chat_id = body.chat_id.trim();
    if chat_id.is_empty() {
        return Err(AppError::Validation("chat_id must not be empty".to_string()));
    }
    state
        .auth_service
        .users()
        .update_last_chat_id(identity.user_id, chat_id)
        .await
        .map_err(AuthError::from)?;
    Ok(Json(
        ctx.respond(serde_json::json!({ "last_chat_id": chat_id }))
            .with_link("current", "/api/v1/auth/current"),
    ))
}
