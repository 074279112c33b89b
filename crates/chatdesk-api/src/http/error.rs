//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use chatdesk_types::error::{AuthError, ChatError, UpstreamError};

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Chat, voice and projection errors.
    Chat(ChatError),
    /// Account and token errors.
    Auth(AuthError),
    /// Malformed request (bad multipart body, missing field).
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        AppError::Auth(e)
    }
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Chat(ChatError::NotFound) => (StatusCode::NOT_FOUND, "CHAT_NOT_FOUND"),
            AppError::Chat(ChatError::InvalidInput(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            AppError::Chat(ChatError::Upstream(UpstreamError::TimedOut { .. })) => {
                (StatusCode::GATEWAY_TIMEOUT, "UPSTREAM_TIMEOUT")
            }
            AppError::Chat(ChatError::Upstream(_)) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            AppError::Chat(ChatError::TimedOut(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "STORE_TIMEOUT")
            }
            AppError::Chat(ChatError::Storage(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR")
            }
            AppError::Auth(AuthError::InvalidCredentials) => {
                (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS")
            }
            AppError::Auth(AuthError::UsernameTaken(_)) => (StatusCode::CONFLICT, "USERNAME_TAKEN"),
            AppError::Auth(AuthError::InvalidToken(_)) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Auth(AuthError::TokenExpired) => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED"),
            AppError::Auth(AuthError::Forbidden) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::Auth(AuthError::Hashing(_) | AuthError::Storage(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "AUTH_ERROR")
            }
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Chat(ChatError::NotFound) => "Chat not found".to_string(),
            AppError::Chat(e) => e.to_string(),
            AppError::Auth(e) => e.to_string(),
            AppError::Validation(msg) | AppError::Internal(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!(code, error = %message, "request failed");
        } else {
            tracing::debug!(code, error = %message, "request rejected");
        }

        let body = ApiResponse::error(code, &message, Uuid::now_v7().to_string(), 0);
        (status, Json(body)).into_response()
    }
}
