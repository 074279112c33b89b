//! Bearer token authentication extractors.
//!
//! Reads `Authorization: Bearer <jwt>` and resolves it to an [`Identity`]
//! through the auth service. No database round-trip is made.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use chatdesk_types::error::AuthError;
use chatdesk_types::user::Identity;

use crate::http::error::AppError;
use crate::state::AppState;

/// Any signed-in user.
pub struct CurrentUser(pub Identity);

/// A signed-in user with the `admin` role.
pub struct AdminUser(pub Identity);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer(parts)?;
        let identity = state.auth_service.authenticate(token)?;
        Ok(CurrentUser(identity))
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(identity) = CurrentUser::from_request_parts(parts, state).await?;
        if !identity.is_admin() {
            return Err(AppError::Auth(AuthError::Forbidden));
        }
        Ok(AdminUser(identity))
    }
}

fn extract_bearer(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| missing("Missing 'Authorization: Bearer <token>' header"))?;
    let value = header
        .to_str()
        .map_err(|_| missing("Invalid Authorization header encoding"))?;

    match value.strip_prefix("Bearer ").map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(missing("Authorization header must use the Bearer scheme")),
    }
}

fn missing(msg: &str) -> AppError {
    AppError::Auth(AuthError::InvalidToken(msg.to_string()))
}
