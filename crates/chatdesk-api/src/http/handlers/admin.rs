//! Admin dashboard handlers. All require the `admin` role.

use axum::extract::{Query, State};
use axum::Json;

use chatdesk_types::chat::{AdminMetrics, RecentConversation};

use crate::http::error::AppError;
use crate::http::extractors::auth::AdminUser;
use crate::http::extractors::query::RecentQuery;
use crate::http::response::{ApiResponse, RequestContext};
use crate::state::AppState;

/// GET /api/v1/admin/metrics
pub async fn metrics(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<ApiResponse<AdminMetrics>>, AppError> {
    let ctx = RequestContext::start();
    let metrics = state.projection.admin_metrics().await?;
    Ok(Json(
        ctx.respond(metrics)
            .with_link("conversations", "/api/v1/admin/conversations"),
    ))
}

/// GET /api/v1/admin/conversations?limit=
pub async fn recent_conversations(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<RecentQuery>,
) -> Result<Json<ApiResponse<Vec<RecentConversation>>>, AppError> {
    let ctx = RequestContext::start();
    let recent = state.projection.recent_conversations(query.limit).await?;
    Ok(Json(ctx.respond(recent)))
}
