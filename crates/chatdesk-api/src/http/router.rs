//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`.
//! Middleware: CORS, tracing.
//!
//! Stored audio is served straight from `{data_dir}/audio/` under
//! `/api/v1/voice/audio/`, so URLs returned by the blob store resolve here.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Largest accepted voice upload.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Accounts
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/current", get(handlers::auth::current))
        .route("/auth/last-chat", post(handlers::auth::set_last_chat))
        // Text chat
        .route("/chats", get(handlers::chat::list_chats))
        .route(
            "/chats/{chat_id}",
            post(handlers::chat::send_message)
                .get(handlers::chat::get_chat)
                .put(handlers::chat::rename_chat)
                .delete(handlers::chat::delete_chat),
        )
        .route("/chats/{chat_id}/full", get(handlers::chat::full_history))
        // Voice
        .route(
            "/voice/upload",
            post(handlers::voice::upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/voice/{chat_id}", get(handlers::voice::list_voice))
        .nest_service("/voice/audio", ServeDir::new(&state.audio_dir))
        // Admin dashboard
        .route("/admin/metrics", get(handlers::admin::metrics))
        .route(
            "/admin/conversations",
            get(handlers::admin::recent_conversations),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
