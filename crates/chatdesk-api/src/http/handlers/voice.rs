//! Voice message handlers.
//!
//! Endpoints:
//! - POST /api/v1/voice/upload    - multipart `chat_id` + `audio`, returns the spoken reply
//! - GET  /api/v1/voice/{chat_id} - The caller's voice records for a chat
//!
//! Stored audio is served from `/api/v1/voice/audio/...` by the router.

use axum::extract::{Multipart, Path, State};
use axum::Json;

use chatdesk_types::voice::{VoiceMessageRecord, VoiceReply};

use crate::http::error::AppError;
use crate::http::extractors::auth::CurrentUser;
use crate::http::response::{ApiResponse, RequestContext};
use crate::state::AppState;

const DEFAULT_FILE_NAME: &str = "recording.mp3";

/// Fields pulled out of the upload form.
struct VoiceUpload {
    chat_id: String,
    file_name: String,
    audio: Vec<u8>,
}

async fn read_upload(mut multipart: Multipart) -> Result<VoiceUpload, AppError> {
    let mut chat_id = None;
    let mut audio = None;
    let mut file_name = DEFAULT_FILE_NAME.to_string();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("chat_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable chat_id field: {e}")))?;
                chat_id = Some(text);
            }
            Some("audio") => {
                if let Some(original) = field.file_name() {
                    file_name = original.to_string();
                }
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable audio field: {e}")))?;
                audio = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    Ok(VoiceUpload {
        chat_id: chat_id.ok_or_else(|| AppError::Validation("missing 'chat_id' field".into()))?,
        file_name,
        audio: audio.ok_or_else(|| AppError::Validation("missing 'audio' file".into()))?,
    })
}

/// POST /api/v1/voice/upload
pub async fn upload(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    multipart: Multipart,
) -> Result<Json<ApiResponse<VoiceReply>>, AppError> {
    let ctx = RequestContext::start();
    let upload = read_upload(multipart).await?;

    let reply = state
        .voice_service
        .process_upload(&upload.chat_id, &identity, &upload.file_name, upload.audio)
        .await?;

    let history = format!("/api/v1/chats/{}/full", upload.chat_id.trim());
    Ok(Json(ctx.respond(reply).with_link("history", &history)))
}

/// GET /api/v1/voice/{chat_id}
pub async fn list_voice(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(chat_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<VoiceMessageRecord>>>, AppError> {
    let ctx = RequestContext::start();
    let records = state.voice_service.list_voice(&chat_id, &identity).await?;
    Ok(Json(ctx.respond(records)))
}
