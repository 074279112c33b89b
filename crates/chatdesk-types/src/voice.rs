//! Voice message types.
//!
//! Voice messages are stored as independent records (not embedded in the chat
//! document) and are always written as a user/bot pair.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::Sender;

/// Offset added to the user record's timestamp to stamp the paired bot record.
///
/// Keeps the pair strictly ordered even when both are created in the same instant.
pub const BOT_REPLY_OFFSET: TimeDelta = TimeDelta::milliseconds(1);

/// One stored voice message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceMessageRecord {
    pub chat_id: String,
    pub owner_user_id: i64,
    pub sender: Sender,
    pub audio_url: String,
    /// Speech-to-text result for the user; response text for the bot.
    pub transcript: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Content of one user/bot voice exchange, before it is stamped and stored.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceExchange {
    pub user_audio_url: String,
    pub transcript: String,
    pub bot_audio_url: String,
    pub response_text: String,
    pub intent: Option<String>,
}

/// Build the user/bot record pair for one voice exchange.
///
/// The bot record is stamped [`BOT_REPLY_OFFSET`] after the user record.
pub fn voice_pair(
    chat_id: &str,
    owner_user_id: i64,
    exchange: VoiceExchange,
    created_at: DateTime<Utc>,
) -> (VoiceMessageRecord, VoiceMessageRecord) {
    let VoiceExchange {
        user_audio_url,
        transcript,
        bot_audio_url,
        response_text,
        intent,
    } = exchange;
    let user = VoiceMessageRecord {
        chat_id: chat_id.to_string(),
        owner_user_id,
        sender: Sender::User,
        audio_url: user_audio_url,
        transcript,
        intent: intent.clone(),
        created_at,
    };
    let bot = VoiceMessageRecord {
        chat_id: chat_id.to_string(),
        owner_user_id,
        sender: Sender::Bot,
        audio_url: bot_audio_url,
        transcript: response_text,
        intent,
        created_at: created_at + BOT_REPLY_OFFSET,
    };
    (user, bot)
}

/// Outcome of one processed voice upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceReply {
    pub transcript: String,
    pub intent: Option<String>,
    pub response_text: String,
    pub bot_audio_url: String,
    pub escalate: bool,
}

/// State of an asynchronous transcription job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    InProgress,
    Completed { transcript: String },
    Failed { reason: String },
}
