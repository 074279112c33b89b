//! Chat document, text message, and projection types for Chatdesk.
//!
//! A chat is one conversation thread keyed by an opaque string. Its typed-text
//! messages live inside the chat document; voice messages are stored as
//! separate records (see [`crate::voice`]) and merged in at read time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Confidence below which a bot reply is flagged for human escalation.
pub const ESCALATION_THRESHOLD: f64 = 0.6;

/// Whether a reply with the given NLP confidence should be escalated.
pub fn should_escalate(confidence: f64) -> bool {
    confidence < ESCALATION_THRESHOLD
}

/// Default chat title derived from the creation instant.
pub fn default_title(created_at: &DateTime<Utc>) -> String {
    format!("Conversation on {}", created_at.format("%-d %B %Y %H:%M"))
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Bot => write!(f, "bot"),
        }
    }
}

impl FromStr for Sender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Sender::User),
            "bot" => Ok(Sender::Bot),
            other => Err(format!("invalid sender: '{other}'")),
        }
    }
}

/// A typed-text message embedded in a [`ChatDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextMessage {
    pub sender: Sender,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    /// NLP confidence in `[0, 1]` (bot messages only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl TextMessage {
    pub fn user(body: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            sender: Sender::User,
            body: body.into(),
            intent: None,
            confidence: None,
            created_at,
        }
    }

    pub fn bot(
        body: impl Into<String>,
        intent: Option<String>,
        confidence: Option<f64>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sender: Sender::Bot,
            body: body.into(),
            intent,
            confidence,
            created_at,
        }
    }
}

/// One chat thread: metadata plus its ordered text messages.
///
/// Exactly one document exists per `chat_id`. `text_messages` is append-only
/// and always grows by a user-then-bot pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatDocument {
    pub chat_id: String,
    pub owner_user_id: i64,
    pub owner_username: String,
    pub title: String,
    pub text_messages: Vec<TextMessage>,
    pub created_at: DateTime<Utc>,
    /// Absent on legacy documents that were never touched after import.
    pub updated_at: Option<DateTime<Utc>>,
}

impl ChatDocument {
    /// Instant of the most recent activity on this chat.
    ///
    /// Prefers the document-level `updated_at`, falling back to the last text
    /// message's timestamp.
    pub fn last_activity_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
            .or_else(|| self.text_messages.last().map(|m| m.created_at))
    }
}

/// Lightweight per-chat row for chat listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatListItem {
    pub chat_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&ChatDocument> for ChatListItem {
    fn from(doc: &ChatDocument) -> Self {
        Self {
            chat_id: doc.chat_id.clone(),
            title: doc.title.clone(),
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

/// Result of recording one text exchange, returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSummary {
    pub chat_id: String,
    pub intent: Option<String>,
    pub message: String,
    pub confidence: f64,
    pub escalate: bool,
}

/// Representation of a message in the merged history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Voice,
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modality::Text => write!(f, "text"),
            Modality::Voice => write!(f, "voice"),
        }
    }
}

/// One normalized entry of a chat's full (text + voice) history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub sender: Sender,
    #[serde(rename = "type")]
    pub modality: Modality,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Platform-wide counters for the admin dashboard.
///
/// `total_messages` counts text messages only; voice records are excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminMetrics {
    pub total_users: u64,
    pub total_conversations: u64,
    pub total_messages: u64,
}

/// Admin view of a recently active conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentConversation {
    pub chat_id: String,
    pub username: String,
    pub last_activity_at: Option<DateTime<Utc>>,
}
