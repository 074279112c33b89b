//! SQLite chat store implementation.
//!
//! Implements `ChatStore` from `chatdesk-core` using sqlx with split read/write pools.
//! Text messages live in the `chats.messages` JSON array; voice records are rows
//! of `voice_messages`. Follows the same patterns as `SqliteUserRepository`: raw
//! queries, private Row structs, split reader/writer pool usage.

use chatdesk_core::chat::store::ChatStore;
use chatdesk_core::chat::timestamp::{format_text_timestamp, parse_text_timestamp};
use chatdesk_types::chat::{default_title, ChatDocument, ChatListItem, Sender, TextMessage};
use chatdesk_types::error::RepositoryError;
use chatdesk_types::voice::VoiceMessageRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ChatStore`.
#[derive(Clone)]
pub struct SqliteChatStore {
    pool: DatabasePool,
}

impl SqliteChatStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

/// One element of the `chats.messages` JSON array.
///
/// Imported documents may use `message`/`timestamp` for `body`/`created_at`.
#[derive(Serialize, Deserialize)]
struct StoredMessage {
    sender: String,
    #[serde(alias = "message")]
    body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    intent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    confidence: Option<f64>,
    #[serde(default, alias = "timestamp")]
    created_at: String,
}

impl StoredMessage {
    fn from_domain(msg: &TextMessage) -> Self {
        Self {
            sender: msg.sender.to_string(),
            body: msg.body.clone(),
            intent: msg.intent.clone(),
            confidence: msg.confidence,
            created_at: format_text_timestamp(&msg.created_at),
        }
    }

    fn into_domain(self) -> Result<TextMessage, RepositoryError> {
        let sender: Sender = self
            .sender
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        Ok(TextMessage {
            sender,
            body: self.body,
            intent: self.intent,
            confidence: self.confidence,
            created_at: parse_text_timestamp(&self.created_at),
        })
    }

    fn to_json(msg: &TextMessage) -> Result<String, RepositoryError> {
        serde_json::to_string(&Self::from_domain(msg))
            .map_err(|e| RepositoryError::Query(format!("failed to encode message: {e}")))
    }
}

/// Internal row type for mapping SQLite rows to domain ChatDocument.
struct ChatRow {
    chat_id: String,
    owner_user_id: i64,
    owner_username: String,
    title: String,
    messages: String,
    created_at: String,
    updated_at: Option<String>,
}

impl ChatRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            chat_id: row.try_get("chat_id")?,
            owner_user_id: row.try_get("owner_user_id")?,
            owner_username: row.try_get("owner_username")?,
            title: row.try_get("title")?,
            messages: row.try_get("messages")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_document(self) -> Result<ChatDocument, RepositoryError> {
        let stored: Vec<StoredMessage> = serde_json::from_str(&self.messages).map_err(|e| {
            RepositoryError::Query(format!("invalid messages for chat {}: {e}", self.chat_id))
        })?;
        let text_messages = stored
            .into_iter()
            .map(StoredMessage::into_domain)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ChatDocument {
            chat_id: self.chat_id,
            owner_user_id: self.owner_user_id,
            owner_username: self.owner_username,
            title: self.title,
            text_messages,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: self.updated_at.as_deref().map(parse_datetime).transpose()?,
        })
    }
}

/// Internal row type for the chat listing projection.
struct ChatListRow {
    chat_id: String,
    title: String,
    created_at: String,
    updated_at: Option<String>,
}

impl ChatListRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            chat_id: row.try_get("chat_id")?,
            title: row.try_get("title")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_item(self) -> Result<ChatListItem, RepositoryError> {
        Ok(ChatListItem {
            chat_id: self.chat_id,
            title: self.title,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: self.updated_at.as_deref().map(parse_datetime).transpose()?,
        })
    }
}

/// Internal row type for mapping SQLite rows to domain VoiceMessageRecord.
struct VoiceRow {
    chat_id: String,
    owner_user_id: i64,
    sender: String,
    audio_url: String,
    transcript: String,
    intent: Option<String>,
    created_at: i64,
}

impl VoiceRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            chat_id: row.try_get("chat_id")?,
            owner_user_id: row.try_get("owner_user_id")?,
            sender: row.try_get("sender")?,
            audio_url: row.try_get("audio_url")?,
            transcript: row.try_get("transcript")?,
            intent: row.try_get("intent")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_record(self) -> Result<VoiceMessageRecord, RepositoryError> {
        let sender: Sender = self
            .sender
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let created_at = DateTime::<Utc>::from_timestamp_millis(self.created_at).ok_or_else(|| {
            RepositoryError::Query(format!("voice timestamp out of range: {}", self.created_at))
        })?;

        Ok(VoiceMessageRecord {
            chat_id: self.chat_id,
            owner_user_id: self.owner_user_id,
            sender,
            audio_url: self.audio_url,
            transcript: self.transcript,
            intent: self.intent,
            created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

// ---------------------------------------------------------------------------
// ChatStore implementation
// ---------------------------------------------------------------------------

// Listings order by `julianday(updated_at)`: imported rows may carry any
// RFC 3339 offset, so the text column does not sort chronologically.

impl ChatStore for SqliteChatStore {
    async fn upsert_text_pair(
        &self,
        chat_id: &str,
        owner_id: i64,
        username: &str,
        user_msg: &TextMessage,
        bot_msg: &TextMessage,
    ) -> Result<(), RepositoryError> {
        let user_json = StoredMessage::to_json(user_msg)?;
        let bot_json = StoredMessage::to_json(bot_msg)?;
        let updated_at = format_text_timestamp(&bot_msg.created_at);

        // Insert-or-append in one statement. The DO UPDATE branch only fires for
        // the owning user; for anyone else the statement affects zero rows.
        let result = sqlx::query(
            r#"INSERT INTO chats (chat_id, owner_user_id, owner_username, title, messages, created_at, updated_at)
               VALUES (?, ?, ?, ?, json_array(json(?), json(?)), ?, ?)
               ON CONFLICT(chat_id) DO UPDATE SET
                   messages = json_insert(chats.messages, '$[#]', json(?), '$[#]', json(?)),
                   updated_at = excluded.updated_at
               WHERE chats.owner_user_id = excluded.owner_user_id"#,
        )
        .bind(chat_id)
        .bind(owner_id)
        .bind(username)
        .bind(default_title(&user_msg.created_at))
        .bind(&user_json)
        .bind(&bot_json)
        .bind(format_text_timestamp(&user_msg.created_at))
        .bind(&updated_at)
        .bind(&user_json)
        .bind(&bot_json)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn insert_voice_pair(
        &self,
        chat_id: &str,
        owner_id: i64,
        user_record: &VoiceMessageRecord,
        bot_record: &VoiceMessageRecord,
    ) -> Result<(), RepositoryError> {
        // A single multi-row INSERT: both rows land or neither does.
        sqlx::query(
            r#"INSERT INTO voice_messages (chat_id, owner_user_id, sender, audio_url, transcript, intent, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?), (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(chat_id)
        .bind(owner_id)
        .bind(user_record.sender.to_string())
        .bind(&user_record.audio_url)
        .bind(&user_record.transcript)
        .bind(&user_record.intent)
        .bind(user_record.created_at.timestamp_millis())
        .bind(chat_id)
        .bind(owner_id)
        .bind(bot_record.sender.to_string())
        .bind(&bot_record.audio_url)
        .bind(&bot_record.transcript)
        .bind(&bot_record.intent)
        .bind(bot_record.created_at.timestamp_millis())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn find_chat_by_owner(
        &self,
        chat_id: &str,
        owner_id: i64,
    ) -> Result<Option<ChatDocument>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chats WHERE chat_id = ? AND owner_user_id = ?")
            .bind(chat_id)
            .bind(owner_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let chat_row =
                    ChatRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(chat_row.into_document()?))
            }
            None => Ok(None),
        }
    }

    async fn list_voice_by_chat_owner(
        &self,
        chat_id: &str,
        owner_id: i64,
    ) -> Result<Vec<VoiceMessageRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM voice_messages WHERE chat_id = ? AND owner_user_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(chat_id)
        .bind(owner_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let voice_row =
                VoiceRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            records.push(voice_row.into_record()?);
        }

        Ok(records)
    }

    async fn rename(
        &self,
        chat_id: &str,
        owner_id: i64,
        new_title: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE chats SET title = ?, updated_at = ? WHERE chat_id = ? AND owner_user_id = ?",
        )
        .bind(new_title)
        .bind(format_text_timestamp(&Utc::now()))
        .bind(chat_id)
        .bind(owner_id)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete(&self, chat_id: &str, owner_id: i64) -> Result<(), RepositoryError> {
        // Use a transaction: DELETE chat + DELETE its voice records
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let result = sqlx::query("DELETE FROM chats WHERE chat_id = ? AND owner_user_id = ?")
            .bind(chat_id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls it back.
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("DELETE FROM voice_messages WHERE chat_id = ? AND owner_user_id = ?")
            .bind(chat_id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn list_chats_by_owner(&self, owner_id: i64) -> Result<Vec<ChatListItem>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT chat_id, title, created_at, updated_at FROM chats WHERE owner_user_id = ? ORDER BY julianday(updated_at) DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            let list_row =
                ChatListRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            items.push(list_row.into_item()?);
        }

        Ok(items)
    }

    async fn recent_chats(&self, limit: i64) -> Result<Vec<ChatDocument>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM chats ORDER BY julianday(updated_at) DESC LIMIT ?")
            .bind(limit)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut docs = Vec::with_capacity(rows.len());
        for row in &rows {
            let chat_row =
                ChatRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            docs.push(chat_row.into_document()?);
        }

        Ok(docs)
    }

    async fn count_chats(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM chats")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(count as u64)
    }

    async fn count_text_messages(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COALESCE(SUM(json_array_length(messages)), 0) as cnt FROM chats")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(count as u64)
    }
}
