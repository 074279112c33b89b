//! ChatStore trait definition.
//!
//! The message store owns chat documents (metadata plus embedded text
//! messages) and the independent voice records of each chat. Follows the same
//! RPITIT pattern as `UserRepository`.

use chatdesk_types::chat::{ChatDocument, ChatListItem, TextMessage};
use chatdesk_types::error::RepositoryError;
use chatdesk_types::voice::VoiceMessageRecord;

/// Repository trait for chat document and voice record persistence.
///
/// Implementations live in chatdesk-infra (e.g., `SqliteChatStore`).
///
/// Every lookup and mutation is keyed by `(chat_id, owner_id)`. A chat that
/// exists under a different owner is reported exactly like a missing chat
/// (`None` / [`RepositoryError::NotFound`]).
pub trait ChatStore: Send + Sync {
    /// Append a user/bot pair to the chat, creating the document if absent.
    ///
    /// Must be a single atomic "insert if absent, else append" operation at
    /// the persistence layer: concurrent calls for the same unseen `chat_id`
    /// yield one document holding every pair. Returns `NotFound` when the
    /// chat exists under another owner.
    fn upsert_text_pair(
        &self,
        chat_id: &str,
        owner_id: i64,
        username: &str,
        user_msg: &TextMessage,
        bot_msg: &TextMessage,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Insert a user/bot voice record pair. Both are written or neither is.
    fn insert_voice_pair(
        &self,
        chat_id: &str,
        owner_id: i64,
        user_record: &VoiceMessageRecord,
        bot_record: &VoiceMessageRecord,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get the chat document matching both keys.
    fn find_chat_by_owner(
        &self,
        chat_id: &str,
        owner_id: i64,
    ) -> impl std::future::Future<Output = Result<Option<ChatDocument>, RepositoryError>> + Send;

    /// Voice records for the chat/owner pair, ordered by created_at ASC.
    fn list_voice_by_chat_owner(
        &self,
        chat_id: &str,
        owner_id: i64,
    ) -> impl std::future::Future<Output = Result<Vec<VoiceMessageRecord>, RepositoryError>> + Send;

    /// Rename a chat. `NotFound` when no chat matches both keys.
    fn rename(
        &self,
        chat_id: &str,
        owner_id: i64,
        new_title: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a chat and its voice records. `NotFound` when no chat matches both keys.
    fn delete(
        &self,
        chat_id: &str,
        owner_id: i64,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Chat summaries for an owner, ordered by updated_at DESC.
    fn list_chats_by_owner(
        &self,
        owner_id: i64,
    ) -> impl std::future::Future<Output = Result<Vec<ChatListItem>, RepositoryError>> + Send;

    /// Most recently updated chats across all owners, ordered by updated_at DESC.
    fn recent_chats(
        &self,
        limit: i64,
    ) -> impl std::future::Future<Output = Result<Vec<ChatDocument>, RepositoryError>> + Send;

    /// Count chat documents.
    fn count_chats(&self) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Sum of text-message counts over all chat documents (voice excluded).
    fn count_text_messages(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
