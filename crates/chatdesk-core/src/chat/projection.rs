//! Read-side views over the chat store: per-user chat lists and admin metrics.

use chatdesk_types::chat::{AdminMetrics, ChatListItem, RecentConversation};
use chatdesk_types::error::ChatError;

use crate::chat::store::ChatStore;
use crate::repository::user::UserRepository;

/// Page size for the admin recent-conversations view.
pub const DEFAULT_RECENT_LIMIT: i64 = 10;

pub struct ChatProjection<S: ChatStore, U: UserRepository> {
    store: S,
    users: U,
}

impl<S: ChatStore, U: UserRepository> ChatProjection<S, U> {
    pub fn new(store: S, users: U) -> Self {
        Self { store, users }
    }

    /// The user's chats, most recently active first.
    pub async fn list_chats(&self, user_id: i64) -> Result<Vec<ChatListItem>, ChatError> {
        Ok(self.store.list_chats_by_owner(user_id).await?)
    }

    /// Totals across all users. Voice records are not counted as messages.
    pub async fn admin_metrics(&self) -> Result<AdminMetrics, ChatError> {
        Ok(AdminMetrics {
            total_users: self.users.count().await?,
            total_conversations: self.store.count_chats().await?,
            total_messages: self.store.count_text_messages().await?,
        })
    }

    /// Most recently updated chats across all users.
    ///
    /// `None` or a non-positive limit falls back to [`DEFAULT_RECENT_LIMIT`].
    pub async fn recent_conversations(
        &self,
        limit: Option<i64>,
    ) -> Result<Vec<RecentConversation>, ChatError> {
        let limit = limit.filter(|l| *l > 0).unwrap_or(DEFAULT_RECENT_LIMIT);
        let docs = self.store.recent_chats(limit).await?;
        Ok(docs
            .iter()
            .map(|doc| RecentConversation {
                chat_id: doc.chat_id.clone(),
                username: doc.owner_username.clone(),
                last_activity_at: doc.last_activity_at(),
            })
            .collect())
    }
}
