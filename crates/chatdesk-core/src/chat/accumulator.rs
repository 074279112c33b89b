//! ConversationAccumulator: appends one text exchange to a chat.
//!
//! The chat document is created on first use. Creation and append are a single
//! store-level upsert, so concurrent first messages for the same `chat_id`
//! never produce duplicate documents or lose a pair.

use std::time::Duration;

use chatdesk_types::chat::{should_escalate, ChatSummary, TextMessage};
use chatdesk_types::error::ChatError;
use chatdesk_types::user::Identity;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::chat::store::ChatStore;
use crate::repository::user::UserRepository;

/// One classified user/bot exchange, ready to persist.
#[derive(Debug, Clone)]
pub struct TextExchange {
    pub user_text: String,
    pub bot_text: String,
    pub intent: String,
    pub confidence: f64,
    /// When the user message arrived. The bot reply is stamped at record time.
    pub received_at: DateTime<Utc>,
}

pub struct ConversationAccumulator<S: ChatStore, U: UserRepository> {
    store: S,
    users: U,
    write_timeout: Duration,
}

impl<S: ChatStore, U: UserRepository> ConversationAccumulator<S, U> {
    pub fn new(store: S, users: U, write_timeout: Duration) -> Self {
        Self {
            store,
            users,
            write_timeout,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persist the exchange and return the summary shown to the caller.
    ///
    /// The store write is bounded by the configured timeout. Updating the
    /// user's last-chat pointer is best effort and never fails the call.
    pub async fn record(
        &self,
        chat_id: &str,
        identity: &Identity,
        exchange: TextExchange,
    ) -> Result<ChatSummary, ChatError> {
        let replied_at = Utc::now().max(exchange.received_at);
        let user_msg = TextMessage::user(exchange.user_text, exchange.received_at);
        let bot_msg = TextMessage::bot(
            exchange.bot_text.clone(),
            Some(exchange.intent.clone()),
            Some(exchange.confidence),
            replied_at,
        );

        let write = self.store.upsert_text_pair(
            chat_id,
            identity.user_id,
            &identity.username,
            &user_msg,
            &bot_msg,
        );
        tokio::time::timeout(self.write_timeout, write)
            .await
            .map_err(|_| {
                ChatError::TimedOut(format!(
                    "chat write exceeded {} ms",
                    self.write_timeout.as_millis()
                ))
            })??;

        debug!(chat_id = %chat_id, user_id = identity.user_id, "appended text exchange");

        if let Err(e) = self
            .users
            .update_last_chat_id(identity.user_id, chat_id)
            .await
        {
            warn!(
                chat_id = %chat_id,
                user_id = identity.user_id,
                error = %e,
                "Failed to update last chat pointer"
            );
        }

        Ok(ChatSummary {
            chat_id: chat_id.to_string(),
            intent: Some(exchange.intent),
            message: exchange.bot_text,
            confidence: exchange.confidence,
            escalate: should_escalate(exchange.confidence),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chatdesk_types::chat::Sender;
    use chatdesk_types::error::RepositoryError;
    use chatdesk_types::user::{NewUser, UserRole, UserStatus};

    use crate::testing::{MemoryChatStore, MemoryUserRepository};

    async fn seeded_users() -> MemoryUserRepository {
        let users = MemoryUserRepository::default();
        users
            .create(&NewUser {
                username: "ana".to_string(),
                password_hash: String::new(),
                role: UserRole::User,
                status: UserStatus::Online,
            })
            .await
            .unwrap();
        users
    }

    fn ana() -> Identity {
        Identity {
            user_id: 1,
            username: "ana".to_string(),
            role: UserRole::User,
        }
    }

    fn exchange(text: &str, confidence: f64) -> TextExchange {
        TextExchange {
            user_text: text.to_string(),
            bot_text: format!("reply to {text}"),
            intent: "balance_inquiry".to_string(),
            confidence,
            received_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_record_creates_chat_and_points_user_at_it() {
        let acc = ConversationAccumulator::new(
            MemoryChatStore::default(),
            seeded_users().await,
            Duration::from_secs(5),
        );

        let summary = acc.record("chat-1", &ana(), exchange("halo", 0.9)).await.unwrap();
        assert_eq!(summary.chat_id, "chat-1");
        assert_eq!(summary.message, "reply to halo");
        assert!(!summary.escalate);

        let doc = acc.store().find_chat_by_owner("chat-1", 1).await.unwrap().unwrap();
        assert_eq!(doc.owner_username, "ana");
        assert_eq!(doc.text_messages.len(), 2);
        assert_eq!(doc.text_messages[0].sender, Sender::User);
        assert_eq!(doc.text_messages[1].sender, Sender::Bot);
        assert!(doc.text_messages[1].created_at >= doc.text_messages[0].created_at);

        let user = acc.users.get(1).await.unwrap().unwrap();
        assert_eq!(user.last_chat_id.as_deref(), Some("chat-1"));
    }

    #[tokio::test]
    async fn test_record_low_confidence_escalates() {
        let acc = ConversationAccumulator::new(
            MemoryChatStore::default(),
            seeded_users().await,
            Duration::from_secs(5),
        );
        let summary = acc.record("chat-1", &ana(), exchange("???", 0.59)).await.unwrap();
        assert!(summary.escalate);
        let summary = acc.record("chat-1", &ana(), exchange("ok", 0.6)).await.unwrap();
        assert!(!summary.escalate);
    }

    #[tokio::test]
    async fn test_pointer_failure_does_not_fail_record() {
        let users = MemoryUserRepository {
            fail_pointer_updates: true,
            ..Default::default()
        };
        let acc =
            ConversationAccumulator::new(MemoryChatStore::default(), users, Duration::from_secs(5));
        let summary = acc.record("chat-9", &ana(), exchange("halo", 0.8)).await;
        assert!(summary.is_ok());
        assert_eq!(acc.store().count_text_messages().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_foreign_chat_is_not_found() {
        let acc = ConversationAccumulator::new(
            MemoryChatStore::default(),
            seeded_users().await,
            Duration::from_secs(5),
        );
        acc.record("chat-1", &ana(), exchange("halo", 0.9)).await.unwrap();

        let intruder = Identity {
            user_id: 2,
            username: "budi".to_string(),
            role: UserRole::User,
        };
        let err = acc
            .record("chat-1", &intruder, exchange("hi", 0.9))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::NotFound));
        assert_eq!(acc.store().count_text_messages().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_first_messages_share_one_document() {
        let acc = Arc::new(ConversationAccumulator::new(
            MemoryChatStore::default(),
            seeded_users().await,
            Duration::from_secs(5),
        ));

        let a = {
            let acc = Arc::clone(&acc);
            tokio::spawn(async move { acc.record("fresh", &ana(), exchange("one", 0.9)).await })
        };
        let b = {
            let acc = Arc::clone(&acc);
            tokio::spawn(async move { acc.record("fresh", &ana(), exchange("two", 0.9)).await })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        assert_eq!(acc.store().count_chats().await.unwrap(), 1);
        let doc = acc.store().find_chat_by_owner("fresh", 1).await.unwrap().unwrap();
        assert_eq!(doc.text_messages.len(), 4);
        // Each pair stays adjacent.
        assert_eq!(doc.text_messages[0].sender, Sender::User);
        assert_eq!(doc.text_messages[1].body, format!("reply to {}", doc.text_messages[0].body));
        assert_eq!(doc.text_messages[3].body, format!("reply to {}", doc.text_messages[2].body));
    }

    /// Never completes a write.
    struct StalledStore(MemoryChatStore);

    impl ChatStore for StalledStore {
        async fn upsert_text_pair(
            &self,
            _chat_id: &str,
            _owner_id: i64,
            _username: &str,
            _user_msg: &TextMessage,
            _bot_msg: &TextMessage,
        ) -> Result<(), RepositoryError> {
            std::future::pending().await
        }

        async fn insert_voice_pair(
            &self,
            chat_id: &str,
            owner_id: i64,
            user_record: &chatdesk_types::voice::VoiceMessageRecord,
            bot_record: &chatdesk_types::voice::VoiceMessageRecord,
        ) -> Result<(), RepositoryError> {
            self.0
                .insert_voice_pair(chat_id, owner_id, user_record, bot_record)
                .await
        }

        async fn find_chat_by_owner(
            &self,
            chat_id: &str,
            owner_id: i64,
        ) -> Result<Option<chatdesk_types::chat::ChatDocument>, RepositoryError> {
            self.0.find_chat_by_owner(chat_id, owner_id).await
        }

        async fn list_voice_by_chat_owner(
            &self,
            chat_id: &str,
            owner_id: i64,
        ) -> Result<Vec<chatdesk_types::voice::VoiceMessageRecord>, RepositoryError> {
            self.0.list_voice_by_chat_owner(chat_id, owner_id).await
        }

        async fn rename(&self, chat_id: &str, owner_id: i64, title: &str) -> Result<(), RepositoryError> {
            self.0.rename(chat_id, owner_id, title).await
        }

        async fn delete(&self, chat_id: &str, owner_id: i64) -> Result<(), RepositoryError> {
            self.0.delete(chat_id, owner_id).await
        }

        async fn list_chats_by_owner(
            &self,
            owner_id: i64,
        ) -> Result<Vec<chatdesk_types::chat::ChatListItem>, RepositoryError> {
            self.0.list_chats_by_owner(owner_id).await
        }

        async fn recent_chats(
            &self,
            limit: i64,
        ) -> Result<Vec<chatdesk_types::chat::ChatDocument>, RepositoryError> {
            self.0.recent_chats(limit).await
        }

        async fn count_chats(&self) -> Result<u64, RepositoryError> {
            self.0.count_chats().await
        }

        async fn count_text_messages(&self) -> Result<u64, RepositoryError> {
            self.0.count_text_messages().await
        }
    }

    #[tokio::test]
    async fn test_stalled_write_times_out() {
        let acc = ConversationAccumulator::new(
            StalledStore(MemoryChatStore::default()),
            seeded_users().await,
            Duration::from_millis(20),
        );
        let err = acc.record("chat-1", &ana(), exchange("halo", 0.9)).await.unwrap_err();
        assert!(matches!(err, ChatError::TimedOut(_)));

        // Pointer is only moved after a successful write.
        let user = acc.users.get(1).await.unwrap().unwrap();
        assert!(user.last_chat_id.is_none());
    }
}
