//! Chatbot service orchestrating a text turn and owner-scoped chat management.
//!
//! ChatbotService classifies the user's message through the NLP port, then
//! hands the exchange to the ConversationAccumulator. Rename, delete and
//! lookup are scoped to the caller; a chat owned by someone else behaves
//! exactly like a missing one.

use chatdesk_types::chat::{ChatDocument, ChatSummary};
use chatdesk_types::error::ChatError;
use chatdesk_types::user::Identity;
use chrono::Utc;
use tracing::info;

use crate::chat::accumulator::{ConversationAccumulator, TextExchange};
use crate::chat::store::ChatStore;
use crate::repository::user::UserRepository;
use crate::upstream::nlp::IntentClassifier;

/// Generic over the store, user repository and classifier so that
/// chatdesk-core never depends on chatdesk-infra.
pub struct ChatbotService<S: ChatStore, U: UserRepository, N: IntentClassifier> {
    accumulator: ConversationAccumulator<S, U>,
    classifier: N,
}

impl<S: ChatStore, U: UserRepository, N: IntentClassifier> ChatbotService<S, U, N> {
    pub fn new(accumulator: ConversationAccumulator<S, U>, classifier: N) -> Self {
        Self {
            accumulator,
            classifier,
        }
    }

    /// Access the underlying chat store.
    pub fn store(&self) -> &S {
        self.accumulator.store()
    }

    /// Run one full text turn: classify, persist, and summarize.
    pub async fn handle_text(
        &self,
        chat_id: &str,
        identity: &Identity,
        text: &str,
    ) -> Result<ChatSummary, ChatError> {
        let chat_id = non_empty(chat_id, "chat id")?;
        let text = non_empty(text, "message")?;
        let received_at = Utc::now();

        let nlp = self.classifier.classify(text).await?;
        let confidence = nlp.clamped_confidence();

        let summary = self
            .accumulator
            .record(
                chat_id,
                identity,
                TextExchange {
                    user_text: text.to_string(),
                    bot_text: nlp.response_text,
                    intent: nlp.intent,
                    confidence,
                    received_at,
                },
            )
            .await?;

        if summary.escalate {
            info!(chat_id = %chat_id, confidence, "reply flagged for escalation");
        }
        Ok(summary)
    }

    /// The caller's chat document, if any.
    pub async fn find_chat(
        &self,
        chat_id: &str,
        identity: &Identity,
    ) -> Result<Option<ChatDocument>, ChatError> {
        Ok(self
            .store()
            .find_chat_by_owner(chat_id, identity.user_id)
            .await?)
    }

    pub async fn rename(
        &self,
        chat_id: &str,
        identity: &Identity,
        new_title: &str,
    ) -> Result<(), ChatError> {
        let title = non_empty(new_title, "title")?;
        self.store().rename(chat_id, identity.user_id, title).await?;
        info!(chat_id = %chat_id, user_id = identity.user_id, "renamed chat");
        Ok(())
    }

    /// Delete the chat together with its voice records.
    pub async fn delete(&self, chat_id: &str, identity: &Identity) -> Result<(), ChatError> {
        self.store().delete(chat_id, identity.user_id).await?;
        info!(chat_id = %chat_id, user_id = identity.user_id, "deleted chat");
        Ok(())
    }
}

fn non_empty<'a>(value: &'a str, what: &str) -> Result<&'a str, ChatError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ChatError::InvalidInput(format!("{what} must not be empty")));
    }
    Ok(trimmed)
}
