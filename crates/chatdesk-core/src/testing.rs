//! In-memory port implementations shared by the service tests.

use std::collections::HashMap;
use std::sync::Mutex;

use chatdesk_types::chat::{default_title, ChatDocument, ChatListItem, TextMessage};
use chatdesk_types::error::{RepositoryError, UpstreamError};
use chatdesk_types::nlp::NlpResult;
use chatdesk_types::user::{NewUser, User, UserStatus};
use chatdesk_types::voice::VoiceMessageRecord;
use chrono::Utc;

use crate::chat::store::ChatStore;
use crate::repository::user::UserRepository;
use crate::upstream::nlp::IntentClassifier;

#[derive(Default)]
pub struct MemoryChatStore {
    pub chats: Mutex<HashMap<String, ChatDocument>>,
    pub voice: Mutex<Vec<VoiceMessageRecord>>,
}

impl MemoryChatStore {
    pub fn insert_doc(&self, doc: ChatDocument) {
        self.chats.lock().unwrap().insert(doc.chat_id.clone(), doc);
    }
}

impl ChatStore for MemoryChatStore {
    async fn upsert_text_pair(
        &self,
        chat_id: &str,
        owner_id: i64,
        username: &str,
        user_msg: &TextMessage,
        bot_msg: &TextMessage,
    ) -> Result<(), RepositoryError> {
        let mut chats = self.chats.lock().unwrap();
        let doc = chats.entry(chat_id.to_string()).or_insert_with(|| ChatDocument {
            chat_id: chat_id.to_string(),
            owner_user_id: owner_id,
            owner_username: username.to_string(),
            title: default_title(&user_msg.created_at),
            text_messages: Vec::new(),
            created_at: user_msg.created_at,
            updated_at: None,
        });
        if doc.owner_user_id != owner_id {
            return Err(RepositoryError::NotFound);
        }
        doc.text_messages.push(user_msg.clone());
        doc.text_messages.push(bot_msg.clone());
        doc.updated_at = Some(bot_msg.created_at);
        Ok(())
    }

    async fn insert_voice_pair(
        &self,
        _chat_id: &str,
        _owner_id: i64,
        user_record: &VoiceMessageRecord,
        bot_record: &VoiceMessageRecord,
    ) -> Result<(), RepositoryError> {
        let mut voice = self.voice.lock().unwrap();
        voice.push(user_record.clone());
        voice.push(bot_record.clone());
        Ok(())
    }

    async fn find_chat_by_owner(
        &self,
        chat_id: &str,
        owner_id: i64,
    ) -> Result<Option<ChatDocument>, RepositoryError> {
        Ok(self
            .chats
            .lock()
            .unwrap()
            .get(chat_id)
            .filter(|d| d.owner_user_id == owner_id)
            .cloned())
    }

    async fn list_voice_by_chat_owner(
        &self,
        chat_id: &str,
        owner_id: i64,
    ) -> Result<Vec<VoiceMessageRecord>, RepositoryError> {
        let mut records: Vec<_> = self
            .voice
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.chat_id == chat_id && r.owner_user_id == owner_id)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.created_at);
        Ok(records)
    }

    async fn rename(
        &self,
        chat_id: &str,
        owner_id: i64,
        new_title: &str,
    ) -> Result<(), RepositoryError> {
        let mut chats = self.chats.lock().unwrap();
        match chats.get_mut(chat_id) {
            Some(doc) if doc.owner_user_id == owner_id => {
                doc.title = new_title.to_string();
                doc.updated_at = Some(Utc::now());
                Ok(())
            }
            _ => Err(RepositoryError::NotFound),
        }
    }

    async fn delete(&self, chat_id: &str, owner_id: i64) -> Result<(), RepositoryError> {
        let mut chats = self.chats.lock().unwrap();
        let owned = chats
            .get(chat_id)
            .is_some_and(|d| d.owner_user_id == owner_id);
        if !owned {
            return Err(RepositoryError::NotFound);
        }
        chats.remove(chat_id);
        self.voice
            .lock()
            .unwrap()
            .retain(|r| !(r.chat_id == chat_id && r.owner_user_id == owner_id));
        Ok(())
    }

    async fn list_chats_by_owner(&self, owner_id: i64) -> Result<Vec<ChatListItem>, RepositoryError> {
        let chats = self.chats.lock().unwrap();
        let mut docs: Vec<&ChatDocument> =
            chats.values().filter(|d| d.owner_user_id == owner_id).collect();
        docs.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(docs.into_iter().map(ChatListItem::from).collect())
    }

    async fn recent_chats(&self, limit: i64) -> Result<Vec<ChatDocument>, RepositoryError> {
        let chats = self.chats.lock().unwrap();
        let mut docs: Vec<ChatDocument> = chats.values().cloned().collect();
        docs.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        docs.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(docs)
    }

    async fn count_chats(&self) -> Result<u64, RepositoryError> {
        Ok(self.chats.lock().unwrap().len() as u64)
    }

    async fn count_text_messages(&self) -> Result<u64, RepositoryError> {
        Ok(self
            .chats
            .lock()
            .unwrap()
            .values()
            .map(|d| d.text_messages.len() as u64)
            .sum())
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    pub users: Mutex<Vec<User>>,
    /// When set, `update_last_chat_id` fails.
    pub fail_pointer_updates: bool,
}

impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == user.username) {
            return Err(RepositoryError::Conflict(user.username.clone()));
        }
        let created = User {
            id: users.len() as i64 + 1,
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            status: user.status,
            last_chat_id: None,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn get(&self, id: i64) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn set_status(&self, id: i64, status: UserStatus) -> Result<(), RepositoryError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(RepositoryError::NotFound)?;
        user.status = status;
        Ok(())
    }

    async fn update_last_chat_id(&self, id: i64, chat_id: &str) -> Result<(), RepositoryError> {
        if self.fail_pointer_updates {
            return Err(RepositoryError::Connection);
        }
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(RepositoryError::NotFound)?;
        user.last_chat_id = Some(chat_id.to_string());
        Ok(())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.users.lock().unwrap().len() as u64)
    }
}

/// Always answers with the given result.
pub struct FixedClassifier(pub NlpResult);

impl FixedClassifier {
    pub fn new(intent: &str, response: &str, confidence: f64) -> Self {
        Self(NlpResult {
            intent: intent.to_string(),
            response_text: response.to_string(),
            confidence,
        })
    }
}

impl IntentClassifier for FixedClassifier {
    async fn classify(&self, _text: &str) -> Result<NlpResult, UpstreamError> {
        Ok(self.0.clone())
    }
}
