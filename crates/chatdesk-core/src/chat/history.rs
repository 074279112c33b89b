//! History merge: one chronological timeline out of text and voice messages.

use chatdesk_types::chat::{HistoryEntry, Modality, TextMessage};
use chatdesk_types::error::ChatError;
use chatdesk_types::voice::VoiceMessageRecord;

use crate::chat::store::ChatStore;

/// Merge text messages and voice records into a single time-ordered list.
///
/// Text entries are laid down first, then voice entries, and the result is
/// stable-sorted by timestamp. On equal timestamps text precedes voice, and
/// within a modality the original order is kept.
pub fn merge_history(text: &[TextMessage], voice: &[VoiceMessageRecord]) -> Vec<HistoryEntry> {
    let mut entries: Vec<HistoryEntry> = Vec::with_capacity(text.len() + voice.len());

    entries.extend(text.iter().map(|m| HistoryEntry {
        sender: m.sender,
        modality: Modality::Text,
        content: m.body.clone(),
        transcript: None,
        audio_url: None,
        intent: m.intent.clone(),
        timestamp: m.created_at,
    }));

    entries.extend(voice.iter().map(|r| HistoryEntry {
        sender: r.sender,
        modality: Modality::Voice,
        content: r.transcript.clone(),
        transcript: Some(r.transcript.clone()),
        audio_url: Some(r.audio_url.clone()),
        intent: r.intent.clone(),
        timestamp: r.created_at,
    }));

    // `sort_by_key` is stable.
    entries.sort_by_key(|e| e.timestamp);
    entries
}

pub struct HistoryMerger<S: ChatStore> {
    store: S,
}

impl<S: ChatStore> HistoryMerger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Full merged history of a chat owned by `owner_id`.
    ///
    /// A missing (or foreign) chat document contributes no text entries;
    /// voice records are still looked up under the same key.
    pub async fn full_history(
        &self,
        chat_id: &str,
        owner_id: i64,
    ) -> Result<Vec<HistoryEntry>, ChatError> {
        let text = self
            .store
            .find_chat_by_owner(chat_id, owner_id)
            .await?
            .map(|doc| doc.text_messages)
            .unwrap_or_default();
        let voice = self.store.list_voice_by_chat_owner(chat_id, owner_id).await?;
        Ok(merge_history(&text, &voice))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatdesk_types::chat::Sender;
    use chatdesk_types::voice::{voice_pair, VoiceExchange};
    use chrono::{DateTime, TimeZone, Utc};

    use crate::testing::MemoryChatStore;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_714_557_600_000 + ms).unwrap()
    }

    fn voice_at(ms: i64) -> (VoiceMessageRecord, VoiceMessageRecord) {
        voice_pair(
            "c1",
            1,
            VoiceExchange {
                user_audio_url: "/api/v1/voice/audio/user/a.mp3".to_string(),
                transcript: "cek saldo".to_string(),
                bot_audio_url: "/api/v1/voice/audio/bot/a.mp3".to_string(),
                response_text: "Saldo anda 10.000".to_string(),
                intent: Some("balance_inquiry".to_string()),
            },
            at(ms),
        )
    }

    #[test]
    fn test_interleaves_by_timestamp() {
        let text = vec![
            TextMessage::user("halo", at(0)),
            TextMessage::bot("Halo!", Some("greeting".into()), Some(0.95), at(5)),
            TextMessage::user("terima kasih", at(100)),
        ];
        let (vu, vb) = voice_at(50);
        let merged = merge_history(&text, &[vu, vb]);

        let order: Vec<(Modality, Sender)> = merged.iter().map(|e| (e.modality, e.sender)).collect();
        assert_eq!(
            order,
            vec![
                (Modality::Text, Sender::User),
                (Modality::Text, Sender::Bot),
                (Modality::Voice, Sender::User),
                (Modality::Voice, Sender::Bot),
                (Modality::Text, Sender::User),
            ]
        );
        assert_eq!(merged[2].content, "cek saldo");
        assert_eq!(merged[2].transcript.as_deref(), Some("cek saldo"));
        assert!(merged[0].audio_url.is_none());
        assert_eq!(merged[3].content, "Saldo anda 10.000");
    }

    #[test]
    fn test_equal_timestamps_keep_text_before_voice() {
        let text = vec![TextMessage::user("same instant", at(10))];
        let (vu, _) = voice_at(10);
        let merged = merge_history(&text, &[vu]);
        assert_eq!(merged[0].modality, Modality::Text);
        assert_eq!(merged[1].modality, Modality::Voice);
    }

    #[test]
    fn test_equal_timestamps_keep_insertion_order_within_text() {
        let text = vec![
            TextMessage::user("first", at(0)),
            TextMessage::bot("second", None, None, at(0)),
        ];
        let merged = merge_history(&text, &[]);
        assert_eq!(merged[0].content, "first");
        assert_eq!(merged[1].content, "second");
    }

    #[test]
    fn test_unparseable_timestamps_sort_first() {
        let text = vec![
            TextMessage::user("normal", at(0)),
            TextMessage::user("legacy", DateTime::<Utc>::MIN_UTC),
        ];
        let merged = merge_history(&text, &[]);
        assert_eq!(merged[0].content, "legacy");
    }

    #[test]
    fn test_empty_inputs() {
        assert!(merge_history(&[], &[]).is_empty());
    }

    #[tokio::test]
    async fn test_full_history_voice_only_chat() {
        let store = MemoryChatStore::default();
        let (vu, vb) = voice_at(0);
        store.insert_voice_pair("c1", 1, &vu, &vb).await.unwrap();

        let merger = HistoryMerger::new(store);
        let history = merger.full_history("c1", 1).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|e| e.modality == Modality::Voice));

        // Another owner sees nothing.
        assert!(merger.full_history("c1", 2).await.unwrap().is_empty());
    }
}
