//! VoiceService: upload, transcribe, classify, synthesize, persist.
//!
//! One call handles a whole voice turn. Both audio artifacts are written to
//! the blob store, and the user/bot record pair is inserted only after every
//! upstream step has succeeded.

use chatdesk_types::chat::should_escalate;
use chatdesk_types::error::ChatError;
use chatdesk_types::user::Identity;
use chatdesk_types::voice::{voice_pair, VoiceExchange, VoiceMessageRecord, VoiceReply};
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::chat::store::ChatStore;
use crate::upstream::blob::BlobStore;
use crate::upstream::nlp::IntentClassifier;
use crate::upstream::speech::{await_transcript, PollPolicy, SpeechSynthesizer, TranscriptionJobs};

const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// Tunables for the voice pipeline.
#[derive(Debug, Clone, Copy)]
pub struct VoiceSettings {
    pub poll: PollPolicy,
    /// Uploads below this size are rejected as corrupt.
    pub min_audio_bytes: usize,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            poll: PollPolicy::default(),
            min_audio_bytes: 1_000,
        }
    }
}

pub struct VoiceService<S, N, T, Y, B>
where
    S: ChatStore,
    N: IntentClassifier,
    T: TranscriptionJobs,
    Y: SpeechSynthesizer,
    B: BlobStore,
{
    store: S,
    classifier: N,
    transcriber: T,
    synthesizer: Y,
    blobs: B,
    settings: VoiceSettings,
}

impl<S, N, T, Y, B> VoiceService<S, N, T, Y, B>
where
    S: ChatStore,
    N: IntentClassifier,
    T: TranscriptionJobs,
    Y: SpeechSynthesizer,
    B: BlobStore,
{
    pub fn new(
        store: S,
        classifier: N,
        transcriber: T,
        synthesizer: Y,
        blobs: B,
        settings: VoiceSettings,
    ) -> Self {
        Self {
            store,
            classifier,
            transcriber,
            synthesizer,
            blobs,
            settings,
        }
    }

    /// Process one uploaded utterance and return the bot's spoken reply.
    pub async fn process_upload(
        &self,
        chat_id: &str,
        identity: &Identity,
        file_name: &str,
        audio: Vec<u8>,
    ) -> Result<VoiceReply, ChatError> {
        let chat_id = chat_id.trim();
        if chat_id.is_empty() {
            return Err(ChatError::InvalidInput("chat id must not be empty".into()));
        }
        if audio.len() < self.settings.min_audio_bytes {
            return Err(ChatError::InvalidInput(format!(
                "audio is {} bytes, expected at least {}",
                audio.len(),
                self.settings.min_audio_bytes
            )));
        }

        let upload_id = Uuid::now_v7();
        let stem = sanitize_stem(file_name);
        let received_at = Utc::now();

        let user_url = self
            .blobs
            .put(&format!("user/{upload_id}-{stem}.mp3"), audio, AUDIO_CONTENT_TYPE)
            .await?;

        let job_name = format!("transcribe-{upload_id}");
        self.transcriber.start_job(&job_name, &user_url).await?;
        let transcript = await_transcript(&self.transcriber, &job_name, self.settings.poll).await?;
        debug!(job = %job_name, chars = transcript.len(), "transcription completed");

        let nlp = self.classifier.classify(&transcript).await?;
        let confidence = nlp.clamped_confidence();

        let speech = self.synthesizer.synthesize(&nlp.response_text).await?;
        let bot_url = self
            .blobs
            .put(&format!("bot/{upload_id}-{stem}.mp3"), speech, AUDIO_CONTENT_TYPE)
            .await?;

        let (user_record, bot_record) = voice_pair(
            chat_id,
            identity.user_id,
            VoiceExchange {
                user_audio_url: user_url,
                transcript: transcript.clone(),
                bot_audio_url: bot_url.clone(),
                response_text: nlp.response_text.clone(),
                intent: Some(nlp.intent.clone()),
            },
            received_at,
        );
        self.store
            .insert_voice_pair(chat_id, identity.user_id, &user_record, &bot_record)
            .await?;

        info!(chat_id = %chat_id, user_id = identity.user_id, intent = %nlp.intent, "voice exchange stored");

        Ok(VoiceReply {
            transcript,
            intent: Some(nlp.intent),
            response_text: nlp.response_text,
            bot_audio_url: bot_url,
            escalate: should_escalate(confidence),
        })
    }

    /// The caller's voice records for a chat, oldest first.
    pub async fn list_voice(
        &self,
        chat_id: &str,
        identity: &Identity,
    ) -> Result<Vec<VoiceMessageRecord>, ChatError> {
        Ok(self
            .store
            .list_voice_by_chat_owner(chat_id, identity.user_id)
            .await?)
    }
}

/// Reduce an uploaded file name to a safe blob key segment.
fn sanitize_stem(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or_default();
    let stem = base.rsplit_once('.').map_or(base, |(s, _)| s);
    let cleaned: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "audio".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use chatdesk_types::chat::Sender;
    use chatdesk_types::error::UpstreamError;
    use chatdesk_types::user::UserRole;
    use chatdesk_types::voice::{JobStatus, BOT_REPLY_OFFSET};

    use crate::testing::{FixedClassifier, MemoryChatStore};

    struct InstantJobs {
        outcome: JobStatus,
        started: Mutex<Vec<(String, String)>>,
    }

    impl InstantJobs {
        fn completing(transcript: &str) -> Self {
            Self {
                outcome: JobStatus::Completed {
                    transcript: transcript.to_string(),
                },
                started: Mutex::new(Vec::new()),
            }
        }
    }

    impl TranscriptionJobs for InstantJobs {
        async fn start_job(&self, job_name: &str, media_url: &str) -> Result<(), UpstreamError> {
            self.started
                .lock()
                .unwrap()
                .push((job_name.to_string(), media_url.to_string()));
            Ok(())
        }

        async fn job_status(&self, _job_name: &str) -> Result<JobStatus, UpstreamError> {
            Ok(self.outcome.clone())
        }
    }

    struct EchoSynth;

    impl SpeechSynthesizer for EchoSynth {
        async fn synthesize(&self, text: &str) -> Result<Vec<u8>, UpstreamError> {
            Ok(text.as_bytes().to_vec())
        }
    }

    #[derive(Default)]
    struct MemoryBlobs {
        keys: Mutex<Vec<String>>,
    }

    impl BlobStore for MemoryBlobs {
        async fn put(&self, key: &str, _bytes: Vec<u8>, _content_type: &str) -> Result<String, UpstreamError> {
            self.keys.lock().unwrap().push(key.to_string());
            Ok(format!("/api/v1/voice/audio/{key}"))
        }
    }

    type TestVoiceService = VoiceService<MemoryChatStore, FixedClassifier, InstantJobs, EchoSynth, MemoryBlobs>;

    fn service(jobs: InstantJobs, confidence: f64) -> TestVoiceService {
        VoiceService::new(
            MemoryChatStore::default(),
            FixedClassifier::new("balance_inquiry", "Saldo anda 10.000", confidence),
            jobs,
            EchoSynth,
            MemoryBlobs::default(),
            VoiceSettings {
                poll: PollPolicy {
                    interval: Duration::from_millis(1),
                    max_attempts: 3,
                },
                min_audio_bytes: 1_000,
            },
        )
    }

    fn ana() -> Identity {
        Identity {
            user_id: 1,
            username: "ana".into(),
            role: UserRole::User,
        }
    }

    #[tokio::test]
    async fn test_process_upload_stores_pair_and_both_blobs() {
        let svc = service(InstantJobs::completing("cek saldo"), 0.9);
        let reply = svc
            .process_upload("c1", &ana(), "rekaman 01.mp3", vec![0u8; 2_048])
            .await
            .unwrap();

        assert_eq!(reply.transcript, "cek saldo");
        assert_eq!(reply.response_text, "Saldo anda 10.000");
        assert!(!reply.escalate);
        assert!(reply.bot_audio_url.starts_with("/api/v1/voice/audio/bot/"));

        let keys = svc.blobs.keys.lock().unwrap().clone();
        assert_eq!(keys.len(), 2);
        assert!(keys[0].starts_with("user/") && keys[0].ends_with("-rekaman_01.mp3"));
        assert!(keys[1].starts_with("bot/"));

        let started = svc.transcriber.started.lock().unwrap().clone();
        assert_eq!(started.len(), 1);
        assert!(started[0].1.ends_with(&keys[0]));

        let records = svc.list_voice("c1", &ana()).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sender, Sender::User);
        assert_eq!(records[1].sender, Sender::Bot);
        assert_eq!(records[1].created_at - records[0].created_at, BOT_REPLY_OFFSET);
        assert_eq!(records[1].transcript, "Saldo anda 10.000");
    }

    #[tokio::test]
    async fn test_small_upload_rejected_before_any_upstream_call() {
        let svc = service(InstantJobs::completing("x"), 0.9);
        let err = svc
            .process_upload("c1", &ana(), "a.mp3", vec![0u8; 999])
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::InvalidInput(_)));
        assert!(svc.blobs.keys.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_transcription_persists_nothing() {
        let jobs = InstantJobs {
            outcome: JobStatus::Failed {
                reason: "bad audio".into(),
            },
            started: Mutex::new(Vec::new()),
        };
        let svc = service(jobs, 0.9);
        let err = svc
            .process_upload("c1", &ana(), "a.mp3", vec![0u8; 2_000])
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Upstream(UpstreamError::JobFailed(_))));
        assert!(svc.list_voice("c1", &ana()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stuck_transcription_times_out() {
        let jobs = InstantJobs {
            outcome: JobStatus::InProgress,
            started: Mutex::new(Vec::new()),
        };
        let svc = service(jobs, 0.9);
        let err = svc
            .process_upload("c1", &ana(), "a.mp3", vec![0u8; 2_000])
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Upstream(UpstreamError::TimedOut { attempts: 3 })));
    }

    #[tokio::test]
    async fn test_low_confidence_voice_reply_escalates() {
        let svc = service(InstantJobs::completing("???"), 0.2);
        let reply = svc
            .process_upload("c1", &ana(), "a.mp3", vec![0u8; 2_000])
            .await
            .unwrap();
        assert!(reply.escalate);
    }

    #[test]
    fn test_sanitize_stem() {
        assert_eq!(sanitize_stem("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_stem("C:\\tmp\\my clip.wav"), "my_clip");
        assert_eq!(sanitize_stem(".mp3"), "audio");
        assert_eq!(sanitize_stem(""), "audio");
    }
}
