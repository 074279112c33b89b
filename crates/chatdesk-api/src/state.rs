//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Services are generic over store/upstream/hasher traits, but AppState
//! pins them to the concrete infra implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chatdesk_core::chat::accumulator::ConversationAccumulator;
use chatdesk_core::chat::history::HistoryMerger;
use chatdesk_core::chat::projection::ChatProjection;
use chatdesk_core::chat::service::ChatbotService;
use chatdesk_core::service::auth::AuthService;
use chatdesk_core::upstream::speech::PollPolicy;
use chatdesk_core::voice::service::{VoiceService, VoiceSettings};
use chatdesk_infra::crypto::jwt::JwtTokenIssuer;
use chatdesk_infra::crypto::password::Argon2PasswordHasher;
use chatdesk_infra::filesystem::blob::LocalBlobStore;
use chatdesk_infra::filesystem::audio_dir;
use chatdesk_infra::sqlite::chat::SqliteChatStore;
use chatdesk_infra::sqlite::pool::DatabasePool;
use chatdesk_infra::sqlite::user::SqliteUserRepository;
use chatdesk_infra::upstream::nlp::HttpIntentClassifier;
use chatdesk_infra::upstream::synthesis::HttpSpeechSynthesizer;
use chatdesk_infra::upstream::transcription::HttpTranscriptionClient;
use chatdesk_types::config::AppConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteChatbotService =
    ChatbotService<SqliteChatStore, SqliteUserRepository, HttpIntentClassifier>;

pub type ConcreteVoiceService = VoiceService<
    SqliteChatStore,
    HttpIntentClassifier,
    HttpTranscriptionClient,
    HttpSpeechSynthesizer,
    LocalBlobStore,
>;

pub type ConcreteAuthService =
    AuthService<SqliteUserRepository, Argon2PasswordHasher, JwtTokenIssuer>;

pub type ConcreteProjection = ChatProjection<SqliteChatStore, SqliteUserRepository>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatbotService>,
    pub voice_service: Arc<ConcreteVoiceService>,
    pub auth_service: Arc<ConcreteAuthService>,
    pub history: Arc<HistoryMerger<SqliteChatStore>>,
    pub projection: Arc<ConcreteProjection>,
    pub config: Arc<AppConfig>,
    pub data_dir: PathBuf,
    pub audio_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Wire services against `data_dir` with an already-loaded config.
    pub async fn build(data_dir: &Path, config: AppConfig) -> anyhow::Result<Self> {
        let db_pool = DatabasePool::open(data_dir).await?;
        let audio_dir = audio_dir(data_dir);

        let store = SqliteChatStore::new(db_pool.clone());
        let users = SqliteUserRepository::new(db_pool.clone());

        let services = &config.services;
        let request_timeout = Duration::from_millis(services.request_timeout_ms);
        let classifier = HttpIntentClassifier::new(&services.nlp_url, request_timeout)?;
        let transcriber = HttpTranscriptionClient::new(
            &services.stt_url,
            &services.media_base_url,
            &services.tts_language,
            request_timeout,
        )?;
        let synthesizer =
            HttpSpeechSynthesizer::new(&services.tts_url, &services.tts_language, request_timeout)?;

        let accumulator = ConversationAccumulator::new(
            store.clone(),
            users.clone(),
            Duration::from_millis(config.store.write_timeout_ms),
        );
        let chat_service = ChatbotService::new(accumulator, classifier.clone());

        let voice_settings = VoiceSettings {
            poll: PollPolicy {
                interval: Duration::from_millis(config.voice.poll_interval_ms),
                max_attempts: config.voice.max_poll_attempts,
            },
            min_audio_bytes: config.voice.min_audio_bytes,
        };
        let voice_service = VoiceService::new(
            store.clone(),
            classifier,
            transcriber,
            synthesizer,
            LocalBlobStore::new(audio_dir.clone()),
            voice_settings,
        );

        let auth_service = AuthService::new(
            users.clone(),
            Argon2PasswordHasher::new(),
            JwtTokenIssuer::from_config(&config.auth),
        );

        Ok(Self {
            chat_service: Arc::new(chat_service),
            voice_service: Arc::new(voice_service),
            auth_service: Arc::new(auth_service),
            history: Arc::new(HistoryMerger::new(store.clone())),
            projection: Arc::new(ChatProjection::new(store, users)),
            config: Arc::new(config),
            data_dir: data_dir.to_path_buf(),
            audio_dir,
            db_pool,
        })
    }
}
