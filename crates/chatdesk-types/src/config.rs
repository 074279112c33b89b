//! Application configuration types for Chatdesk.
//!
//! `AppConfig` represents the top-level `config.toml`. Every section and field
//! has a default so an empty or missing file yields a runnable configuration.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Top-level configuration loaded from `~/.chatdesk/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub services: ServicesConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret. When unset, an ephemeral secret is generated at startup.
    #[serde(default, skip_serializing)]
    pub jwt_secret: Option<SecretString>,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: u32,
}

fn default_token_ttl_hours() -> u32 {
    24
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_hours: default_token_ttl_hours(),
        }
    }
}

/// Endpoints of the external NLP and speech services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    #[serde(default = "default_nlp_url")]
    pub nlp_url: String,
    #[serde(default = "default_stt_url")]
    pub stt_url: String,
    #[serde(default = "default_tts_url")]
    pub tts_url: String,
    #[serde(default = "default_tts_language")]
    pub tts_language: String,
    /// Base prepended to relative audio URLs handed to the transcription service.
    #[serde(default = "default_media_base_url")]
    pub media_base_url: String,
    /// Per-request timeout for calls to these services.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_nlp_url() -> String {
    "http://localhost:5000/nlp".to_string()
}

fn default_stt_url() -> String {
    "http://localhost:5001".to_string()
}

fn default_tts_url() -> String {
    "http://localhost:5002/synthesize".to_string()
}

fn default_tts_language() -> String {
    "id-ID".to_string()
}

fn default_media_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            nlp_url: default_nlp_url(),
            stt_url: default_stt_url(),
            tts_url: default_tts_url(),
            tts_language: default_tts_language(),
            media_base_url: default_media_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Upper bound on a single conversation write.
    #[serde(default = "default_write_timeout_ms")]
    pub write_timeout_ms: u64,
}

fn default_write_timeout_ms() -> u64 {
    5_000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            write_timeout_ms: default_write_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
    /// Uploads smaller than this are rejected as corrupt.
    #[serde(default = "default_min_audio_bytes")]
    pub min_audio_bytes: usize,
}

fn default_poll_interval_ms() -> u64 {
    3_000
}

fn default_max_poll_attempts() -> u32 {
    20
}

fn default_min_audio_bytes() -> usize {
    1_000
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_attempts: default_max_poll_attempts(),
            min_audio_bytes: default_min_audio_bytes(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of human-readable ones.
    #[serde(default)]
    pub json: bool,
    /// Bridge spans to OpenTelemetry (stdout exporter).
    #[serde(default)]
    pub otel: bool,
}
