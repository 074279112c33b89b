//! Application configuration loader for Chatdesk.
//!
//! Reads `config.toml` from the data directory (`~/.chatdesk/` in production)
//! and deserializes it into [`AppConfig`]. Falls back to defaults when the
//! file is missing or malformed, then applies `CHATDESK_*` environment
//! overrides.

use std::path::Path;

use chatdesk_types::config::AppConfig;
use secrecy::SecretString;

/// Load configuration from `{data_dir}/config.toml` plus environment overrides.
///
/// - If the file does not exist, starts from [`AppConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and starts from the default.
/// - Environment variables win over file values (see [`apply_env_overrides`]).
pub async fn load_app_config(data_dir: &Path) -> AppConfig {
    let mut config = load_config_file(data_dir).await;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

async fn load_config_file(data_dir: &Path) -> AppConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AppConfig::default()
        }
    }
}

/// Apply `CHATDESK_*` overrides using `lookup` to read variables.
///
/// Recognized: `CHATDESK_JWT_SECRET`, `CHATDESK_NLP_URL`, `CHATDESK_STT_URL`,
/// `CHATDESK_TTS_URL`, `CHATDESK_PORT`. Empty values are ignored, as is an
/// unparseable port.
pub fn apply_env_overrides(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(secret) = get("CHATDESK_JWT_SECRET") {
        config.auth.jwt_secret = Some(SecretString::from(secret));
    }
    if let Some(url) = get("CHATDESK_NLP_URL") {
        config.services.nlp_url = url;
    }
    if let Some(url) = get("CHATDESK_STT_URL") {
        config.services.stt_url = url;
    }
    if let Some(url) = get("CHATDESK_TTS_URL") {
        config.services.tts_url = url;
    }
    if let Some(port) = get("CHATDESK_PORT") {
        match port.parse() {
            Ok(port) => config.server.port = port,
            Err(_) => tracing::warn!("Ignoring invalid CHATDESK_PORT value '{port}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config_file(tmp.path()).await;
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.store.write_timeout_ms, 5_000);
    }

    #[tokio::test]
    async fn load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
[server]
host = "0.0.0.0"
port = 9090

[services]
nlp_url = "http://nlp.internal/nlp"

[voice]
poll_interval_ms = 500
"#,
        )
        .await
        .unwrap();

        let config = load_config_file(tmp.path()).await;
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.services.nlp_url, "http://nlp.internal/nlp");
        assert_eq!(config.voice.poll_interval_ms, 500);
        assert_eq!(config.voice.max_poll_attempts, 20);
    }

    #[tokio::test]
    async fn load_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_config_file(tmp.path()).await;
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn env_overrides_win_and_skip_empty_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("CHATDESK_JWT_SECRET", "from-env"),
            ("CHATDESK_NLP_URL", "http://nlp:5000/nlp"),
            ("CHATDESK_STT_URL", "  "),
            ("CHATDESK_PORT", "not-a-port"),
        ]);
        let mut config = AppConfig::default();
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string()));

        let secret = config.auth.jwt_secret.as_ref().unwrap();
        assert_eq!(secret.expose_secret(), "from-env");
        assert_eq!(config.services.nlp_url, "http://nlp:5000/nlp");
        assert_eq!(config.services.stt_url, "http://localhost:5001");
        assert_eq!(config.server.port, 8080);
    }
}
