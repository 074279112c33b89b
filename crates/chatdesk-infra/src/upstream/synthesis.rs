//! HttpSpeechSynthesizer -- [`SpeechSynthesizer`] returning MP3 bytes.

use std::time::Duration;

use serde::Serialize;

use chatdesk_core::upstream::speech::SpeechSynthesizer;
use chatdesk_types::error::UpstreamError;

use super::{build_client, check_status, request_failed};

#[derive(Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    language: &'a str,
}

#[derive(Clone)]
pub struct HttpSpeechSynthesizer {
    client: reqwest::Client,
    url: String,
    language: String,
}

impl HttpSpeechSynthesizer {
    pub fn new(
        url: impl Into<String>,
        language: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        Ok(Self {
            client: build_client(timeout)?,
            url: url.into(),
            language: language.into(),
        })
    }
}

impl SpeechSynthesizer for HttpSpeechSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, UpstreamError> {
        let response = self
            .client
            .post(&self.url)
            .json(&SynthesisRequest {
                text,
                language: &self.language,
            })
            .send()
            .await
            .map_err(request_failed)?;

        let bytes = check_status(response)
            .await?
            .bytes()
            .await
            .map_err(|e| UpstreamError::InvalidResponse(format!("failed to read audio: {e}")))?;

        if bytes.is_empty() {
            return Err(UpstreamError::InvalidResponse(
                "speech service returned no audio".to_string(),
            ));
        }
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(SynthesisRequest {
            text: "Saldo anda 10.000",
            language: "id-ID",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "text": "Saldo anda 10.000", "language": "id-ID" })
        );
    }
}
