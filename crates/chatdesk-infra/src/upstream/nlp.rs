//! HttpIntentClassifier -- [`IntentClassifier`] over the NLP service's JSON API.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use chatdesk_core::upstream::nlp::IntentClassifier;
use chatdesk_types::error::UpstreamError;
use chatdesk_types::nlp::NlpResult;

use super::{build_client, check_status, request_failed};

#[derive(Serialize)]
struct NlpRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct NlpResponse {
    intent: String,
    response_message: String,
    confidence: f64,
}

impl From<NlpResponse> for NlpResult {
    fn from(r: NlpResponse) -> Self {
        NlpResult {
            intent: r.intent,
            response_text: r.response_message,
            confidence: r.confidence,
        }
    }
}

#[derive(Clone)]
pub struct HttpIntentClassifier {
    client: reqwest::Client,
    url: String,
}

impl HttpIntentClassifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, UpstreamError> {
        Ok(Self {
            client: build_client(timeout)?,
            url: url.into(),
        })
    }
}

impl IntentClassifier for HttpIntentClassifier {
    async fn classify(&self, text: &str) -> Result<NlpResult, UpstreamError> {
        let response = self
            .client
            .post(&self.url)
            .json(&NlpRequest { message: text })
            .send()
            .await
            .map_err(request_failed)?;

        let parsed: NlpResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| UpstreamError::InvalidResponse(format!("failed to parse NLP response: {e}")))?;

        Ok(parsed.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(NlpRequest { message: "cek saldo" }).unwrap();
        assert_eq!(body, serde_json::json!({ "message": "cek saldo" }));
    }

    #[test]
    fn test_response_maps_to_nlp_result() {
        let raw = r#"{"intent":"balance_inquiry","response_message":"Saldo anda 10.000","confidence":0.82}"#;
        let result: NlpResult = serde_json::from_str::<NlpResponse>(raw).unwrap().into();
        assert_eq!(result.intent, "balance_inquiry");
        assert_eq!(result.response_text, "Saldo anda 10.000");
        assert_eq!(result.confidence, 0.82);
    }

    #[test]
    fn test_response_missing_fields_rejected() {
        assert!(serde_json::from_str::<NlpResponse>(r#"{"intent":"x"}"#).is_err());
    }
}
