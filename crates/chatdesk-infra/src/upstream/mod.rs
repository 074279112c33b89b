//! HTTP adapters for the NLP, speech-to-text and text-to-speech services.
//!
//! All clients share one reqwest configuration: a per-request timeout taken
//! from `ServicesConfig::request_timeout_ms`. Non-2xx responses become
//! `UpstreamError::Request` carrying the status and body.

pub mod nlp;
pub mod synthesis;
pub mod transcription;

use std::time::Duration;

use chatdesk_types::error::UpstreamError;

pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, UpstreamError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| UpstreamError::Request(format!("failed to create HTTP client: {e}")))
}

/// Turn a non-success response into an error, passing successes through.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(UpstreamError::Request(format!("HTTP {status}: {body}")))
}

pub(crate) fn request_failed(e: reqwest::Error) -> UpstreamError {
    UpstreamError::Request(format!("HTTP request failed: {e}"))
}
