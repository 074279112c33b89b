//! IntentClassifier trait.

use chatdesk_types::error::UpstreamError;
use chatdesk_types::nlp::NlpResult;

/// Maps a user utterance to an intent, a canned reply, and a confidence.
pub trait IntentClassifier: Send + Sync {
    fn classify(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<NlpResult, UpstreamError>> + Send;
}
