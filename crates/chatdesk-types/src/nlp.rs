//! NLP classifier result type.

use serde::{Deserialize, Serialize};

/// Classification of one user utterance by the external NLP service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NlpResult {
    pub intent: String,
    /// Reply text generated for the utterance.
    pub response_text: String,
    /// Classifier confidence in `[0, 1]`.
    pub confidence: f64,
}

impl NlpResult {
    /// Confidence clamped into `[0, 1]`; NaN is treated as zero.
    pub fn clamped_confidence(&self) -> f64 {
        if self.confidence.is_nan() {
            0.0
        } else {
            self.confidence.clamp(0.0, 1.0)
        }
    }
}
