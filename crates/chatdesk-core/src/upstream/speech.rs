//! Speech-to-text and text-to-speech ports.
//!
//! Transcription is an asynchronous job: the caller starts it and then polls
//! its status. [`await_transcript`] implements the bounded polling loop.

use std::time::Duration;

use chatdesk_types::error::UpstreamError;
use chatdesk_types::voice::JobStatus;
use tracing::debug;

/// Asynchronous transcription job API.
pub trait TranscriptionJobs: Send + Sync {
    /// Submit a job that transcribes the audio at `media_url`.
    fn start_job(
        &self,
        job_name: &str,
        media_url: &str,
    ) -> impl std::future::Future<Output = Result<(), UpstreamError>> + Send;

    /// Current state of a previously started job.
    fn job_status(
        &self,
        job_name: &str,
    ) -> impl std::future::Future<Output = Result<JobStatus, UpstreamError>> + Send;
}

/// Turns reply text into audio bytes.
pub trait SpeechSynthesizer: Send + Sync {
    fn synthesize(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>, UpstreamError>> + Send;
}

/// Polling bounds for a transcription job.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            max_attempts: 20,
        }
    }
}

/// Poll `job_name` until it completes, fails, or the attempts run out.
///
/// Sleeps `policy.interval` between status checks, never after the last one.
pub async fn await_transcript<T: TranscriptionJobs>(
    jobs: &T,
    job_name: &str,
    policy: PollPolicy,
) -> Result<String, UpstreamError> {
    for attempt in 1..=policy.max_attempts {
        match jobs.job_status(job_name).await? {
            JobStatus::Completed { transcript } => return Ok(transcript),
            JobStatus::Failed { reason } => return Err(UpstreamError::JobFailed(reason)),
            JobStatus::InProgress => {
                debug!(job = %job_name, attempt, "transcription still in progress");
                if attempt < policy.max_attempts {
                    tokio::time::sleep(policy.interval).await;
                }
            }
        }
    }
    Err(UpstreamError::TimedOut {
        attempts: policy.max_attempts,
    })
}
