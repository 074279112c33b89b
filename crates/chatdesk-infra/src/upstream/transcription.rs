//! HttpTranscriptionClient -- [`TranscriptionJobs`] against a job-based STT service.
//!
//! Wire protocol:
//! - `POST {base}/jobs` with `{job_name, media_url, language_code, media_format}`
//! - `GET {base}/jobs/{job_name}` returning `{status, transcript?, transcript_url?, failure_reason?}`
//!
//! A completed job may carry the transcript inline or point at a results
//! document shaped `{"results": {"transcripts": [{"transcript": "..."}]}}`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use chatdesk_core::upstream::speech::TranscriptionJobs;
use chatdesk_types::error::UpstreamError;
use chatdesk_types::voice::JobStatus;

use super::{build_client, check_status, request_failed};

#[derive(Serialize)]
struct StartJobRequest<'a> {
    job_name: &'a str,
    media_url: &'a str,
    language_code: &'a str,
    media_format: &'a str,
}

#[derive(Deserialize)]
struct JobResponse {
    status: String,
    #[serde(default)]
    transcript: Option<String>,
    #[serde(default)]
    transcript_url: Option<String>,
    #[serde(default)]
    failure_reason: Option<String>,
}

#[derive(Deserialize)]
struct TranscriptDocument {
    results: TranscriptResults,
}

#[derive(Deserialize)]
struct TranscriptResults {
    #[serde(default)]
    transcripts: Vec<TranscriptEntry>,
}

#[derive(Deserialize)]
struct TranscriptEntry {
    transcript: String,
}

/// Where a completed job's transcript can be found.
enum Completion {
    Inline(String),
    Remote(String),
}

enum ParsedStatus {
    Pending,
    Done(Completion),
    Failed(String),
}

impl JobResponse {
    fn parse(self) -> Result<ParsedStatus, UpstreamError> {
        match self.status.to_ascii_lowercase().as_str() {
            "queued" | "in_progress" | "pending" => Ok(ParsedStatus::Pending),
            "failed" => Ok(ParsedStatus::Failed(
                self.failure_reason
                    .unwrap_or_else(|| "transcription job failed".to_string()),
            )),
            "completed" => match (self.transcript, self.transcript_url) {
                (Some(text), _) => Ok(ParsedStatus::Done(Completion::Inline(text))),
                (None, Some(url)) => Ok(ParsedStatus::Done(Completion::Remote(url))),
                (None, None) => Err(UpstreamError::InvalidResponse(
                    "completed job has no transcript".to_string(),
                )),
            },
            other => Err(UpstreamError::InvalidResponse(format!(
                "unknown job status '{other}'"
            ))),
        }
    }
}

impl TranscriptDocument {
    fn first_transcript(self) -> Result<String, UpstreamError> {
        self.results
            .transcripts
            .into_iter()
            .next()
            .map(|t| t.transcript)
            .ok_or_else(|| UpstreamError::InvalidResponse("no transcript in results".to_string()))
    }
}

#[derive(Clone)]
pub struct HttpTranscriptionClient {
    client: reqwest::Client,
    base_url: String,
    media_base_url: String,
    language_code: String,
}

impl HttpTranscriptionClient {
    /// `media_base_url` is prepended to relative media URLs so the service can fetch them.
    pub fn new(
        base_url: impl Into<String>,
        media_base_url: impl Into<String>,
        language_code: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            media_base_url: media_base_url.into().trim_end_matches('/').to_string(),
            language_code: language_code.into(),
        })
    }

    fn absolute_media_url(&self, media_url: &str) -> String {
        if media_url.starts_with('/') {
            format!("{}{media_url}", self.media_base_url)
        } else {
            media_url.to_string()
        }
    }

    async fn fetch_transcript(&self, url: &str) -> Result<String, UpstreamError> {
        let response = self.client.get(url).send().await.map_err(request_failed)?;
        let doc: TranscriptDocument = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| UpstreamError::InvalidResponse(format!("failed to decode transcript: {e}")))?;
        doc.first_transcript()
    }
}

impl TranscriptionJobs for HttpTranscriptionClient {
    async fn start_job(&self, job_name: &str, media_url: &str) -> Result<(), UpstreamError> {
        let media_url = self.absolute_media_url(media_url);
        let response = self
            .client
            .post(format!("{}/jobs", self.base_url))
            .json(&StartJobRequest {
                job_name,
                media_url: &media_url,
                language_code: &self.language_code,
                media_format: "mp3",
            })
            .send()
            .await
            .map_err(request_failed)?;
        check_status(response).await?;
        Ok(())
    }

    async fn job_status(&self, job_name: &str) -> Result<JobStatus, UpstreamError> {
        let response = self
            .client
            .get(format!("{}/jobs/{job_name}", self.base_url))
            .send()
            .await
            .map_err(request_failed)?;
        let job: JobResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| UpstreamError::InvalidResponse(format!("failed to parse job status: {e}")))?;

        Ok(match job.parse()? {
            ParsedStatus::Pending => JobStatus::InProgress,
            ParsedStatus::Failed(reason) => JobStatus::Failed { reason },
            ParsedStatus::Done(Completion::Inline(transcript)) => JobStatus::Completed { transcript },
            ParsedStatus::Done(Completion::Remote(url)) => JobStatus::Completed {
                transcript: self.fetch_transcript(&url).await?,
            },
        })
    }
}
