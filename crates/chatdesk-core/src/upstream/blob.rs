//! BlobStore trait for audio artifacts.

use chatdesk_types::error::UpstreamError;

/// Write-once storage for uploaded and synthesized audio.
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key` and return the URL clients use to fetch it.
    fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> impl std::future::Future<Output = Result<String, UpstreamError>> + Send;
}
