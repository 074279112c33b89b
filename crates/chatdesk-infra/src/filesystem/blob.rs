//! LocalBlobStore -- [`BlobStore`] writing audio under `{data_dir}/audio/`.
//!
//! Keys are relative slash-separated paths (`user/<name>.mp3`). The returned
//! URL is the API route that serves the same key back.

use std::path::{Component, Path, PathBuf};

use chatdesk_core::upstream::blob::BlobStore;
use chatdesk_types::error::UpstreamError;
use tracing::debug;

/// Route prefix under which stored audio is served.
pub const AUDIO_ROUTE_PREFIX: &str = "/api/v1/voice/audio";

#[derive(Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a key to a path inside the root, rejecting anything that could escape it.
    fn path_for(&self, key: &str) -> Result<PathBuf, UpstreamError> {
        let relative = Path::new(key);
        let safe = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(UpstreamError::Request(format!("invalid blob key '{key}'")));
        }
        Ok(self.root.join(relative))
    }
}

impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, UpstreamError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| UpstreamError::Request(format!("failed to create {}: {e}", parent.display())))?;
        }
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| UpstreamError::Request(format!("failed to write {}: {e}", path.display())))?;

        debug!(key = %key, bytes = bytes.len(), content_type = %content_type, "stored blob");
        Ok(format!("{AUDIO_ROUTE_PREFIX}/{key}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_put_writes_file_and_returns_route() {
        let dir = tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().join("audio"));

        let url = store
            .put("user/abc-clip.mp3", vec![1, 2, 3], "audio/mpeg")
            .await
            .unwrap();
        assert_eq!(url, "/api/v1/voice/audio/user/abc-clip.mp3");

        let written = tokio::fs::read(dir.path().join("audio/user/abc-clip.mp3"))
            .await
            .unwrap();
        assert_eq!(written, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_put_rejects_escaping_keys() {
        let dir = tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());

        for key in ["../etc/passwd", "/abs.mp3", "user/../../x.mp3", ""] {
            assert!(
                store.put(key, vec![0], "audio/mpeg").await.is_err(),
                "key {key:?} should be rejected"
            );
        }
    }
}
