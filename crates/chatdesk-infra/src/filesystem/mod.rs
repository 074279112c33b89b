//! Filesystem adapters for Chatdesk.
//!
//! Resolves the data directory layout and implements the `BlobStore` port
//! for audio files kept on local disk.

pub mod blob;

use std::path::{Path, PathBuf};

/// Compute the audio blob root: `{data_dir}/audio/`.
pub fn audio_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("audio")
}

/// Resolve the Chatdesk data directory.
///
/// Uses `CHATDESK_DATA_DIR` when set, otherwise `~/.chatdesk`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CHATDESK_DATA_DIR") {
        return PathBuf::from(dir);
    }

    // Use home directory fallback: ~/.chatdesk
    if let Some(home) = dirs::home_dir() {
        return home.join(".chatdesk");
    }

    // Last resort: current directory
    PathBuf::from(".chatdesk")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_dir_path() {
        let data_dir = PathBuf::from("/home/user/.chatdesk");
        assert_eq!(audio_dir(&data_dir), PathBuf::from("/home/user/.chatdesk/audio"));
    }

    #[test]
    fn test_resolve_data_dir_from_env() {
        // SAFETY: This test is single-threaded and restores the env var immediately.
        unsafe {
            std::env::set_var("CHATDESK_DATA_DIR", "/tmp/test-chatdesk");
        }
        let dir = resolve_data_dir();
        assert_eq!(dir, PathBuf::from("/tmp/test-chatdesk"));
        unsafe {
            std::env::remove_var("CHATDESK_DATA_DIR");
        }
    }
}
