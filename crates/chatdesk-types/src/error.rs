use thiserror::Error;

/// Errors from repository operations (used by trait definitions in chatdesk-core).
///
/// `NotFound` covers both "no such key" and "key owned by someone else";
/// stores never distinguish the two to callers.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from external collaborators (NLP, speech-to-text, text-to-speech, blob storage).
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Request(String),

    #[error("invalid upstream response: {0}")]
    InvalidResponse(String),

    #[error("transcription job failed: {0}")]
    JobFailed(String),

    #[error("transcription timed out after {attempts} attempts")]
    TimedOut { attempts: u32 },
}

/// Errors surfaced by the chat and voice services.
#[derive(Debug, Error)]
pub enum ChatError {
    /// No chat matches the given key for this owner.
    #[error("chat not found")]
    NotFound,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("operation timed out: {0}")]
    TimedOut(String),
}

impl From<RepositoryError> for ChatError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => ChatError::NotFound,
            other => ChatError::Storage(other.to_string()),
        }
    }
}

/// Errors related to authentication and user accounts.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("username '{0}' already exists")]
    UsernameTaken(String),

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    TokenExpired,

    #[error("insufficient permissions")]
    Forbidden,

    #[error("password hashing error: {0}")]
    Hashing(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<RepositoryError> for AuthError {
    fn from(e: RepositoryError) -> Self {
        AuthError::Storage(e.to_string())
    }
}
