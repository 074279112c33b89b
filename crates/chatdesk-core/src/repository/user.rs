//! User repository trait definition.

use chatdesk_types::error::RepositoryError;
use chatdesk_types::user::{NewUser, User, UserStatus};

/// Repository trait for user account persistence.
///
/// Implementations live in chatdesk-infra (e.g., SqliteUserRepository).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Returns `Conflict` when the username is taken.
    fn create(
        &self,
        user: &NewUser,
    ) -> impl std::future::Future<Output = Result<User, RepositoryError>> + Send;

    /// Get a user by numeric ID.
    fn get(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Get a user by unique username.
    fn find_by_username(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Set the presence status. `NotFound` when the user does not exist.
    fn set_status(
        &self,
        id: i64,
        status: UserStatus,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Point the user's "last chat" at `chat_id`.
    fn update_last_chat_id(
        &self,
        id: i64,
        chat_id: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Total number of users.
    fn count(&self) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
