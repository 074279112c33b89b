//! PasswordHasher trait for credential storage.
//!
//! Defined in chatdesk-core so AuthService can hash and verify passwords
//! without coupling to a specific algorithm. The `Argon2PasswordHasher`
//! adapter lives in chatdesk-infra.

use chatdesk_types::error::AuthError;

pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into a self-describing (PHC) string.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Check a plaintext password against a stored hash.
    ///
    /// A mismatch is `Ok(false)`; `Err` is reserved for malformed hashes.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}
