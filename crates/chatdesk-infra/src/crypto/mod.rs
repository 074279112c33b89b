//! Credential cryptography for Chatdesk.
//!
//! - `password`: Argon2id password hashing for user accounts
//! - `jwt`: HS256 session tokens

pub mod jwt;
pub mod password;
