//! Infrastructure layer for Chatdesk.
//!
//! Contains implementations of the ports defined in `chatdesk-core`: SQLite
//! storage, HTTP clients for the NLP and speech services, local audio blob
//! storage, and credential cryptography (Argon2id hashing, HS256 tokens).

pub mod config;
pub mod crypto;
pub mod filesystem;
pub mod sqlite;
pub mod upstream;
