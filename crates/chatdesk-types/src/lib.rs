//! Shared domain types for Chatdesk.
//!
//! This crate contains the core domain types used across the Chatdesk backend:
//! chat documents, voice records, users, configuration, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod nlp;
pub mod user;
pub mod voice;
