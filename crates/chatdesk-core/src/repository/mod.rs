//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (chatdesk-infra) implements. The core crate never depends on any
//! specific storage technology. The chat message store lives in
//! [`crate::chat::store`].

pub mod user;
