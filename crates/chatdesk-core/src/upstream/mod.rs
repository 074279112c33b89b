//! Ports for external collaborators: intent classification, speech
//! transcription and synthesis, and audio blob storage.
//!
//! HTTP and filesystem adapters live in chatdesk-infra.

pub mod blob;
pub mod nlp;
pub mod speech;
