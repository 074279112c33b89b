//! Business logic services (use cases).
//!
//! Services orchestrate repository calls and business rules. They depend on
//! traits (ports) -- never on concrete infrastructure implementations. Chat
//! and voice services live in [`crate::chat`] and [`crate::voice`].

pub mod auth;
pub mod hash;
pub mod token;
