//! Request extractors: authenticated identities and query parameters.

pub mod auth;
pub mod query;
