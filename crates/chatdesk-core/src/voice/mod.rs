//! Voice exchange pipeline.

pub mod service;
