//! Observability for Chatdesk: tracing subscriber setup and OpenTelemetry export.

pub mod tracing_setup;
