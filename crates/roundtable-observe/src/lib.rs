//! Observability for Roundtable: subscriber setup and the span attribute
//! names used by provider clients.

pub mod genai_attrs;
pub mod tracing_setup;
