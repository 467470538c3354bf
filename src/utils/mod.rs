//! Shared helpers for providers and the orchestration layer

pub mod debug;
pub mod http;
