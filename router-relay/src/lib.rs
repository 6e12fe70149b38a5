//! vLLM Router Relay Library
//!
//! This library provides request relay functionality for the vLLM Router including:
//! - Model and stream flag extraction from inbound requests
//! - Pass-through forwarding, buffered and streamed
//! - Upstream error responses

pub mod relay;

// Re-export commonly used types
pub use relay::{ProxyRequest, RelayError, RequestForwarder, RequestTarget};
