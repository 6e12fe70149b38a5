//! vLLM Router Server Library
//!
//! This library wires discovery and relay into the HTTP server of the vLLM Router

pub mod app;
pub mod logging;
pub mod router;

// Re-export the main server function
pub use app::start_server;
