//! vLLM Router Core Library
//!
//! This library provides core functionality for the vLLM Router including:
//! - Configuration management
//! - Backend address and model identifier types

pub mod config;
pub mod types;

// Re-export commonly used types
pub use config::model::{Config, DiscoverySettings, LoggingSettings, ServerSettings};
pub use types::{BackendAddress, ModelId};
