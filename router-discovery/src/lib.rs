//! vLLM Router Discovery Library
//!
//! This library keeps the model routing table current:
//! - Backend probing (`GET /v1/models`)
//! - Lock-free route table snapshots
//! - Discovery sweeps and the periodic scheduler

pub mod discovery;

// Re-export commonly used types
pub use discovery::{
    BackendProbe, DiscoveryScheduler, DiscoveryService, ProbeError, Resolution, RouteTable,
    RouteTableHandle, SchedulerError, SchedulerHandle, SweepReport,
};
