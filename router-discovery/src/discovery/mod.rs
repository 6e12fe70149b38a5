pub mod probe;
pub mod scheduler;
pub mod service;
pub mod table;


pub use probe::{BackendProbe, ProbeError};
pub use scheduler::{DiscoveryScheduler, SchedulerError, SchedulerHandle};
pub use service::{DiscoveryService, SweepReport};
pub use table::{Resolution, RouteTable, RouteTableHandle};
