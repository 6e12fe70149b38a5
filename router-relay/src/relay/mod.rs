pub mod forwarder;
pub mod request;
pub mod types;


pub use forwarder::RequestForwarder;
pub use request::{ProxyRequest, RequestTarget};
pub use types::RelayError;
