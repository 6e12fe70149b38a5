pub mod models;
pub mod proxy;
pub mod router;
