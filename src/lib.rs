//! zlb API library
//!
//! Configuration-management HTTP API for the zlb load-balancer control plane.

pub mod api;
pub mod config;
pub mod domain;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod store;

pub use config::schema::ApiConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use store::{KvStore, MemoryStore};
