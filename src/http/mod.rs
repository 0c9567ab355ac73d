//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, layers)
//!     → request.rs (request ID, tracing span)
//!     → middleware/ (metrics, API key)
//!     → extract.rs (domain name, JSON/form payload)
//!     → api handlers
//!     → response.rs (envelope, error status)
//! ```

pub mod extract;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::{ApiError, ApiResult, Envelope};
pub use server::{AppState, HttpServer};
