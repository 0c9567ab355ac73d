//! Load-balancer domain configuration subsystem.
//!
//! # Data Flow
//! ```text
//! Write path:
//!     JSON / form payload
//!     → model.rs (DomainConfig, HealthCheck, CookieFilter)
//!     → keys.rs (deterministic key path, base64 path segments)
//!     → store put/delete
//!
//! Read path:
//!     store list (flat "a/b/c" keys)
//!     → explode.rs (nested JSON object, path segments decoded)
//!     → response envelope
//! ```
//!
//! # Design Decisions
//! - Key layout is the contract with the load balancer; it never changes shape
//! - Routing paths are base64 encoded so their slashes do not split keys
//! - Wire field names match the load balancer's reader (PascalCase)

pub mod explode;
pub mod keys;
pub mod model;

pub use explode::{explode, ExplodeError};
pub use model::{CookieFilter, DomainConfig, HealthCheck, ValidationError};
