//! Client SDK for the zlb configuration API.

pub mod client;
pub mod types;

pub use client::{ApiFailure, ZlbClient};
pub use types::{CookieFilter, DomainConfig, Envelope, HealthCheck};
