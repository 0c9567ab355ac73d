//! Wire types for domain configuration records.
//!
//! Field names follow the load balancer's reader, so they are renamed
//! explicitly rather than derived from the Rust names.

use serde::{Deserialize, Serialize};

/// Payload rejected by semantic validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub(crate) fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// How the load balancer probes upstream liveness for a domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheck {
    /// Probe protocol (e.g. "http", "tcp").
    #[serde(rename = "Type")]
    pub kind: String,

    #[serde(rename = "Uri", skip_serializing_if = "String::is_empty")]
    pub uri: String,

    /// Comma separated list of accepted status codes.
    #[serde(rename = "Valid_statuses", skip_serializing_if = "String::is_empty")]
    pub valid_statuses: String,

    #[serde(rename = "Interval", skip_serializing_if = "is_zero")]
    pub interval: i64,

    #[serde(rename = "Timeout", skip_serializing_if = "is_zero")]
    pub timeout: i64,

    /// Consecutive failures before an upstream is marked down.
    #[serde(rename = "Fall", skip_serializing_if = "is_zero")]
    pub fall: i64,

    /// Consecutive successes before an upstream is marked up.
    #[serde(rename = "Rise", skip_serializing_if = "is_zero")]
    pub rise: i64,

    #[serde(rename = "Concurrency", skip_serializing_if = "is_zero")]
    pub concurrency: i64,
}

impl HealthCheck {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.kind.trim().is_empty() {
            return Err(ValidationError::new("Type", "must not be empty"));
        }
        for (field, value) in [
            ("Interval", self.interval),
            ("Timeout", self.timeout),
            ("Fall", self.fall),
            ("Rise", self.rise),
            ("Concurrency", self.concurrency),
        ] {
            if value < 0 {
                return Err(ValidationError::new(field, "must not be negative"));
            }
        }
        Ok(())
    }
}

/// Routing configuration for one path of a domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DomainConfig {
    #[serde(rename = "Healthcheck")]
    pub healthcheck: HealthCheck,

    /// Enable cookie-based session affinity.
    #[serde(rename = "Sticky", skip_serializing_if = "is_false")]
    pub sticky: bool,

    #[serde(rename = "KeepAlive", skip_serializing_if = "is_zero")]
    pub keep_alive: i64,

    /// Path override this record applies to; empty means "/".
    #[serde(rename = "Path", skip_serializing_if = "String::is_empty")]
    pub path: String,
}

impl DomainConfig {
    pub fn effective_path(&self) -> &str {
        if self.path.is_empty() {
            "/"
        } else {
            &self.path
        }
    }
}

/// Maps a cookie name/value pair to a stickiness lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CookieFilter {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Value")]
    pub value: String,

    /// Lifetime in seconds.
    #[serde(rename = "Lifecycle")]
    pub lifecycle: i64,
}

impl CookieFilter {
    /// Name and value become key segments, so both must be usable as one.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [("Name", &self.name), ("Value", &self.value)] {
            if value.is_empty() {
                return Err(ValidationError::new(field, "must not be empty"));
            }
            if value.contains('/') {
                return Err(ValidationError::new(field, "must not contain '/'"));
            }
        }
        Ok(())
    }
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}

fn is_false(v: &bool) -> bool {
    !*v
}
