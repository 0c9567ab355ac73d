//! Configuration store subsystem.
//!
//! # Data Flow
//! ```text
//! api handlers
//!     → KvStore trait (get/put/delete/delete_tree/list/keys)
//!     → consul.rs (Consul agent /v1/kv over HTTP)
//!       or memory.rs (process-local map, tests and dev mode)
//! ```
//!
//! # Design Decisions
//! - Handlers see only the trait; the backend is chosen at startup
//! - Listing an absent prefix is an empty result, not an error
//! - Results are sorted by key so responses are deterministic
//! - Deleting the empty prefix is refused outright
//! - Keys with `.` or `..` segments are refused by every backend

pub mod consul;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;

pub use consul::ConsulStore;
pub use memory::MemoryStore;

use crate::config::{StoreBackend, StoreConfig};

/// A single key/value entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvPair {
    pub key: String,
    pub value: Vec<u8>,
}

impl KvPair {
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("store rejected write to {0}")]
    Rejected(String),

    #[error("invalid value for {key}: {reason}")]
    Decode { key: String, reason: String },

    #[error("invalid store address {0:?}")]
    Address(String),

    #[error("refusing to delete an empty prefix")]
    EmptyPrefix,

    #[error("invalid key {0:?}: '.' and '..' segments are not allowed")]
    InvalidKey(String),
}

/// Key/value interface to the configuration store.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<KvPair>, StoreError>;

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Delete one key. Deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Delete every key starting with `prefix`.
    async fn delete_tree(&self, prefix: &str) -> Result<(), StoreError>;

    /// All pairs whose key starts with `prefix`, sorted by key.
    async fn list(&self, prefix: &str) -> Result<Vec<KvPair>, StoreError>;

    /// Keys starting with `prefix`, sorted.
    ///
    /// With a separator, each key is cut after the first separator that
    /// follows the prefix and duplicates are collapsed.
    async fn keys(&self, prefix: &str, separator: Option<&str>) -> Result<Vec<String>, StoreError>;
}

/// Build the store selected by configuration.
pub fn from_config(config: &StoreConfig) -> Result<Arc<dyn KvStore>, StoreError> {
    match config.backend {
        StoreBackend::Consul => Ok(Arc::new(ConsulStore::new(config)?)),
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}

/// Refuse keys with `.` or `..` segments. URL path normalization would
/// otherwise resolve them into a different key on the Consul backend.
pub(crate) fn check_key(key: &str) -> Result<(), StoreError> {
    if key.split('/').any(|segment| segment == "." || segment == "..") {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Apply separator folding to a sorted key listing.
pub(crate) fn fold_keys<'a>(
    keys: impl Iterator<Item = &'a str>,
    prefix: &str,
    separator: Option<&str>,
) -> Vec<String> {
    let mut out: Vec<String> = keys
        .filter(|k| k.starts_with(prefix))
        .map(|k| match separator.filter(|s| !s.is_empty()) {
            Some(sep) => match k[prefix.len()..].find(sep) {
                Some(idx) => k[..prefix.len() + idx + sep.len()].to_string(),
                None => k.to_string(),
            },
            None => k.to_string(),
        })
        .collect();
    out.sort();
    out.dedup();
    out
}
