//! Process-local store.
//!
//! Same semantics as the Consul backend, minus durability. Backs the
//! `--store memory` development mode and the test suites.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::observability::metrics;
use crate::store::{check_key, fold_keys, KvPair, KvStore, StoreError};

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn guard(op: &'static str, key: &str) -> Result<(), StoreError> {
        check_key(key).inspect_err(|_| metrics::record_store_operation(op, "error"))
    }

    fn sorted_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.iter().map(|r| r.key().clone()).collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<KvPair>, StoreError> {
        Self::guard("get", key)?;
        metrics::record_store_operation("get", "ok");
        Ok(self
            .inner
            .get(key)
            .map(|r| KvPair::new(r.key().clone(), r.value().clone())))
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        Self::guard("put", key)?;
        metrics::record_store_operation("put", "ok");
        self.inner.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        Self::guard("delete", key)?;
        metrics::record_store_operation("delete", "ok");
        self.inner.remove(key);
        Ok(())
    }

    async fn delete_tree(&self, prefix: &str) -> Result<(), StoreError> {
        if prefix.is_empty() {
            metrics::record_store_operation("delete_tree", "error");
            return Err(StoreError::EmptyPrefix);
        }
        Self::guard("delete_tree", prefix)?;
        metrics::record_store_operation("delete_tree", "ok");
        self.inner.retain(|k, _| !k.starts_with(prefix));
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<KvPair>, StoreError> {
        Self::guard("list", prefix)?;
        metrics::record_store_operation("list", "ok");
        let mut pairs: Vec<KvPair> = self
            .inner
            .iter()
            .filter(|r| r.key().starts_with(prefix))
            .map(|r| KvPair::new(r.key().clone(), r.value().clone()))
            .collect();
        pairs.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(pairs)
    }

    async fn keys(&self, prefix: &str, separator: Option<&str>) -> Result<Vec<String>, StoreError> {
        Self::guard("keys", prefix)?;
        metrics::record_store_operation("keys", "ok");
        let keys = self.sorted_keys();
        Ok(fold_keys(keys.iter().map(String::as_str), prefix, separator))
    }
}
