//! Consul KV backend.
//!
//! # Responsibilities
//! - Map store operations onto the agent's `/v1/kv` HTTP endpoints
//! - Decode base64 values from listing responses
//! - Attach ACL token and datacenter to every request
//!
//! # Design Decisions
//! - 404 from the agent means "no such key" and is not an error
//! - Key segments are percent-encoded individually so `/` keeps its meaning
//! - No retries: a failed request surfaces to the caller immediately

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::config::StoreConfig;
use crate::observability::metrics;
use crate::store::{check_key, KvPair, KvStore, StoreError};

const TOKEN_HEADER: &str = "X-Consul-Token";

/// Entry as returned by `GET /v1/kv/<key>`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct KvEntry {
    key: String,
    #[serde(default)]
    value: Option<String>,
}

impl KvEntry {
    fn into_pair(self) -> Result<KvPair, StoreError> {
        let value = match self.value {
            Some(encoded) => STANDARD.decode(encoded).map_err(|e| StoreError::Decode {
                key: self.key.clone(),
                reason: e.to_string(),
            })?,
            None => Vec::new(),
        };
        Ok(KvPair::new(self.key, value))
    }
}

pub struct ConsulStore {
    client: reqwest::Client,
    base: Url,
    token: Option<String>,
    datacenter: Option<String>,
}

impl ConsulStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let base = agent_url(&config.consul_address)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        tracing::debug!(agent = %base, datacenter = ?config.datacenter, "Consul store configured");

        Ok(Self {
            client,
            base,
            token: config.token.clone(),
            datacenter: config.datacenter.clone(),
        })
    }

    fn kv_url(&self, key: &str, query: &[(&str, &str)]) -> Result<Url, StoreError> {
        check_key(key)?;
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Address(self.base.to_string()))?
            .pop_if_empty()
            .extend(["v1", "kv"])
            .extend(key.split('/'));

        {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
            if let Some(dc) = &self.datacenter {
                pairs.append_pair("dc", dc);
            }
        }
        // an empty query string would still leave a dangling '?'
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }

    fn request(&self, method: Method, key: &str, query: &[(&str, &str)]) -> Result<RequestBuilder, StoreError> {
        let url = self.kv_url(key, query)?;
        let mut builder = self.client.request(method, url);
        if let Some(token) = &self.token {
            builder = builder.header(TOKEN_HEADER, token);
        }
        Ok(builder)
    }

    /// Send and return `None` on 404.
    async fn send(&self, builder: RequestBuilder) -> Result<Option<Response>, StoreError> {
        let response = builder.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(Some(response))
    }

    async fn fetch_entries(&self, key: &str, query: &[(&str, &str)]) -> Result<Vec<KvPair>, StoreError> {
        let builder = self.request(Method::GET, key, query)?;
        let Some(response) = self.send(builder).await? else {
            return Ok(Vec::new());
        };
        let entries: Vec<KvEntry> = response.json().await?;
        let mut pairs = entries
            .into_iter()
            .map(KvEntry::into_pair)
            .collect::<Result<Vec<_>, _>>()?;
        pairs.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(pairs)
    }

    async fn remove(&self, key: &str, query: &[(&str, &str)]) -> Result<(), StoreError> {
        let builder = self.request(Method::DELETE, key, query)?;
        self.send(builder).await?;
        Ok(())
    }

    /// The agent answers a PUT with `true` or `false`.
    async fn store(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        let builder = self.request(Method::PUT, key, &[])?.body(value);
        let accepted = match self.send(builder).await? {
            Some(response) => response.json::<bool>().await?,
            None => false,
        };
        if accepted {
            Ok(())
        } else {
            Err(StoreError::Rejected(key.to_string()))
        }
    }

    async fn fetch_keys(&self, prefix: &str, separator: Option<&str>) -> Result<Vec<String>, StoreError> {
        let mut query = vec![("keys", "")];
        if let Some(sep) = separator {
            query.push(("separator", sep));
        }
        let builder = self.request(Method::GET, prefix, &query)?;
        let mut keys: Vec<String> = match self.send(builder).await? {
            Some(response) => response.json().await?,
            None => Vec::new(),
        };
        keys.sort();
        Ok(keys)
    }
}

#[async_trait]
impl KvStore for ConsulStore {
    async fn get(&self, key: &str) -> Result<Option<KvPair>, StoreError> {
        let result = self
            .fetch_entries(key, &[])
            .await
            .map(|pairs| pairs.into_iter().find(|p| p.key == key));
        observe("get", key, result)
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        let result = self.store(key, value).await;
        observe("put", key, result)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let result = self.remove(key, &[]).await;
        observe("delete", key, result)
    }

    async fn delete_tree(&self, prefix: &str) -> Result<(), StoreError> {
        let result = if prefix.is_empty() {
            Err(StoreError::EmptyPrefix)
        } else {
            self.remove(prefix, &[("recurse", "")]).await
        };
        observe("delete_tree", prefix, result)
    }

    async fn list(&self, prefix: &str) -> Result<Vec<KvPair>, StoreError> {
        let result = self.fetch_entries(prefix, &[("recurse", "")]).await;
        observe("list", prefix, result)
    }

    async fn keys(&self, prefix: &str, separator: Option<&str>) -> Result<Vec<String>, StoreError> {
        let result = self.fetch_keys(prefix, separator).await;
        observe("keys", prefix, result)
    }
}

fn observe<T>(op: &'static str, key: &str, result: Result<T, StoreError>) -> Result<T, StoreError> {
    match &result {
        Ok(_) => metrics::record_store_operation(op, "ok"),
        Err(e) => {
            tracing::debug!(op, key, error = %e, "Consul request failed");
            metrics::record_store_operation(op, "error");
        }
    }
    result
}

/// Accepts `host:port` or a full URL.
fn agent_url(address: &str) -> Result<Url, StoreError> {
    let candidate = if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{address}")
    };
    let url = Url::parse(&candidate).map_err(|_| StoreError::Address(address.to_string()))?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(StoreError::Address(address.to_string()));
    }
    Ok(url)
}
