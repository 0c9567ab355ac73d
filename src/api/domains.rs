//! Domain listing, inspection, creation and removal.

use std::collections::BTreeSet;

use axum::extract::State;
use serde_json::{Map, Value};

use crate::api::store_failure;
use crate::domain::{explode, keys, DomainConfig};
use crate::http::extract::{DomainName, Payload};
use crate::http::response::{ApiResult, Envelope};
use crate::http::server::AppState;

/// Names of every domain with configuration under `zlb/`.
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let listing = state
        .store
        .keys(keys::DOMAIN_PREFIX, Some("/"))
        .await
        .map_err(store_failure(keys::DOMAIN_PREFIX))?;

    let names: BTreeSet<String> = listing
        .iter()
        .filter_map(|key| keys::domain_from_key(key))
        .map(String::from)
        .collect();

    Ok(Envelope::ok(names.into_iter().collect()))
}

/// The domain's keys exploded into a nested object, routing paths decoded.
pub async fn inspect(
    State(state): State<AppState>,
    DomainName(name): DomainName,
) -> ApiResult<Map<String, Value>> {
    let root = keys::domain_root(&name);
    let pairs = state.store.list(&root).await.map_err(store_failure(&root))?;
    let tree = explode(pairs.iter().map(|p| (p.key.as_str(), p.value.as_slice())))?;
    Ok(Envelope::ok(tree))
}

/// Serves both create and update: the record for the payload's path is
/// overwritten and the domain is (re)registered.
pub async fn upsert(
    State(state): State<AppState>,
    DomainName(name): DomainName,
    Payload(config): Payload<DomainConfig>,
) -> ApiResult<()> {
    let key = keys::domain_config(&name, config.effective_path());
    let body = serde_json::to_vec(&config)?;
    state.store.put(&key, body).await.map_err(store_failure(&key))?;

    let registry = keys::domain_registry(&name);
    state
        .store
        .put(&registry, name.clone().into_bytes())
        .await
        .map_err(store_failure(&registry))?;

    tracing::info!(domain = %name, path = config.effective_path(), "Domain config stored");
    Ok(Envelope::done())
}

/// Delete everything stored for the domain, one namespace at a time.
/// The first failing delete aborts the rest.
pub async fn remove(State(state): State<AppState>, DomainName(name): DomainName) -> ApiResult<()> {
    let store = &state.store;

    let root = keys::domain_root(&name);
    store.delete_tree(&root).await.map_err(store_failure(&root))?;

    let registry = keys::domain_registry(&name);
    store.delete(&registry).await.map_err(store_failure(&registry))?;

    let healthcheck = keys::healthcheck(&name);
    store.delete(&healthcheck).await.map_err(store_failure(&healthcheck))?;

    let filters = keys::cookie_filter_root(&name);
    store.delete_tree(&filters).await.map_err(store_failure(&filters))?;

    tracing::info!(domain = %name, "Domain removed");
    Ok(Envelope::done())
}
