//! Cookie-based session affinity filters.

use axum::extract::State;

use crate::api::store_failure;
use crate::domain::{keys, CookieFilter};
use crate::http::extract::{DomainName, Payload};
use crate::http::response::{ApiResult, Envelope};
use crate::http::server::AppState;

pub async fn set(
    State(state): State<AppState>,
    DomainName(name): DomainName,
    Payload(filter): Payload<CookieFilter>,
) -> ApiResult<()> {
    filter.validate()?;
    let key = keys::cookie_filter(&name, &filter.name, &filter.value);
    state
        .store
        .put(&key, filter.lifecycle.to_string().into_bytes())
        .await
        .map_err(store_failure(&key))?;

    tracing::info!(domain = %name, key = %key, lifecycle = filter.lifecycle, "Cookie filter stored");
    Ok(Envelope::done())
}

/// `Lifecycle` in the payload is ignored.
pub async fn remove(
    State(state): State<AppState>,
    DomainName(name): DomainName,
    Payload(filter): Payload<CookieFilter>,
) -> ApiResult<()> {
    filter.validate()?;
    let key = keys::cookie_filter(&name, &filter.name, &filter.value);
    state.store.delete(&key).await.map_err(store_failure(&key))?;
    Ok(Envelope::done())
}

pub async fn list(
    State(state): State<AppState>,
    DomainName(name): DomainName,
) -> ApiResult<Vec<CookieFilter>> {
    let root = keys::cookie_filter_root(&name);
    let pairs = state.store.list(&root).await.map_err(store_failure(&root))?;

    let mut filters = Vec::with_capacity(pairs.len());
    for pair in pairs {
        match parse_entry(&root, &pair.key, &pair.value) {
            Some(filter) => filters.push(filter),
            None => tracing::warn!(key = %pair.key, "Skipping malformed cookie filter entry"),
        }
    }
    Ok(Envelope::ok(filters))
}

fn parse_entry(root: &str, key: &str, value: &[u8]) -> Option<CookieFilter> {
    let (name, cookie_value) = key.strip_prefix(root)?.split_once('/')?;
    if name.is_empty() || cookie_value.is_empty() || cookie_value.contains('/') {
        return None;
    }
    let lifecycle = std::str::from_utf8(value).ok()?.trim().parse().ok()?;
    Some(CookieFilter {
        name: name.to_string(),
        value: cookie_value.to_string(),
        lifecycle,
    })
}
