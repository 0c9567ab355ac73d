//! Per-domain health check records.

use axum::extract::State;

use crate::api::store_failure;
use crate::domain::{keys, HealthCheck};
use crate::http::extract::{DomainName, Payload};
use crate::http::response::{ApiError, ApiResult, Envelope};
use crate::http::server::AppState;

pub async fn inspect(
    State(state): State<AppState>,
    DomainName(name): DomainName,
) -> ApiResult<HealthCheck> {
    let key = keys::healthcheck(&name);
    let pair = state
        .store
        .get(&key)
        .await
        .map_err(store_failure(&key))?
        .ok_or_else(|| ApiError::NotFound(format!("health check not configured for {name}")))?;

    let check = serde_json::from_slice(&pair.value).map_err(|source| ApiError::Corrupt {
        key: key.clone(),
        source,
    })?;
    Ok(Envelope::ok(check))
}

pub async fn update(
    State(state): State<AppState>,
    DomainName(name): DomainName,
    Payload(check): Payload<HealthCheck>,
) -> ApiResult<()> {
    check.validate()?;
    let key = keys::healthcheck(&name);
    let body = serde_json::to_vec(&check)?;
    state.store.put(&key, body).await.map_err(store_failure(&key))?;

    tracing::info!(domain = %name, kind = %check.kind, "Health check stored");
    Ok(Envelope::done())
}

pub async fn delete(
    State(state): State<AppState>,
    DomainName(name): DomainName,
) -> ApiResult<()> {
    let key = keys::healthcheck(&name);
    state.store.delete(&key).await.map_err(store_failure(&key))?;
    Ok(Envelope::done())
}
