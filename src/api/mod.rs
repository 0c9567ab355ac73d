//! Operator-facing routes.
//!
//! Every configuration route is a `POST` under `/zlb/domains`, mirroring
//! the control plane the load balancer operators already script against.

pub mod cookie_filter;
pub mod domains;
pub mod healthcheck;
pub mod status;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::http::middleware::require_api_key;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::store::StoreError;

pub fn router(state: AppState) -> Router {
    let domains = Router::new()
        .route("/zlb/domains/list", post(domains::list))
        .route("/zlb/domains/{name}/inspect", post(domains::inspect))
        .route("/zlb/domains/{name}/create", post(domains::upsert))
        .route("/zlb/domains/{name}/update", post(domains::upsert))
        .route("/zlb/domains/{name}/remove", post(domains::remove))
        .route("/zlb/domains/{name}/setCookieFilter", post(cookie_filter::set))
        .route("/zlb/domains/{name}/removeCookieFilter", post(cookie_filter::remove))
        .route("/zlb/domains/{name}/cookieFilters", post(cookie_filter::list))
        .route("/zlb/domains/{name}/healthcheck/inspect", post(healthcheck::inspect))
        .route("/zlb/domains/{name}/healthcheck/update", post(healthcheck::update))
        .route("/zlb/domains/{name}/healthcheck/delete", post(healthcheck::delete))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .route("/zlb/status", get(status::get_status))
        .merge(domains)
        .fallback(not_found)
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::NotFound("not found".to_string())
}

/// Log a failed store call against its key before it becomes a response.
fn store_failure(key: &str) -> impl FnOnce(StoreError) -> ApiError + '_ {
    move |e| {
        tracing::warn!(key, error = %e, "Store operation failed");
        ApiError::Store(e)
    }
}
