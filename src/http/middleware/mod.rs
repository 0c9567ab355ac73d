pub mod auth;
pub mod metrics;

pub use auth::require_api_key;
pub use metrics::track_requests;
