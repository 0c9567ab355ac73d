use axum::extract::State;
use serde::Serialize;

use crate::config::StoreBackend;
use crate::http::response::Envelope;
use crate::http::server::AppState;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub store: StoreBackend,
}

pub async fn get_status(State(state): State<AppState>) -> Envelope<SystemStatus> {
    Envelope::ok(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        store: state.config.store.backend,
    })
}
