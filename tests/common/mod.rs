//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use zlb_api::config::{ApiConfig, StoreBackend, StoreConfig};
use zlb_api::store::ConsulStore;
use zlb_api::{HttpServer, KvStore, MemoryStore, Shutdown};

/// A running API server; shuts down when dropped.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the API on an ephemeral port over `store`.
pub async fn start_server(config: ApiConfig, store: Arc<dyn KvStore>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();

    let server = HttpServer::new(config, store);
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    TestServer { addr, shutdown }
}

/// Start the API over a fresh memory store and hand back the store too.
pub async fn start_memory_server(mut config: ApiConfig) -> (TestServer, Arc<MemoryStore>) {
    config.store.backend = StoreBackend::Memory;
    let store = Arc::new(MemoryStore::new());
    let server = start_server(config, store.clone()).await;
    (server, store)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Send a bodiless `POST` with `path` written verbatim on the request line.
///
/// URL parsers in HTTP clients resolve `.` and `..` segments (including
/// their percent-encoded forms) before sending, so this writes the request
/// by hand. Returns the status code and the raw response text.
pub async fn raw_post(addr: SocketAddr, path: &str) -> (u16, String) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "POST {path} HTTP/1.1\r\nHost: {addr}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    let status = response
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap();
    (status, response)
}

/// In-process stand-in for a Consul agent's KV endpoints.
#[derive(Clone, Default)]
pub struct MockConsul {
    pub kv: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
    /// `X-Consul-Token` of every request, in arrival order.
    pub tokens: Arc<Mutex<Vec<Option<String>>>>,
    /// Requests for keys under this prefix answer 500.
    pub fail_prefix: Arc<Mutex<Option<String>>>,
}

impl MockConsul {
    pub fn insert(&self, key: &str, value: &str) {
        self.kv
            .lock()
            .unwrap()
            .insert(key.to_string(), value.as_bytes().to_vec());
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.kv
            .lock()
            .unwrap()
            .get(key)
            .map(|v| String::from_utf8_lossy(v).into_owned())
    }

    pub fn keys(&self) -> Vec<String> {
        self.kv.lock().unwrap().keys().cloned().collect()
    }

    pub fn fail_under(&self, prefix: &str) {
        *self.fail_prefix.lock().unwrap() = Some(prefix.to_string());
    }
}

pub async fn start_mock_consul() -> (SocketAddr, MockConsul) {
    let mock = MockConsul::default();
    let app = Router::new()
        .route("/v1/kv/{*key}", any(mock_kv))
        .with_state(mock.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, mock)
}

pub fn consul_store(addr: SocketAddr, token: Option<&str>) -> ConsulStore {
    let config = StoreConfig {
        backend: StoreBackend::Consul,
        consul_address: addr.to_string(),
        token: token.map(String::from),
        ..Default::default()
    };
    ConsulStore::new(&config).unwrap()
}

async fn mock_kv(
    State(mock): State<MockConsul>,
    method: Method,
    Path(key): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    mock.tokens.lock().unwrap().push(
        headers
            .get("x-consul-token")
            .and_then(|v| v.to_str().ok())
            .map(String::from),
    );

    let failing = mock.fail_prefix.lock().unwrap().clone();
    if let Some(prefix) = failing {
        if key.starts_with(&prefix) {
            return (StatusCode::INTERNAL_SERVER_ERROR, "injected failure").into_response();
        }
    }

    let recurse = query.contains_key("recurse");
    let mut kv = mock.kv.lock().unwrap();

    match method {
        Method::GET if query.contains_key("keys") => {
            let separator = query.get("separator").filter(|s| !s.is_empty());
            let mut keys: Vec<String> = kv
                .keys()
                .filter(|k| k.starts_with(&key))
                .map(|k| match separator.and_then(|sep| k[key.len()..].find(sep.as_str()).map(|i| (i, sep))) {
                    Some((i, sep)) => k[..key.len() + i + sep.len()].to_string(),
                    None => k.clone(),
                })
                .collect();
            keys.dedup();
            if keys.is_empty() {
                return StatusCode::NOT_FOUND.into_response();
            }
            Json(keys).into_response()
        }
        Method::GET => {
            let entries: Vec<_> = kv
                .iter()
                .filter(|(k, _)| if recurse { k.starts_with(&key) } else { **k == key })
                .map(|(k, v)| json!({ "Key": k, "Flags": 0, "Value": STANDARD.encode(v) }))
                .collect();
            if entries.is_empty() {
                return StatusCode::NOT_FOUND.into_response();
            }
            Json(entries).into_response()
        }
        Method::PUT => {
            kv.insert(key, body.to_vec());
            Json(true).into_response()
        }
        Method::DELETE => {
            if recurse {
                kv.retain(|k, _| !k.starts_with(&key));
            } else {
                kv.remove(&key);
            }
            Json(true).into_response()
        }
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}
