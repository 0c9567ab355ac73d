use std::fmt;

use reqwest::{Client, IntoUrl, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::types::{CookieFilter, DomainConfig, Envelope, HealthCheck};

/// A `FAIL` envelope (or a non-envelope error body) from the API.
#[derive(Debug, Clone)]
pub struct ApiFailure {
    pub status: u16,
    pub msg: String,
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zlb api returned {}: {}", self.status, self.msg)
    }
}

impl std::error::Error for ApiFailure {}

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub struct ZlbClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ZlbClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    /// Send `Authorization: Bearer <key>` with every request.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub async fn status(&self) -> Result<Value> {
        let req = self.client.get(format!("{}/zlb/status", self.base_url));
        self.data(self.send(req).await?)
    }

    pub async fn list_domains(&self) -> Result<Vec<String>> {
        let env = self.post(format!("{}/zlb/domains/list", self.base_url), None::<&()>).await?;
        self.data(env)
    }

    /// The domain's configuration as a nested object.
    pub async fn inspect_domain(&self, name: &str) -> Result<Value> {
        let env = self.post(self.domain_url(name, "inspect")?, None::<&()>).await?;
        self.data(env)
    }

    pub async fn create_domain(&self, name: &str, config: &DomainConfig) -> Result<()> {
        self.post(self.domain_url(name, "create")?, Some(config)).await?;
        Ok(())
    }

    pub async fn update_domain(&self, name: &str, config: &DomainConfig) -> Result<()> {
        self.post(self.domain_url(name, "update")?, Some(config)).await?;
        Ok(())
    }

    pub async fn remove_domain(&self, name: &str) -> Result<()> {
        self.post(self.domain_url(name, "remove")?, None::<&()>).await?;
        Ok(())
    }

    pub async fn set_cookie_filter(&self, name: &str, filter: &CookieFilter) -> Result<()> {
        self.post(self.domain_url(name, "setCookieFilter")?, Some(filter)).await?;
        Ok(())
    }

    pub async fn remove_cookie_filter(&self, name: &str, filter: &CookieFilter) -> Result<()> {
        self.post(self.domain_url(name, "removeCookieFilter")?, Some(filter)).await?;
        Ok(())
    }

    pub async fn cookie_filters(&self, name: &str) -> Result<Vec<CookieFilter>> {
        let env = self.post(self.domain_url(name, "cookieFilters")?, None::<&()>).await?;
        self.data(env)
    }

    pub async fn health_check(&self, name: &str) -> Result<HealthCheck> {
        let env = self.post(self.domain_url(name, "healthcheck/inspect")?, None::<&()>).await?;
        self.data(env)
    }

    pub async fn update_health_check(&self, name: &str, check: &HealthCheck) -> Result<()> {
        self.post(self.domain_url(name, "healthcheck/update")?, Some(check)).await?;
        Ok(())
    }

    pub async fn delete_health_check(&self, name: &str) -> Result<()> {
        self.post(self.domain_url(name, "healthcheck/delete")?, None::<&()>).await?;
        Ok(())
    }

    async fn post<U: IntoUrl, B: Serialize + ?Sized>(&self, url: U, body: Option<&B>) -> Result<Envelope> {
        let mut req = self.client.post(url);
        if let Some(body) = body {
            req = req.json(body);
        }
        self.send(req).await
    }

    async fn send(&self, mut req: reqwest::RequestBuilder) -> Result<Envelope> {
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        match serde_json::from_str::<Envelope>(&text) {
            Ok(env) if status.is_success() && env.is_ok() => Ok(env),
            Ok(env) => Err(Box::new(ApiFailure {
                status: status.as_u16(),
                msg: env.msg.unwrap_or_default(),
            })),
            Err(_) => Err(Box::new(ApiFailure {
                status: status.as_u16(),
                msg: text,
            })),
        }
    }

    fn data<T: DeserializeOwned>(&self, env: Envelope) -> Result<T> {
        let value = env.data.unwrap_or(Value::Null);
        Ok(serde_json::from_value(value)?)
    }

    /// `/zlb/domains/<name>/<action>`, with `name` percent-encoded as a
    /// single path segment.
    fn domain_url(&self, name: &str, action: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| format!("base url {} cannot take a path", self.base_url))?
            .pop_if_empty()
            .extend(["zlb", "domains", name])
            .extend(action.split('/'));
        Ok(url)
    }
}
