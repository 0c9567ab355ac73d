use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{"state": "OK"|"FAIL", "msg"?, "data"?}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub state: String,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl Envelope {
    pub fn is_ok(&self) -> bool {
        self.state == "OK"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthCheck {
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Uri", skip_serializing_if = "String::is_empty")]
    pub uri: String,
    #[serde(rename = "Valid_statuses", skip_serializing_if = "String::is_empty")]
    pub valid_statuses: String,
    #[serde(rename = "Interval", skip_serializing_if = "is_zero")]
    pub interval: i64,
    #[serde(rename = "Timeout", skip_serializing_if = "is_zero")]
    pub timeout: i64,
    #[serde(rename = "Fall", skip_serializing_if = "is_zero")]
    pub fall: i64,
    #[serde(rename = "Rise", skip_serializing_if = "is_zero")]
    pub rise: i64,
    #[serde(rename = "Concurrency", skip_serializing_if = "is_zero")]
    pub concurrency: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainConfig {
    #[serde(rename = "Healthcheck")]
    pub healthcheck: HealthCheck,
    #[serde(rename = "Sticky", skip_serializing_if = "is_false")]
    pub sticky: bool,
    #[serde(rename = "KeepAlive", skip_serializing_if = "is_zero")]
    pub keep_alive: i64,
    #[serde(rename = "Path", skip_serializing_if = "String::is_empty")]
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieFilter {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value")]
    pub value: String,
    #[serde(rename = "Lifecycle")]
    pub lifecycle: i64,
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}

fn is_false(v: &bool) -> bool {
    !*v
}
