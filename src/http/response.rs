//! Response envelope and error mapping.
//!
//! Every route answers with `{"state": "OK"|"FAIL", "msg"?, "data"?}`.
//! Failures carry the underlying error text in `msg` and an HTTP error
//! status chosen by [`ApiError::status`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::{ExplodeError, ValidationError};
use crate::store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Ok,
    Fail,
}

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub state: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            state: Outcome::Ok,
            msg: None,
            data: Some(data),
        }
    }
}

impl Envelope<()> {
    /// Success without a payload.
    pub fn done() -> Self {
        Self {
            state: Outcome::Ok,
            msg: None,
            data: None,
        }
    }

    pub fn fail(msg: impl Into<String>) -> Self {
        Self {
            state: Outcome::Fail,
            msg: Some(msg.into()),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Please set DomainName in URI")]
    MissingDomain,

    #[error("{0}")]
    BadPayload(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("{0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Explode(#[from] ExplodeError),

    #[error("stored value at {key} is not valid: {source}")]
    Corrupt {
        key: String,
        source: serde_json::Error,
    },

    #[error("failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingDomain | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadPayload(_) | ApiError::Invalid(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Store(_) | ApiError::Explode(_) | ApiError::Corrupt { .. } | ApiError::Encode(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Request failed");
        } else {
            tracing::debug!(status = %status, error = %self, "Request rejected");
        }
        (status, Json(Envelope::fail(self.to_string()))).into_response()
    }
}

pub type ApiResult<T> = Result<Envelope<T>, ApiError>;
