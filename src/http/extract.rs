//! Request extractors shared by the API handlers.
//!
//! # Responsibilities
//! - Pull the domain name out of the route, rejecting blanks with 404
//! - Decode JSON or form-encoded bodies into one payload type
//!
//! # Design Decisions
//! - Rejections are `ApiError`s so they render as the response envelope
//! - A body without a content type is read as JSON

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{header::CONTENT_TYPE, request::Parts},
    Form,
};
use serde::de::DeserializeOwned;

use crate::domain::keys;
use crate::http::response::ApiError;

/// The `{name}` route variable, guaranteed to be one usable key segment.
///
/// A blank name is a missing one (404); anything else that
/// [`keys::check_domain`] refuses is a bad request.
#[derive(Debug, Clone)]
pub struct DomainName(pub String);

impl<S> FromRequestParts<S> for DomainName
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(name) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::MissingDomain)?;
        if name.trim().is_empty() {
            return Err(ApiError::MissingDomain);
        }
        keys::check_domain(&name)?;
        Ok(Self(name))
    }
}

/// A body decoded from JSON or `application/x-www-form-urlencoded`.
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

#[derive(Debug, PartialEq, Eq)]
enum Encoding {
    Json,
    Form,
}

fn encoding(content_type: Option<&str>) -> Option<Encoding> {
    let Some(content_type) = content_type else {
        return Some(Encoding::Json);
    };
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match mime.as_str() {
        "" | "application/json" => Some(Encoding::Json),
        "application/x-www-form-urlencoded" => Some(Encoding::Form),
        other if other.ends_with("+json") => Some(Encoding::Json),
        _ => None,
    }
}

impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .map(|v| v.to_str().unwrap_or("unreadable"))
            .map(str::to_string);

        match encoding(content_type.as_deref()) {
            Some(Encoding::Json) => {
                let body = Bytes::from_request(req, state)
                    .await
                    .map_err(|e| ApiError::BadPayload(e.body_text()))?;
                let value = serde_json::from_slice(&body)
                    .map_err(|e| ApiError::BadPayload(e.to_string()))?;
                Ok(Self(value))
            }
            Some(Encoding::Form) => {
                let Form(value) = Form::<T>::from_request(req, state)
                    .await
                    .map_err(|e| ApiError::BadPayload(e.body_text()))?;
                Ok(Self(value))
            }
            None => Err(ApiError::BadPayload(format!(
                "unsupported content type {:?}",
                content_type.unwrap_or_default()
            ))),
        }
    }
}
