//! Key layout in the configuration store.
//!
//! ```text
//! zlb/<domain>/cfg/path_<b64(path)>          domain config per routing path
//! zlb_domain/<domain>                        domain registry entry
//! zlb_healthcheck/<domain>                   health check record
//! zlb_cookiefilter/<domain>/<name>/<value>   cookie filter lifetime
//! ```

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;

use crate::domain::ValidationError;

pub const DOMAIN_PREFIX: &str = "zlb/";
pub const REGISTRY_PREFIX: &str = "zlb_domain/";
pub const HEALTHCHECK_PREFIX: &str = "zlb_healthcheck/";
pub const COOKIE_FILTER_PREFIX: &str = "zlb_cookiefilter/";

/// Marks a key segment holding an encoded routing path.
pub const PATH_SEGMENT_PREFIX: &str = "path_";

pub fn domain_root(domain: &str) -> String {
    format!("{DOMAIN_PREFIX}{domain}/")
}

pub fn domain_config(domain: &str, path: &str) -> String {
    format!("{DOMAIN_PREFIX}{domain}/cfg/{}", encode_path(path))
}

pub fn domain_registry(domain: &str) -> String {
    format!("{REGISTRY_PREFIX}{domain}")
}

pub fn healthcheck(domain: &str) -> String {
    format!("{HEALTHCHECK_PREFIX}{domain}")
}

pub fn cookie_filter_root(domain: &str) -> String {
    format!("{COOKIE_FILTER_PREFIX}{domain}/")
}

pub fn cookie_filter(domain: &str, name: &str, value: &str) -> String {
    format!("{COOKIE_FILTER_PREFIX}{domain}/{name}/{value}")
}

/// Encode a routing path as a single key segment. Empty means "/".
pub fn encode_path(path: &str) -> String {
    let path = if path.is_empty() { "/" } else { path };
    format!("{PATH_SEGMENT_PREFIX}{}", URL_SAFE.encode(path.as_bytes()))
}

/// Decode a `path_` segment back to the routing path.
///
/// Segments without the marker, or whose payload is not valid base64 UTF-8,
/// are returned unchanged.
pub fn decode_segment(segment: &str) -> String {
    segment
        .strip_prefix(PATH_SEGMENT_PREFIX)
        .and_then(|encoded| URL_SAFE.decode(encoded).ok())
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| segment.to_string())
}

/// A domain name is the second segment of every key built for it, so it
/// must be exactly one segment and must not be a relative path component.
pub fn check_domain(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::new("DomainName", "must not be empty"));
    }
    if name.trim() != name {
        return Err(ValidationError::new(
            "DomainName",
            "must not have surrounding whitespace",
        ));
    }
    if name.contains('/') {
        return Err(ValidationError::new("DomainName", "must not contain '/'"));
    }
    if name == "." || name == ".." {
        return Err(ValidationError::new("DomainName", "must not be '.' or '..'"));
    }
    Ok(())
}

/// Extract the domain name from a key under `zlb/`.
pub fn domain_from_key(key: &str) -> Option<&str> {
    key.strip_prefix(DOMAIN_PREFIX)?
        .split('/')
        .next()
        .filter(|name| !name.is_empty())
}
