//! Rebuild a nested JSON object from flat slash-delimited keys.
//!
//! # Responsibilities
//! - Split each key on `/` and nest one object per segment
//! - Decode `path_` segments back into routing paths
//! - Report keys that try to nest under an existing leaf
//!
//! # Design Decisions
//! - Values are emitted as JSON strings; the store holds opaque bytes
//! - Folder markers (keys ending in `/`) create objects but no leaf
//! - A later leaf at the same position replaces the earlier one

use serde_json::{Map, Value};

use crate::domain::keys::decode_segment;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExplodeError {
    #[error("not a map: {key:?}: {segment:?} already has value {existing}")]
    NotAMap {
        key: String,
        segment: String,
        existing: String,
    },
}

/// Explode `(key, value)` pairs into a nested object.
pub fn explode<I, K, V>(pairs: I) -> Result<Map<String, Value>, ExplodeError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<[u8]>,
{
    let mut root = Map::new();
    for (key, value) in pairs {
        let key = key.as_ref();
        let value = String::from_utf8_lossy(value.as_ref());
        insert(&mut root, key, &value, key)?;
    }
    Ok(root)
}

fn insert(
    map: &mut Map<String, Value>,
    key: &str,
    value: &str,
    full_key: &str,
) -> Result<(), ExplodeError> {
    let Some((head, rest)) = key.split_once('/') else {
        if !key.is_empty() {
            map.insert(decode_segment(key), Value::String(value.to_string()));
        }
        return Ok(());
    };

    let segment = decode_segment(head);
    let entry = map
        .entry(segment.clone())
        .or_insert_with(|| Value::Object(Map::new()));

    match entry {
        Value::Object(nested) => insert(nested, rest, value, full_key),
        existing => Err(ExplodeError::NotAMap {
            key: full_key.to_string(),
            segment,
            existing: existing.to_string(),
        }),
    }
}
