//! Normalization of CMS response bodies into collection and single envelopes.
//!
//! Plugin endpoints (uploads, navigation) answer with a bare array or object;
//! those are wrapped so callers always see `{data, meta}`.

use folio_api_types::{Collection, Envelope, Pagination, PaginationParams, Single};
use serde::de::Error as _;
use serde_json::Value;

use crate::domain::resources::ResourceKind;

pub fn normalize_collection(body: Value) -> Result<Collection, serde_json::Error> {
    match body {
        Value::Array(items) => {
            let count = len_u64(items.len());
            Ok(Envelope::collection(
                items,
                Pagination::Offset {
                    start: 0,
                    limit: count,
                    total: count,
                },
            ))
        }
        Value::Object(map) if map.contains_key("data") => {
            serde_json::from_value(Value::Object(map))
        }
        other => Err(serde_json::Error::custom(format!(
            "expected a collection envelope, found {}",
            kind_of(&other)
        ))),
    }
}

pub fn normalize_single(body: Value) -> Result<Single, serde_json::Error> {
    match body {
        Value::Object(map) if map.contains_key("data") => {
            serde_json::from_value(Value::Object(map))
        }
        Value::Object(map) => Ok(Envelope::single(Some(Value::Object(map)))),
        Value::Null => Ok(Envelope::empty_single()),
        other => Err(serde_json::Error::custom(format!(
            "expected a single envelope, found {}",
            kind_of(&other)
        ))),
    }
}

/// Normalize `body` for `kind` and re-encode it as the JSON written to disk.
pub fn normalize_to_value(kind: ResourceKind, body: Value) -> Result<Value, serde_json::Error> {
    match kind {
        ResourceKind::Collection => serde_json::to_value(normalize_collection(body)?),
        ResourceKind::Single => serde_json::to_value(normalize_single(body)?),
    }
}

/// Empty collection whose metadata echoes the requested pagination style.
pub fn empty_collection<T>(pagination: Option<PaginationParams>) -> Collection<T> {
    match pagination {
        None => Envelope::empty_collection(),
        Some(PaginationParams::Offset { start, limit }) => Envelope::collection(
            Vec::new(),
            Pagination::Offset {
                start,
                limit,
                total: 0,
            },
        ),
        Some(PaginationParams::Page { page, page_size }) => Envelope::collection(
            Vec::new(),
            Pagination::Page {
                page: page.max(1),
                page_size: page_size.max(1),
                page_count: 0,
                total: 0,
            },
        ),
    }
}

pub(crate) fn len_u64(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object without `data`",
    }
}
