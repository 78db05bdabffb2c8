//! `qs`-style bracket encoding of [`Query`] for the CMS REST API.

use folio_api_types::Query;
use serde_json::Value;

/// Flatten `query` into `key[child][index]=value` pairs, dropping nulls.
pub fn encode_query(query: &Query) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    if let Ok(Value::Object(map)) = serde_json::to_value(query) {
        for (key, value) in map {
            flatten(key, value, &mut pairs);
        }
    }
    pairs
}

fn flatten(prefix: String, value: Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(flag) => out.push((prefix, flag.to_string())),
        Value::Number(number) => out.push((prefix, number.to_string())),
        Value::String(text) => out.push((prefix, text)),
        Value::Array(items) => {
            for (index, item) in items.into_iter().enumerate() {
                flatten(format!("{prefix}[{index}]"), item, out);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                flatten(format!("{prefix}[{key}]"), item, out);
            }
        }
    }
}
