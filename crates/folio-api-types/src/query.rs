//! Caller-facing query object, mirroring the CMS REST query parameters.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Relations and media to include; `"*"` populates everything one level deep.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub populate: Option<Value>,
    /// Filter tree in the CMS operator grammar (`{"slug": {"$eq": "x"}}`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Value>,
    /// `field` or `field:asc|desc` entries, applied in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationParams>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaginationParams {
    Page {
        page: u64,
        #[serde(rename = "pageSize")]
        page_size: u64,
    },
    Offset {
        start: u64,
        limit: u64,
    },
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    #[must_use]
    pub fn populate_all(mut self) -> Self {
        self.populate = Some(Value::String("*".into()));
        self
    }

    #[must_use]
    pub fn populate(mut self, relation: impl Into<String>) -> Self {
        let relation = Value::String(relation.into());
        match self.populate.as_mut() {
            Some(Value::Array(items)) => items.push(relation),
            _ => self.populate = Some(Value::Array(vec![relation])),
        }
        self
    }

    /// Add an `$eq` predicate on `field`, keeping any existing filters.
    #[must_use]
    pub fn filter_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        let predicate = json!({ "$eq": value.into() });
        match self.filters.as_mut() {
            Some(Value::Object(map)) => {
                map.insert(field.into(), predicate);
            }
            _ => {
                let mut map = Map::new();
                map.insert(field.into(), predicate);
                self.filters = Some(Value::Object(map));
            }
        }
        self
    }

    #[must_use]
    pub fn sort_by(mut self, key: impl Into<String>) -> Self {
        self.sort.push(key.into());
        self
    }

    #[must_use]
    pub fn paginate(mut self, pagination: PaginationParams) -> Self {
        self.pagination = Some(pagination);
        self
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_eq_merges_into_existing_filters() {
        let query = Query::new()
            .filter_eq("slug", "hello")
            .filter_eq("locale", "en");

        assert_eq!(
            query.filters,
            Some(json!({"slug": {"$eq": "hello"}, "locale": {"$eq": "en"}}))
        );
    }

    #[test]
    fn populate_accumulates_relations() {
        let query = Query::new().populate("author").populate("cover");
        assert_eq!(query.populate, Some(json!(["author", "cover"])));
    }

    #[test]
    fn default_query_serializes_to_empty_object() {
        let value = serde_json::to_value(Query::new()).expect("encode");
        assert_eq!(value, json!({}));
        assert!(Query::new().is_empty());
    }
}
