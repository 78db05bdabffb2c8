use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `{data, meta}` wrapper returned for every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<D> {
    pub data: D,
    #[serde(default, skip_serializing_if = "Meta::is_empty")]
    pub meta: Meta,
}

pub type Collection<T = Value> = Envelope<Vec<T>>;
pub type Single<T = Value> = Envelope<Option<T>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    /// Anything else the CMS puts into `meta`, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Meta {
    pub fn is_empty(&self) -> bool {
        self.pagination.is_none() && self.extra.is_empty()
    }

    pub fn with_pagination(pagination: Pagination) -> Self {
        Self {
            pagination: Some(pagination),
            extra: Map::new(),
        }
    }
}

/// Pagination metadata. The two synthesized styles are typed; any other
/// object the CMS sends is carried as-is in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, deny_unknown_fields)]
pub enum Pagination {
    Page {
        page: u64,
        #[serde(rename = "pageSize")]
        page_size: u64,
        #[serde(rename = "pageCount")]
        page_count: u64,
        total: u64,
    },
    Offset {
        start: u64,
        limit: u64,
        total: u64,
    },
    Other(Map<String, Value>),
}

impl Pagination {
    pub fn total(&self) -> Option<u64> {
        match self {
            Self::Page { total, .. } | Self::Offset { total, .. } => Some(*total),
            Self::Other(raw) => raw.get("total").and_then(Value::as_u64),
        }
    }
}

impl<T> Envelope<Vec<T>> {
    pub fn collection(data: Vec<T>, pagination: Pagination) -> Self {
        Self {
            data,
            meta: Meta::with_pagination(pagination),
        }
    }

    /// Collection with no entries and zeroed page-based metadata.
    pub fn empty_collection() -> Self {
        Self::collection(
            Vec::new(),
            Pagination::Page {
                page: 1,
                page_size: 0,
                page_count: 0,
                total: 0,
            },
        )
    }
}

impl<T> Envelope<Option<T>> {
    pub fn single(data: Option<T>) -> Self {
        Self {
            data,
            meta: Meta::default(),
        }
    }

    pub fn empty_single() -> Self {
        Self::single(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn collection_envelope_keeps_unknown_meta_keys() {
        let raw = json!({
            "data": [{"id": 1}],
            "meta": {
                "pagination": {"page": 1, "pageSize": 25, "pageCount": 1, "total": 1},
                "locale": "en"
            }
        });

        let envelope: Collection = serde_json::from_value(raw.clone()).expect("decode");
        assert_eq!(envelope.meta.pagination.and_then(|p| p.total()), Some(1));
        assert_eq!(serde_json::to_value(&envelope).expect("encode"), raw);
    }

    #[test]
    fn single_envelope_omits_empty_meta() {
        let envelope: Single = Envelope::empty_single();
        let value = serde_json::to_value(&envelope).expect("encode");
        assert_eq!(value, json!({"data": null}));
    }

    #[test]
    fn offset_pagination_is_recognised() {
        let meta: Meta =
            serde_json::from_value(json!({"pagination": {"start": 10, "limit": 5, "total": 42}}))
                .expect("decode");
        assert_eq!(
            meta.pagination,
            Some(Pagination::Offset {
                start: 10,
                limit: 5,
                total: 42
            })
        );
    }

    #[test]
    fn unrecognised_pagination_round_trips_unchanged() {
        let raw = json!({
            "data": [{"id": 1}],
            "meta": {"pagination": {"page": 1, "pageSize": 25}}
        });

        let envelope: Collection = serde_json::from_value(raw.clone()).expect("decode");
        assert!(matches!(envelope.meta.pagination, Some(Pagination::Other(_))));
        assert_eq!(envelope.meta.pagination.as_ref().and_then(Pagination::total), None);
        assert_eq!(serde_json::to_value(&envelope).expect("encode"), raw);
    }

    #[test]
    fn extra_pagination_keys_are_not_dropped() {
        let raw = json!({
            "pagination": {"start": 0, "limit": 10, "total": 3, "cursor": "abc"}
        });

        let meta: Meta = serde_json::from_value(raw.clone()).expect("decode");
        assert_eq!(meta.pagination.as_ref().and_then(Pagination::total), Some(3));
        assert_eq!(serde_json::to_value(&meta).expect("encode"), raw);
    }
}
