//! Build-time approximation of CMS queries over snapshot entries.
//!
//! Only `id`/`documentId` equality and start/limit (or page/pageSize)
//! slicing are emulated. Everything else is reported by
//! [`unsupported_options`] so the caller can log it.

use folio_api_types::{Collection, Envelope, Pagination, PaginationParams, Query};
use serde_json::Value;

use crate::application::envelope::len_u64;
use crate::domain::resources::EntryId;

const ID_FIELDS: [&str; 2] = ["id", "documentId"];

/// Id-equality predicates carried by `filters`. An entry must satisfy all of them.
pub fn id_filters(query: &Query) -> Vec<EntryId> {
    let Some(Value::Object(filters)) = query.filters.as_ref() else {
        return Vec::new();
    };
    ID_FIELDS
        .iter()
        .filter_map(|field| filters.get(*field).and_then(equality_operand))
        .filter_map(EntryId::from_value)
        .collect()
}

/// Keep the entries matching every id predicate in `query`.
pub fn retain_ids(entries: &mut Vec<Value>, query: &Query) {
    let ids = id_filters(query);
    if !ids.is_empty() {
        entries.retain(|entry| ids.iter().all(|id| id.matches(entry)));
    }
}

/// Query options the snapshot path will ignore, named for logging.
pub fn unsupported_options(query: &Query) -> Vec<String> {
    let mut ignored = Vec::new();
    if !query.sort.is_empty() {
        ignored.push("sort".to_string());
    }
    if !query.fields.is_empty() {
        ignored.push("fields".to_string());
    }
    match query.filters.as_ref() {
        None => {}
        Some(Value::Object(filters)) => {
            for (key, operand) in filters {
                let emulated = ID_FIELDS.contains(&key.as_str())
                    && equality_operand(operand)
                        .and_then(EntryId::from_value)
                        .is_some();
                if !emulated {
                    ignored.push(format!("filters.{key}"));
                }
            }
        }
        Some(_) => ignored.push("filters".to_string()),
    }
    ignored
}

/// Slice `entries` for the requested pagination; `total` counts all entries.
pub fn slice(entries: Vec<Value>, pagination: Option<PaginationParams>) -> Collection {
    let total = len_u64(entries.len());
    match pagination {
        None => Envelope::collection(
            entries,
            Pagination::Page {
                page: 1,
                page_size: total,
                page_count: u64::from(total > 0),
                total,
            },
        ),
        Some(PaginationParams::Offset { start, limit }) => Envelope::collection(
            window(entries, start, limit),
            Pagination::Offset {
                start,
                limit,
                total,
            },
        ),
        Some(PaginationParams::Page { page, page_size }) => {
            let page = page.max(1);
            let page_size = page_size.max(1);
            let start = (page - 1).saturating_mul(page_size);
            Envelope::collection(
                window(entries, start, page_size),
                Pagination::Page {
                    page,
                    page_size,
                    page_count: total.div_ceil(page_size),
                    total,
                },
            )
        }
    }
}

pub fn find_entry(entries: Vec<Value>, id: &EntryId) -> Option<Value> {
    entries.into_iter().find(|entry| id.matches(entry))
}

fn equality_operand(operand: &Value) -> Option<&Value> {
    match operand {
        Value::Object(ops) if ops.len() == 1 => ops.get("$eq"),
        Value::Object(_) | Value::Array(_) | Value::Null => None,
        scalar => Some(scalar),
    }
}

fn window(entries: Vec<Value>, start: u64, limit: u64) -> Vec<Value> {
    let start = usize::try_from(start).unwrap_or(usize::MAX);
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    entries.into_iter().skip(start).take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entries(n: u64) -> Vec<Value> {
        (1..=n).map(|id| json!({"id": id})).collect()
    }

    fn ids(collection: &Collection) -> Vec<u64> {
        collection
            .data
            .iter()
            .filter_map(|e| e.get("id").and_then(Value::as_u64))
            .collect()
    }

    #[test]
    fn offset_slice_reports_full_total() {
        let out = slice(
            entries(10),
            Some(PaginationParams::Offset { start: 2, limit: 3 }),
        );
        assert_eq!(ids(&out), vec![3, 4, 5]);
        assert_eq!(out.meta.pagination.and_then(|p| p.total()), Some(10));
    }

    #[test]
    fn offset_slice_clamps_to_bounds() {
        let tail = slice(
            entries(4),
            Some(PaginationParams::Offset { start: 3, limit: 10 }),
        );
        assert_eq!(ids(&tail), vec![4]);

        let past_end = slice(
            entries(4),
            Some(PaginationParams::Offset { start: 9, limit: 2 }),
        );
        assert!(past_end.data.is_empty());
        assert_eq!(past_end.meta.pagination.and_then(|p| p.total()), Some(4));
    }

    #[test]
    fn page_slice_synthesizes_page_count() {
        let out = slice(
            entries(7),
            Some(PaginationParams::Page {
                page: 2,
                page_size: 3,
            }),
        );
        assert_eq!(ids(&out), vec![4, 5, 6]);
        assert_eq!(
            out.meta.pagination,
            Some(Pagination::Page {
                page: 2,
                page_size: 3,
                page_count: 3,
                total: 7
            })
        );
    }

    #[test]
    fn no_pagination_returns_everything_as_one_page() {
        let out = slice(entries(3), None);
        assert_eq!(ids(&out), vec![1, 2, 3]);
        assert_eq!(
            out.meta.pagination,
            Some(Pagination::Page {
                page: 1,
                page_size: 3,
                page_count: 1,
                total: 3
            })
        );
    }

    #[test]
    fn id_filter_accepts_scalar_and_eq_operands() {
        let scalar = Query {
            filters: Some(json!({"id": 2})),
            ..Query::default()
        };
        assert_eq!(id_filters(&scalar), vec![EntryId::Numeric(2)]);

        let eq = Query::new().filter_eq("documentId", "abc");
        assert_eq!(id_filters(&eq), vec![EntryId::Document("abc".into())]);

        let other = Query::new().filter_eq("slug", "hello");
        assert!(id_filters(&other).is_empty());
    }

    #[test]
    fn id_and_document_id_filters_must_both_match() {
        let mut rows = vec![
            json!({"id": 1, "documentId": "a1"}),
            json!({"id": 2, "documentId": "a2"}),
        ];
        let conflicting = Query::new().filter_eq("id", 1).filter_eq("documentId", "a2");
        retain_ids(&mut rows, &conflicting);
        assert!(rows.is_empty());

        let mut rows = vec![
            json!({"id": 1, "documentId": "a1"}),
            json!({"id": 2, "documentId": "a2"}),
        ];
        let agreeing = Query::new().filter_eq("id", 2).filter_eq("documentId", "a2");
        retain_ids(&mut rows, &agreeing);
        assert_eq!(rows, vec![json!({"id": 2, "documentId": "a2"})]);
    }

    #[test]
    fn unsupported_options_are_named() {
        let query = Query::new()
            .filter_eq("id", 3)
            .filter_eq("slug", "x")
            .sort_by("title")
            .field("title")
            .populate_all();

        assert_eq!(
            unsupported_options(&query),
            vec![
                "sort".to_string(),
                "fields".to_string(),
                "filters.slug".to_string()
            ]
        );
    }

    #[test]
    fn id_with_non_equality_operator_is_unsupported() {
        let query = Query {
            filters: Some(json!({"id": {"$in": [1, 2]}})),
            ..Query::default()
        };
        assert!(id_filters(&query).is_empty());
        assert_eq!(unsupported_options(&query), vec!["filters.id".to_string()]);
    }

    #[test]
    fn find_entry_matches_by_id() {
        assert_eq!(
            find_entry(entries(3), &EntryId::Numeric(2)),
            Some(json!({"id": 2}))
        );
        assert_eq!(find_entry(entries(3), &EntryId::Numeric(99)), None);
    }
}
