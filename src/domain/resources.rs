//! Registry of CMS resources and the static list the snapshot producer fetches.

use std::fmt;
use std::str::FromStr;

use folio_api_types::{PaginationParams, Query};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::error::DomainError;

/// Upper bound requested per collection when capturing a snapshot.
pub const SNAPSHOT_PAGE_LIMIT: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Articles,
    Authors,
    Categories,
    Tags,
    Pages,
    Files,
    Settings,
    Navigation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Collection,
    Single,
}

impl Resource {
    pub const ALL: [Resource; 8] = [
        Resource::Articles,
        Resource::Authors,
        Resource::Categories,
        Resource::Tags,
        Resource::Pages,
        Resource::Files,
        Resource::Settings,
        Resource::Navigation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Articles => "articles",
            Resource::Authors => "authors",
            Resource::Categories => "categories",
            Resource::Tags => "tags",
            Resource::Pages => "pages",
            Resource::Files => "files",
            Resource::Settings => "settings",
            Resource::Navigation => "navigation",
        }
    }

    /// REST path below the API prefix.
    pub fn path(self) -> &'static str {
        match self {
            Resource::Articles => "articles",
            Resource::Authors => "authors",
            Resource::Categories => "categories",
            Resource::Tags => "tags",
            Resource::Pages => "pages",
            Resource::Files => "upload/files",
            Resource::Settings => "global",
            Resource::Navigation => "navigation/render/main-navigation",
        }
    }

    pub fn kind(self) -> ResourceKind {
        match self {
            Resource::Settings => ResourceKind::Single,
            _ => ResourceKind::Collection,
        }
    }

    pub fn audience(self) -> Audience {
        match self {
            Resource::Files => Audience::Backend,
            _ => Audience::Frontend,
        }
    }

    /// Last path segment; names the snapshot file.
    pub fn snapshot_basename(self) -> &'static str {
        let path = self.path();
        path.rsplit('/').next().unwrap_or(path)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Resource::ALL
            .into_iter()
            .find(|resource| resource.as_str() == needle)
            .ok_or_else(|| DomainError::unknown_resource(s))
    }
}

/// Credential class attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    Frontend,
    Backend,
}

impl Audience {
    pub fn as_str(self) -> &'static str {
        match self {
            Audience::Frontend => "frontend",
            Audience::Backend => "backend",
        }
    }
}

impl FromStr for Audience {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "frontend" => Ok(Audience::Frontend),
            "backend" => Ok(Audience::Backend),
            _ => Err(DomainError::unknown_audience(s)),
        }
    }
}

/// Identifier for a single entry: numeric `id` or string `documentId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryId {
    Numeric(u64),
    Document(String),
}

impl EntryId {
    /// Build an id from a JSON filter operand, if it is a scalar.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64().map(EntryId::Numeric),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn matches(&self, entry: &Value) -> bool {
        let id = entry.get("id");
        match self {
            EntryId::Numeric(wanted) => match id {
                Some(Value::Number(n)) => n.as_u64() == Some(*wanted),
                Some(Value::String(s)) => s.parse::<u64>().ok() == Some(*wanted),
                _ => false,
            },
            EntryId::Document(wanted) => {
                entry.get("documentId").and_then(Value::as_str) == Some(wanted.as_str())
                    || id.and_then(Value::as_str) == Some(wanted.as_str())
            }
        }
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryId::Numeric(id) => write!(f, "{id}"),
            EntryId::Document(id) => f.write_str(id),
        }
    }
}

impl FromStr for EntryId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("entry id must not be empty"));
        }
        Ok(match trimmed.parse::<u64>() {
            Ok(id) => EntryId::Numeric(id),
            Err(_) => EntryId::Document(trimmed.to_string()),
        })
    }
}

/// One entry of the producer's fetch list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotDescriptor {
    pub resource: Resource,
    pub audience: Audience,
    pub populate: bool,
    pub paginate: bool,
}

impl SnapshotDescriptor {
    const fn content(resource: Resource) -> Self {
        Self {
            resource,
            audience: Audience::Frontend,
            populate: true,
            paginate: true,
        }
    }

    pub fn query(&self) -> Query {
        let mut query = Query::new();
        if self.populate {
            query = query.populate_all();
        }
        if self.paginate {
            query = query.paginate(PaginationParams::Offset {
                start: 0,
                limit: SNAPSHOT_PAGE_LIMIT,
            });
        }
        query
    }
}

pub const SNAPSHOT_DESCRIPTORS: &[SnapshotDescriptor] = &[
    SnapshotDescriptor::content(Resource::Articles),
    SnapshotDescriptor::content(Resource::Authors),
    SnapshotDescriptor::content(Resource::Categories),
    SnapshotDescriptor::content(Resource::Tags),
    SnapshotDescriptor::content(Resource::Pages),
    SnapshotDescriptor {
        resource: Resource::Files,
        audience: Audience::Backend,
        populate: false,
        paginate: false,
    },
    SnapshotDescriptor {
        resource: Resource::Settings,
        audience: Audience::Frontend,
        populate: true,
        paginate: false,
    },
    SnapshotDescriptor {
        resource: Resource::Navigation,
        audience: Audience::Frontend,
        populate: false,
        paginate: false,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snapshot_basename_is_last_path_segment() {
        assert_eq!(Resource::Articles.snapshot_basename(), "articles");
        assert_eq!(Resource::Files.snapshot_basename(), "files");
        assert_eq!(Resource::Navigation.snapshot_basename(), "main-navigation");
    }

    #[test]
    fn descriptors_cover_every_resource_once() {
        for resource in Resource::ALL {
            let count = SNAPSHOT_DESCRIPTORS
                .iter()
                .filter(|d| d.resource == resource)
                .count();
            assert_eq!(count, 1, "{resource} listed {count} times");
        }
    }

    #[test]
    fn descriptor_audience_matches_resource_default() {
        for descriptor in SNAPSHOT_DESCRIPTORS {
            assert_eq!(descriptor.audience, descriptor.resource.audience());
        }
    }

    #[test]
    fn unknown_audience_is_rejected() {
        assert_eq!("Backend".parse::<Audience>(), Ok(Audience::Backend));
        assert_eq!(
            "admin".parse::<Audience>(),
            Err(DomainError::unknown_audience("admin"))
        );
    }

    #[test]
    fn resource_parses_case_insensitively() {
        assert_eq!("Articles".parse::<Resource>(), Ok(Resource::Articles));
        assert!("widgets".parse::<Resource>().is_err());
    }

    #[test]
    fn entry_id_matches_numeric_and_document_ids() {
        let entry = json!({"id": 2, "documentId": "doc-2"});
        assert!(EntryId::Numeric(2).matches(&entry));
        assert!(!EntryId::Numeric(3).matches(&entry));
        assert!(EntryId::Document("doc-2".into()).matches(&entry));
        assert!(EntryId::Numeric(5).matches(&json!({"id": "5"})));
        assert_eq!("42".parse::<EntryId>(), Ok(EntryId::Numeric(42)));
        assert_eq!(
            EntryId::from_value(&json!("abc")),
            Some(EntryId::Document("abc".into()))
        );
    }

    #[test]
    fn collection_descriptor_query_requests_large_offset_page() {
        let query = SNAPSHOT_DESCRIPTORS[0].query();
        assert_eq!(query.populate, Some(json!("*")));
        assert_eq!(
            query.pagination,
            Some(PaginationParams::Offset {
                start: 0,
                limit: SNAPSHOT_PAGE_LIMIT
            })
        );
    }
}
