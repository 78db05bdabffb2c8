//! Seams between the application layer and its data sources.

use std::path::PathBuf;

use async_trait::async_trait;
use folio_api_types::Query;
use serde_json::Value;
use thiserror::Error;

use crate::domain::resources::{EntryId, Resource};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid request url: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid credential header: {0}")]
    Credential(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("cms responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode response body: {0}")]
    Decode(String),
}

impl SourceError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }
}

/// One read against the CMS. `token` is attached as a bearer credential when present.
#[derive(Debug, Clone, Copy)]
pub struct FetchRequest<'a> {
    pub resource: Resource,
    pub id: Option<&'a EntryId>,
    pub query: &'a Query,
    pub token: Option<&'a str>,
}

#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Status code of an unauthenticated GET on the CMS base URL.
    async fn probe(&self) -> Result<u16, SourceError>;

    /// Raw JSON body of a successful read.
    async fn fetch(&self, request: FetchRequest<'_>) -> Result<Value, SourceError>;
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("snapshot {path} is not valid json: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("snapshot writer task failed: {0}")]
    Task(String),
}

#[async_trait]
pub trait SnapshotRepo: Send + Sync {
    /// `Ok(None)` when no snapshot exists for the resource.
    async fn load(&self, resource: Resource) -> Result<Option<Value>, SnapshotError>;

    /// Replace the snapshot wholesale, returning the written path.
    async fn write(&self, resource: Resource, envelope: &Value) -> Result<PathBuf, SnapshotError>;
}
