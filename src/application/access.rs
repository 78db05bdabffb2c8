//! Mode-aware data access: one generic accessor over every CMS resource.
//!
//! Each call reads the build-time flag afresh. At build time the matching
//! snapshot file answers the query (with the emulation subset described in
//! [`crate::application::emulation`]); at runtime the query goes to the CMS
//! untouched. Failures never escape: they are logged and the caller gets an
//! empty envelope of the expected shape.

use std::sync::Arc;

use folio_api_types::{Collection, Envelope, Query, Single};
use metrics::counter;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::application::emulation::{find_entry, retain_ids, slice, unsupported_options};
use crate::application::envelope::{empty_collection, normalize_collection, normalize_single};
use crate::application::env::{Mode, RuntimeEnv};
use crate::application::sources::{ContentSource, FetchRequest, SnapshotRepo};
use crate::domain::entities::{
    Article, Author, Category, FileAsset, NavigationItem, Page, ResourceType, SiteSettings, Tag,
};
use crate::domain::resources::{EntryId, Resource, ResourceKind};

#[derive(Clone)]
pub struct DataAccess {
    env: RuntimeEnv,
    snapshots: Arc<dyn SnapshotRepo>,
    source: Arc<dyn ContentSource>,
}

impl DataAccess {
    pub fn new(
        env: RuntimeEnv,
        snapshots: Arc<dyn SnapshotRepo>,
        source: Arc<dyn ContentSource>,
    ) -> Self {
        Self {
            env,
            snapshots,
            source,
        }
    }

    pub fn mode(&self) -> Mode {
        self.env.mode()
    }

    pub async fn articles(&self, query: &Query) -> Collection<Article> {
        self.collection(query).await
    }

    pub async fn article(&self, id: &EntryId, query: &Query) -> Single<Article> {
        self.entry(id, query).await
    }

    pub async fn authors(&self, query: &Query) -> Collection<Author> {
        self.collection(query).await
    }

    pub async fn author(&self, id: &EntryId, query: &Query) -> Single<Author> {
        self.entry(id, query).await
    }

    pub async fn categories(&self, query: &Query) -> Collection<Category> {
        self.collection(query).await
    }

    pub async fn category(&self, id: &EntryId, query: &Query) -> Single<Category> {
        self.entry(id, query).await
    }

    pub async fn tags(&self, query: &Query) -> Collection<Tag> {
        self.collection(query).await
    }

    pub async fn tag(&self, id: &EntryId, query: &Query) -> Single<Tag> {
        self.entry(id, query).await
    }

    pub async fn pages(&self, query: &Query) -> Collection<Page> {
        self.collection(query).await
    }

    pub async fn page(&self, id: &EntryId, query: &Query) -> Single<Page> {
        self.entry(id, query).await
    }

    pub async fn files(&self, query: &Query) -> Collection<FileAsset> {
        self.collection(query).await
    }

    pub async fn file(&self, id: &EntryId, query: &Query) -> Single<FileAsset> {
        self.entry(id, query).await
    }

    pub async fn settings(&self, query: &Query) -> Single<SiteSettings> {
        self.single(query).await
    }

    pub async fn navigation(&self, query: &Query) -> Collection<NavigationItem> {
        self.collection(query).await
    }

    /// Typed collection read for `T`'s resource.
    pub async fn collection<T: ResourceType>(&self, query: &Query) -> Collection<T> {
        let raw = self.raw_collection(T::RESOURCE, query).await;
        decode_collection(T::RESOURCE, raw).unwrap_or_else(|| empty_collection(query.pagination))
    }

    /// Typed single-entry read from a collection resource.
    pub async fn entry<T: ResourceType>(&self, id: &EntryId, query: &Query) -> Single<T> {
        let raw = self.raw_entry(T::RESOURCE, id, query).await;
        decode_single(T::RESOURCE, raw)
    }

    /// Typed read of a single-type resource.
    pub async fn single<T: ResourceType>(&self, query: &Query) -> Single<T> {
        let raw = self.raw_single(T::RESOURCE, query).await;
        decode_single(T::RESOURCE, raw)
    }

    pub async fn raw_collection(&self, resource: Resource, query: &Query) -> Collection {
        let mode = self.begin(resource);
        if resource.kind() == ResourceKind::Single {
            warn!(
                resource = %resource,
                "collection read requested for a single-type resource"
            );
            return empty_collection(query.pagination);
        }

        let parsed = match mode {
            Mode::BuildTime => {
                warn_unsupported(resource, query);
                self.load_snapshot(resource).await.map(|body| {
                    normalize_collection(body).map(|envelope| {
                        let mut entries = envelope.data;
                        retain_ids(&mut entries, query);
                        slice(entries, query.pagination)
                    })
                })
            }
            Mode::Runtime => self
                .live(resource, None, query)
                .await
                .map(normalize_collection),
        };

        match parsed {
            Some(Ok(envelope)) => envelope,
            Some(Err(err)) => {
                fail(mode, resource, &err);
                empty_collection(query.pagination)
            }
            None => empty_collection(query.pagination),
        }
    }

    pub async fn raw_entry(&self, resource: Resource, id: &EntryId, query: &Query) -> Single {
        if resource.kind() == ResourceKind::Single {
            debug!(resource = %resource, id = %id, "id ignored for single-type resource");
            return self.raw_single(resource, query).await;
        }
        let mode = self.begin(resource);

        let parsed = match mode {
            Mode::BuildTime => {
                warn_unsupported(resource, query);
                self.load_snapshot(resource).await.map(|body| {
                    normalize_collection(body).map(|envelope| {
                        let mut entries = envelope.data;
                        retain_ids(&mut entries, query);
                        Envelope::single(find_entry(entries, id))
                    })
                })
            }
            Mode::Runtime => self
                .live(resource, Some(id), query)
                .await
                .map(normalize_single),
        };

        settle_single(mode, resource, parsed)
    }

    pub async fn raw_single(&self, resource: Resource, query: &Query) -> Single {
        let mode = self.begin(resource);

        let parsed = match mode {
            Mode::BuildTime => {
                warn_unsupported(resource, query);
                self.load_snapshot(resource).await.map(normalize_single)
            }
            Mode::Runtime => self.live(resource, None, query).await.map(normalize_single),
        };

        settle_single(mode, resource, parsed)
    }

    fn begin(&self, resource: Resource) -> Mode {
        let mode = self.env.mode();
        counter!("folio_access_total", "source" => mode.as_str()).increment(1);
        debug!(resource = %resource, mode = mode.as_str(), "resolving resource read");
        mode
    }

    async fn load_snapshot(&self, resource: Resource) -> Option<Value> {
        match self.snapshots.load(resource).await {
            Ok(Some(body)) => Some(body),
            Ok(None) => {
                debug!(resource = %resource, "no snapshot on disk; serving empty envelope");
                None
            }
            Err(err) => {
                fail(Mode::BuildTime, resource, &err);
                None
            }
        }
    }

    async fn live(&self, resource: Resource, id: Option<&EntryId>, query: &Query) -> Option<Value> {
        let token = self.env.credential(resource.audience());
        let request = FetchRequest {
            resource,
            id,
            query,
            token: token.as_deref(),
        };
        match self.source.fetch(request).await {
            Ok(body) => Some(body),
            Err(err) => {
                fail(Mode::Runtime, resource, &err);
                None
            }
        }
    }
}

fn settle_single(
    mode: Mode,
    resource: Resource,
    parsed: Option<Result<Single, serde_json::Error>>,
) -> Single {
    match parsed {
        Some(Ok(envelope)) => envelope,
        Some(Err(err)) => {
            fail(mode, resource, &err);
            Envelope::empty_single()
        }
        None => Envelope::empty_single(),
    }
}

fn warn_unsupported(resource: Resource, query: &Query) {
    let ignored = unsupported_options(query);
    if !ignored.is_empty() {
        warn!(
            resource = %resource,
            ignored = ?ignored,
            "query options not supported against snapshots were ignored"
        );
    }
}

fn fail(mode: Mode, resource: Resource, err: &dyn std::error::Error) {
    counter!("folio_access_failures_total", "source" => mode.as_str()).increment(1);
    warn!(
        resource = %resource,
        mode = mode.as_str(),
        error = %err,
        "resource read failed; serving empty envelope"
    );
}

fn decode_collection<T: DeserializeOwned>(
    resource: Resource,
    raw: Collection,
) -> Option<Collection<T>> {
    let Envelope { data, meta } = raw;
    match data
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()
    {
        Ok(data) => Some(Envelope { data, meta }),
        Err(err) => {
            warn!(resource = %resource, error = %err, "entries do not match the expected shape");
            None
        }
    }
}

fn decode_single<T: DeserializeOwned>(resource: Resource, raw: Single) -> Single<T> {
    let Envelope { data, meta } = raw;
    match data.map(serde_json::from_value).transpose() {
        Ok(data) => Envelope { data, meta },
        Err(err) => {
            warn!(resource = %resource, error = %err, "entry does not match the expected shape");
            Envelope::empty_single()
        }
    }
}
