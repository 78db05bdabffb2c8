//! Build-time snapshot producer.
//!
//! Blocks until the CMS answers its base URL with a 2xx, then captures every
//! descriptor in order. A failing resource is logged and skipped; the rest of
//! the batch still runs.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use thiserror::Error;
use tracing::{info, warn};

use crate::application::env::RuntimeEnv;
use crate::application::envelope::normalize_to_value;
use crate::application::sources::{
    ContentSource, FetchRequest, SnapshotError, SnapshotRepo, SourceError,
};
use crate::domain::resources::{Resource, SNAPSHOT_DESCRIPTORS, SnapshotDescriptor};

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error(transparent)]
    Fetch(#[from] SourceError),
    #[error("response is not an envelope: {0}")]
    Shape(#[from] serde_json::Error),
    #[error(transparent)]
    Write(#[from] SnapshotError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProducerReport {
    pub written: Vec<Resource>,
    pub failed: Vec<Resource>,
}

impl ProducerReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct SnapshotProducer {
    source: Arc<dyn ContentSource>,
    snapshots: Arc<dyn SnapshotRepo>,
    env: RuntimeEnv,
    probe_interval: Duration,
    descriptors: &'static [SnapshotDescriptor],
}

impl SnapshotProducer {
    pub fn new(
        source: Arc<dyn ContentSource>,
        snapshots: Arc<dyn SnapshotRepo>,
        env: RuntimeEnv,
        probe_interval: Duration,
    ) -> Self {
        Self {
            source,
            snapshots,
            env,
            probe_interval,
            descriptors: SNAPSHOT_DESCRIPTORS,
        }
    }

    pub fn with_descriptors(mut self, descriptors: &'static [SnapshotDescriptor]) -> Self {
        self.descriptors = descriptors;
        self
    }

    /// Wait for the CMS, then capture every descriptor.
    pub async fn run(&self) -> ProducerReport {
        let attempts = self.wait_until_reachable().await;
        info!(attempts, "cms is reachable; capturing snapshots");
        self.capture_all().await
    }

    /// Probe until a 2xx answer, sleeping `probe_interval` between attempts.
    /// Returns the number of probes sent.
    pub async fn wait_until_reachable(&self) -> u64 {
        let mut attempts = 0_u64;
        loop {
            attempts += 1;
            counter!("folio_cms_probe_total").increment(1);
            match self.source.probe().await {
                Ok(status) if (200..300).contains(&status) => return attempts,
                Ok(status) => info!(status, attempts, "cms not ready yet"),
                Err(err) => info!(error = %err, attempts, "cms unreachable"),
            }
            tokio::time::sleep(self.probe_interval).await;
        }
    }

    pub async fn capture_all(&self) -> ProducerReport {
        let mut report = ProducerReport::default();
        for descriptor in self.descriptors {
            let resource = descriptor.resource;
            match self.capture(descriptor).await {
                Ok(path) => {
                    counter!("folio_snapshot_written_total").increment(1);
                    info!(resource = %resource, path = %path.display(), "snapshot written");
                    report.written.push(resource);
                }
                Err(err) => {
                    counter!("folio_snapshot_failed_total").increment(1);
                    warn!(resource = %resource, error = %err, "snapshot skipped");
                    report.failed.push(resource);
                }
            }
        }
        report
    }

    async fn capture(&self, descriptor: &SnapshotDescriptor) -> Result<PathBuf, CaptureError> {
        let query = descriptor.query();
        let token = self.env.credential(descriptor.audience);
        let body = self
            .source
            .fetch(FetchRequest {
                resource: descriptor.resource,
                id: None,
                query: &query,
                token: token.as_deref(),
            })
            .await?;
        let envelope = normalize_to_value(descriptor.resource.kind(), body)?;
        Ok(self.snapshots.write(descriptor.resource, &envelope).await?)
    }
}
