//! Snapshot files on disk: one pretty-printed JSON envelope per resource.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::application::sources::{SnapshotError, SnapshotRepo};
use crate::domain::resources::Resource;

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    directory: PathBuf,
}

impl SnapshotStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn path_for(&self, resource: Resource) -> PathBuf {
        self.directory
            .join(format!("{}.json", resource.snapshot_basename()))
    }
}

#[async_trait]
impl SnapshotRepo for SnapshotStore {
    async fn load(&self, resource: Resource) -> Result<Option<Value>, SnapshotError> {
        let path = self.path_for(resource);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(SnapshotError::Io { path, source }),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| SnapshotError::Parse { path, source })
    }

    async fn write(&self, resource: Resource, envelope: &Value) -> Result<PathBuf, SnapshotError> {
        let mut bytes = serde_json::to_vec_pretty(envelope).map_err(SnapshotError::Encode)?;
        bytes.push(b'\n');

        let directory = self.directory.clone();
        let target = self.path_for(resource);
        let written = target.clone();
        tokio::task::spawn_blocking(move || write_atomically(&directory, &target, &bytes))
            .await
            .map_err(|err| SnapshotError::Task(err.to_string()))??;
        Ok(written)
    }
}

/// Temp file in the target directory, then rename over `target`.
fn write_atomically(directory: &Path, target: &Path, bytes: &[u8]) -> Result<(), SnapshotError> {
    fs::create_dir_all(directory).map_err(io_error(directory))?;
    let mut file = NamedTempFile::new_in(directory).map_err(io_error(directory))?;
    file.write_all(bytes).map_err(io_error(target))?;
    file.as_file().sync_all().map_err(io_error(target))?;
    file.persist(target).map_err(|err| SnapshotError::Io {
        path: target.to_path_buf(),
        source: err.error,
    })?;
    Ok(())
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SnapshotError + use<> {
    let path = path.to_path_buf();
    move |source| SnapshotError::Io { path, source }
}
