//! Durable run counter store.
//!
//! A single persisted non-negative integer with whole-value read/write
//! semantics. The daemon performs the read-modify-write itself; the
//! store never increments. An absent or corrupt value reads as 0 so a
//! wiped bootflash never prevents a run.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::error::{HealthError, Result};

/// Durable single-value integer store.
#[async_trait]
pub trait RunCounterStore: Send + Sync {
    /// Reads the persisted count. Absent or unparseable content is 0.
    async fn read(&self) -> u64;

    /// Persists the count, replacing any previous value.
    async fn write(&self, count: u64) -> Result<()>;
}

/// Run counter persisted as a decimal string in a single file.
#[derive(Debug, Clone)]
pub struct FileCounterStore {
    path: PathBuf,
}

impl FileCounterStore {
    /// Creates a store backed by the given file path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RunCounterStore for FileCounterStore {
    async fn read(&self) -> u64 {
        match fs::read_to_string(&self.path).await {
            Ok(content) => match content.trim().parse::<u64>() {
                Ok(count) => count,
                Err(_) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        "Run counter file is not a number, treating as 0"
                    );
                    0
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Run counter file unreadable, treating as 0"
                );
                0
            }
        }
    }

    async fn write(&self, count: u64) -> Result<()> {
        fs::write(&self.path, count.to_string())
            .await
            .map_err(|e| {
                HealthError::counter_store(format!(
                    "failed to write {}: {}",
                    self.path.display(),
                    e
                ))
            })
    }
}
