//! Content-addressed audio storage.
//!
//! Artifacts live at `<root>/<key>.<ext>`. A given key and format always map
//! to the same bytes, so entries are written once and never updated in place.

use crate::error::CacheError;
use crate::key::CacheKey;
use async_trait::async_trait;
use parrot_types::AudioFormat;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Storage for synthesized and converted audio.
#[async_trait]
pub trait AudioCache: Send + Sync {
    /// Checks whether an artifact exists.
    async fn has(&self, key: &CacheKey, format: AudioFormat) -> Result<bool, CacheError>;

    /// Reads an artifact. `Ok(None)` means it is not cached or the entry
    /// is empty.
    async fn read(&self, key: &CacheKey, format: AudioFormat)
        -> Result<Option<Vec<u8>>, CacheError>;

    /// Persists an artifact, replacing any existing copy.
    async fn write(&self, key: &CacheKey, format: AudioFormat, data: &[u8])
        -> Result<(), CacheError>;
}

/// Filesystem-backed cache rooted at a single directory.
#[derive(Debug, Clone)]
pub struct DiskCache {
    root: PathBuf,
}

impl DiskCache {
    /// Opens the cache, creating the root directory if needed.
    ///
    /// Staging files left behind by an interrupted write are removed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        let cache = Self { root };
        cache.sweep_staging().await?;
        Ok(cache)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn sweep_staging(&self) -> Result<(), CacheError> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut removed = 0usize;
        while let Some(entry) = entries.next_entry().await? {
            if !is_staging_name(&entry.file_name().to_string_lossy()) {
                continue;
            }
            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(
                        path = %entry.path().display(),
                        error = %e,
                        "failed to remove stale staging file"
                    );
                }
            }
        }
        if removed > 0 {
            info!(removed, root = %self.root.display(), "removed stale cache staging files");
        }
        Ok(())
    }

    fn artifact_path(&self, key: &CacheKey, format: AudioFormat) -> PathBuf {
        self.root
            .join(format!("{}.{}", key.as_str(), format.extension()))
    }
}

fn is_staging_name(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(".tmp")
}

#[async_trait]
impl AudioCache for DiskCache {
    async fn has(&self, key: &CacheKey, format: AudioFormat) -> Result<bool, CacheError> {
        Ok(tokio::fs::try_exists(self.artifact_path(key, format)).await?)
    }

    async fn read(
        &self,
        key: &CacheKey,
        format: AudioFormat,
    ) -> Result<Option<Vec<u8>>, CacheError> {
        match tokio::fs::read(self.artifact_path(key, format)).await {
            Ok(data) if !data.is_empty() => Ok(Some(data)),
            Ok(_) => {
                debug!(key = %key, %format, "ignoring empty cache entry");
                Ok(None)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::Io(e)),
        }
    }

    async fn write(
        &self,
        key: &CacheKey,
        format: AudioFormat,
        data: &[u8],
    ) -> Result<(), CacheError> {
        let path = self.artifact_path(key, format);
        // Stage next to the target so the rename stays on one filesystem.
        // Readers see either no file or the complete file.
        let staging = self.root.join(format!(
            ".{}.{}.{}.tmp",
            key.as_str(),
            format.extension(),
            Uuid::new_v4()
        ));

        if let Err(e) = tokio::fs::write(&staging, data).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(CacheError::Io(e));
        }
        if let Err(e) = tokio::fs::rename(&staging, &path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(CacheError::Io(e));
        }

        debug!(key = %key, %format, bytes = data.len(), "cached audio artifact");
        Ok(())
    }
}
