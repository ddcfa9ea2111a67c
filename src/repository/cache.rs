//! Local artifact cache.
//!
//! Artifacts are stored in the repository layout
//! (`group/as/dirs/name/version/file`) under a shared root. Each file has a
//! `.meta.json` sidecar recording where it came from and when. Writes go
//! through a temporary file and an atomic rename, so other processes using
//! the same root never observe a partially written file.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::coordinate::Coordinate;
use crate::error::Result;

/// Metadata stored beside each cached file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// Id of the repository that supplied the file.
    pub repository_id: String,
    /// URL of that repository.
    pub repository_url: String,
    /// When the file was downloaded or last revalidated.
    pub cached_at: DateTime<Utc>,
    /// ETag from the HTTP response, if available.
    pub etag: Option<String>,
    /// SHA-256 of the content, hex encoded.
    pub sha256: String,
    /// Size in bytes.
    pub size_bytes: u64,
}

impl CacheMetadata {
    /// Age of the entry.
    pub fn age(&self) -> chrono::Duration {
        Utc::now().signed_duration_since(self.cached_at)
    }
}

/// The shared local repository.
#[derive(Debug, Clone)]
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    /// Create a local repository rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a coordinate's artifact file.
    pub fn artifact_path(&self, coordinate: &Coordinate) -> PathBuf {
        self.root
            .join(coordinate.directory())
            .join(coordinate.file_name())
    }

    /// Path of a coordinate's module descriptor.
    pub fn descriptor_path(&self, coordinate: &Coordinate) -> PathBuf {
        self.root
            .join(coordinate.directory())
            .join(coordinate.descriptor_name())
    }

    fn metadata_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(".meta.json");
        PathBuf::from(name)
    }

    /// Store content at `path` along with its metadata.
    pub fn store(&self, path: &Path, content: &[u8], metadata: &CacheMetadata) -> Result<()> {
        write_atomic(path, content)?;
        self.save_metadata(path, metadata)
    }

    /// Load the metadata of a cached file.
    ///
    /// Unreadable or corrupt metadata is treated as absent.
    pub fn metadata(&self, path: &Path) -> Option<CacheMetadata> {
        let json = fs::read_to_string(Self::metadata_path(path)).ok()?;
        serde_json::from_str(&json).ok()
    }

    /// Rewrite the metadata of a cached file (e.g. after revalidation).
    pub fn save_metadata(&self, path: &Path, metadata: &CacheMetadata) -> Result<()> {
        let json = serde_json::to_vec_pretty(metadata).context("Failed to encode cache metadata")?;
        write_atomic(&Self::metadata_path(path), &json)
    }

    /// Remove every cached file.
    pub fn clear(&self) -> Result<()> {
        if self.root.exists() {
            fs::remove_dir_all(&self.root)?;
        }
        Ok(())
    }
}

fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("{} has no parent directory", path.display()))?;
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create cache directory {}", parent.display()))?;

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
