//! Content fingerprints and the scratch directory they key.
//!
//! The scratch directory holds two kinds of files: `<fingerprint>.json` with the dimensions
//! the image service reported for a source, and `<fingerprint>-<w>x<h>.png` with a generated
//! image. Both are named purely by content and size, so they stay valid across runs.

use serde::{Deserialize, Serialize};
use std::{
    fmt,
    path::{Path, PathBuf},
};

/// CRC-32 of a source file's contents as lowercase hex. Not collision resistant, only used to
/// name cache entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(pub String);

impl Fingerprint {
    pub fn of(data: &[u8]) -> Fingerprint {
        Fingerprint(format!("{:x}", crc32fast::hash(data)))
    }

    pub async fn of_file(path: &Path) -> std::io::Result<Fingerprint> {
        let data = tokio::fs::read(path).await?;
        Ok(Fingerprint::of(&data))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the image service knows about a source image.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SourceMetadata {
    pub width: u32,
    pub height: u32,
    pub vector: bool,
}

/// On-disk form of [`SourceMetadata`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub width: u32,
    pub height: u32,
    pub vector: bool,
    pub version: u32,
}

impl CacheEntry {
    pub const SCHEMA_VERSION: u32 = 1;
}

impl From<SourceMetadata> for CacheEntry {
    fn from(m: SourceMetadata) -> Self {
        CacheEntry {
            width: m.width,
            height: m.height,
            vector: m.vector,
            version: CacheEntry::SCHEMA_VERSION,
        }
    }
}

/// Location of the generated image for a source at a given size.
pub fn scratch_path(dir: &Path, fingerprint: &Fingerprint, width: u32, height: u32) -> PathBuf {
    dir.join(format!("{}-{}x{}.png", fingerprint, width, height))
}

#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
    enabled: bool,
}

impl CacheStore {
    pub fn new(dir: PathBuf, enabled: bool) -> Self {
        CacheStore { dir, enabled }
    }

    pub async fn ensure_dir(&self) {
        if let Err(error) = tokio::fs::create_dir_all(&self.dir).await {
            tracing::warn!(%error, "failed to create scratch directory {}", self.dir.display());
        }
    }

    pub fn scratch_path(&self, fingerprint: &Fingerprint, width: u32, height: u32) -> PathBuf {
        scratch_path(&self.dir, fingerprint, width, height)
    }

    fn entry_path(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.dir.join(format!("{}.json", fingerprint))
    }

    /// Whether a generated image from an earlier run can be reused.
    pub async fn has_image(&self, path: &Path) -> bool {
        self.enabled && tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    /// Reads the metadata recorded for a source. Missing, unreadable, corrupt or outdated
    /// entries all count as absent.
    pub async fn lookup(&self, fingerprint: &Fingerprint) -> Option<SourceMetadata> {
        if !self.enabled {
            return None;
        }
        let data = tokio::fs::read(self.entry_path(fingerprint)).await.ok()?;
        let entry: CacheEntry = serde_json::from_slice(&data).ok()?;
        if entry.version != CacheEntry::SCHEMA_VERSION {
            tracing::debug!(%fingerprint, version = entry.version, "ignoring outdated cache entry");
            return None;
        }
        Some(SourceMetadata {
            width: entry.width,
            height: entry.height,
            vector: entry.vector,
        })
    }

    /// Records the metadata for a source. Failures are logged and otherwise ignored.
    pub async fn write(&self, fingerprint: &Fingerprint, metadata: SourceMetadata) {
        let path = self.entry_path(fingerprint);
        let result = match serde_json::to_vec(&CacheEntry::from(metadata)) {
            Ok(data) => tokio::fs::write(&path, data).await.map_err(eyre::Report::new),
            Err(e) => Err(eyre::Report::new(e)),
        };
        if let Err(error) = result {
            tracing::warn!("error writing cache entry {}: {}", path.display(), error);
        }
    }
}
