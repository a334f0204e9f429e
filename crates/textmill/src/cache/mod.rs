//! Content-addressed extraction result cache.
//!
//! Maps an absolute file path to the text previously extracted from it. A
//! cached record is valid only while the source file's size and modification
//! time both match the signature captured at store time; any mismatch
//! invalidates the whole record. Records are replaced wholesale, never
//! partially updated, and only successful non-blank extractions are stored.
//!
//! The backing store is a single JSON map file, read in full at construction
//! and written in full on [`ResultCache::save`]. [`ResultCache::clear`] drops
//! every record and deletes the file.

use crate::{Result, TextmillError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const CACHE_FILE_NAME: &str = "file_cache.json";

/// One cached extraction. Owned exclusively by [`ResultCache`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheRecord {
    /// Freshness signature of the source file, `"{mtime}_{size}"`.
    pub signature: String,
    pub text: String,
    pub cached_at: u64,
}

pub struct ResultCache {
    store_path: PathBuf,
    records: HashMap<String, CacheRecord>,
}

impl ResultCache {
    /// Open (or create) the cache under `cache_dir`, loading the full store.
    ///
    /// An unreadable or malformed store file starts an empty cache rather
    /// than failing the session.
    pub fn open(cache_dir: impl AsRef<Path>) -> Result<Self> {
        let cache_dir = cache_dir.as_ref();
        fs::create_dir_all(cache_dir)
            .map_err(|e| TextmillError::cache(format!("failed to create cache directory: {e}")))?;
        let store_path = cache_dir.join(CACHE_FILE_NAME);

        let records = match fs::read(&store_path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!("discarding malformed cache store: {e}");
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };

        Ok(Self { store_path, records })
    }

    /// Compute the freshness signature for a file, or `None` if it cannot
    /// be stat'ed.
    pub fn signature(path: &Path) -> Option<String> {
        let metadata = fs::metadata(path).ok()?;
        let mtime = metadata
            .modified()
            .ok()?
            .duration_since(UNIX_EPOCH)
            .ok()?
            .as_secs();
        Some(format!("{}_{}", mtime, metadata.len()))
    }

    /// Cached text for `path`, if present and still fresh.
    pub fn get(&self, path: &Path) -> Option<&str> {
        let current = Self::signature(path)?;
        let record = self.records.get(&key_for(path))?;
        if record.signature == current {
            Some(&record.text)
        } else {
            None
        }
    }

    /// Store text for `path`, replacing any previous record.
    ///
    /// Callers must not pass blank text; the engine enforces that invariant
    /// before reaching the cache.
    pub fn put(&mut self, path: &Path, text: String) {
        let Some(signature) = Self::signature(path) else {
            return;
        };
        let cached_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.records.insert(
            key_for(path),
            CacheRecord {
                signature,
                text,
                cached_at,
            },
        );
    }

    /// Flush the full record map to the backing store.
    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_vec_pretty(&self.records)?;
        fs::write(&self.store_path, json)
            .map_err(|e| TextmillError::cache(format!("failed to write cache store: {e}")))?;
        Ok(())
    }

    /// Drop all records and delete the backing store file.
    pub fn clear(&mut self) -> Result<()> {
        self.records.clear();
        if self.store_path.exists() {
            fs::remove_file(&self.store_path)
                .map_err(|e| TextmillError::cache(format!("failed to delete cache store: {e}")))?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn key_for(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
