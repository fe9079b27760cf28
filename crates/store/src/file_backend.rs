//! File-based fact store: a pretty-printed JSON array of coin records.
//!
//! Storage location: `~/.coinclaw/data/kb.json` by default.
//!
//! Records are loaded into memory on creation and the whole file is rewritten
//! on every upsert. Entries that fail to parse (missing fields, wrong types)
//! are skipped at load with a warning.

use async_trait::async_trait;
use coinclaw_core::error::StoreError;
use coinclaw_core::record::CoinRecord;
use coinclaw_core::store::FactStore;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::{find_in, upsert_into};

/// A file-backed store.
///
/// Fast reads from memory, durable writes. A failed write leaves the
/// in-memory copy ahead of the file until the next successful flush.
pub struct FileStore {
    path: PathBuf,
    records: Arc<RwLock<Vec<CoinRecord>>>,
}

impl FileStore {
    /// Open the store at the given path.
    ///
    /// If the file exists, records are loaded from it.
    /// If it does not, the store starts empty (file created on first write).
    pub fn new(path: PathBuf) -> Self {
        let records = Self::load_from_disk(&path);
        debug!(path = %path.display(), count = records.len(), "File fact store loaded");
        Self {
            path,
            records: Arc::new(RwLock::new(records)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_disk(path: &Path) -> Vec<CoinRecord> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Vec::new(), // File doesn't exist yet, start empty
        };

        if content.trim().is_empty() {
            return Vec::new();
        }

        let entries: Vec<serde_json::Value> = match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Fact store file is not a JSON array, starting empty");
                return Vec::new();
            }
        };

        let mut records = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<CoinRecord>(entry) {
                Ok(record) => {
                    upsert_into(&mut records, record);
                }
                Err(e) => warn!(index, error = %e, "Skipping malformed coin record"),
            }
        }
        records
    }

    /// Write all records to disk.
    fn flush(&self, records: &[CoinRecord]) -> Result<(), StoreError> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Storage(format!("Failed to create store directory: {e}"))
                })?;
            }
        }

        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        records
            .serialize(&mut ser)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        std::fs::write(&self.path, &buf)
            .map_err(|e| StoreError::Storage(format!("Failed to write store file: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl FactStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn get(&self, identifier: &str) -> Result<Option<CoinRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(find_in(&records, identifier).cloned())
    }

    async fn upsert(&self, record: CoinRecord) -> Result<CoinRecord, StoreError> {
        let mut records = self.records.write().await;
        let stored = upsert_into(&mut records, record);
        // Flush under the write lock so concurrent upserts cannot interleave on disk.
        self.flush(&records)?;
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<CoinRecord>, StoreError> {
        Ok(self.records.read().await.clone())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().await.len())
    }
}
