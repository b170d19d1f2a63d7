//! Record source seam and the two bundled implementations.

use crate::record::CallRecord;
use async_trait::async_trait;
use callmetrics_common::{CallMetricsError, OwnerId, Result};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Supplies call records to the analytics service.
#[async_trait]
pub trait CallRecordStore: Send + Sync {
    /// All records belonging to `owner_id`, in any order.
    async fn records_for_owner(&self, owner_id: &OwnerId) -> Result<Vec<CallRecord>>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Store backed by a vector in memory.
#[derive(Debug, Default)]
pub struct InMemoryCallStore {
    records: RwLock<Vec<CallRecord>>,
}

impl InMemoryCallStore {
    /// Creates a store holding `records`.
    pub fn new(records: Vec<CallRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Adds one record.
    pub async fn insert(&self, record: CallRecord) {
        self.records.write().await.push(record);
    }

    /// Number of stored records across all owners.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl CallRecordStore for InMemoryCallStore {
    async fn records_for_owner(&self, owner_id: &OwnerId) -> Result<Vec<CallRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|record| &record.owner_id == owner_id)
            .cloned()
            .collect())
    }

    fn name(&self) -> &'static str {
        "in-memory"
    }
}

/// Store reading a JSON array of call records from disk on every request.
#[derive(Debug, Clone)]
pub struct JsonFileCallStore {
    path: PathBuf,
}

impl JsonFileCallStore {
    /// Creates a store for the file at `path`. The file is not touched until
    /// the first read.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record in the file.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn load_all(&self) -> Result<Vec<CallRecord>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            CallMetricsError::storage_with_source(
                format!("Failed to read records from {}", self.path.display()),
                e,
            )
        })?;

        let records: Vec<CallRecord> = serde_json::from_str(&content).map_err(|e| {
            CallMetricsError::storage_with_source(
                format!("Malformed records file {}", self.path.display()),
                e,
            )
        })?;

        debug!(count = records.len(), "Loaded call records");
        Ok(records)
    }

    /// Replaces the file contents with `records` as pretty-printed JSON.
    #[instrument(skip(self, records), fields(path = %self.path.display(), count = records.len()))]
    pub async fn save_all(&self, records: &[CallRecord]) -> Result<()> {
        let json = serde_json::to_string_pretty(records)?;
        tokio::fs::write(&self.path, json).await.map_err(|e| {
            CallMetricsError::storage_with_source(
                format!("Failed to write records to {}", self.path.display()),
                e,
            )
        })?;
        debug!("Saved call records");
        Ok(())
    }
}

#[async_trait]
impl CallRecordStore for JsonFileCallStore {
    async fn records_for_owner(&self, owner_id: &OwnerId) -> Result<Vec<CallRecord>> {
        let mut records = self.load_all().await?;
        records.retain(|record| &record.owner_id == owner_id);
        Ok(records)
    }

    fn name(&self) -> &'static str {
        "json-file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callmetrics_common::test_utils::mock_timestamp;

    fn sample() -> Vec<CallRecord> {
        vec![
            CallRecord::new("a", "alice", 60, mock_timestamp(2024, 1, 1, 9, 0, 0)),
            CallRecord::new("b", "bob", 90, mock_timestamp(2024, 1, 2, 9, 0, 0)),
            CallRecord::new("c", "alice", 30, mock_timestamp(2024, 1, 3, 9, 0, 0)),
        ]
    }

    #[tokio::test]
    async fn test_in_memory_scopes_to_owner() {
        let store = InMemoryCallStore::new(sample());
        let alice = store.records_for_owner(&OwnerId::from("alice")).await.unwrap();

        assert_eq!(alice.len(), 2);
        assert!(alice.iter().all(|r| r.owner_id.as_str() == "alice"));
        assert!(store
            .records_for_owner(&OwnerId::from("carol"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_in_memory_insert() {
        let store = InMemoryCallStore::default();
        assert!(store.is_empty().await);

        store
            .insert(CallRecord::new("x", "bob", 5, mock_timestamp(2024, 1, 1, 0, 0, 0)))
            .await;
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileCallStore::new(dir.path().join("calls.json"));

        store.save_all(&sample()).await.unwrap();
        let bob = store.records_for_owner(&OwnerId::from("bob")).await.unwrap();

        assert_eq!(bob.len(), 1);
        assert_eq!(bob[0].duration_seconds, 90);
    }

    #[tokio::test]
    async fn test_json_file_missing_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileCallStore::new(dir.path().join("absent.json"));

        let err = store.load_all().await.unwrap_err();
        assert!(matches!(err, CallMetricsError::Storage { .. }));
    }

    #[tokio::test]
    async fn test_json_file_malformed_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        tokio::fs::write(&path, "{ not an array").await.unwrap();

        let err = JsonFileCallStore::new(&path).load_all().await.unwrap_err();
        assert!(err.to_string().contains("Malformed records file"));
    }
}
