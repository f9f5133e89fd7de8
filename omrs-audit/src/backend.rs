//! Audit log storage backends

use crate::AuditRecord;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Audit log storage backend trait
#[async_trait]
pub trait AuditBackend: Send + Sync {
    /// Write an audit record
    async fn write(&self, record: &AuditRecord) -> Result<(), AuditBackendError>;

    /// Flush any pending writes
    async fn flush(&self) -> Result<(), AuditBackendError>;

    /// Read the most recent records (if supported)
    async fn read(&self, _limit: usize) -> Result<Vec<AuditRecord>, AuditBackendError> {
        Err(AuditBackendError::NotSupported)
    }
}

/// Audit backend errors
#[derive(Debug, thiserror::Error)]
pub enum AuditBackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Operation not supported")]
    NotSupported,

    #[error("No audit backend configured")]
    MissingBackend,
}

/// Writes records to a file, one JSON object per line.
pub struct FileBackend {
    path: PathBuf,
    // Serializes appends so concurrent records never interleave
    lock: Mutex<()>,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl AuditBackend for FileBackend {
    async fn write(&self, record: &AuditRecord) -> Result<(), AuditBackendError> {
        let mut line = record.to_json()?;
        line.push('\n');

        let _guard = self.lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }

    async fn flush(&self) -> Result<(), AuditBackendError> {
        // Every write is flushed
        Ok(())
    }

    async fn read(&self, limit: usize) -> Result<Vec<AuditRecord>, AuditBackendError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let records = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str::<AuditRecord>)
            .collect::<Result<Vec<_>, _>>()?;

        let skip = records.len().saturating_sub(limit);
        Ok(records.into_iter().skip(skip).collect())
    }
}

/// In-memory backend, mostly for tests and embedded cohorts
#[derive(Clone, Default)]
pub struct MemoryBackend {
    records: Arc<Mutex<Vec<AuditRecord>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().await.clone()
    }

    /// Records carrying the given message id
    pub async fn records_with_id(&self, message_id: &str) -> Vec<AuditRecord> {
        self.records
            .lock()
            .await
            .iter()
            .filter(|r| r.message.message_id == message_id)
            .cloned()
            .collect()
    }

    pub async fn clear(&self) {
        self.records.lock().await.clear();
    }
}

#[async_trait]
impl AuditBackend for MemoryBackend {
    async fn write(&self, record: &AuditRecord) -> Result<(), AuditBackendError> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }

    async fn flush(&self) -> Result<(), AuditBackendError> {
        Ok(())
    }

    async fn read(&self, limit: usize) -> Result<Vec<AuditRecord>, AuditBackendError> {
        let records = self.records.lock().await;
        let skip = records.len().saturating_sub(limit);
        Ok(records.iter().skip(skip).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AuditMessage, AuditSeverity};

    fn record(message_id: &str) -> AuditRecord {
        AuditRecord::new(
            "test",
            "send",
            AuditMessage::new(message_id, AuditSeverity::Event, "an event"),
        )
    }

    #[tokio::test]
    async fn test_memory_backend_read_returns_most_recent() {
        let backend = MemoryBackend::new();

        for i in 0..5 {
            backend.write(&record(&format!("ID-{}", i))).await.unwrap();
        }

        let records = backend.read(2).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message.message_id, "ID-3");
        assert_eq!(records[1].message.message_id, "ID-4");
    }

    #[tokio::test]
    async fn test_memory_backend_filter_by_id() {
        let backend = MemoryBackend::new();
        backend.write(&record("A")).await.unwrap();
        backend.write(&record("B")).await.unwrap();
        backend.write(&record("A")).await.unwrap();

        assert_eq!(backend.records_with_id("A").await.len(), 2);
        backend.clear().await;
        assert!(backend.records().await.is_empty());
    }

    #[test]
    fn test_memory_backend_flush_keeps_records() {
        let backend = MemoryBackend::new();
        let result = tokio_test::block_on(async {
            backend.write(&record("ONLY")).await?;
            backend.flush().await
        });

        assert!(result.is_ok());
        assert_eq!(tokio_test::block_on(backend.records()).len(), 1);
    }

    #[tokio::test]
    async fn test_file_backend_appends_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("audit.log"));

        assert!(backend.read(10).await.unwrap().is_empty());

        backend.write(&record("FIRST")).await.unwrap();
        backend.write(&record("SECOND")).await.unwrap();

        let records = backend.read(10).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].message.message_id, "SECOND");
    }
}
