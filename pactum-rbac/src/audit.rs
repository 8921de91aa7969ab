//! Audit trail for permission decisions
//!
//! Every evaluation produces exactly one audit record, emitted after the
//! decision is final. Emission is fire-and-forget: the record is handed to a
//! channel and persisted by a background task, so a slow or failing sink can
//! never change or delay the decision returned to the caller.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use pactum_api_types::ApiId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::{mpsc, RwLock};
use tracing::{error, info, warn};

use crate::config::AuditConfig;
use crate::models::Decision;

/// One permission decision, as written to the audit trail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Record ID
    pub id: String,
    /// Acting user, `None` for anonymous requesters
    pub user_id: Option<ApiId>,
    /// The permission string that was required
    pub required_permission: String,
    /// The decision that was made
    pub result: Decision,
    /// Reason naming the rule that fired
    pub reason: String,
    /// Request path the evaluation was made for
    pub path: String,
    /// When the decision was made
    pub timestamp: DateTime<Utc>,
}

impl AuditRecord {
    /// Create a record for a finalized decision
    pub fn new(
        user_id: Option<ApiId>,
        required_permission: impl Into<String>,
        result: Decision,
        reason: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            required_permission: required_permission.into(),
            result,
            reason: reason.into(),
            path: path.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Audit trail query parameters
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    /// Start date filter
    pub start_date: Option<DateTime<Utc>>,
    /// End date filter
    pub end_date: Option<DateTime<Utc>>,
    /// User ID filter
    pub user_ids: Vec<String>,
    /// Decision filter
    pub results: Vec<Decision>,
    /// Exact required-permission filter
    pub required_permission: Option<String>,
    /// Limit results
    pub limit: Option<usize>,
    /// Offset for pagination
    pub offset: Option<usize>,
}

impl AuditQuery {
    /// Check if a record matches the query
    fn matches(&self, record: &AuditRecord) -> bool {
        if let Some(start) = self.start_date {
            if record.timestamp < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if record.timestamp > end {
                return false;
            }
        }

        if !self.user_ids.is_empty() {
            match &record.user_id {
                Some(user_id) => {
                    if !self.user_ids.iter().any(|u| u == user_id.as_str()) {
                        return false;
                    }
                }
                None => return false,
            }
        }

        if !self.results.is_empty() && !self.results.contains(&record.result) {
            return false;
        }

        if let Some(permission) = &self.required_permission {
            if &record.required_permission != permission {
                return false;
            }
        }

        true
    }
}

/// Audit trail storage backend trait
#[async_trait::async_trait]
pub trait AuditStorage: Send + Sync {
    /// Store an audit record
    async fn store(&self, record: &AuditRecord) -> Result<()>;

    /// Query audit records
    async fn query(&self, query: &AuditQuery) -> Result<Vec<AuditRecord>>;

    /// Cleanup old audit records, returning how many units were removed
    async fn cleanup(&self, retention_days: u32) -> Result<u64>;
}

/// File-based audit storage writing JSONL files with daily rotation
pub struct FileAuditStorage {
    /// Base directory for audit logs
    base_path: PathBuf,
    /// File writer
    writer: Arc<RwLock<Option<BufWriter<File>>>>,
    /// Current log file path
    current_file: Arc<RwLock<Option<PathBuf>>>,
}

impl FileAuditStorage {
    /// Create a new file audit storage
    pub async fn new(base_path: PathBuf) -> Result<Self> {
        tokio::fs::create_dir_all(&base_path)
            .await
            .context("Failed to create audit log directory")?;

        let storage = Self {
            base_path,
            writer: Arc::new(RwLock::new(None)),
            current_file: Arc::new(RwLock::new(None)),
        };

        storage.rotate_log_file().await?;
        Ok(storage)
    }

    /// Rotate to a new log file (daily rotation)
    async fn rotate_log_file(&self) -> Result<()> {
        let date = Utc::now().format("%Y-%m-%d");
        let file_path = self.base_path.join(format!("permission-audit-{}.jsonl", date));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)
            .await
            .context("Failed to open audit log file")?;

        let writer = BufWriter::new(file);

        {
            let mut current_writer = self.writer.write().await;
            if let Some(mut old_writer) = current_writer.take() {
                old_writer.flush().await.ok();
            }
            *current_writer = Some(writer);
        }

        {
            let mut current_file = self.current_file.write().await;
            *current_file = Some(file_path);
        }

        Ok(())
    }

    /// Check if log rotation is needed
    async fn should_rotate(&self) -> bool {
        let current_file = self.current_file.read().await;
        if let Some(file_path) = current_file.as_ref() {
            if let Some(file_name) = file_path.file_stem().and_then(|s| s.to_str()) {
                let today = Utc::now().format("%Y-%m-%d").to_string();
                let expected_name = format!("permission-audit-{}", today);
                return !file_name.starts_with(&expected_name);
            }
        }
        true
    }
}

#[async_trait::async_trait]
impl AuditStorage for FileAuditStorage {
    async fn store(&self, record: &AuditRecord) -> Result<()> {
        if self.should_rotate().await {
            self.rotate_log_file().await?;
        }

        let json_line = serde_json::to_string(record).context("Failed to serialize audit record")?;

        let mut writer_guard = self.writer.write().await;
        if let Some(writer) = writer_guard.as_mut() {
            writer
                .write_all(json_line.as_bytes())
                .await
                .context("Failed to write audit record")?;
            writer
                .write_all(b"\n")
                .await
                .context("Failed to write newline")?;
            writer.flush().await.context("Failed to flush audit writer")?;
        }

        Ok(())
    }

    async fn query(&self, query: &AuditQuery) -> Result<Vec<AuditRecord>> {
        let mut records = Vec::new();
        let mut dir_entries = tokio::fs::read_dir(&self.base_path)
            .await
            .context("Failed to read audit log directory")?;

        while let Some(entry) = dir_entries.next_entry().await? {
            let file_path = entry.path();
            if file_path.extension().and_then(|s| s.to_str()) == Some("jsonl") {
                let content = tokio::fs::read_to_string(&file_path)
                    .await
                    .context("Failed to read audit log file")?;

                for line in content.lines() {
                    if line.trim().is_empty() {
                        continue;
                    }

                    match serde_json::from_str::<AuditRecord>(line) {
                        Ok(record) => {
                            if query.matches(&record) {
                                records.push(record);
                            }
                        }
                        Err(e) => {
                            warn!("Failed to parse audit record: {}", e);
                        }
                    }
                }
            }
        }

        // Newest first
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        if let Some(offset) = query.offset {
            if offset < records.len() {
                records = records.into_iter().skip(offset).collect();
            } else {
                records.clear();
            }
        }

        if let Some(limit) = query.limit {
            records.truncate(limit);
        }

        Ok(records)
    }

    async fn cleanup(&self, retention_days: u32) -> Result<u64> {
        let cutoff_date = Utc::now() - chrono::Duration::days(retention_days as i64);
        let mut deleted_count = 0;

        let mut dir_entries = tokio::fs::read_dir(&self.base_path)
            .await
            .context("Failed to read audit log directory")?;

        while let Some(entry) = dir_entries.next_entry().await? {
            let file_path = entry.path();
            if file_path.extension().and_then(|s| s.to_str()) == Some("jsonl") {
                if let Ok(metadata) = entry.metadata().await {
                    if let Ok(modified) = metadata.modified() {
                        let modified_datetime: DateTime<Utc> = modified.into();
                        if modified_datetime < cutoff_date {
                            if tokio::fs::remove_file(&file_path).await.is_ok() {
                                deleted_count += 1;
                                info!("Deleted old audit log file: {:?}", file_path);
                            }
                        }
                    }
                }
            }
        }

        Ok(deleted_count)
    }
}

/// In-memory audit storage, for embedding and tests
#[derive(Default)]
pub struct InMemoryAuditStorage {
    records: Arc<RwLock<Vec<AuditRecord>>>,
}

impl InMemoryAuditStorage {
    /// Create an empty in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored record, in insertion order
    pub async fn records(&self) -> Vec<AuditRecord> {
        self.records.read().await.clone()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether no records are stored
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait::async_trait]
impl AuditStorage for InMemoryAuditStorage {
    async fn store(&self, record: &AuditRecord) -> Result<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn query(&self, query: &AuditQuery) -> Result<Vec<AuditRecord>> {
        let mut records: Vec<AuditRecord> = self
            .records
            .read()
            .await
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();

        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        if let Some(offset) = query.offset {
            records = records.into_iter().skip(offset).collect();
        }
        if let Some(limit) = query.limit {
            records.truncate(limit);
        }

        Ok(records)
    }

    async fn cleanup(&self, retention_days: u32) -> Result<u64> {
        let cutoff = Utc::now() - chrono::Duration::days(retention_days as i64);
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.timestamp >= cutoff);
        Ok((before - records.len()) as u64)
    }
}

/// Audit logger for permission decisions
pub struct AuditLogger {
    /// Storage backend
    storage: Arc<dyn AuditStorage>,
    /// Async channel for records
    sender: mpsc::UnboundedSender<AuditRecord>,
    /// Configuration
    config: AuditConfig,
}

impl AuditLogger {
    /// Create a new audit logger.
    ///
    /// Spawns a background task draining the record channel into storage;
    /// requires a running tokio runtime.
    pub fn new(storage: Arc<dyn AuditStorage>, config: AuditConfig) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<AuditRecord>();
        let storage_clone = storage.clone();

        tokio::spawn(async move {
            while let Some(record) = receiver.recv().await {
                if let Err(e) = storage_clone.store(&record).await {
                    error!("Failed to store audit record: {}", e);
                }
            }
        });

        Self {
            storage,
            sender,
            config,
        }
    }

    /// Hand a record to the audit pipeline.
    ///
    /// Synchronous and infallible from the caller's perspective: the send is
    /// the attempt, persistence completes in the background.
    pub fn record(&self, record: AuditRecord) {
        if !self.config.enabled {
            return;
        }

        if self.sender.send(record).is_err() {
            error!("Audit channel closed; dropping permission audit record");
        }
    }

    /// Query the audit trail
    pub async fn query(&self, query: AuditQuery) -> Result<Vec<AuditRecord>> {
        self.storage.query(&query).await
    }

    /// Clean up records past the configured retention
    pub async fn cleanup(&self) -> Result<u64> {
        self.storage.cleanup(self.config.retention_days).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_record(user: &str, result: Decision) -> AuditRecord {
        AuditRecord::new(
            Some(ApiId::from(user)),
            "booking:view:provider",
            result,
            match result {
                Decision::Allow => "Provider is associated with the resource",
                Decision::Deny => "Provider is not associated with the resource",
            },
            "/api/bookings/booking-1",
        )
    }

    #[tokio::test]
    async fn test_file_audit_storage_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileAuditStorage::new(temp_dir.path().to_path_buf()).await.unwrap();

        let record = sample_record("provider-individual-1", Decision::Allow);
        storage.store(&record).await.unwrap();

        let records = storage.query(&AuditQuery::default()).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, record.id);
        assert_eq!(records[0].result, Decision::Allow);
        assert_eq!(records[0].path, "/api/bookings/booking-1");
    }

    #[tokio::test]
    async fn test_query_filters() {
        let storage = InMemoryAuditStorage::new();
        storage.store(&sample_record("provider-individual-1", Decision::Allow)).await.unwrap();
        storage.store(&sample_record("provider-individual-1", Decision::Deny)).await.unwrap();
        storage.store(&sample_record("client-basic-1", Decision::Deny)).await.unwrap();
        storage
            .store(&AuditRecord::new(
                None,
                "discovery:search:public",
                Decision::Allow,
                "public resource accessible to all",
                "unknown",
            ))
            .await
            .unwrap();

        let denies = storage
            .query(&AuditQuery {
                results: vec![Decision::Deny],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(denies.len(), 2);

        let by_user = storage
            .query(&AuditQuery {
                user_ids: vec!["client-basic-1".to_string()],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_user.len(), 1);

        // Anonymous records never match a user filter
        let by_missing_user = storage
            .query(&AuditQuery {
                user_ids: vec!["nobody".to_string()],
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(by_missing_user.is_empty());

        let by_permission = storage
            .query(&AuditQuery {
                required_permission: Some("discovery:search:public".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_permission.len(), 1);
        assert!(by_permission[0].user_id.is_none());
    }

    #[tokio::test]
    async fn test_query_limit_and_offset() {
        let storage = InMemoryAuditStorage::new();
        for i in 0..5 {
            storage.store(&sample_record(&format!("user-{}", i), Decision::Allow)).await.unwrap();
        }

        let page = storage
            .query(&AuditQuery {
                limit: Some(2),
                offset: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
    }

    #[tokio::test]
    async fn test_audit_logger_drains_to_storage() {
        let storage = Arc::new(InMemoryAuditStorage::new());
        let logger = AuditLogger::new(storage.clone(), AuditConfig::default());

        logger.record(sample_record("provider-individual-1", Decision::Allow));

        // Wait a moment for async processing
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        assert_eq!(storage.len().await, 1);
        let records = logger.query(AuditQuery::default()).await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_audit_logger_disabled() {
        let storage = Arc::new(InMemoryAuditStorage::new());
        let logger = AuditLogger::new(
            storage.clone(),
            AuditConfig {
                enabled: false,
                ..AuditConfig::default()
            },
        );

        logger.record(sample_record("provider-individual-1", Decision::Allow));
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_in_memory_cleanup() {
        let storage = InMemoryAuditStorage::new();
        let mut old = sample_record("client-basic-1", Decision::Deny);
        old.timestamp = Utc::now() - chrono::Duration::days(120);
        storage.store(&old).await.unwrap();
        storage.store(&sample_record("client-basic-1", Decision::Allow)).await.unwrap();

        let removed = storage.cleanup(90).await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(storage.len().await, 1);
    }
}
