//! Append-only audit logging for pipeline stage transitions
//!
//! Every stage transition writes one entry recording the request and response
//! payloads, enabling post-hoc debugging and replay of model interactions.
//! The log is a diagnostic side channel: it is never read back by the
//! pipeline, and appending is best-effort. A sink failure is logged and
//! swallowed, never allowed to abort the primary response path.

use crate::core_types::Stage;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

/// One record of a stage's request and response payloads.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub request_id: Uuid,
    pub stage: Stage,
    pub request: Value,
    pub response: Value,
}

impl AuditEntry {
    pub fn new(request_id: Uuid, stage: Stage, request: Value, response: Value) -> Self {
        Self {
            timestamp: Utc::now(),
            request_id,
            stage,
            request,
            response,
        }
    }
}

/// Fire-and-forget audit sink. Implementations must never propagate failure.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, entry: AuditEntry);
}

/// Appends entries as JSON lines to a file, opened lazily on first write.
pub struct FileAuditSink {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl FileAuditSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: Mutex::new(None),
        }
    }

    async fn write(&self, entry: &AuditEntry) -> std::io::Result<()> {
        let mut line = serde_json::to_string(entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        line.push('\n');

        let mut guard = self.file.lock().await;
        if guard.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .await?;
            *guard = Some(file);
        }
        if let Some(file) = guard.as_mut() {
            file.write_all(line.as_bytes()).await?;
            file.flush().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl AuditSink for FileAuditSink {
    async fn append(&self, entry: AuditEntry) {
        if let Err(e) = self.write(&entry).await {
            log::warn!(
                "audit append to {} failed (stage {}): {}",
                self.path.display(),
                entry.stage,
                e
            );
        }
    }
}

/// Discards every entry. Used when auditing is disabled.
pub struct NullAuditSink;

#[async_trait]
impl AuditSink for NullAuditSink {
    async fn append(&self, _entry: AuditEntry) {}
}
