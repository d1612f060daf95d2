//! Analysis history persistence.
//!
//! Records are stored one JSON object per line. Appends never rewrite the
//! file; `delete` rewrites it through a temporary file and an atomic rename.

use std::path::{Path, PathBuf};
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

use moodscan_common::error::{MoodscanError, MoodscanResult};
use moodscan_sentiment::Sentiment;

use crate::result::{AnalysisResult, Source};

/// A saved analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub text: String,
    pub sentiment: Sentiment,
    pub confidence: u8,
    pub summary: String,
    pub source: Source,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_confidence: Option<u8>,
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    /// Stamp a result with a fresh id and the current time.
    pub fn from_result(result: &AnalysisResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: result.text().to_string(),
            sentiment: result.sentiment(),
            confidence: result.confidence(),
            summary: result.summary().to_string(),
            source: result.source(),
            ocr_confidence: result.ocr_confidence(),
            created_at: Utc::now(),
        }
    }

    fn matches(&self, needle: &str) -> bool {
        self.text.to_lowercase().contains(needle) || self.summary.to_lowercase().contains(needle)
    }
}

/// Storage for saved analyses.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(&self, record: AnalysisRecord) -> MoodscanResult<()>;

    /// All records, newest first.
    async fn list(&self) -> MoodscanResult<Vec<AnalysisRecord>>;

    /// Remove a record. Returns `false` when no record has that id.
    async fn delete(&self, id: Uuid) -> MoodscanResult<bool>;

    /// Records whose text or summary contains `query`, ignoring case.
    async fn search(&self, query: &str) -> MoodscanResult<Vec<AnalysisRecord>> {
        let needle = query.trim().to_lowercase();
        let records = self.list().await?;
        if needle.is_empty() {
            return Ok(records);
        }
        Ok(records.into_iter().filter(|r| r.matches(&needle)).collect())
    }
}

/// Newest first. Records sharing a timestamp keep reverse insertion order.
fn newest_first(mut records: Vec<AnalysisRecord>) -> Vec<AnalysisRecord> {
    records.reverse();
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    records
}

/// Record store backed by a JSONL file.
pub struct JsonlRecordStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonlRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> MoodscanResult<Vec<AnalysisRecord>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(store_err("read history", e)),
        };

        let mut records = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AnalysisRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(
                    path = %self.path.display(),
                    line = index + 1,
                    error = %e,
                    "Skipping malformed history line"
                ),
            }
        }
        Ok(records)
    }

    async fn ensure_parent(&self) -> MoodscanResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| store_err("create history directory", e))?;
            }
        }
        Ok(())
    }
}

fn store_err(action: &str, err: impl std::fmt::Display) -> MoodscanError {
    MoodscanError::record_store(format!("failed to {action}: {err}"))
}

#[async_trait]
impl RecordStore for JsonlRecordStore {
    async fn insert(&self, record: AnalysisRecord) -> MoodscanResult<()> {
        let _guard = self.lock.lock().await;
        self.ensure_parent().await?;

        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| store_err("open history", e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| store_err("append record", e))?;
        file.flush().await.map_err(|e| store_err("flush history", e))?;

        tracing::debug!(id = %record.id, path = %self.path.display(), "Record saved");
        Ok(())
    }

    async fn list(&self) -> MoodscanResult<Vec<AnalysisRecord>> {
        let _guard = self.lock.lock().await;
        Ok(newest_first(self.read_all().await?))
    }

    async fn delete(&self, id: Uuid) -> MoodscanResult<bool> {
        let _guard = self.lock.lock().await;
        let records = self.read_all().await?;
        let before = records.len();
        let kept: Vec<_> = records.into_iter().filter(|r| r.id != id).collect();
        if kept.len() == before {
            return Ok(false);
        }

        let mut content = String::new();
        for record in &kept {
            let line = serde_json::to_string(record)?;
            content.push_str(&line);
            content.push('\n');
        }

        let tmp = self.path.with_extension("jsonl.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| store_err("write history", e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| store_err("replace history", e))?;

        tracing::info!(%id, "Record deleted");
        Ok(true)
    }
}

/// Record store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: StdMutex<Vec<AnalysisRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> std::sync::MutexGuard<'_, Vec<AnalysisRecord>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, record: AnalysisRecord) -> MoodscanResult<()> {
        self.records().push(record);
        Ok(())
    }

    async fn list(&self) -> MoodscanResult<Vec<AnalysisRecord>> {
        Ok(newest_first(self.records().clone()))
    }

    async fn delete(&self, id: Uuid) -> MoodscanResult<bool> {
        let mut records = self.records();
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() != before)
    }
}
