//! Append-only scan history: a bounded in-memory ring mirrored to a JSONL file.

use std::collections::VecDeque;
use std::path::PathBuf;

use leadscan_core::{parse_scan_log, ScanResult};
use tokio::sync::Mutex;

pub const DEFAULT_CAPACITY: usize = 500;

pub struct ScanLog {
    path: Option<PathBuf>,
    capacity: usize,
    entries: Mutex<VecDeque<ScanResult>>,
}

impl ScanLog {
    /// History kept only in memory.
    #[must_use]
    pub fn in_memory(capacity: usize) -> Self {
        Self {
            path: None,
            capacity: capacity.max(1),
            entries: Mutex::new(VecDeque::new()),
        }
    }

    /// Open a file-backed log, seeding the ring with the tail of any existing
    /// file. An unreadable file starts an empty history.
    pub async fn open(path: impl Into<PathBuf>, capacity: usize) -> Self {
        let path = path.into();
        let capacity = capacity.max(1);
        let mut entries = VecDeque::with_capacity(capacity);

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                let results = parse_scan_log(&content);
                let skip = results.len().saturating_sub(capacity);
                entries.extend(results.into_iter().skip(skip));
                tracing::info!(
                    path = %path.display(),
                    loaded = entries.len(),
                    "scan history loaded"
                );
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read scan history");
            }
        }

        Self {
            path: Some(path),
            capacity,
            entries: Mutex::new(entries),
        }
    }

    /// Record a finished scan. File persistence failures are logged only.
    pub async fn append(&self, result: ScanResult) {
        if let Some(path) = &self.path {
            match serde_json::to_vec(&result) {
                Ok(mut line) => {
                    line.push(b'\n');
                    if let Err(e) = crate::sink::append(path, &line).await {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "failed to persist scan result"
                        );
                    }
                }
                Err(e) => tracing::warn!(error = %e, "failed to serialize scan result"),
            }
        }

        let mut entries = self.entries.lock().await;
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(result);
    }

    /// Up to `limit` most recent results, newest first.
    pub async fn history(&self, limit: usize) -> Vec<ScanResult> {
        let entries = self.entries.lock().await;
        entries.iter().rev().take(limit).cloned().collect()
    }

    pub async fn latest(&self) -> Option<ScanResult> {
        self.entries.lock().await.back().cloned()
    }
}
