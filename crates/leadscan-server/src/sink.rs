//! Lead output.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use leadscan_core::Platform;
use leadscan_qualify::Lead;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("lead file I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("lead serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Receives each source's leads at the end of its pipeline run.
#[async_trait]
pub trait LeadSink: Send + Sync {
    async fn write(&self, platform: Platform, leads: &[Lead]) -> Result<(), SinkError>;
}

/// Appends one JSON object per lead to a file.
pub struct JsonlLeadSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlLeadSink {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn io_error(&self, source: std::io::Error) -> SinkError {
        SinkError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl LeadSink for JsonlLeadSink {
    async fn write(&self, platform: Platform, leads: &[Lead]) -> Result<(), SinkError> {
        if leads.is_empty() {
            return Ok(());
        }

        let mut buf = Vec::new();
        for lead in leads {
            serde_json::to_writer(&mut buf, lead)?;
            buf.push(b'\n');
        }

        let _guard = self.write_lock.lock().await;
        append(&self.path, &buf).await.map_err(|e| self.io_error(e))?;
        tracing::info!(
            %platform,
            count = leads.len(),
            path = %self.path.display(),
            "leads written"
        );
        Ok(())
    }
}

/// Append `bytes` to `path`, creating the file and its parent directory.
pub(crate) async fn append(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(bytes).await?;
    file.flush().await
}
