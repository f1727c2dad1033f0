//! Scan log records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Platform;

/// What caused a scan tick to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanTrigger {
    /// The immediate scan performed when the scheduler starts.
    Initial,
    Scheduled,
    Manual,
}

/// Outcome of one source within one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReport {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub items_fetched: usize,
    #[serde(default)]
    pub items_analyzed: usize,
    #[serde(default)]
    pub items_failed: usize,
}

impl SourceReport {
    #[must_use]
    pub fn succeeded(
        lead_count: usize,
        items_fetched: usize,
        items_analyzed: usize,
        items_failed: usize,
    ) -> Self {
        Self {
            success: true,
            lead_count: Some(lead_count),
            error: None,
            items_fetched,
            items_analyzed,
            items_failed,
        }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            lead_count: None,
            error: Some(error.into()),
            items_fetched: 0,
            items_analyzed: 0,
            items_failed: 0,
        }
    }
}

/// One append-only scan log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub id: Uuid,
    pub trigger: ScanTrigger,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Keyed by platform; iteration order is scan order.
    pub per_source: BTreeMap<Platform, SourceReport>,
    pub total_leads: usize,
}

impl ScanResult {
    /// Sum of lead counts over the sources that succeeded.
    #[must_use]
    pub fn sum_leads(per_source: &BTreeMap<Platform, SourceReport>) -> usize {
        per_source.values().filter_map(|r| r.lead_count).sum()
    }
}

/// Parse a JSON-lines scan log, skipping lines that do not decode.
#[must_use]
pub fn parse_scan_log(content: &str) -> Vec<ScanResult> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str::<ScanResult>(line).ok())
        .collect()
}
