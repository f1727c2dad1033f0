//! One scan tick across all configured sources.

use std::collections::BTreeMap;
use std::time::Duration;

use leadscan_core::{Platform, ScanResult, ScanTargets, ScanTrigger, SourceReport};
use leadscan_sources::{ContentSource, SourceError};
use thiserror::Error;
use uuid::Uuid;

use super::ScanDeps;
use crate::sink::SinkError;

#[derive(Debug, Error)]
enum SourceScanError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] SourceError),

    #[error("lead sink failed: {0}")]
    Sink(#[from] SinkError),

    #[error("source fetch timed out after {0:?}")]
    Timeout(Duration),
}

/// Run every platform with targets, in scan order. A failing source is
/// recorded in its report and never stops the others.
pub(super) async fn run_scan(
    deps: &ScanDeps,
    targets: &ScanTargets,
    trigger: ScanTrigger,
) -> ScanResult {
    let started_at = deps.clock.now();
    let id = Uuid::new_v4();
    tracing::info!(scan_id = %id, ?trigger, "scheduler: scan started");

    let mut per_source = BTreeMap::new();
    for platform in Platform::SCAN_ORDER {
        let platform_targets = targets.for_platform(platform);
        if platform_targets.is_empty() {
            tracing::debug!(%platform, "scheduler: no targets configured; skipping");
            continue;
        }

        let Some(source) = deps.sources.iter().find(|s| s.platform() == platform) else {
            tracing::warn!(
                %platform,
                "scheduler: targets configured but no source registered"
            );
            per_source.insert(platform, SourceReport::failed("no source registered"));
            continue;
        };

        let report = match scan_source(deps, source.as_ref(), platform_targets).await {
            Ok(report) => {
                tracing::info!(
                    %platform,
                    leads = report.lead_count.unwrap_or_default(),
                    fetched = report.items_fetched,
                    "scheduler: source scan complete"
                );
                report
            }
            Err(e) => {
                tracing::error!(%platform, error = %e, "scheduler: source scan failed");
                SourceReport::failed(e.to_string())
            }
        };
        per_source.insert(platform, report);
    }

    let total_leads = ScanResult::sum_leads(&per_source);
    let result = ScanResult {
        id,
        trigger,
        started_at,
        finished_at: deps.clock.now(),
        per_source,
        total_leads,
    };
    tracing::info!(scan_id = %id, total_leads, "scheduler: scan finished");
    deps.scan_log.append(result.clone()).await;
    result
}

/// Only the fetch is bounded by `source_timeout`. Qualification relies on
/// the per-call model timeout, and the sink write always runs to completion
/// once leads exist.
async fn scan_source(
    deps: &ScanDeps,
    source: &dyn ContentSource,
    targets: &[String],
) -> Result<SourceReport, SourceScanError> {
    let platform = source.platform();
    let items = tokio::time::timeout(deps.source_timeout, source.fetch(targets))
        .await
        .map_err(|_| SourceScanError::Timeout(deps.source_timeout))??;

    let report = deps.qualifier.qualify(&items, deps.clock.now()).await;
    deps.sink.write(platform, &report.leads).await?;
    Ok(SourceReport::succeeded(
        report.leads.len(),
        items.len(),
        report.stats.analyzed,
        report.stats.failed,
    ))
}
