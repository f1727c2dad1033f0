//! Read-only view over the scan log file.

use std::path::Path;

use leadscan_core::{parse_scan_log, ScanResult};

/// The last `limit` scans in `content`, newest first.
pub(crate) fn recent_scans(content: &str, limit: usize) -> Vec<ScanResult> {
    let mut scans = parse_scan_log(content);
    let skip = scans.len().saturating_sub(limit);
    scans.drain(..skip);
    scans.reverse();
    scans
}

fn source_summary(scan: &ScanResult) -> String {
    scan.per_source
        .iter()
        .map(|(platform, report)| match (report.success, report.lead_count) {
            (true, Some(n)) => format!("{platform}={n}"),
            _ => format!("{platform}=failed"),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) async fn run_history(path: &Path, limit: usize) -> anyhow::Result<()> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            println!("no scans recorded at {}", path.display());
            return Ok(());
        }
        Err(e) => return Err(anyhow::anyhow!("failed to read {}: {e}", path.display())),
    };

    let scans = recent_scans(&content, limit);
    if scans.is_empty() {
        println!("no scans recorded at {}", path.display());
        return Ok(());
    }

    println!("{:<18}{:<11}{:<7}SOURCES", "FINISHED", "TRIGGER", "LEADS");
    for scan in &scans {
        let finished = scan.finished_at.format("%Y-%m-%d %H:%M").to_string();
        let trigger = serde_json::to_value(scan.trigger)?
            .as_str()
            .unwrap_or_default()
            .to_owned();
        println!(
            "{:<18}{:<11}{:<7}{}",
            finished,
            trigger,
            scan.total_leads,
            source_summary(scan)
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{Duration, Utc};
    use leadscan_core::{Platform, ScanTrigger, SourceReport};
    use uuid::Uuid;

    use super::*;

    fn scan(minutes: i64, total: usize) -> ScanResult {
        let at = Utc::now() + Duration::minutes(minutes);
        let mut per_source = BTreeMap::new();
        per_source.insert(Platform::Instagram, SourceReport::succeeded(total, 10, 10, 0));
        per_source.insert(Platform::Facebook, SourceReport::failed("collector down"));
        ScanResult {
            id: Uuid::new_v4(),
            trigger: ScanTrigger::Scheduled,
            started_at: at,
            finished_at: at,
            per_source,
            total_leads: total,
        }
    }

    fn log(scans: &[ScanResult]) -> String {
        scans
            .iter()
            .map(|s| serde_json::to_string(s).expect("serialize"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn returns_tail_newest_first() {
        let content = log(&[scan(1, 1), scan(2, 2), scan(3, 3)]);
        let totals: Vec<usize> = recent_scans(&content, 2)
            .iter()
            .map(|s| s.total_leads)
            .collect();
        assert_eq!(totals, [3, 2]);
    }

    #[test]
    fn limit_larger_than_log_returns_everything() {
        let content = log(&[scan(1, 1), scan(2, 2)]);
        assert_eq!(recent_scans(&content, 50).len(), 2);
    }

    #[test]
    fn summary_marks_failed_sources() {
        assert_eq!(source_summary(&scan(1, 4)), "instagram=4 facebook=failed");
    }

    #[tokio::test]
    async fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        run_history(&dir.path().join("absent.jsonl"), 5)
            .await
            .expect("missing log is fine");
    }
}
