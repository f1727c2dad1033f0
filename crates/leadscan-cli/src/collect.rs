//! Single-platform collection through the collector service.

use chrono::{DateTime, Utc};
use leadscan_core::{AppConfig, Platform};
use leadscan_qualify::{LeadQualifier, QualifyReport};
use leadscan_sources::{CollectorSource, CollectorSourceConfig, ContentSource};

pub(crate) async fn collect_leads(
    source: &dyn ContentSource,
    qualifier: &LeadQualifier,
    targets: &[String],
    assess: bool,
    now: DateTime<Utc>,
) -> anyhow::Result<QualifyReport> {
    let items = source.fetch(targets).await?;
    tracing::info!(platform = %source.platform(), fetched = items.len(), "collect: items fetched");
    let mut report = qualifier.qualify(&items, now).await;
    if assess {
        let mut assessed = Vec::with_capacity(report.leads.len());
        for lead in report.leads {
            assessed.push(qualifier.assess(lead).await);
        }
        report.leads = assessed;
    }
    Ok(report)
}

/// Fetch `targets` for `platform` and print the qualified leads as JSON.
///
/// # Errors
///
/// Returns an error if no collector is configured, the platform cannot be
/// scanned, or the fetch fails.
pub(crate) async fn run_collect(
    config: &AppConfig,
    qualifier: &LeadQualifier,
    platform: Platform,
    targets: &[String],
    assess: bool,
) -> anyhow::Result<()> {
    if !Platform::SCAN_ORDER.contains(&platform) {
        anyhow::bail!("platform '{platform}' cannot be collected");
    }
    let base_url = config
        .collector_url
        .clone()
        .ok_or_else(|| anyhow::anyhow!("LEADSCAN_COLLECTOR_URL is not set"))?;
    let source = CollectorSource::new(
        &CollectorSourceConfig {
            base_url,
            max_items_per_target: config.max_items_per_target,
            timeout_secs: config.source_timeout_secs,
        },
        platform,
    )?;

    let report = collect_leads(&source, qualifier, targets, assess, Utc::now()).await?;
    let stats = report.stats;
    eprintln!(
        "received {} | too short {} | analyzed {} | rejected {} | failed {} | leads {}",
        stats.received,
        stats.too_short,
        stats.analyzed,
        stats.rejected,
        stats.failed,
        report.leads.len()
    );
    println!("{}", serde_json::to_string_pretty(&report.leads)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use leadscan_qualify::CallPolicy;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::tests::{fixed_now, KeywordModel};

    #[tokio::test]
    async fn collected_items_run_through_the_pipeline() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/collect/youtube"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    {
                        "kind": "youtube_comment",
                        "cid": "Ugx1",
                        "text": "Need 3BHK near Sohna road, WhatsApp me 9876543211",
                        "author": "Amit",
                        "video_id": "dQw4w9WgXcQ"
                    },
                    { "kind": "youtube_comment", "cid": "Ugx2", "text": "great video" },
                    { "kind": "youtube_comment", "cid": "Ugx3", "text": "wow" }
                ]
            })))
            .mount(&server)
            .await;

        let source = CollectorSource::new(
            &CollectorSourceConfig {
                base_url: server.uri(),
                max_items_per_target: 5,
                timeout_secs: 5,
            },
            Platform::YouTube,
        )
        .expect("source");
        let policy = CallPolicy {
            max_retries: 0,
            backoff_base_ms: 0,
            ..CallPolicy::default()
        };
        let model = KeywordModel::new();
        let qualifier = LeadQualifier::new(model.clone(), policy, 10);

        let report = collect_leads(
            &source,
            &qualifier,
            &["dQw4w9WgXcQ".to_owned()],
            true,
            fixed_now(),
        )
        .await
        .expect("collect");

        assert_eq!(report.stats.received, 3);
        assert_eq!(report.stats.too_short, 1);
        assert_eq!(report.stats.rejected, 1);
        assert_eq!(report.leads.len(), 1);
        let lead = &report.leads[0];
        assert_eq!(lead.source, Platform::YouTube);
        assert!(lead.post_url.contains("dQw4w9WgXcQ"), "{}", lead.post_url);
        assert_eq!(lead.assessment.as_ref().map(|a| a.quality_score), Some(8));
        // classify twice, extract once, assess once
        assert_eq!(model.calls(), 4);
    }

    #[tokio::test]
    async fn collector_failure_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let source = CollectorSource::new(
            &CollectorSourceConfig {
                base_url: server.uri(),
                max_items_per_target: 5,
                timeout_secs: 5,
            },
            Platform::Instagram,
        )
        .expect("source");
        let qualifier = LeadQualifier::new(KeywordModel::new(), CallPolicy::default(), 10);

        let result =
            collect_leads(&source, &qualifier, &["noidaflats".to_owned()], false, fixed_now()).await;
        assert!(result.is_err());
    }
}
