//! HTTP client for the content collector service.
//!
//! The collector owns crawling (hashtag pages, group feeds, comment threads)
//! and exposes one endpoint per platform:
//!
//! `POST {base}/v1/collect/{platform}` with `{"targets": [...], "max_items_per_target": n}`
//! returning `{"items": [ { "kind": "...", ... } ]}`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use leadscan_core::Platform;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::item::PlatformItem;
use crate::source::ContentSource;

const USER_AGENT: &str = "leadscan/0.1 (lead-qualification)";

#[derive(Debug, Clone)]
pub struct CollectorSourceConfig {
    pub base_url: String,
    pub max_items_per_target: usize,
    pub timeout_secs: u64,
}

/// [`ContentSource`] backed by the collector for a single platform.
pub struct CollectorSource {
    client: Client,
    endpoint: Url,
    platform: Platform,
    max_items_per_target: usize,
}

#[derive(Serialize)]
struct CollectRequest<'a> {
    targets: &'a [String],
    max_items_per_target: usize,
}

#[derive(Deserialize)]
struct CollectResponse {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

impl CollectorSource {
    /// Creates a source for `platform` against the collector at `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidUrl`] if the base URL does not parse, or
    /// [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &CollectorSourceConfig, platform: Platform) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()?;

        let raw = format!(
            "{}/v1/collect/{}",
            config.base_url.trim_end_matches('/'),
            platform.as_str()
        );
        let endpoint = Url::parse(&raw).map_err(|e| SourceError::InvalidUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            endpoint,
            platform,
            max_items_per_target: config.max_items_per_target,
        })
    }

    /// One source per scanned platform, in scan order.
    ///
    /// # Errors
    ///
    /// Propagates the first construction error from [`CollectorSource::new`].
    pub fn for_scan_platforms(
        config: &CollectorSourceConfig,
    ) -> Result<Vec<Arc<dyn ContentSource>>, SourceError> {
        Platform::SCAN_ORDER
            .iter()
            .map(|p| Self::new(config, *p).map(|s| Arc::new(s) as Arc<dyn ContentSource>))
            .collect()
    }

    fn decode_items(&self, values: Vec<serde_json::Value>) -> Vec<PlatformItem> {
        let mut items = Vec::with_capacity(values.len());
        for value in values {
            match serde_json::from_value::<PlatformItem>(value) {
                Ok(item) if item.platform() == self.platform => items.push(item),
                Ok(item) => {
                    tracing::warn!(
                        platform = %self.platform,
                        got = %item.platform(),
                        "collector returned item for another platform; dropping"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        platform = %self.platform,
                        error = %e,
                        "skipping malformed collector item"
                    );
                }
            }
        }
        items
    }
}

#[async_trait]
impl ContentSource for CollectorSource {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn fetch(&self, targets: &[String]) -> Result<Vec<PlatformItem>, SourceError> {
        let request = CollectRequest {
            targets,
            max_items_per_target: self.max_items_per_target,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let envelope: CollectResponse =
            serde_json::from_slice(&bytes).map_err(|e| SourceError::Deserialize {
                context: format!("collect({})", self.platform),
                source: e,
            })?;

        let received = envelope.items.len();
        let items = self.decode_items(envelope.items);
        tracing::debug!(
            platform = %self.platform,
            targets = targets.len(),
            received,
            kept = items.len(),
            "collector fetch complete"
        );
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base: &str) -> CollectorSourceConfig {
        CollectorSourceConfig {
            base_url: base.to_string(),
            max_items_per_target: 10,
            timeout_secs: 5,
        }
    }

    #[test]
    fn endpoint_includes_platform_segment() {
        let source =
            CollectorSource::new(&config("http://collector:8080/"), Platform::YouTube).expect("new");
        assert_eq!(
            source.endpoint.as_str(),
            "http://collector:8080/v1/collect/youtube"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = CollectorSource::new(&config("not a url"), Platform::Instagram);
        assert!(matches!(result, Err(SourceError::InvalidUrl { .. })));
    }

    #[test]
    fn for_scan_platforms_builds_in_scan_order() {
        let sources = CollectorSource::for_scan_platforms(&config("http://c")).expect("build");
        let platforms: Vec<Platform> = sources.iter().map(|s| s.platform()).collect();
        assert_eq!(platforms, Platform::SCAN_ORDER.to_vec());
    }
}
