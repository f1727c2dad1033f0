//! normalize → length filter → classify → extract → assemble.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use leadscan_core::RawContentItem;
use leadscan_sources::PlatformItem;
use serde::Serialize;

use crate::assembler::assemble;
use crate::assessor::LeadAssessor;
use crate::classifier::IntentClassifier;
use crate::error::QualifyError;
use crate::extractor::ContactExtractor;
use crate::model::{CallPolicy, LanguageModel};
use crate::normalize::normalize;
use crate::types::Lead;

/// Per-batch counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QualifyStats {
    pub received: usize,
    pub too_short: usize,
    /// Items the classifier answered for, accepted or not.
    pub analyzed: usize,
    pub rejected: usize,
    pub failed: usize,
    pub duplicates: usize,
}

#[derive(Debug, Clone, Default)]
pub struct QualifyReport {
    pub leads: Vec<Lead>,
    pub stats: QualifyStats,
}

pub struct LeadQualifier {
    classifier: IntentClassifier,
    extractor: ContactExtractor,
    assessor: LeadAssessor,
    min_text_chars: usize,
}

impl LeadQualifier {
    #[must_use]
    pub fn new(model: Arc<dyn LanguageModel>, policy: CallPolicy, min_text_chars: usize) -> Self {
        Self {
            classifier: IntentClassifier::new(Arc::clone(&model), policy),
            extractor: ContactExtractor::new(Arc::clone(&model), policy),
            assessor: LeadAssessor::new(model, policy),
            min_text_chars,
        }
    }

    /// Items whose stripped text is shorter than this never reach the model.
    #[must_use]
    pub fn min_text_chars(&self) -> usize {
        self.min_text_chars
    }

    /// Optional quality review of an assembled lead. Failures return the
    /// lead unchanged.
    pub async fn assess(&self, lead: Lead) -> Lead {
        self.assessor.assess(lead).await
    }

    /// Qualify one batch. Items are processed in order; a failed model call
    /// skips that item only.
    pub async fn qualify(&self, items: &[PlatformItem], extracted_at: DateTime<Utc>) -> QualifyReport {
        let mut report = QualifyReport::default();
        let mut seen = HashSet::new();
        report.stats.received = items.len();

        for item in items {
            let raw = normalize(item);
            if raw.stripped_len() < self.min_text_chars {
                report.stats.too_short += 1;
                continue;
            }

            match self.qualify_item(&raw, extracted_at).await {
                Ok(Some(lead)) => {
                    report.stats.analyzed += 1;
                    if seen.insert(lead.lead_id.clone()) {
                        report.leads.push(lead);
                    } else {
                        report.stats.duplicates += 1;
                    }
                }
                Ok(None) => {
                    report.stats.analyzed += 1;
                    report.stats.rejected += 1;
                }
                Err(e) => {
                    report.stats.failed += 1;
                    tracing::warn!(
                        platform = ?raw.platform,
                        url = raw.url.as_deref().unwrap_or_default(),
                        error = %e,
                        "classification failed; skipping item"
                    );
                }
            }
        }

        tracing::info!(
            received = report.stats.received,
            too_short = report.stats.too_short,
            analyzed = report.stats.analyzed,
            rejected = report.stats.rejected,
            failed = report.stats.failed,
            leads = report.leads.len(),
            "batch qualified"
        );
        report
    }

    /// Classify, extract and assemble one already-normalized item.
    ///
    /// The length filter is not applied here.
    ///
    /// # Errors
    ///
    /// Returns the classifier's model-call error. Extraction failures are
    /// absorbed into an empty contact.
    pub async fn qualify_item(
        &self,
        item: &RawContentItem,
        extracted_at: DateTime<Utc>,
    ) -> Result<Option<Lead>, QualifyError> {
        let text = item.text.trim();
        let Some(analysis) = self.classifier.classify(text, item).await? else {
            return Ok(None);
        };
        let contact = self.extractor.extract(text).await;
        Ok(Some(assemble(text, item, &analysis, &contact, extracted_at)))
    }
}
