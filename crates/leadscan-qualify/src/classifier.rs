//! Intent classification and the lead gating policy.

use std::fmt::Write as _;
use std::sync::Arc;

use leadscan_core::RawContentItem;
use serde::Serialize;

use crate::error::QualifyError;
use crate::model::{complete_with_policy, CallPolicy, LanguageModel};
use crate::parse::parse_model_response;
use crate::types::{BuyingIntent, IntentAnalysis};

/// Which gating rule admitted an analysis. Variants are listed in priority
/// order: contact details lower the bar, score alone needs the highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateRule {
    ContactAndScore,
    HighIntent,
    ScoreOnly,
}

/// Apply the gating policy. `None` means the item is not lead-worthy.
#[must_use]
pub fn gate(analysis: &IntentAnalysis) -> Option<GateRule> {
    if !analysis.is_lead {
        return None;
    }
    if analysis.contact_available && analysis.lead_score >= 6 {
        Some(GateRule::ContactAndScore)
    } else if analysis.buying_intent == BuyingIntent::High && analysis.lead_score >= 7 {
        Some(GateRule::HighIntent)
    } else if analysis.lead_score >= 8 {
        Some(GateRule::ScoreOnly)
    } else {
        None
    }
}

pub struct IntentClassifier {
    model: Arc<dyn LanguageModel>,
    policy: CallPolicy,
}

impl IntentClassifier {
    #[must_use]
    pub fn new(model: Arc<dyn LanguageModel>, policy: CallPolicy) -> Self {
        Self { model, policy }
    }

    /// Classify `text` and apply [`gate`].
    ///
    /// `Ok(None)` means the model answered but the item did not qualify.
    ///
    /// # Errors
    ///
    /// Returns the model-call error once retries are exhausted.
    pub async fn classify(
        &self,
        text: &str,
        context: &RawContentItem,
    ) -> Result<Option<IntentAnalysis>, QualifyError> {
        let prompt = build_prompt(text, context);
        let reply = complete_with_policy(self.model.as_ref(), &prompt, &self.policy).await?;
        let parsed = parse_model_response(&reply);
        let analysis = IntentAnalysis::from_fields(&parsed.fields);

        if analysis.out_of_range() {
            tracing::warn!(
                lead_score = analysis.lead_score,
                confidence = analysis.confidence,
                "model returned values outside declared range; keeping as given"
            );
        }

        match gate(&analysis) {
            Some(rule) => {
                tracing::debug!(
                    rule = ?rule,
                    lead_score = analysis.lead_score,
                    strategy = ?parsed.strategy,
                    "item accepted as lead"
                );
                Ok(Some(analysis))
            }
            None => {
                tracing::debug!(
                    is_lead = analysis.is_lead,
                    lead_score = analysis.lead_score,
                    strategy = ?parsed.strategy,
                    "item rejected by gate"
                );
                Ok(None)
            }
        }
    }
}

fn build_prompt(text: &str, context: &RawContentItem) -> String {
    let mut prompt = String::from(
        "You qualify real estate leads from social media. Decide whether the author of \
         the content below is actively trying to buy, rent or sell property.\n\n",
    );
    if let Some(platform) = context.platform {
        let _ = writeln!(prompt, "Platform: {platform}");
    }
    if let Some(source) = &context.source_id {
        let _ = writeln!(prompt, "Found via: {source}");
    }
    let _ = write!(
        prompt,
        "Content: \"{text}\"\n\n\
         Prioritise high-intent authors who leave a phone number, email or WhatsApp, or who \
         state a concrete requirement (\"looking for\", \"need\", \"want to buy\") with a \
         location, budget or timeline. Casual remarks, adverts by agents and scenery posts \
         are not leads.\n\n\
         Report:\n\
         - is_lead: true or false\n\
         - property_type: 1BHK, 2BHK, 3BHK, villa, plot, commercial, ...\n\
         - location: city or sector mentioned\n\
         - budget_range: as written, e.g. 50L-70L\n\
         - timeline: urgent, within_month, flexible, ...\n\
         - contact_available: true if a phone, email or WhatsApp is visible\n\
         - contact_method: phone, email, whatsapp or dm\n\
         - buying_intent: High, Medium or Low\n\
         - lead_score: integer 1-10, 10 is strongest; favour posts with contact details\n\
         - language: English, Hindi or Both\n\
         - confidence: number between 0 and 1\n\n\
         Answer with a single JSON object in a ```json fenced block and nothing else."
    );
    prompt
}
