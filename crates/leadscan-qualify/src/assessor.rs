//! Optional quality review of an assembled lead.

use std::sync::Arc;

use crate::error::QualifyError;
use crate::model::{complete_with_policy, CallPolicy, LanguageModel};
use crate::parse::{parse_model_response, ParseStrategy};
use crate::types::{Lead, LeadAssessment};

pub struct LeadAssessor {
    model: Arc<dyn LanguageModel>,
    policy: CallPolicy,
}

impl LeadAssessor {
    #[must_use]
    pub fn new(model: Arc<dyn LanguageModel>, policy: CallPolicy) -> Self {
        Self { model, policy }
    }

    /// Attach an assessment. On any failure the lead comes back unchanged.
    pub async fn assess(&self, lead: Lead) -> Lead {
        match self.try_assess(&lead).await {
            Ok(assessment) => Lead {
                assessment: Some(assessment),
                ..lead
            },
            Err(e) => {
                tracing::warn!(
                    lead_id = %lead.lead_id,
                    error = %e,
                    "lead assessment failed; keeping lead as assembled"
                );
                lead
            }
        }
    }

    /// # Errors
    ///
    /// Returns the model-call error once retries are exhausted, or
    /// [`QualifyError::Unparseable`] when the reply holds no JSON object.
    pub async fn try_assess(&self, lead: &Lead) -> Result<LeadAssessment, QualifyError> {
        let prompt = build_prompt(lead)?;
        let reply = complete_with_policy(self.model.as_ref(), &prompt, &self.policy).await?;
        let parsed = parse_model_response(&reply);
        if parsed.strategy == ParseStrategy::Fallback {
            return Err(QualifyError::Unparseable("lead assessment"));
        }
        Ok(LeadAssessment::from_fields(&parsed.fields))
    }
}

fn build_prompt(lead: &Lead) -> Result<String, QualifyError> {
    let lead_json = serde_json::to_string_pretty(&Lead {
        assessment: None,
        ..lead.clone()
    })
    .map_err(|source| QualifyError::Deserialize {
        context: "lead assessment prompt".to_owned(),
        source,
    })?;
    Ok(format!(
        "Analyze this lead data for quality and priority:\n\n\
         Lead Data: {lead_json}\n\n\
         Provide:\n\
         - quality_score: 1-10\n\
         - priority: High, Medium or Low\n\
         - recommended_action: what to do next\n\
         - risk_factors: list of concerns\n\
         - opportunity_assessment: potential value\n\
         - follow_up_suggestion: how to approach this lead\n\n\
         Answer with a single JSON object with exactly these keys in a ```json fenced block."
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use leadscan_core::Platform;

    use super::*;
    use crate::types::{BuyingIntent, LeadAction, LeadPriority, LeadStatus};

    struct Scripted {
        reply: Result<&'static str, u16>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn ok(reply: &'static str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(status),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LanguageModel for Scripted {
        async fn complete(&self, prompt: &str) -> Result<String, QualifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(prompt.starts_with("Analyze this lead data"));
            match self.reply {
                Ok(text) => Ok(text.to_owned()),
                Err(status) => Err(QualifyError::Api {
                    status,
                    body: "rejected".to_owned(),
                }),
            }
        }

        fn model_id(&self) -> &str {
            "scripted"
        }
    }

    fn lead() -> Lead {
        Lead {
            lead_id: "facebook_abc".to_owned(),
            source: Platform::Facebook,
            name: Some("Rahul".to_owned()),
            phone: Some("9876543210".to_owned()),
            email: None,
            whatsapp: None,
            social_handle: None,
            contact_phrase: None,
            requirement: "3BHK".to_owned(),
            location: "Sector 65".to_owned(),
            budget: "1.2Cr".to_owned(),
            timeline: "urgent".to_owned(),
            contact_method: "phone".to_owned(),
            buying_intent: BuyingIntent::High,
            lead_score: 8,
            language: "English".to_owned(),
            confidence: 0.9,
            original_content: "Need 3BHK in Sector 65, call 9876543210".to_owned(),
            post_url: "https://www.facebook.com/groups/g/posts/abc/".to_owned(),
            social_media_url: None,
            username: Some("Rahul".to_owned()),
            author_url: None,
            status: LeadStatus::New,
            action: LeadAction::Contact,
            extracted_at: Utc.with_ymd_and_hms(2025, 1, 8, 10, 0, 0).unwrap(),
            assessment: None,
        }
    }

    fn policy() -> CallPolicy {
        CallPolicy::new(5, 0, 1)
    }

    #[tokio::test]
    async fn fenced_reply_is_attached() {
        let model = Scripted::ok(
            "```json\n{\"quality_score\": 9, \"priority\": \"High\", \
             \"recommended_action\": \"Call within the hour\", \
             \"risk_factors\": [\"budget may stretch\"], \
             \"opportunity_assessment\": \"Ready buyer\", \
             \"follow_up_suggestion\": \"Send two listings\"}\n```",
        );
        let assessed = LeadAssessor::new(model.clone(), policy()).assess(lead()).await;

        let assessment = assessed.assessment.clone().expect("assessment attached");
        assert_eq!(assessment.quality_score, 9);
        assert_eq!(assessment.priority, LeadPriority::High);
        assert_eq!(assessment.risk_factors, vec!["budget may stretch".to_owned()]);
        assert_eq!(assessment.follow_up_suggestion, "Send two listings");
        assert_eq!(Lead { assessment: None, ..assessed }, lead());
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn model_failure_keeps_the_lead_unchanged() {
        let assessor = LeadAssessor::new(Scripted::failing(400), policy());
        assert_eq!(assessor.assess(lead()).await, lead());
    }

    #[tokio::test]
    async fn prose_reply_keeps_the_lead_unchanged() {
        let assessor = LeadAssessor::new(Scripted::ok("Looks like a decent lead to me."), policy());
        let err = assessor.try_assess(&lead()).await.unwrap_err();
        assert!(matches!(err, QualifyError::Unparseable(_)));
        assert_eq!(assessor.assess(lead()).await, lead());
    }

    #[test]
    fn prompt_embeds_lead_json() {
        let prompt = build_prompt(&lead()).unwrap();
        assert!(prompt.contains("\"lead_id\": \"facebook_abc\""));
        assert!(!prompt.contains("\"assessment\""));
    }
}
