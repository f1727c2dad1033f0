//! Contact extraction. Always yields a [`ContactInfo`].

use std::sync::Arc;

use crate::error::QualifyError;
use crate::model::{complete_with_policy, CallPolicy, LanguageModel};
use crate::parse::parse_model_response;
use crate::types::ContactInfo;

pub struct ContactExtractor {
    model: Arc<dyn LanguageModel>,
    policy: CallPolicy,
}

impl ContactExtractor {
    #[must_use]
    pub fn new(model: Arc<dyn LanguageModel>, policy: CallPolicy) -> Self {
        Self { model, policy }
    }

    /// Extract contact details; any model failure yields an empty [`ContactInfo`].
    pub async fn extract(&self, text: &str) -> ContactInfo {
        match self.try_extract(text).await {
            Ok(contact) => contact,
            Err(e) => {
                tracing::warn!(error = %e, "contact extraction failed; continuing without contact");
                ContactInfo::default()
            }
        }
    }

    /// # Errors
    ///
    /// Returns the model-call error once retries are exhausted.
    pub async fn try_extract(&self, text: &str) -> Result<ContactInfo, QualifyError> {
        let prompt = build_prompt(text);
        let reply = complete_with_policy(self.model.as_ref(), &prompt, &self.policy).await?;
        let parsed = parse_model_response(&reply);
        Ok(ContactInfo::from_fields(&parsed.fields))
    }
}

fn build_prompt(text: &str) -> String {
    format!(
        "Extract every piece of contact information from this text:\n\n\
         \"{text}\"\n\n\
         Look for:\n\
         - name: any personal name\n\
         - phone: any format, e.g. 9876543210, +91-9876543210, 98765-43210; Indian mobiles start with 6-9\n\
         - email: anything shaped like user@domain\n\
         - whatsapp: a number mentioned together with WhatsApp\n\
         - social_handle: @username\n\
         - contact_phrase: e.g. \"call me\", \"DM me\", \"reach out\"\n\n\
         Partial details count. Use null for anything not present.\n\
         Answer with a single JSON object with exactly these six keys in a ```json fenced block."
    )
}
