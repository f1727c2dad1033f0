//! Classification, contact and lead records.

use chrono::{DateTime, Utc};
use leadscan_core::Platform;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Qualitative buying-signal strength assigned by the classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuyingIntent {
    High,
    Medium,
    #[default]
    Low,
}

impl BuyingIntent {
    /// Case-insensitive; anything unrecognised is `Low`.
    #[must_use]
    pub fn from_label(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => BuyingIntent::High,
            "medium" | "med" => BuyingIntent::Medium,
            _ => BuyingIntent::Low,
        }
    }
}

/// Classifier output for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentAnalysis {
    pub is_lead: bool,
    pub property_type: String,
    pub location: String,
    pub budget_range: String,
    pub timeline: String,
    pub contact_available: bool,
    pub contact_method: String,
    pub buying_intent: BuyingIntent,
    /// Declared range is 0..=10 but the model's value is kept as given.
    pub lead_score: i64,
    pub language: String,
    /// Declared range is 0.0..=1.0 but the model's value is kept as given.
    pub confidence: f64,
}

impl Default for IntentAnalysis {
    fn default() -> Self {
        Self {
            is_lead: false,
            property_type: String::new(),
            location: String::new(),
            budget_range: String::new(),
            timeline: String::new(),
            contact_available: false,
            contact_method: String::new(),
            buying_intent: BuyingIntent::Low,
            lead_score: 0,
            language: String::new(),
            confidence: 0.5,
        }
    }
}

impl IntentAnalysis {
    /// Coerce a parsed model reply. Missing or unreadable fields take the
    /// [`Default`] values.
    #[must_use]
    pub fn from_fields(fields: &Map<String, Value>) -> Self {
        let defaults = Self::default();
        Self {
            is_lead: fields.get("is_lead").map_or(defaults.is_lead, coerce_bool),
            property_type: text_field(fields, "property_type"),
            location: text_field(fields, "location"),
            budget_range: text_field(fields, "budget_range"),
            timeline: text_field(fields, "timeline"),
            contact_available: fields
                .get("contact_available")
                .map_or(defaults.contact_available, coerce_bool),
            contact_method: text_field(fields, "contact_method"),
            buying_intent: fields
                .get("buying_intent")
                .and_then(Value::as_str)
                .map_or(defaults.buying_intent, BuyingIntent::from_label),
            lead_score: fields
                .get("lead_score")
                .and_then(coerce_int)
                .unwrap_or(defaults.lead_score),
            language: text_field(fields, "language"),
            confidence: fields
                .get("confidence")
                .and_then(coerce_float)
                .unwrap_or(defaults.confidence),
        }
    }

    /// `true` when the score or confidence falls outside its declared range.
    #[must_use]
    pub fn out_of_range(&self) -> bool {
        !(0..=10).contains(&self.lead_score) || !(0.0..=1.0).contains(&self.confidence)
    }
}

/// Contact details pulled from free text. `None` means absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub whatsapp: Option<String>,
    pub social_handle: Option<String>,
    pub contact_phrase: Option<String>,
}

impl ContactInfo {
    /// Read the six contact keys, treating null-like strings as absent.
    #[must_use]
    pub fn from_fields(fields: &Map<String, Value>) -> Self {
        let get = |key: &str| fields.get(key).and_then(contact_value);
        Self {
            name: get("name"),
            phone: get("phone"),
            email: get("email"),
            whatsapp: get("whatsapp"),
            social_handle: get("social_handle"),
            contact_phrase: get("contact_phrase"),
        }
    }

    /// Phone, email or WhatsApp present.
    #[must_use]
    pub fn has_direct_channel(&self) -> bool {
        [&self.phone, &self.email, &self.whatsapp]
            .iter()
            .any(|v| v.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
    #[default]
    New,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadAction {
    Contact,
    FollowUp,
}

impl LeadAction {
    #[must_use]
    pub fn for_contact(contact: &ContactInfo) -> Self {
        if contact.has_direct_channel() {
            LeadAction::Contact
        } else {
            LeadAction::FollowUp
        }
    }
}

/// Canonical output record handed to the sink. Only the optional quality
/// review adds to it after assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub lead_id: String,
    pub source: Platform,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub whatsapp: Option<String>,
    pub social_handle: Option<String>,
    pub contact_phrase: Option<String>,
    pub requirement: String,
    pub location: String,
    pub budget: String,
    pub timeline: String,
    pub contact_method: String,
    pub buying_intent: BuyingIntent,
    pub lead_score: i64,
    pub language: String,
    pub confidence: f64,
    pub original_content: String,
    pub post_url: String,
    pub social_media_url: Option<String>,
    pub username: Option<String>,
    pub author_url: Option<String>,
    pub status: LeadStatus,
    pub action: LeadAction,
    pub extracted_at: DateTime<Utc>,
    /// Set only when the optional quality review ran and succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment: Option<LeadAssessment>,
}

/// Follow-up urgency from the quality review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeadPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl LeadPriority {
    /// Case-insensitive; anything unrecognised is `Medium`.
    #[must_use]
    pub fn from_label(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => LeadPriority::High,
            "low" => LeadPriority::Low,
            _ => LeadPriority::Medium,
        }
    }
}

/// Sales-side review of an assembled lead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadAssessment {
    /// 1 to 10; out-of-range replies are clamped.
    pub quality_score: i64,
    pub priority: LeadPriority,
    pub recommended_action: String,
    pub risk_factors: Vec<String>,
    pub opportunity_assessment: String,
    pub follow_up_suggestion: String,
}

impl LeadAssessment {
    #[must_use]
    pub fn from_fields(fields: &Map<String, Value>) -> Self {
        let risk_factors = match fields.get("risk_factors") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::trim))
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
            Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_owned()],
            _ => Vec::new(),
        };
        Self {
            quality_score: fields
                .get("quality_score")
                .and_then(coerce_int)
                .map_or(5, |n| n.clamp(1, 10)),
            priority: fields
                .get("priority")
                .and_then(Value::as_str)
                .map_or_else(LeadPriority::default, LeadPriority::from_label),
            recommended_action: text_field(fields, "recommended_action"),
            risk_factors,
            opportunity_assessment: text_field(fields, "opportunity_assessment"),
            follow_up_suggestion: text_field(fields, "follow_up_suggestion"),
        }
    }
}

const NULL_LIKE: [&str; 5] = ["", "null", "none", "n/a", "unknown"];

fn contact_value(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_owned(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if NULL_LIKE.contains(&text.to_ascii_lowercase().as_str()) {
        None
    } else {
        Some(text)
    }
}

fn text_field(fields: &Map<String, Value>, key: &str) -> String {
    match fields.get(key) {
        Some(Value::String(s)) => s.trim().to_owned(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "yes"),
        _ => false,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    }
}

fn coerce_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn missing_fields_take_defaults() {
        let analysis = IntentAnalysis::from_fields(&Map::new());
        assert!(!analysis.is_lead);
        assert_eq!(analysis.buying_intent, BuyingIntent::Low);
        assert_eq!(analysis.lead_score, 0);
        assert!((analysis.confidence - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn loose_types_are_coerced() {
        let analysis = IntentAnalysis::from_fields(&fields(json!({
            "is_lead": "Yes",
            "contact_available": "true",
            "lead_score": "7.9",
            "buying_intent": "HIGH",
            "confidence": "0.8",
            "location": "  Gurgaon "
        })));
        assert!(analysis.is_lead);
        assert!(analysis.contact_available);
        assert_eq!(analysis.lead_score, 7);
        assert_eq!(analysis.buying_intent, BuyingIntent::High);
        assert!((analysis.confidence - 0.8).abs() < f64::EPSILON);
        assert_eq!(analysis.location, "Gurgaon");
    }

    #[test]
    fn float_scores_truncate() {
        let analysis = IntentAnalysis::from_fields(&fields(json!({"lead_score": 8.7})));
        assert_eq!(analysis.lead_score, 8);
    }

    #[test]
    fn out_of_range_values_pass_through() {
        let analysis =
            IntentAnalysis::from_fields(&fields(json!({"lead_score": 15, "confidence": 1.4})));
        assert_eq!(analysis.lead_score, 15);
        assert!(analysis.out_of_range());
        assert!(!IntentAnalysis::default().out_of_range());
    }

    #[test]
    fn assessment_is_coerced_and_clamped() {
        let assessment = LeadAssessment::from_fields(&fields(json!({
            "quality_score": "14",
            "priority": "HIGH",
            "recommended_action": " Call today ",
            "risk_factors": ["budget unclear", "", 3],
            "follow_up_suggestion": "Share 3BHK listings"
        })));
        assert_eq!(assessment.quality_score, 10);
        assert_eq!(assessment.priority, LeadPriority::High);
        assert_eq!(assessment.recommended_action, "Call today");
        assert_eq!(assessment.risk_factors, vec!["budget unclear".to_owned()]);
        assert_eq!(assessment.opportunity_assessment, "");

        let sparse = LeadAssessment::from_fields(&fields(json!({"risk_factors": "no phone"})));
        assert_eq!(sparse.quality_score, 5);
        assert_eq!(sparse.priority, LeadPriority::Medium);
        assert_eq!(sparse.risk_factors, vec!["no phone".to_owned()]);
    }

    #[test]
    fn null_like_contact_values_are_absent() {
        let contact = ContactInfo::from_fields(&fields(json!({
            "name": "Unknown",
            "phone": "null",
            "email": "N/A",
            "whatsapp": 9876543211_u64,
            "social_handle": null,
            "contact_phrase": "  "
        })));
        assert_eq!(contact.name, None);
        assert_eq!(contact.phone, None);
        assert_eq!(contact.email, None);
        assert_eq!(contact.whatsapp.as_deref(), Some("9876543211"));
        assert_eq!(contact.social_handle, None);
        assert_eq!(contact.contact_phrase, None);
    }

    #[test]
    fn action_requires_a_direct_channel() {
        let empty = ContactInfo {
            phone: Some(String::new()),
            email: Some(String::new()),
            whatsapp: Some(String::new()),
            social_handle: Some("@buyer".to_owned()),
            ..ContactInfo::default()
        };
        assert_eq!(LeadAction::for_contact(&empty), LeadAction::FollowUp);

        for contact in [
            ContactInfo {
                phone: Some("9876543210".to_owned()),
                ..ContactInfo::default()
            },
            ContactInfo {
                email: Some("a@b.in".to_owned()),
                ..ContactInfo::default()
            },
            ContactInfo {
                whatsapp: Some("9876543211".to_owned()),
                ..ContactInfo::default()
            },
        ] {
            assert_eq!(LeadAction::for_contact(&contact), LeadAction::Contact);
        }
    }

    #[test]
    fn enums_serialize_in_upper_case() {
        assert_eq!(serde_json::to_value(LeadAction::FollowUp).unwrap(), "FOLLOW_UP");
        assert_eq!(serde_json::to_value(LeadStatus::New).unwrap(), "NEW");
    }
}
