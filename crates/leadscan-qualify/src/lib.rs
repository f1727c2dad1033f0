//! Lead qualification pipeline.
//!
//! Turns raw social posts and comments into scored [`Lead`] records:
//! normalize → length filter → AI intent classification → gating policy →
//! AI contact extraction → lead assembly, with an optional AI quality
//! review of assembled leads. Model output is parsed by a
//! tolerant response parser that never fails.

pub mod assembler;
pub mod assessor;
pub mod classifier;
pub mod error;
pub mod extractor;
pub mod model;
pub mod normalize;
pub mod parse;
pub mod pipeline;
pub mod types;

mod retry;

pub use assessor::LeadAssessor;
pub use classifier::{gate, GateRule, IntentClassifier};
pub use error::QualifyError;
pub use extractor::ContactExtractor;
pub use model::{CallPolicy, GeminiClient, LanguageModel};
pub use normalize::normalize;
pub use parse::{parse_model_response, ParseStrategy, ParsedResponse};
pub use pipeline::{LeadQualifier, QualifyReport, QualifyStats};
pub use types::{
    BuyingIntent, ContactInfo, IntentAnalysis, Lead, LeadAction, LeadAssessment, LeadPriority,
    LeadStatus,
};
