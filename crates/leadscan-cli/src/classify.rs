//! One-off classification of a single text.

use chrono::{DateTime, Utc};
use leadscan_core::{Platform, RawContentItem};
use leadscan_qualify::{Lead, LeadQualifier};

#[derive(Debug)]
pub(crate) enum ClassifyOutcome {
    /// Below the minimum text length; the model was not called.
    TooShort { chars: usize, min: usize },
    Rejected,
    Lead(Box<Lead>),
}

/// Length filter → classify → extract → assemble for `text`, plus the
/// quality review when `assess` is set.
pub(crate) async fn classify_text(
    qualifier: &LeadQualifier,
    text: &str,
    platform: Option<Platform>,
    assess: bool,
    now: DateTime<Utc>,
) -> anyhow::Result<ClassifyOutcome> {
    let item = RawContentItem {
        text: text.to_owned(),
        platform,
        ..RawContentItem::default()
    };
    let chars = item.stripped_len();
    if chars < qualifier.min_text_chars() {
        return Ok(ClassifyOutcome::TooShort {
            chars,
            min: qualifier.min_text_chars(),
        });
    }

    let Some(lead) = qualifier.qualify_item(&item, now).await? else {
        return Ok(ClassifyOutcome::Rejected);
    };
    let lead = if assess { qualifier.assess(lead).await } else { lead };
    Ok(ClassifyOutcome::Lead(Box::new(lead)))
}

pub(crate) async fn run_classify(
    qualifier: &LeadQualifier,
    text: &str,
    platform: Option<Platform>,
    assess: bool,
) -> anyhow::Result<()> {
    match classify_text(qualifier, text, platform, assess, Utc::now()).await? {
        ClassifyOutcome::TooShort { chars, min } => {
            println!("skipped: text has {chars} characters, minimum is {min}");
        }
        ClassifyOutcome::Rejected => println!("rejected: not a qualified lead"),
        ClassifyOutcome::Lead(lead) => println!("{}", serde_json::to_string_pretty(&lead)?),
    }
    Ok(())
}
