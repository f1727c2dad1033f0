//! Builds the canonical [`Lead`] from an accepted item.

use chrono::{DateTime, Utc};
use leadscan_core::{Platform, RawContentItem};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Url;
use sha2::{Digest, Sha256};

use crate::types::{ContactInfo, IntentAnalysis, Lead, LeadAction, LeadStatus};

/// Characters left as-is inside an identifier segment.
const ID_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Merge classifier output, contact details and item metadata.
///
/// Identical inputs produce identical leads apart from `extracted_at`.
#[must_use]
pub fn assemble(
    text: &str,
    item: &RawContentItem,
    analysis: &IntentAnalysis,
    contact: &ContactInfo,
    extracted_at: DateTime<Utc>,
) -> Lead {
    let source = resolve_platform(item);
    let post_url = post_url(source, item);
    let lead_id = lead_id(source, &post_url, item.author.as_deref(), text);

    Lead {
        lead_id,
        source,
        name: contact.name.clone(),
        phone: contact.phone.clone(),
        email: contact.email.clone(),
        whatsapp: contact.whatsapp.clone(),
        social_handle: contact.social_handle.clone(),
        contact_phrase: contact.contact_phrase.clone(),
        requirement: analysis.property_type.clone(),
        location: analysis.location.clone(),
        budget: analysis.budget_range.clone(),
        timeline: analysis.timeline.clone(),
        contact_method: analysis.contact_method.clone(),
        buying_intent: analysis.buying_intent,
        lead_score: analysis.lead_score,
        language: analysis.language.clone(),
        confidence: analysis.confidence,
        original_content: text.to_owned(),
        post_url,
        social_media_url: item.url.clone(),
        username: item.author.clone(),
        author_url: item.author_url.clone(),
        status: LeadStatus::New,
        action: LeadAction::for_contact(contact),
        extracted_at,
        assessment: None,
    }
}

/// Explicit tag first, then structural hints, otherwise unknown.
#[must_use]
pub fn resolve_platform(item: &RawContentItem) -> Platform {
    if let Some(platform) = item.platform.filter(|p| *p != Platform::Unknown) {
        return platform;
    }
    if item.shortcode.is_some() {
        return Platform::Instagram;
    }
    if item.group_id.is_some() || item.post_id.is_some() {
        return Platform::Facebook;
    }
    if item.video_id.is_some() {
        return Platform::YouTube;
    }
    Platform::Unknown
}

/// Canonical link for the item, falling back to its original URL (or empty)
/// when the template lacks an identifier or does not produce a valid URL.
#[must_use]
pub fn post_url(platform: Platform, item: &RawContentItem) -> String {
    let fallback = || item.url.clone().unwrap_or_default();
    let enc = |id: &str| utf8_percent_encode(id, ID_SEGMENT).to_string();

    let candidate = match platform {
        Platform::Instagram => item
            .shortcode
            .as_deref()
            .map(|code| format!("https://www.instagram.com/p/{}/", enc(code))),
        Platform::Facebook => match (item.group_id.as_deref(), item.post_id.as_deref()) {
            (Some(group), Some(post)) => Some(format!(
                "https://www.facebook.com/groups/{}/posts/{}/",
                enc(group),
                enc(post)
            )),
            (None, Some(post)) => Some(format!("https://www.facebook.com/posts/{}/", enc(post))),
            _ => None,
        },
        Platform::YouTube => match (item.video_id.as_deref(), item.comment_id.as_deref()) {
            (Some(video), Some(comment)) => Some(format!(
                "https://www.youtube.com/watch?v={}&lc={}",
                enc(video),
                enc(comment)
            )),
            (Some(video), None) => Some(format!("https://www.youtube.com/watch?v={}", enc(video))),
            _ => None,
        },
        Platform::Unknown => None,
    };

    match candidate {
        Some(url) if Url::parse(&url).is_ok() => url,
        Some(url) => {
            tracing::warn!(%url, "generated post URL is invalid; using original");
            fallback()
        }
        None => fallback(),
    }
}

/// SHA-256 over `platform|post_url|author|text`, hex encoded.
fn lead_id(platform: Platform, post_url: &str, author: Option<&str>, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(platform.as_str().as_bytes());
    hasher.update(b"|");
    hasher.update(post_url.as_bytes());
    hasher.update(b"|");
    hasher.update(author.unwrap_or_default().as_bytes());
    hasher.update(b"|");
    hasher.update(text.trim().as_bytes());
    hasher
        .finalize()
        .iter()
        .fold(String::with_capacity(64), |mut out, byte| {
            use std::fmt::Write as _;
            let _ = write!(out, "{byte:02x}");
            out
        })
}
