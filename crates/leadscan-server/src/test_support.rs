//! Shared fakes for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadscan_core::{Clock, Platform, ScanTargets};
use leadscan_qualify::{
    BuyingIntent, CallPolicy, LanguageModel, Lead, LeadAction, LeadQualifier, LeadStatus,
    QualifyError,
};
use leadscan_sources::{
    ContentSource, FacebookPost, InstagramPost, PlatformItem, SourceError, YoutubeComment,
};
use tokio::sync::Notify;

use crate::scan_log::ScanLog;
use crate::scheduler::{ScanConfig, ScanDeps, ScanOrchestrator};
use crate::sink::{LeadSink, SinkError};

pub(crate) const BUYER_MARKER: &str = "BUYER";

pub(crate) fn fixed_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-01-08T10:00:00Z")
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

pub(crate) fn sample_lead(id: &str) -> Lead {
    Lead {
        lead_id: id.to_owned(),
        source: Platform::Facebook,
        name: Some("Rahul".to_owned()),
        phone: Some("9876543210".to_owned()),
        email: None,
        whatsapp: None,
        social_handle: None,
        contact_phrase: Some("call me".to_owned()),
        requirement: "3BHK".to_owned(),
        location: "Sector 65".to_owned(),
        budget: "1.2Cr".to_owned(),
        timeline: "urgent".to_owned(),
        contact_method: "phone".to_owned(),
        buying_intent: BuyingIntent::High,
        lead_score: 8,
        language: "English".to_owned(),
        confidence: 0.9,
        original_content: "Looking for 3BHK in Sector 65, call 9876543210".to_owned(),
        post_url: format!("https://www.facebook.com/groups/gurgaonproperty/posts/{id}/"),
        social_media_url: None,
        username: Some("Rahul".to_owned()),
        author_url: None,
        status: LeadStatus::New,
        action: LeadAction::Contact,
        extracted_at: fixed_now(),
        assessment: None,
    }
}

pub(crate) struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Accepts any content carrying [`BUYER_MARKER`] as a high-score lead with a
/// phone number; everything else is rejected.
pub(crate) struct BuyerModel {
    pub calls: AtomicUsize,
    delay: Duration,
}

impl BuyerModel {
    pub(crate) fn new() -> Arc<Self> {
        Self::with_delay(Duration::ZERO)
    }

    /// Every call sleeps for `delay` before answering.
    pub(crate) fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay,
        })
    }
}

#[async_trait]
impl LanguageModel for BuyerModel {
    async fn complete(&self, prompt: &str) -> Result<String, QualifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let reply = if prompt.starts_with("Extract") {
            r#"{"phone": "9876543210", "contact_phrase": "call me"}"#
        } else if prompt.contains(BUYER_MARKER) {
            r#"{"is_lead": true, "contact_available": true, "lead_score": 8,
                "buying_intent": "High", "property_type": "2BHK", "location": "Gurugram"}"#
        } else {
            r#"{"is_lead": false, "lead_score": 1}"#
        };
        Ok(reply.to_owned())
    }

    fn model_id(&self) -> &str {
        "buyer-fake"
    }
}

pub(crate) enum Behavior {
    Items(Vec<PlatformItem>),
    Fail,
    Hang,
    Panic,
    /// Signals `entered`, then waits for `release` before returning nothing.
    Gated {
        entered: Arc<Notify>,
        release: Arc<Notify>,
    },
}

pub(crate) struct FakeSource {
    platform: Platform,
    behavior: Behavior,
    pub fetches: AtomicUsize,
}

impl FakeSource {
    pub(crate) fn new(platform: Platform, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            platform,
            behavior,
            fetches: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ContentSource for FakeSource {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn fetch(&self, _targets: &[String]) -> Result<Vec<PlatformItem>, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Items(items) => Ok(items.clone()),
            Behavior::Fail => Err(SourceError::Status {
                status: 502,
                body: "collector unavailable".to_owned(),
            }),
            Behavior::Hang => std::future::pending().await,
            Behavior::Panic => panic!("collector exploded"),
            Behavior::Gated { entered, release } => {
                entered.notify_one();
                release.notified().await;
                Ok(Vec::new())
            }
        }
    }
}

pub(crate) fn buyer_post(platform: Platform, id: &str) -> PlatformItem {
    match platform {
        Platform::Facebook => PlatformItem::FacebookPost(FacebookPost {
            text: Some(format!("{BUYER_MARKER} wants a plot in Gurugram, call 9876543210")),
            author_name: Some("Priya".to_owned()),
            post_url: Some(format!(
                "https://www.facebook.com/groups/gurgaonproperty/posts/{id}/"
            )),
            ..FacebookPost::default()
        }),
        Platform::YouTube => PlatformItem::YoutubeComment(YoutubeComment {
            comment_id: Some(id.to_owned()),
            text: Some(format!("{BUYER_MARKER} looking for a villa near Sohna, call 9876543210")),
            author: Some("Amit".to_owned()),
            video_id: Some("dQw4w9WgXcQ".to_owned()),
            ..YoutubeComment::default()
        }),
        _ => PlatformItem::InstagramPost(InstagramPost {
            caption: Some(format!("{BUYER_MARKER} needs a 2BHK in Sector 65, call 9876543210")),
            shortcode: Some(id.to_owned()),
            username: Some("buyer_1".to_owned()),
            ..InstagramPost::default()
        }),
    }
}

pub(crate) fn scenery_post(id: &str) -> PlatformItem {
    PlatformItem::InstagramPost(InstagramPost {
        caption: Some("Nice view of Gurgaon skyline tonight".to_owned()),
        shortcode: Some(id.to_owned()),
        ..InstagramPost::default()
    })
}

/// Records how many leads each write carried; optionally fails every write.
pub(crate) struct RecordingSink {
    pub writes: std::sync::Mutex<Vec<(Platform, usize)>>,
    fail: bool,
}

impl RecordingSink {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            writes: std::sync::Mutex::new(Vec::new()),
            fail: false,
        })
    }

    pub(crate) fn failing() -> Arc<Self> {
        Arc::new(Self {
            writes: std::sync::Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub(crate) fn total_written(&self) -> usize {
        self.writes
            .lock()
            .expect("sink lock")
            .iter()
            .map(|(_, n)| n)
            .sum()
    }
}

#[async_trait]
impl LeadSink for RecordingSink {
    async fn write(&self, platform: Platform, leads: &[Lead]) -> Result<(), SinkError> {
        if self.fail {
            return Err(SinkError::Io {
                path: "/read-only/leads.jsonl".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        self.writes
            .lock()
            .expect("sink lock")
            .push((platform, leads.len()));
        Ok(())
    }
}

pub(crate) fn qualifier(model: Arc<BuyerModel>) -> Arc<LeadQualifier> {
    let policy = CallPolicy {
        max_retries: 0,
        backoff_base_ms: 0,
        ..CallPolicy::default()
    };
    Arc::new(LeadQualifier::new(model, policy, 10))
}

pub(crate) fn deps(sources: Vec<Arc<dyn ContentSource>>, sink: Arc<dyn LeadSink>) -> ScanDeps {
    deps_with_model(sources, sink, BuyerModel::new())
}

pub(crate) fn deps_with_model(
    sources: Vec<Arc<dyn ContentSource>>,
    sink: Arc<dyn LeadSink>,
    model: Arc<BuyerModel>,
) -> ScanDeps {
    ScanDeps {
        qualifier: qualifier(model),
        sources,
        sink,
        scan_log: Arc::new(ScanLog::in_memory(50)),
        clock: Arc::new(FixedClock(fixed_now())),
        source_timeout: Duration::from_secs(5),
        panic_backoff: Duration::from_millis(20),
    }
}

pub(crate) async fn orchestrator(deps: ScanDeps, targets: ScanTargets) -> ScanOrchestrator {
    ScanOrchestrator::new(
        deps,
        ScanConfig {
            targets,
            interval_minutes: 10,
        },
    )
    .await
    .expect("orchestrator")
}

/// No sources registered; scans record every configured platform as failed.
pub(crate) async fn idle_orchestrator() -> ScanOrchestrator {
    orchestrator(deps(Vec::new(), RecordingSink::new()), ScanTargets::default()).await
}

/// Instagram and Facebook sources that each return one qualifying post.
pub(crate) async fn orchestrator_with_buyer_sources() -> ScanOrchestrator {
    let sources: Vec<Arc<dyn ContentSource>> = vec![
        FakeSource::new(
            Platform::Instagram,
            Behavior::Items(vec![buyer_post(Platform::Instagram, "CxIG1")]),
        ),
        FakeSource::new(
            Platform::Facebook,
            Behavior::Items(vec![buyer_post(Platform::Facebook, "1001")]),
        ),
    ];
    orchestrator(deps(sources, RecordingSink::new()), ScanTargets::default()).await
}
