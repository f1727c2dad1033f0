//! Collector items → [`RawContentItem`].
//!
//! Identifiers the collector did not send explicitly are recovered from
//! URLs so the assembler can build canonical post links.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use leadscan_core::{Engagement, Platform, RawContentItem};
use leadscan_sources::item::parse_date_text;
use leadscan_sources::{
    FacebookPost, InstagramComment, InstagramPost, PlatformItem, RawTimestamp, YoutubeComment,
};
use regex::Regex;

static INSTAGRAM_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"instagram\.com/(?:[^/?#]+/)?(?:p|reel|tv)/([A-Za-z0-9_-]+)")
        .expect("valid instagram shortcode regex")
});
static FACEBOOK_POST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(?:posts|permalink)/([A-Za-z0-9_.-]+)").expect("valid facebook post regex")
});
static FACEBOOK_STORY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]story_fbid=([0-9]+)").expect("valid facebook story regex"));
static FACEBOOK_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/groups/([^/?#]+)").expect("valid facebook group regex"));
static YOUTUBE_VIDEO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:youtube\.com/watch\?(?:[^#]*&)?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/)([A-Za-z0-9_-]+)")
        .expect("valid youtube video regex")
});
static YOUTUBE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]lc=([A-Za-z0-9_.-]+)").expect("valid youtube comment regex"));

#[must_use]
pub fn normalize(item: &PlatformItem) -> RawContentItem {
    match item {
        PlatformItem::InstagramPost(post) => instagram_post(post),
        PlatformItem::InstagramComment(comment) => instagram_comment(comment),
        PlatformItem::FacebookPost(post) => facebook_post(post),
        PlatformItem::YoutubeComment(comment) => youtube_comment(comment),
    }
}

fn instagram_post(post: &InstagramPost) -> RawContentItem {
    let url = present(post.url.as_ref());
    RawContentItem {
        text: post.caption.clone().unwrap_or_default(),
        platform: Some(Platform::Instagram),
        source_id: present(post.hashtag.as_ref()),
        author: present(post.username.as_ref()),
        author_url: present(post.profile_url.as_ref()),
        shortcode: present(post.shortcode.as_ref())
            .or_else(|| capture(&INSTAGRAM_CODE, url.as_deref())),
        url,
        engagement: Engagement {
            likes: post.likes,
            comments: post.comments_count,
            replies: 0,
            views: post.video_view_count,
        },
        timestamp: timestamp(post.timestamp.as_ref(), post.date.as_deref()),
        ..RawContentItem::default()
    }
}

fn instagram_comment(comment: &InstagramComment) -> RawContentItem {
    let url = present(comment.post_url.as_ref());
    RawContentItem {
        text: comment.text.clone().unwrap_or_default(),
        platform: Some(Platform::Instagram),
        source_id: present(comment.hashtag.as_ref()),
        author: present(comment.username.as_ref()),
        author_url: present(comment.profile_url.as_ref()),
        shortcode: capture(&INSTAGRAM_CODE, url.as_deref()),
        comment_id: present(comment.id.as_ref()),
        url,
        engagement: Engagement {
            likes: comment.likes,
            ..Engagement::default()
        },
        timestamp: timestamp(comment.timestamp.as_ref(), comment.date.as_deref()),
        ..RawContentItem::default()
    }
}

fn facebook_post(post: &FacebookPost) -> RawContentItem {
    let url = present(post.post_url.as_ref());
    let group_name = present(post.group_name.as_ref());
    let post_id = present(post.post_id.as_ref())
        .or_else(|| capture(&FACEBOOK_POST, url.as_deref()))
        .or_else(|| capture(&FACEBOOK_STORY, url.as_deref()));
    let group_id = present(post.group_id.as_ref())
        .or_else(|| capture(&FACEBOOK_GROUP, url.as_deref()))
        .or_else(|| group_name.clone());
    RawContentItem {
        text: post.text.clone().unwrap_or_default(),
        platform: Some(Platform::Facebook),
        source_id: group_name.or_else(|| group_id.clone()),
        author: present(post.author_name.as_ref()),
        author_url: present(post.author_url.as_ref()),
        url,
        post_id,
        group_id,
        engagement: Engagement {
            likes: post.likes_count,
            comments: post.comments_count,
            ..Engagement::default()
        },
        timestamp: timestamp(post.timestamp.as_ref(), post.date.as_deref()),
        ..RawContentItem::default()
    }
}

fn youtube_comment(comment: &YoutubeComment) -> RawContentItem {
    let url = present(comment.video_url.as_ref());
    let video_id =
        present(comment.video_id.as_ref()).or_else(|| capture(&YOUTUBE_VIDEO, url.as_deref()));
    RawContentItem {
        text: comment.text.clone().unwrap_or_default(),
        platform: Some(Platform::YouTube),
        source_id: video_id.clone(),
        author: present(comment.author.as_ref()),
        author_url: present(comment.author_url.as_ref()),
        comment_id: present(comment.comment_id.as_ref())
            .or_else(|| capture(&YOUTUBE_COMMENT, url.as_deref())),
        url,
        video_id,
        engagement: Engagement {
            likes: comment.likes,
            replies: comment.replies,
            ..Engagement::default()
        },
        timestamp: timestamp(comment.timestamp.as_ref(), comment.date.as_deref()),
        ..RawContentItem::default()
    }
}

fn present(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}

fn capture(pattern: &Regex, haystack: Option<&str>) -> Option<String> {
    pattern
        .captures(haystack?)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}

fn timestamp(raw: Option<&RawTimestamp>, date: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(RawTimestamp::to_datetime)
        .or_else(|| date.and_then(parse_date_text))
}
