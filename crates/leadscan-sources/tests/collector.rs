//! Integration tests for `CollectorSource` using wiremock HTTP mocks.

use leadscan_core::Platform;
use leadscan_sources::{CollectorSource, CollectorSourceConfig, ContentSource, PlatformItem, SourceError};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_source(base_url: &str, platform: Platform) -> CollectorSource {
    let config = CollectorSourceConfig {
        base_url: base_url.to_string(),
        max_items_per_target: 20,
        timeout_secs: 5,
    };
    CollectorSource::new(&config, platform).expect("source construction should not fail")
}

fn targets(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

#[tokio::test]
async fn fetch_posts_targets_and_parses_items() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "items": [
            {
                "kind": "facebook_post",
                "text": "Looking for 3BHK in Sector 65, budget 1.2Cr. Call 9876543210",
                "author_name": "Rahul",
                "post_url": "https://www.facebook.com/groups/gurgaonproperty/posts/1234567890/",
                "group_name": "gurgaonproperty",
                "likes_count": 4
            },
            {
                "kind": "facebook_post",
                "message": "Sunset from the balcony",
                "author": "Priya"
            }
        ]
    });

    Mock::given(method("POST"))
        .and(path("/v1/collect/facebook"))
        .and(body_json(serde_json::json!({
            "targets": ["gurgaonproperty", "realestate"],
            "max_items_per_target": 20
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let source = test_source(&server.uri(), Platform::Facebook);
    let items = source
        .fetch(&targets(&["gurgaonproperty", "realestate"]))
        .await
        .expect("fetch should succeed");

    assert_eq!(items.len(), 2);
    let PlatformItem::FacebookPost(first) = &items[0] else {
        panic!("expected facebook post, got {:?}", items[0]);
    };
    assert_eq!(first.author_name.as_deref(), Some("Rahul"));
    assert_eq!(first.likes_count, 4);
    let PlatformItem::FacebookPost(second) = &items[1] else {
        panic!("expected facebook post");
    };
    assert_eq!(second.text.as_deref(), Some("Sunset from the balcony"));
}

#[tokio::test]
async fn malformed_and_foreign_items_are_dropped() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "items": [
            { "kind": "instagram_post", "shortcode": "abc", "caption": "Need flat urgently in Noida" },
            { "kind": "youtube_comment", "text": "wrong platform" },
            { "kind": "not_a_kind" },
            "just a string"
        ]
    });

    Mock::given(method("POST"))
        .and(path("/v1/collect/instagram"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let source = test_source(&server.uri(), Platform::Instagram);
    let items = source.fetch(&targets(&["noidaflats"])).await.expect("fetch");

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].platform(), Platform::Instagram);
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/collect/youtube"))
        .respond_with(ResponseTemplate::new(503).set_body_string("collector overloaded"))
        .mount(&server)
        .await;

    let source = test_source(&server.uri(), Platform::YouTube);
    let err = source.fetch(&targets(&["dQw4w9WgXcQ"])).await.unwrap_err();

    match err {
        SourceError::Status { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "collector overloaded");
        }
        other => panic!("expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_envelope_is_a_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/collect/instagram"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login required</html>"))
        .mount(&server)
        .await;

    let source = test_source(&server.uri(), Platform::Instagram);
    let err = source.fetch(&targets(&["realestate"])).await.unwrap_err();
    assert!(matches!(err, SourceError::Deserialize { .. }), "got {err:?}");
}

#[tokio::test]
async fn missing_items_field_yields_empty_list() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/collect/instagram"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let source = test_source(&server.uri(), Platform::Instagram);
    let items = source.fetch(&targets(&["realestate"])).await.expect("fetch");
    assert!(items.is_empty());
}
