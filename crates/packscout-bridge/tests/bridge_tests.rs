//! Bridge client tests against a mock HTTP server

use futures_util::StreamExt;
use packscout_bridge::BridgeClient;
use packscout_common::BridgeConfig;
use packscout_core::{ChatTransport, DomainError, EmojiId, MessageId, PackId};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, token: Option<&str>) -> BridgeClient {
    BridgeClient::new(&BridgeConfig {
        url: server.uri(),
        token: token.map(ToString::to_string),
        timeout_secs: 5,
        page_size: 2,
        poll_timeout_secs: 1,
        reconnect_delay_ms: 10,
    })
    .unwrap()
}

fn message(id: i64) -> serde_json::Value {
    json!({"id": id, "source": "chan", "text": format!("message {id}")})
}

#[tokio::test]
async fn test_fetch_pack_by_name_sends_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/packs/by-name/foo"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "short_name": "foo",
            "title": "Foo",
            "documents": [{"id": 101}, {"id": 102}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let pack = client(&server, Some("secret"))
        .fetch_pack_by_name("foo")
        .await
        .unwrap();

    assert_eq!(pack.id, PackId::new(7));
    assert_eq!(pack.title, "Foo");
    assert_eq!(
        pack.emoji_ids.into_iter().collect::<Vec<_>>(),
        vec![EmojiId::new(101), EmojiId::new(102)]
    );
}

#[tokio::test]
async fn test_missing_resources_are_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/packs/9"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/documents/55"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client(&server, None);

    let err = client.fetch_pack_by_id(PackId::new(9)).await.unwrap_err();
    assert!(matches!(err, DomainError::PackNotFound(_)));

    let err = client.fetch_document(EmojiId::new(55)).await.unwrap_err();
    assert!(matches!(err, DomainError::DocumentNotFound(id) if id == EmojiId::new(55)));
}

#[tokio::test]
async fn test_server_error_is_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/packs/by-name/foo"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = client(&server, None)
        .fetch_pack_by_name("foo")
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Transport(_)));
}

#[tokio::test]
async fn test_fetch_document_reads_parent_pack() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/documents/55"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 55,
            "attributes": [{"type": "custom_emoji", "alt": "🔥", "stickerset": {"id": 7}}]
        })))
        .mount(&server)
        .await;

    let doc = client(&server, None)
        .fetch_document(EmojiId::new(55))
        .await
        .unwrap();

    assert_eq!(doc.pack_id, Some(PackId::new(7)));
}

#[tokio::test]
async fn test_paginate_walks_pages_until_empty() {
    let server = MockServer::start().await;
    let page_path = "/v1/sources/chan/messages";

    Mock::given(method("GET"))
        .and(path(page_path))
        .and(query_param("after_id", "4"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"messages": [message(5), message(6)]})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(page_path))
        .and(query_param("after_id", "6"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"messages": [message(8)]})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(page_path))
        .and(query_param("after_id", "8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"messages": []})))
        .expect(1)
        .mount(&server)
        .await;

    let ids: Vec<i64> = client(&server, None)
        .paginate("chan", MessageId::new(4))
        .map(|message| message.unwrap().id.into_inner())
        .collect()
        .await;

    assert_eq!(ids, vec![5, 6, 8]);
}

#[tokio::test]
async fn test_paginate_ends_after_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/sources/chan/messages"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let items: Vec<_> = client(&server, None)
        .paginate("chan", MessageId::new(0))
        .collect()
        .await;

    assert_eq!(items.len(), 1);
    assert!(items[0].as_ref().unwrap_err().is_transport());
}

#[tokio::test]
async fn test_subscribe_reconnects_after_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/updates"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/updates"))
        .and(query_param("sources", "chan,other"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "updates": [
                {"update_id": 1, "message": message(10)},
                {"update_id": 2, "message": message(11)}
            ]
        })))
        .mount(&server)
        .await;

    let ids: Vec<i64> = client(&server, None)
        .subscribe(&["chan".to_string(), "other".to_string()])
        .take(2)
        .map(|message| message.unwrap().id.into_inner())
        .collect()
        .await;

    assert_eq!(ids, vec![10, 11]);
}

fn broken_message(id: i64) -> serde_json::Value {
    // text_url entity without its url
    json!({
        "id": id,
        "source": "chan",
        "entities": [{"type": "text_url", "offset": 0, "length": 4}]
    })
}

#[tokio::test]
async fn test_subscribe_skips_malformed_update() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/updates"))
        .and(query_param("offset", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "updates": [{"update_id": 3, "message": message(12)}]
        })))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/updates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "updates": [
                {"update_id": 1, "message": broken_message(10)},
                {"update_id": 2, "message": message(11)}
            ]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let ids: Vec<i64> = client(&server, None)
        .subscribe(&["chan".to_string()])
        .take(2)
        .map(|message| message.unwrap().id.into_inner())
        .collect()
        .await;

    // The second poll asks for updates after the bad one
    assert_eq!(ids, vec![11, 12]);
}

#[tokio::test]
async fn test_paginate_skips_malformed_message() {
    let server = MockServer::start().await;
    let page_path = "/v1/sources/chan/messages";

    Mock::given(method("GET"))
        .and(path(page_path))
        .and(query_param("after_id", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [message(1), broken_message(2), message(3)]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(page_path))
        .and(query_param("after_id", "3"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"messages": [broken_message(4)]})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(page_path))
        .and(query_param("after_id", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"messages": [message(5)]})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(page_path))
        .and(query_param("after_id", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"messages": []})))
        .expect(1)
        .mount(&server)
        .await;

    let items: Vec<_> = client(&server, None)
        .paginate("chan", MessageId::new(0))
        .collect()
        .await;

    let ids: Vec<i64> = items
        .into_iter()
        .map(|message| message.unwrap().id.into_inner())
        .collect();
    assert_eq!(ids, vec![1, 3, 5]);
}

#[tokio::test]
async fn test_source_name_is_encoded_in_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/sources/news%2Ffeed%3Fall/messages"))
        .and(query_param("after_id", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"messages": [message(1)]})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/sources/news%2Ffeed%3Fall/messages"))
        .and(query_param("after_id", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"messages": []})))
        .expect(1)
        .mount(&server)
        .await;

    let count = client(&server, None)
        .paginate("news/feed?all", MessageId::new(0))
        .count()
        .await;

    assert_eq!(count, 1);
}
