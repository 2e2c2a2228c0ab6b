//! Tests for the HTTP category store against a mock server

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use catreorder::config::ApiConfig;
use catreorder::domain::{ReorderItem, ReorderRequest};
use catreorder::infrastructure::{CategoryStore, HttpCategoryStore, InfraError, Session};

const FIXTURE: &str = include_str!("resources/categories.json");

fn store(server: &MockServer, session: Session) -> HttpCategoryStore {
    let api = ApiConfig {
        base_url: format!("{}/api/", server.uri()),
        timeout_secs: 5,
    };
    HttpCategoryStore::new(&api, session).unwrap()
}

#[tokio::test]
async fn given_token_when_listing_then_bearer_sent_and_nested_forest_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .and(header("authorization", "Bearer s3cret"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FIXTURE))
        .expect(1)
        .mount(&server)
        .await;

    let nodes = store(&server, Session::with_token("s3cret"))
        .list()
        .await
        .unwrap();

    assert_eq!(nodes.len(), 3);
    assert_eq!(nodes[0].name, "Books");
    assert_eq!(nodes[0].children.len(), 2);
    assert!(!nodes[0].children[1].is_active);
    assert_eq!(nodes[1].children[0].parent_id, Some(2));
}

#[tokio::test]
async fn given_anonymous_session_when_listing_then_no_authorization_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let nodes = store(&server, Session::anonymous()).list().await.unwrap();

    assert!(nodes.is_empty());
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn given_change_set_when_reordering_then_items_posted_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/categories/reorder"))
        .and(body_json(json!({
            "items": [
                { "id": 1, "parent_id": null, "order": 1 },
                { "id": 3, "parent_id": null, "order": 2 },
                { "id": 2, "parent_id": 3, "order": 1 }
            ]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let request = ReorderRequest {
        items: vec![
            ReorderItem { id: 1, parent_id: None, order: 1 },
            ReorderItem { id: 3, parent_id: None, order: 2 },
            ReorderItem { id: 2, parent_id: Some(3), order: 1 },
        ],
    };

    store(&server, Session::anonymous())
        .reorder(&request)
        .await
        .unwrap();
}

#[tokio::test]
async fn given_validation_error_when_reordering_then_first_field_message_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/categories/reorder"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "The given data was invalid.",
            "errors": {
                "items.0.parent_id": ["The selected parent is invalid."],
                "items.1.order": ["The order must be at least 1."]
            }
        })))
        .mount(&server)
        .await;

    let err = store(&server, Session::anonymous())
        .reorder(&ReorderRequest::default())
        .await
        .unwrap_err();

    match err {
        InfraError::Remote { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "The selected parent is invalid.");
        }
        other => panic!("expected Remote, got {other:?}"),
    }
}

#[tokio::test]
async fn given_plain_text_error_when_listing_then_raw_text_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = store(&server, Session::anonymous()).list().await.unwrap_err();

    assert!(matches!(
        err,
        InfraError::Remote { status: 502, ref message } if message == "Bad Gateway"
    ));
}

#[tokio::test]
async fn given_malformed_listing_when_decoding_then_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data": "nope"}"#))
        .mount(&server)
        .await;

    let err = store(&server, Session::anonymous()).list().await.unwrap_err();

    assert!(matches!(err, InfraError::Decode { .. }));
}
