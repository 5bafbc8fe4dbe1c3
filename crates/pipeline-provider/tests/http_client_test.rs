use pipeline_provider::clients::{Client, ClientError, ClientSettings, HttpClient};
use pipeline_provider::model::{AlertTarget, Pipeline, Source};
use regex::Regex;
use reqwest::Url;
use serde_json::json;
use std::collections::BTreeMap;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> HttpClient {
    let mut headers = BTreeMap::new();
    headers.insert("x-team".to_string(), "observability".to_string());
    HttpClient::new(&ClientSettings {
        endpoint: Url::parse(&server.uri()).unwrap(),
        auth_key: "secret".to_string(),
        headers,
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

#[tokio::test]
async fn test_create_pipeline_sends_auth_and_unwraps_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/pipeline"))
        .and(header("authorization", "Token secret"))
        .and(header("x-team", "observability"))
        .and(body_partial_json(json!({"title": "edge"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"id": "p1", "title": "edge", "updated_at": "2024-05-01T10:00:00Z"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = client(&server)
        .create_pipeline(&Pipeline {
            title: Some("edge".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(created.id, "p1");
    assert_eq!(created.updated_at.as_deref(), Some("2024-05-01T10:00:00Z"));

    let requests = server.received_requests().await.unwrap();
    let user_agent = requests[0].headers.get("user-agent").unwrap().to_str().unwrap();
    let pattern = Regex::new(r"^terraform-provider-pipeline/\d+\.\d+\.\d+$").unwrap();
    assert!(pattern.is_match(user_agent), "{user_agent}");

    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("id").is_none());
    assert!(body.get("updated_at").is_none());
}

#[tokio::test]
async fn test_component_paths_nest_under_pipeline() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v3/pipeline/p1/source/s1"))
        .and(body_partial_json(json!({"type": "http", "generation_id": 4})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": "s1", "type": "http", "user_config": {}, "generation_id": 5}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v3/pipeline/p1/sink/k1/alert/a1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let updated = client
        .update_source(
            "p1",
            "s1",
            &Source {
                kind: "http".into(),
                generation_id: Some(4),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.generation_id, Some(5));

    let target = AlertTarget {
        pipeline_id: "p1".into(),
        component_kind: "sink".into(),
        component_id: "k1".into(),
    };
    client.delete_alert(&target, "a1").await.unwrap();
}

#[tokio::test]
async fn test_error_statuses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/pipeline/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/pipeline/broken"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"error": "title is required"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/pipeline/garbled"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let client = client(&server);

    let err = client.get_pipeline("gone").await.unwrap_err();
    assert!(err.is_not_found(), "{err}");

    match client.get_pipeline("broken").await.unwrap_err() {
        ClientError::Status { status, body, .. } => {
            assert_eq!(status, 422);
            assert_eq!(body, r#"{"error":"title is required"}"#);
        }
        other => panic!("Expected status error, got {other:?}"),
    }

    assert!(matches!(
        client.get_pipeline("garbled").await.unwrap_err(),
        ClientError::Decode { .. }
    ));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let server = MockServer::start().await;
    let client = client(&server);
    drop(server);

    let err = client.get_pipeline("p1").await.unwrap_err();
    assert!(matches!(err, ClientError::Transport { .. }), "{err:?}");
}

#[tokio::test]
async fn test_ids_cannot_escape_their_path_segment() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = client(&server);
    for id in ["..", "."] {
        let err = client.delete_source("p1", id).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidPath(_)), "{err:?}");
    }
    assert!(server.received_requests().await.unwrap().is_empty());

    client.delete_source("p1", "s1?force=1").await.unwrap();
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), "/v3/pipeline/p1/source/s1%3Fforce=1");
    assert_eq!(requests[0].url.query(), None);
}
