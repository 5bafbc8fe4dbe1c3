use pipeline_provider::host::{handle, Operation, Request, Response};
use pipeline_provider::PipelineProvider;
use regex::Regex;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// --- Helpers ---

fn provider_block(server: &MockServer) -> Value {
    json!({"auth_key": "secret", "endpoint": server.uri()})
}

async fn run(server: &MockServer, operation: Operation, type_name: &str, request: Value) -> Response {
    let mut request: Request = serde_json::from_value(request).unwrap();
    request.provider = provider_block(server);
    let mut provider = PipelineProvider::new();
    handle(&mut provider, operation, type_name, request).await
}

fn summaries(response: &Response) -> Vec<String> {
    response.diagnostics.iter().map(|d| d.summary.clone()).collect()
}

// --- Tests ---

#[tokio::test]
async fn test_create_pipeline_yields_id_and_timestamp() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/pipeline"))
        .and(body_partial_json(json!({"title": "edge"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"id": "7f1c", "title": "edge", "updated_at": "2024-05-01T10:00:00Z", "origin": "terraform"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = run(
        &server,
        Operation::Create,
        "pipeline_pipeline",
        json!({"config": {"title": "edge"}}),
    )
    .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let state = response.state.unwrap();
    assert_eq!(state["id"], "7f1c");
    assert_eq!(state["title"], "edge");
    assert_eq!(state["updated_at"], "2024-05-01T10:00:00Z");
}

#[tokio::test]
async fn test_source_lifecycle_carries_generation_forward() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/pipeline/p1/source"))
        .and(body_partial_json(json!({"type": "http", "user_config": {"decoding": "json"}})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {
                "id": "s1", "type": "http", "title": "ingest",
                "user_config": {"decoding": "json", "capture_metadata": false},
                "generation_id": 1, "gateway_route_id": "route-1", "shared_source_id": "shared-1"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v3/pipeline/p1/source/s1"))
        .and(body_partial_json(json!({
            "id": "s1", "title": "renamed", "generation_id": 1, "shared_source_id": "shared-1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "id": "s1", "type": "http", "title": "renamed",
                "user_config": {"decoding": "json", "capture_metadata": false},
                "generation_id": 2, "gateway_route_id": "route-1", "shared_source_id": "shared-1"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = run(
        &server,
        Operation::Create,
        "pipeline_http_source",
        json!({"config": {"pipeline_id": "p1", "title": "ingest"}}),
    )
    .await;
    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
    let prior = created.state.unwrap();
    assert_eq!(prior["generation_id"], 1);
    assert_eq!(prior["shared_source_id"], "shared-1");

    let updated = run(
        &server,
        Operation::Update,
        "pipeline_http_source",
        json!({"prior": prior, "config": {"pipeline_id": "p1", "title": "renamed"}}),
    )
    .await;
    assert!(updated.diagnostics.is_empty(), "{:?}", updated.diagnostics);
    let state = updated.state.unwrap();
    assert_eq!(state["title"], "renamed");
    assert_eq!(state["generation_id"], 2);
    assert_eq!(state["gateway_route_id"], "route-1");
}

#[tokio::test]
async fn test_changing_shared_source_id_never_calls_api() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let prior = json!({
        "id": "s1", "pipeline_id": "p1", "title": null, "description": null,
        "generation_id": 1, "shared_source_id": "shared-1", "capture_metadata": false
    });
    let response = run(
        &server,
        Operation::Update,
        "pipeline_agent_source",
        json!({"prior": prior, "config": {"pipeline_id": "p1", "shared_source_id": "shared-2"}}),
    )
    .await;

    assert!(response.state.is_none());
    let diag = response.diagnostics.iter().next().unwrap();
    assert_eq!(diag.summary, "Cannot change \"shared_source_id\"");
    assert_eq!(
        diag.detail,
        "\"shared_source_id\" cannot be changed after the resource has been created. Remove the resource and create it again."
    );
}

#[tokio::test]
async fn test_access_key_create_returns_key_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/pipeline/access-key"))
        .and(body_partial_json(json!({"title": "ci", "source_id": "ss1"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"id": "ak1", "title": "ci", "source_id": "ss1",
                     "key": "3f2b8c1e-9d4a-4e6f-b7a2-0c5d8e1f4a93"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/pipeline/access-key/ak1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": "ak1", "title": "ci", "source_id": "ss1"}
        })))
        .mount(&server)
        .await;

    let created = run(
        &server,
        Operation::Create,
        "pipeline_access_key",
        json!({"config": {"title": "ci", "source_id": "ss1"}}),
    )
    .await;
    let state = created.state.unwrap();
    let uuid = Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap();
    assert!(uuid.is_match(state["key"].as_str().unwrap()));

    let read = run(&server, Operation::Read, "pipeline_access_key", json!({"state": state})).await;
    assert_eq!(
        read.state.unwrap()["key"],
        "3f2b8c1e-9d4a-4e6f-b7a2-0c5d8e1f4a93"
    );

    let update = run(
        &server,
        Operation::Update,
        "pipeline_access_key",
        json!({"prior": state, "config": {"title": "ci", "source_id": "ss1"}}),
    )
    .await;
    assert_eq!(summaries(&update), vec!["Access keys cannot be updated"]);
}

#[tokio::test]
async fn test_read_not_found_drops_state_and_delete_not_found_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/pipeline/p1/sink/k1"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v3/pipeline/p1/sink/k1"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let state = json!({"id": "k1", "pipeline_id": "p1", "inputs": ["t1"], "ack_enabled": true});

    let read = run(&server, Operation::Read, "pipeline_blackhole_destination", json!({"state": state})).await;
    assert!(read.diagnostics.is_empty());
    assert!(read.state.is_none());

    let deleted = run(
        &server,
        Operation::Delete,
        "pipeline_blackhole_destination",
        json!({"state": state}),
    )
    .await;
    assert!(deleted.diagnostics.is_empty(), "{:?}", deleted.diagnostics);
}

#[tokio::test]
async fn test_api_error_is_reported_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/pipeline/p1/transform"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string(r#"{"error":"unknown input s9"}"#),
        )
        .mount(&server)
        .await;

    let response = run(
        &server,
        Operation::Create,
        "pipeline_drop_fields_processor",
        json!({"config": {"pipeline_id": "p1", "inputs": ["s9"], "fields": [".secret"]}}),
    )
    .await;

    let diag = response.diagnostics.iter().next().unwrap();
    assert_eq!(diag.summary, "Error creating pipeline_drop_fields_processor");
    assert_eq!(diag.detail, r#"API error (status 400): {"error":"unknown input s9"}"#);
}

#[tokio::test]
async fn test_import_alert_by_full_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/pipeline/p1/sink/k1/alert/a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "id": "a1", "component_kind": "sink", "component_id": "k1", "inputs": [], "active": false,
                "alert_config": {
                    "type": "absence", "event_type": "log", "name": "quiet sink", "severity": "WARNING",
                    "window_duration_minutes": 15,
                    "service": {"name": "slack", "uri": "https://hooks.slack.com/x"}
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = run(
        &server,
        Operation::Import,
        "pipeline_absence_alert",
        json!({"id": "p1/sink/k1/a1"}),
    )
    .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let state = response.state.unwrap();
    assert_eq!(state["pipeline_id"], "p1");
    assert_eq!(state["name"], "quiet sink");
    assert_eq!(state["active"], false);
    assert_eq!(state["window_duration_minutes"], 15);
    assert_eq!(state["service"]["name"], "slack");
}

#[tokio::test]
async fn test_validation_errors_stop_before_the_api() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let response = run(
        &server,
        Operation::Create,
        "pipeline_filter_processor",
        json!({"config": {
            "pipeline_id": "p1",
            "action": "drop",
            "conditional": {"expressions": [{"field": ".n", "operator": "greater", "value_string": "x"}]}
        }}),
    )
    .await;
    assert_eq!(summaries(&response), vec!["Invalid expression"]);

    let response = run(
        &server,
        Operation::Validate,
        "pipeline_kafka_source",
        json!({"config": {"pipeline_id": "p1", "topics": [], "group_id": "g", "id": "x"}}),
    )
    .await;
    let found = summaries(&response);
    assert!(found.contains(&"Missing required argument".to_string()), "{found:?}");
    assert!(found.contains(&"Invalid configuration for read-only attribute".to_string()));
}
