//! Dispatch sequences of the primary action creators against a mock HTTP API.

#![allow(clippy::unwrap_used)]

use crud_actions_core::environment::NoAnnotation;
use crud_actions_core::{FormData, HostConfig, ResponseSchemas};
use crud_actions_runtime::{HeaderResolvers, PrimaryActions, Transport, bearer};
use crud_actions_testing::{
    RecordingDispatcher, SequentialIdGenerator, init_test_tracing, test_environment,
    test_received_at,
};
use futures::future::join;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn channels(server: &MockServer) -> PrimaryActions {
    PrimaryActions::new(
        "channel",
        &HostConfig::new(server.uri()),
        Transport::http(ResponseSchemas::default()),
        test_environment(),
    )
    .unwrap()
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}

#[tokio::test]
async fn test_find_one_success() {
    init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels/667"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"name": "im a channel"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = RecordingDispatcher::new();
    let terminal = channels(&server).find_one(667).run(store.clone()).await;

    assert_eq!(
        store.action_values(),
        [
            json!({"type": "CHANNEL_FIND_START"}),
            json!({
                "type": "CHANNEL_FIND_SUCCESS",
                "channel": {"name": "im a channel"},
                "receivedAt": test_received_at(),
            }),
        ]
    );
    assert_eq!(terminal.action_type, "CHANNEL_FIND_SUCCESS");
}

#[tokio::test]
async fn test_find_one_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels/789"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"message": "this is an error"})),
        )
        .mount(&server)
        .await;

    let store = RecordingDispatcher::new();
    channels(&server).find_one(789).run(store.clone()).await;

    assert_eq!(
        store.action_values(),
        [
            json!({"type": "CHANNEL_FIND_START"}),
            json!({
                "type": "CHANNEL_FIND_ERROR",
                "data": 789,
                "error": {"message": "this is an error"},
            }),
        ]
    );
}

#[tokio::test]
async fn test_find_one_falsy_id_makes_no_request() {
    let server = MockServer::start().await;
    let actions = channels(&server);

    for id in [json!(null), json!(0), json!(""), json!(false)] {
        let store = RecordingDispatcher::new();
        actions.find_one(id).run(store.clone()).await;

        assert_eq!(
            store.action_values(),
            [json!({
                "type": "CHANNEL_FIND_ERROR",
                "data": null,
                "error": {"message": "no modelId given for action findChannel"},
            })]
        );
    }
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_start_is_dispatched_before_the_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels/667"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .mount(&server)
        .await;

    let store = RecordingDispatcher::new();
    let completion = channels(&server).find_one(667).run(store.clone());

    assert_eq!(store.types(), ["CHANNEL_FIND_START"]);
    completion.await;
    assert_eq!(store.types(), ["CHANNEL_FIND_START", "CHANNEL_FIND_SUCCESS"]);
}

#[tokio::test]
async fn test_find_many_default_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels"))
        .and(query_param("limit", "10000"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": 1}, {"id": 2}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = RecordingDispatcher::new();
    channels(&server).find_many(None).run(store.clone()).await;

    assert_eq!(
        store.action_values(),
        [
            json!({"type": "CHANNELS_FIND_START"}),
            json!({
                "type": "CHANNELS_FIND_SUCCESS",
                "channels": [{"id": 1, "tmpId": "456"}, {"id": 2, "tmpId": "456"}],
                "receivedAt": test_received_at(),
            }),
        ]
    );
}

#[tokio::test]
async fn test_find_many_empty_query_without_annotation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": [{"name": "general"}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let actions = PrimaryActions::new(
        "channel",
        &HostConfig::new(server.uri()),
        Transport::http(ResponseSchemas::default()),
        test_environment().with_annotator(Arc::new(NoAnnotation)),
    )
    .unwrap();

    let store = RecordingDispatcher::new();
    actions.find_many(Some("")).run(store.clone()).await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), None);
    assert_eq!(
        store.action_values()[1],
        json!({
            "type": "CHANNELS_FIND_SUCCESS",
            "channels": [{"name": "general"}],
            "receivedAt": test_received_at(),
        })
    );
}

#[tokio::test]
async fn test_find_many_error_has_no_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({"data": {"message": "down"}})),
        )
        .mount(&server)
        .await;

    let store = RecordingDispatcher::new();
    channels(&server).find_many(Some("")).run(store.clone()).await;

    assert_eq!(
        store.action_values()[1],
        json!({"type": "CHANNELS_FIND_ERROR", "error": {"message": "down"}})
    );
}

#[tokio::test]
async fn test_create_one_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/channels"))
        .and(body_json(json!({"foo": "bar"})))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"data": {"id": 1, "foo": "bar"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = RecordingDispatcher::new();
    channels(&server)
        .create_one(json!({"foo": "bar"}))
        .run(store.clone())
        .await;

    assert_eq!(
        store.action_values(),
        [
            json!({"type": "CHANNEL_CREATE_START", "channel": {"foo": "bar", "tmpId": "456"}}),
            json!({"type": "CHANNEL_CREATE_SUCCESS", "channel": {"foo": "bar", "tmpId": "456"}}),
        ]
    );
}

#[tokio::test]
async fn test_create_one_error_keeps_tmp_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/channels"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"data": {"message": "name taken"}})),
        )
        .mount(&server)
        .await;

    let store = RecordingDispatcher::new();
    channels(&server)
        .create_one(json!({"foo": "bar"}))
        .run(store.clone())
        .await;

    assert_eq!(
        store.action_values()[1],
        json!({
            "type": "CHANNEL_CREATE_ERROR",
            "data": {"foo": "bar", "tmpId": "456"},
            "error": {"message": "name taken"},
        })
    );
}

#[tokio::test]
async fn test_create_one_empty_entity_makes_no_request() {
    let server = MockServer::start().await;
    let actions = channels(&server);

    for entity in [json!({}), json!(null), json!("channel")] {
        let store = RecordingDispatcher::new();
        actions.create_one(entity).run(store.clone()).await;
        assert_eq!(
            store.action_values(),
            [json!({
                "type": "CHANNEL_CREATE_ERROR",
                "data": null,
                "error": {"message": "no model given for action createChannel"},
            })]
        );
    }
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_create_one_form_skips_start() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": 9}})))
        .expect(1)
        .mount(&server)
        .await;

    let form = FormData::new()
        .text("name", "general")
        .file("avatar", "a.png", Some("image/png".to_string()), vec![1, 2, 3]);

    let store = RecordingDispatcher::new();
    channels(&server).create_one(form).run(store.clone()).await;

    assert_eq!(
        store.action_values(),
        [json!({"type": "CHANNEL_CREATE_SUCCESS", "channel": {"id": 9}})]
    );
    let requests = server.received_requests().await.unwrap();
    let content_type = requests[0].headers.get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data"));
}

#[tokio::test]
async fn test_prefix_and_singular_segments() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/channel/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": 5}})))
        .expect(1)
        .mount(&server)
        .await;

    let host = HostConfig::new(server.uri())
        .with_prefix("api/v1")
        .with_pluralize_models(false);
    let actions = PrimaryActions::new(
        "channel",
        &host,
        Transport::http(ResponseSchemas::default()),
        test_environment(),
    )
    .unwrap();

    let store = RecordingDispatcher::new();
    actions.find_one("5").run(store.clone()).await;
    assert_eq!(store.types(), ["CHANNEL_FIND_START", "CHANNEL_FIND_SUCCESS"]);
}

#[tokio::test]
async fn test_headers_resolved_per_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels/1"))
        .and(header("Authorization", "Bearer session-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/channels/1"))
        .and(header("Authorization", "Bearer session-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let resolvers = HeaderResolvers::new().with("findChannel", move || {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        Some(bearer(format!("session-{n}")))
    });
    let actions = channels(&server).with_headers(resolvers);

    // Building the thunk must not read headers yet
    let thunk = actions.find_one(1);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let store = RecordingDispatcher::new();
    thunk.run(store.clone()).await;
    actions.find_one(1).run(store.clone()).await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        store.types(),
        [
            "CHANNEL_FIND_START",
            "CHANNEL_FIND_SUCCESS",
            "CHANNEL_FIND_START",
            "CHANNEL_FIND_SUCCESS",
        ]
    );
}

#[tokio::test]
async fn test_update_one_strips_tmp_id() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/channels/3"))
        .and(body_json(json!({"id": 3, "name": "renamed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": 3}})))
        .expect(1)
        .mount(&server)
        .await;

    let entity = json!({"id": 3, "name": "renamed", "tmpId": "abc"});
    let store = RecordingDispatcher::new();
    channels(&server).update_one(entity.clone()).run(store.clone()).await;

    assert_eq!(
        store.action_values(),
        [
            json!({"type": "CHANNEL_UPDATE_START", "channel": entity}),
            json!({"type": "CHANNEL_UPDATE_SUCCESS", "channel": entity}),
        ]
    );
}

#[tokio::test]
async fn test_update_one_requires_id() {
    let server = MockServer::start().await;
    let store = RecordingDispatcher::new();
    channels(&server)
        .update_one(json!({"name": "no id"}))
        .run(store.clone())
        .await;

    assert_eq!(
        store.action_values(),
        [json!({
            "type": "CHANNEL_UPDATE_ERROR",
            "data": null,
            "error": {"message": "no modelId given for action updateChannel"},
        })]
    );
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_destroy_one_error() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/channels/3"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "not found"})))
        .expect(1)
        .mount(&server)
        .await;

    let entity = json!({"id": 3});
    let store = RecordingDispatcher::new();
    channels(&server).destroy_one(entity.clone()).run(store.clone()).await;

    assert_eq!(
        store.action_values(),
        [
            json!({"type": "CHANNEL_DESTROY_START", "channel": entity}),
            json!({
                "type": "CHANNEL_DESTROY_ERROR",
                "data": entity,
                "error": {"message": "not found"},
            }),
        ]
    );
}

#[tokio::test]
async fn test_unreachable_host_reports_message() {
    // Nothing listens on port 9 of localhost in the test environment
    let actions = PrimaryActions::new(
        "channel",
        &HostConfig::new("http://127.0.0.1:9"),
        Transport::http(ResponseSchemas::default()),
        test_environment(),
    )
    .unwrap();

    let store = RecordingDispatcher::new();
    let terminal = actions.find_one(1).run(store.clone()).await;

    assert_eq!(terminal.action_type, "CHANNEL_FIND_ERROR");
    assert!(terminal.error().unwrap()["message"].is_string());
}

#[test]
fn test_construction_errors() {
    use crud_actions_core::ConstructionError;

    let missing_host = PrimaryActions::new(
        "channel",
        &HostConfig::default(),
        Transport::http(ResponseSchemas::default()),
        test_environment(),
    );
    assert!(matches!(missing_host, Err(ConstructionError::MissingHost)));

    let bad_name = PrimaryActions::new(
        "not a name",
        &HostConfig::new("http://example.com"),
        Transport::http(ResponseSchemas::default()),
        test_environment(),
    );
    assert!(matches!(
        bad_name,
        Err(ConstructionError::InvalidModelName { .. })
    ));
}

#[tokio::test]
async fn test_concurrent_creates_keep_their_own_lifecycle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/channels"))
        .and(body_json(json!({"name": "slow"})))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"data": {"id": 1}}))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/channels"))
        .and(body_json(json!({"name": "fast"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": 2}})))
        .expect(1)
        .mount(&server)
        .await;

    let actions = PrimaryActions::new(
        "channel",
        &HostConfig::new(server.uri()),
        Transport::http(ResponseSchemas::default()),
        test_environment().with_ids(Arc::new(SequentialIdGenerator::new())),
    )
    .unwrap();

    let store = RecordingDispatcher::new();
    let (slow, fast) = join(
        actions.create_one(json!({"name": "slow"})).run(store.clone()),
        actions.create_one(json!({"name": "fast"})).run(store.clone()),
    )
    .await;

    let slow_entity = json!({"name": "slow", "tmpId": "tmp-1"});
    let fast_entity = json!({"name": "fast", "tmpId": "tmp-2"});
    assert_eq!(
        slow.to_value(),
        json!({"type": "CHANNEL_CREATE_SUCCESS", "channel": slow_entity})
    );
    assert_eq!(
        fast.to_value(),
        json!({"type": "CHANNEL_CREATE_SUCCESS", "channel": fast_entity})
    );
    assert_eq!(
        store.action_values(),
        [
            json!({"type": "CHANNEL_CREATE_START", "channel": slow_entity}),
            json!({"type": "CHANNEL_CREATE_START", "channel": fast_entity}),
            json!({"type": "CHANNEL_CREATE_SUCCESS", "channel": fast_entity}),
            json!({"type": "CHANNEL_CREATE_SUCCESS", "channel": slow_entity}),
        ]
    );
}
