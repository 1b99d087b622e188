// Integration tests for the realtime long-poll subscriber using wiremock.
//
// The connect loop is exercised end-to-end: handshake, subscribe, a
// poll that delivers data, and both termination paths (server error
// vs. cancellation).

use std::time::Duration;

use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cumulo_api::realtime::{RealtimeHandle, RealtimeSession, SubscriptionState};
use cumulo_api::{ApiClient, Error};

async fn setup() -> (MockServer, RealtimeSession) {
    let server = MockServer::start().await;
    let api = ApiClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    let session = RealtimeSession::from_api_client(&api).unwrap();
    (server, session)
}

fn handshake_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!([{
        "channel": "/meta/handshake",
        "successful": true,
        "clientId": "client-1",
        "version": "1.0"
    }]))
}

fn subscribe_ok(subscription: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!([{
        "channel": "/meta/subscribe",
        "successful": true,
        "subscription": subscription
    }]))
}

async fn mount_meta(server: &MockServer, channel: &str, resp: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/cep/realtime"))
        .and(body_partial_json(json!([{ "channel": channel }])))
        .respond_with(resp)
        .mount(server)
        .await;
}

// ── Handshake / subscribe ───────────────────────────────────────────

#[tokio::test]
async fn handshake_caches_client_id() {
    let (server, mut session) = setup().await;
    mount_meta(&server, "/meta/handshake", handshake_ok()).await;

    session.handshake().await.unwrap();
    assert_eq!(session.client_id(), Some("client-1"));
}

#[tokio::test]
async fn failed_handshake_clears_cached_client_id() {
    let (server, mut session) = setup().await;

    mount_meta(&server, "/meta/handshake", handshake_ok()).await;
    session.handshake().await.unwrap();
    assert!(session.client_id().is_some());

    // Replace the mock: the next handshake is rejected.
    server.reset().await;
    mount_meta(
        &server,
        "/meta/handshake",
        ResponseTemplate::new(200).set_body_json(json!([{
            "channel": "/meta/handshake",
            "successful": false,
            "error": "403::Handshake denied"
        }])),
    )
    .await;

    let err = session.handshake().await.unwrap_err();
    assert!(matches!(err, Error::Realtime { phase: "handshake", .. }));
    assert_eq!(session.client_id(), None);
}

#[tokio::test]
async fn subscribe_without_handshake_is_rejected_locally() {
    let (_server, session) = setup().await;

    let err = session.subscribe("/alarms/*").await.unwrap_err();
    assert!(matches!(err, Error::Realtime { phase: "subscribe", .. }));
}

#[tokio::test]
async fn unsuccessful_subscribe_surfaces_error() {
    let (server, mut session) = setup().await;

    mount_meta(&server, "/meta/handshake", handshake_ok()).await;
    mount_meta(
        &server,
        "/meta/subscribe",
        ResponseTemplate::new(200).set_body_json(json!([{
            "channel": "/meta/subscribe",
            "successful": false,
            "error": "404::Channel unknown"
        }])),
    )
    .await;

    session.handshake().await.unwrap();
    let err = session.subscribe("/bogus/*").await.unwrap_err();
    match err {
        Error::Realtime { phase, message } => {
            assert_eq!(phase, "subscribe");
            assert!(message.contains("Channel unknown"));
        }
        other => panic!("expected Realtime error, got {other:?}"),
    }
}

// ── Connect loop ────────────────────────────────────────────────────

#[tokio::test]
async fn connect_loop_emits_payloads_then_dies_on_error() {
    let (server, session) = setup().await;

    mount_meta(&server, "/meta/handshake", handshake_ok()).await;
    mount_meta(&server, "/meta/subscribe", subscribe_ok("/alarms/*")).await;

    // First poll delivers one alarm notification, every later poll
    // fails — the loop must broadcast the payload, then terminate
    // without restarting. The delay keeps the poll in flight until the
    // test has subscribed its receiver.
    Mock::given(method("POST"))
        .and(path("/cep/realtime"))
        .and(body_partial_json(json!([{ "channel": "/meta/connect" }])))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(200))
                .set_body_json(json!([
                    { "channel": "/meta/connect", "successful": true },
                    {
                        "channel": "/alarms/4201",
                        "data": {
                            "realtimeAction": "UPDATE",
                            "data": { "id": "9001", "status": "ACKNOWLEDGED" }
                        }
                    }
                ])),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/cep/realtime"))
        .and(body_partial_json(json!([{ "channel": "/meta/connect" }])))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let handle = RealtimeHandle::start(session, &["/alarms/*".into()], cancel)
        .await
        .unwrap();

    let mut rx = handle.subscribe();
    let msg = rx.recv().await.unwrap();
    assert_eq!(msg.channel, "/alarms/4201");
    assert_eq!(msg.action.as_deref(), Some("UPDATE"));
    assert_eq!(msg.body["status"], "ACKNOWLEDGED");

    let mut state = handle.state();
    state
        .wait_for(|s| *s == SubscriptionState::Stopped { error: true })
        .await
        .unwrap();
}

#[tokio::test]
async fn shutdown_stops_loop_between_polls() {
    let (server, session) = setup().await;

    mount_meta(&server, "/meta/handshake", handshake_ok()).await;
    mount_meta(&server, "/meta/subscribe", subscribe_ok("/operations/*")).await;
    mount_meta(
        &server,
        "/meta/connect",
        ResponseTemplate::new(200)
            .set_delay(Duration::from_millis(20))
            .set_body_json(json!([
                { "channel": "/meta/connect", "successful": true }
            ])),
    )
    .await;

    let cancel = CancellationToken::new();
    let handle = RealtimeHandle::start(session, &["/operations/*".into()], cancel)
        .await
        .unwrap();

    handle.shutdown();

    let mut state = handle.state();
    state
        .wait_for(|s| matches!(s, SubscriptionState::Stopped { error: false }))
        .await
        .unwrap();
}

#[tokio::test]
async fn start_fails_fast_when_handshake_fails() {
    let (server, session) = setup().await;

    mount_meta(
        &server,
        "/meta/handshake",
        ResponseTemplate::new(503).set_body_string("unavailable"),
    )
    .await;

    let cancel = CancellationToken::new();
    let err = RealtimeHandle::start(session, &["/alarms/*".into()], cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Realtime { phase: "handshake", .. }));
}
