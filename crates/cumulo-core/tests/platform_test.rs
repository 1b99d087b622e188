// End-to-end Platform tests against a wiremock tenant.

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cumulo_core::{
    Command, CommandResult, ConnectionState, CoreError, GId, Platform, PlatformConfig, Severity,
    TenantCredentials, TlsVerification,
};

fn empty_collection(key: &str) -> serde_json::Value {
    json!({
        key: [],
        "statistics": { "pageSize": 100, "currentPage": 1, "totalPages": 0 }
    })
}

async fn mock_tenant() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/currentUser"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "userName": "alice" })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/inventory/managedObjects"))
        .and(query_param("fragmentType", "c8y_IsDevice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "managedObjects": [
                {
                    "id": "4201",
                    "name": "pump-17",
                    "type": "c8y_Linux",
                    "c8y_IsDevice": {},
                    "c8y_Availability": { "status": "AVAILABLE" }
                }
            ],
            "statistics": { "pageSize": 100, "currentPage": 1, "totalPages": 1 }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/inventory/managedObjects"))
        .and(query_param("type", "c8y_DeviceGroup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "managedObjects": [
                {
                    "id": "100",
                    "name": "Plant North",
                    "type": "c8y_DeviceGroup",
                    "childAssets": { "references": [ { "managedObject": { "id": "4201" } } ] }
                }
            ],
            "statistics": { "pageSize": 100, "currentPage": 1, "totalPages": 1 }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/inventory/managedObjects"))
        .and(query_param("type", "c8y_DeviceSubgroup"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(empty_collection("managedObjects")),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/alarm/alarms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "alarms": [
                {
                    "id": "9001",
                    "source": { "id": "4201", "name": "pump-17" },
                    "type": "c8y_HighTemperature",
                    "severity": "MAJOR",
                    "status": "ACTIVE",
                    "count": 2
                }
            ],
            "statistics": { "pageSize": 100, "currentPage": 1, "totalPages": 1 }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/event/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_collection("events")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/devicecontrol/operations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_collection("operations")))
        .mount(&server)
        .await;

    server
}

fn config_for(server: &MockServer) -> PlatformConfig {
    PlatformConfig {
        url: server.uri().parse().expect("mock server uri"),
        credentials: TenantCredentials {
            tenant: Some("t100".into()),
            username: "alice".into(),
            password: SecretString::from("pw".to_string()),
        },
        tls: TlsVerification::SystemDefaults,
        timeout: Duration::from_secs(5),
        refresh_interval_secs: 0,
        realtime_enabled: false,
        page_size: 100,
    }
}

#[tokio::test]
async fn connect_populates_store_and_asset_tree() {
    let server = mock_tenant().await;
    let platform = Platform::new(config_for(&server));

    platform.connect().await.unwrap();
    assert_eq!(
        *platform.connection_state().borrow(),
        ConnectionState::Connected
    );

    let devices = platform.devices_snapshot();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].label(), "pump-17");
    assert!(devices[0].state.is_online());

    let alarms = platform.alarms_snapshot();
    assert_eq!(alarms.len(), 1);
    assert_eq!(alarms[0].severity, Some(Severity::Major));
    assert_eq!(alarms[0].count, 2);

    let tree = platform.asset_tree();
    assert_eq!(tree.roots.len(), 1);
    assert_eq!(tree.roots[0].label, "Plant North");
    assert_eq!(tree.device_count(), 1);
    assert!(tree.orphan_device_ids.is_empty());

    platform.disconnect().await;
    assert_eq!(
        *platform.connection_state().borrow(),
        ConnectionState::Disconnected
    );
}

#[tokio::test]
async fn commands_round_trip_through_processor() {
    let server = mock_tenant().await;

    Mock::given(method("POST"))
        .and(path("/alarm/alarms"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "9002",
            "source": { "id": "4201" },
            "type": "c8y_ManualCheck",
            "text": "operator raised",
            "severity": "MINOR",
            "status": "ACTIVE",
            "count": 1
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/alarm/alarms/9002"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "9002",
            "source": { "id": "4201" },
            "type": "c8y_ManualCheck",
            "severity": "MINOR",
            "status": "CLEARED",
            "count": 1
        })))
        .mount(&server)
        .await;

    let platform = Platform::new(config_for(&server));
    platform.connect().await.unwrap();

    let result = platform
        .execute(Command::RaiseAlarm {
            source: GId::new("4201"),
            alarm_type: "c8y_ManualCheck".into(),
            text: "operator raised".into(),
            severity: Severity::Minor,
        })
        .await
        .unwrap();

    let CommandResult::Alarm(alarm) = result else {
        panic!("expected alarm result");
    };
    assert_eq!(alarm.id, GId::new("9002"));
    // The new alarm is immediately visible in the store.
    assert!(platform.store().alarm_by_id(&GId::new("9002")).is_some());

    let result = platform
        .execute(Command::ClearAlarm {
            id: GId::new("9002"),
        })
        .await
        .unwrap();
    let CommandResult::Alarm(cleared) = result else {
        panic!("expected alarm result");
    };
    assert!(cleared.status.is_some_and(|s| s.is_resolved()));

    platform.disconnect().await;
}

#[tokio::test]
async fn execute_requires_connection() {
    let server = mock_tenant().await;
    let platform = Platform::new(config_for(&server));

    let err = platform
        .execute(Command::RestartDevice {
            device_id: GId::new("4201"),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::PlatformDisconnected));
}

#[tokio::test]
async fn bad_credentials_fail_connect() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/currentUser"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "security/Unauthorized",
            "message": "Invalid credentials"
        })))
        .mount(&server)
        .await;

    let platform = Platform::new(config_for(&server));
    let err = platform.connect().await.unwrap_err();
    assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    assert_eq!(
        *platform.connection_state().borrow(),
        ConnectionState::Failed
    );
}

#[tokio::test]
async fn oneshot_connects_and_disconnects() {
    let server = mock_tenant().await;

    let count = Platform::oneshot(config_for(&server), |platform| async move {
        Ok(platform.devices_snapshot().len())
    })
    .await
    .unwrap();

    assert_eq!(count, 1);
}
