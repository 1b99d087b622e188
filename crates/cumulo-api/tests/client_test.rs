// Integration tests for `ApiClient` using wiremock.

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cumulo_api::alarms::AlarmQuery;
use cumulo_api::inventory::InventoryQuery;
use cumulo_api::operations::OperationQuery;
use cumulo_api::types::{
    Alarm, ManagedObject, ManagedObjectCollection, Operation, SourceRef,
};
use cumulo_api::{ApiClient, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let client = ApiClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_list_managed_objects_with_filters() {
    let (server, client) = setup().await;

    let body = json!({
        "managedObjects": [
            {
                "id": "4201",
                "name": "pump-17",
                "type": "c8y_Linux",
                "c8y_IsDevice": {}
            },
            {
                "id": "4202",
                "name": "pump-18",
                "type": "c8y_Linux",
                "c8y_IsDevice": {}
            }
        ],
        "statistics": { "pageSize": 100, "currentPage": 1, "totalPages": 1 }
    });

    Mock::given(method("GET"))
        .and(path("/inventory/managedObjects"))
        .and(query_param("fragmentType", "c8y_IsDevice"))
        .and(query_param("currentPage", "1"))
        .and(query_param("pageSize", "100"))
        .and(query_param("withTotalPages", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let page = client
        .list_managed_objects(&InventoryQuery::devices(), 1, 100)
        .await
        .unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].name.as_deref(), Some("pump-17"));
    assert!(page.items[0].is_device());
}

#[tokio::test]
async fn test_get_managed_object_keeps_fragments() {
    let (server, client) = setup().await;

    let body = json!({
        "id": "4201",
        "name": "pump-17",
        "type": "c8y_Linux",
        "owner": "device_pmp0017",
        "lastUpdated": "2026-03-01T08:00:00Z",
        "c8y_IsDevice": {},
        "c8y_Hardware": { "serialNumber": "PMP-0017", "model": "P300" },
        "c8y_Availability": { "status": "AVAILABLE" }
    });

    Mock::given(method("GET"))
        .and(path("/inventory/managedObjects/4201"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let mo = client.get_managed_object("4201").await.unwrap();

    assert_eq!(mo.id.as_deref(), Some("4201"));
    assert_eq!(mo.owner.as_deref(), Some("device_pmp0017"));
    assert_eq!(
        mo.fragments["c8y_Availability"]["status"],
        json!("AVAILABLE")
    );
}

#[tokio::test]
async fn test_create_alarm() {
    let (server, client) = setup().await;

    let response = json!({
        "id": "9001",
        "source": { "id": "4201" },
        "type": "c8y_HighTemperature",
        "text": "Temperature above threshold",
        "severity": "MAJOR",
        "status": "ACTIVE",
        "time": "2026-03-01T08:00:00Z",
        "count": 1
    });

    Mock::given(method("POST"))
        .and(path("/alarm/alarms"))
        .respond_with(ResponseTemplate::new(201).set_body_json(&response))
        .mount(&server)
        .await;

    let alarm = client
        .create_alarm(&Alarm {
            source: Some(SourceRef::new("4201")),
            alarm_type: Some("c8y_HighTemperature".into()),
            text: Some("Temperature above threshold".into()),
            severity: Some("MAJOR".into()),
            ..Alarm::default()
        })
        .await
        .unwrap();

    assert_eq!(alarm.id.as_deref(), Some("9001"));
    assert_eq!(alarm.status.as_deref(), Some("ACTIVE"));
    assert_eq!(alarm.count, Some(1));
}

#[tokio::test]
async fn test_list_alarms_filters_as_query_params() {
    let (server, client) = setup().await;

    let body = json!({
        "alarms": [],
        "statistics": { "pageSize": 50, "currentPage": 1, "totalPages": 0 }
    });

    Mock::given(method("GET"))
        .and(path("/alarm/alarms"))
        .and(query_param("source", "4201"))
        .and(query_param("severity", "CRITICAL"))
        .and(query_param("status", "ACTIVE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let query = AlarmQuery {
        source: Some("4201".into()),
        severity: Some("CRITICAL".into()),
        status: Some("ACTIVE".into()),
        ..AlarmQuery::default()
    };

    let page = client.list_alarms(&query, 1, 50).await.unwrap();
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn test_operation_lifecycle_bodies() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/devicecontrol/operations"))
        .and(body_json(json!({
            "deviceId": "4201",
            "c8y_Restart": {}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "701",
            "deviceId": "4201",
            "status": "PENDING",
            "c8y_Restart": {}
        })))
        .mount(&server)
        .await;

    let mut op = Operation {
        device_id: Some("4201".into()),
        ..Operation::default()
    };
    op.fragments.insert("c8y_Restart".into(), json!({}));

    let created = client.create_operation(&op).await.unwrap();
    assert_eq!(created.status.as_deref(), Some("PENDING"));

    Mock::given(method("PUT"))
        .and(path("/devicecontrol/operations/701"))
        .and(body_json(json!({ "status": "FAILED", "failureReason": "device offline" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "701",
            "deviceId": "4201",
            "status": "FAILED",
            "failureReason": "device offline"
        })))
        .mount(&server)
        .await;

    let failed = client
        .update_operation(
            "701",
            &Operation {
                status: Some("FAILED".into()),
                failure_reason: Some("device offline".into()),
                ..Operation::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(failed.failure_reason.as_deref(), Some("device offline"));
}

#[tokio::test]
async fn test_list_operations_by_device_and_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/devicecontrol/operations"))
        .and(query_param("deviceId", "4201"))
        .and(query_param("status", "PENDING"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "operations": [
                { "id": "701", "deviceId": "4201", "status": "PENDING" }
            ],
            "statistics": { "pageSize": 20, "currentPage": 1, "totalPages": 1 }
        })))
        .mount(&server)
        .await;

    let query = OperationQuery {
        device_id: Some("4201".into()),
        status: Some("PENDING".into()),
        ..OperationQuery::default()
    };
    let page = client.list_operations(&query, 1, 20).await.unwrap();
    assert_eq!(page.items.len(), 1);
}

#[tokio::test]
async fn test_external_id_resolution() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/identity/externalIds/c8y_Serial/PMP-0017"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "externalId": "PMP-0017",
            "type": "c8y_Serial",
            "managedObject": { "id": "4201" }
        })))
        .mount(&server)
        .await;

    let ext = client
        .get_external_id("c8y_Serial", "PMP-0017")
        .await
        .unwrap();

    assert_eq!(ext.external_id, "PMP-0017");
    assert_eq!(ext.managed_object.unwrap().id, "4201");
}

#[tokio::test]
async fn test_child_asset_linking() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/inventory/managedObjects/100/childAssets"))
        .and(body_json(json!({ "managedObject": { "id": "4201" } })))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    client.add_child_asset("100", "4201").await.unwrap();

    Mock::given(method("DELETE"))
        .and(path("/inventory/managedObjects/100/childAssets/4201"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    client.remove_child_asset("100", "4201").await.unwrap();
}

#[tokio::test]
async fn test_provisioning_flow() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/devicecontrol/newDeviceRequests"))
        .and(body_json(json!({ "id": "PMP-0018" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "PMP-0018",
            "status": "WAITING_FOR_CONNECTION"
        })))
        .mount(&server)
        .await;

    let req = client.create_new_device_request("PMP-0018").await.unwrap();
    assert_eq!(req.status.as_deref(), Some("WAITING_FOR_CONNECTION"));

    Mock::given(method("PUT"))
        .and(path("/devicecontrol/newDeviceRequests/PMP-0018"))
        .and(body_json(json!({ "status": "ACCEPTED" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "PMP-0018",
            "status": "ACCEPTED"
        })))
        .mount(&server)
        .await;

    let accepted = client.accept_new_device_request("PMP-0018").await.unwrap();
    assert_eq!(accepted.status.as_deref(), Some("ACCEPTED"));
}

// ── Pagination tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_paginate_all_walks_total_pages() {
    let (server, client) = setup().await;

    let page1 = json!({
        "managedObjects": [ { "id": "1" }, { "id": "2" } ],
        "statistics": { "pageSize": 2, "currentPage": 1, "totalPages": 2 }
    });
    let page2 = json!({
        "managedObjects": [ { "id": "3" } ],
        "statistics": { "pageSize": 2, "currentPage": 2, "totalPages": 2 }
    });

    Mock::given(method("GET"))
        .and(path("/inventory/managedObjects"))
        .and(query_param("currentPage", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page1))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/inventory/managedObjects"))
        .and(query_param("currentPage", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page2))
        .mount(&server)
        .await;

    let query = InventoryQuery::default();
    let all: Vec<ManagedObject> = client
        .paginate_all::<ManagedObjectCollection, _, _>(2, |page, size| {
            client.list_managed_objects(&query, page, size)
        })
        .await
        .unwrap();

    assert_eq!(all.len(), 3);
    assert_eq!(all[2].id.as_deref(), Some("3"));
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_error_401_maps_to_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "security/Unauthorized",
            "message": "Invalid credentials"
        })))
        .mount(&server)
        .await;

    let err = client.get_managed_object("1").await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }));
    assert!(err.is_auth_failure());
}

#[tokio::test]
async fn test_error_envelope_carries_platform_code() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "inventory/notFound",
            "message": "Finding device data from database failed"
        })))
        .mount(&server)
        .await;

    let err = client.get_managed_object("9999").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.api_error_code(), Some("inventory/notFound"));
}

#[tokio::test]
async fn test_deserialization_error_preserves_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = client.get_managed_object("1").await.unwrap_err();
    match err {
        Error::Deserialization { body, .. } => assert!(body.contains("not json")),
        other => panic!("expected Deserialization, got {other:?}"),
    }
}
