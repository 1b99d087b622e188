//! REST wire types for the Cumulocity platform APIs.
//!
//! All types match the JSON bodies exchanged with the tenant endpoints.
//! Field names use camelCase via `#[serde(rename_all = "camelCase")]`.
//! Custom fragments (anything the platform or an application attaches
//! beyond the modeled fields) are kept in a `#[serde(flatten)]` map so
//! nothing is silently dropped.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Pagination ───────────────────────────────────────────────────────

/// Paging statistics attached to every collection response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagingStatistics {
    pub page_size: i32,
    pub current_page: i32,
    /// Only present when the request asked for `withTotalPages=true`.
    #[serde(default)]
    pub total_pages: Option<i32>,
}

/// A single page of a collection resource.
///
/// The platform names the item array after the resource
/// (`managedObjects`, `alarms`, …), so each collection type maps its
/// array into this shared shape via `Page::items`.
pub trait Page {
    type Item;

    fn into_items(self) -> Vec<Self::Item>;
    fn statistics(&self) -> &PagingStatistics;
}

macro_rules! collection {
    ($name:ident, $key:literal, $item:ty) => {
        #[derive(Debug, Clone, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            #[serde(rename = $key)]
            pub items: Vec<$item>,
            pub statistics: PagingStatistics,
            /// URL of the next page, absent on the last one.
            #[serde(default)]
            pub next: Option<String>,
        }

        impl Page for $name {
            type Item = $item;

            fn into_items(self) -> Vec<$item> {
                self.items
            }

            fn statistics(&self) -> &PagingStatistics {
                &self.statistics
            }
        }
    };
}

collection!(ManagedObjectCollection, "managedObjects", ManagedObject);
collection!(ManagedObjectReferenceCollection, "references", ManagedObjectReference);
collection!(AlarmCollection, "alarms", Alarm);
collection!(EventCollection, "events", Event);
collection!(OperationCollection, "operations", Operation);
collection!(MeasurementCollection, "measurements", Measurement);
collection!(ExternalIdCollection, "externalIds", ExternalId);
collection!(NewDeviceRequestCollection, "newDeviceRequests", NewDeviceRequest);

// ── Managed objects ──────────────────────────────────────────────────

/// A managed object — the platform's generic asset record (device,
/// group, or any other entity), extensible with custom fragments.
///
/// The same type serves as POST/PUT body: server-assigned fields are
/// `Option` and skipped when absent, so a create body carries only
/// what the caller set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Application-defined type, e.g. `"c8y_Linux"`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_assets: Option<ReferenceList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_devices: Option<ReferenceList>,
    /// Everything else: `c8y_IsDevice`, `c8y_Hardware`, availability,
    /// application fragments.
    #[serde(flatten)]
    pub fragments: HashMap<String, Value>,
}

impl ManagedObject {
    /// Whether the marker fragment for a device is present.
    pub fn is_device(&self) -> bool {
        self.fragments.contains_key("c8y_IsDevice")
    }

    /// Whether the marker fragment for a device group is present.
    pub fn is_group(&self) -> bool {
        self.object_type.as_deref() == Some("c8y_DeviceGroup")
            || self.object_type.as_deref() == Some("c8y_DeviceSubgroup")
    }
}

/// Inline reference list embedded in a managed object
/// (`childAssets` / `childDevices`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceList {
    #[serde(default)]
    pub references: Vec<ManagedObjectReference>,
}

/// A reference to another managed object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedObjectReference {
    pub managed_object: SourceRef,
}

/// Minimal managed-object reference: id plus optional name.
///
/// Used both inside reference lists and as the `source` of alarms,
/// events, and measurements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl SourceRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }
}

// ── Alarms ───────────────────────────────────────────────────────────

/// An alarm raised against a source managed object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alarm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceRef>,
    /// Application alarm type, e.g. `"c8y_UnavailabilityAlarm"`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub alarm_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// One of: `CRITICAL`, `MAJOR`, `MINOR`, `WARNING`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    /// One of: `ACTIVE`, `ACKNOWLEDGED`, `CLEARED`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateTime<Utc>>,
    /// De-duplication counter: how often this alarm re-occurred while active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_occurrence_time: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub fragments: HashMap<String, Value>,
}

// ── Events ───────────────────────────────────────────────────────────

/// An event recorded against a source managed object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceRef>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub fragments: HashMap<String, Value>,
}

// ── Operations ───────────────────────────────────────────────────────

/// A device-control operation queued for an agent.
///
/// The actual instruction lives in a fragment (`c8y_Restart`,
/// `c8y_Command`, …); the modeled fields are the delivery envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Target device (managed object) ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// One of: `PENDING`, `EXECUTING`, `SUCCESSFUL`, `FAILED`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub fragments: HashMap<String, Value>,
}

// ── Measurements ─────────────────────────────────────────────────────

/// A measurement: one or more series values under fragment keys, e.g.
/// `{"c8y_TemperatureMeasurement": {"T": {"value": 21.5, "unit": "C"}}}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceRef>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub measurement_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub fragments: HashMap<String, Value>,
}

impl Measurement {
    /// Extract a single series value, e.g. `value_of("c8y_TemperatureMeasurement", "T")`.
    pub fn value_of(&self, fragment: &str, series: &str) -> Option<f64> {
        self.fragments
            .get(fragment)?
            .get(series)?
            .get("value")?
            .as_f64()
    }

    /// Extract a series unit, e.g. `"C"`.
    pub fn unit_of(&self, fragment: &str, series: &str) -> Option<&str> {
        self.fragments
            .get(fragment)?
            .get(series)?
            .get("unit")?
            .as_str()
    }
}

// ── Identity ─────────────────────────────────────────────────────────

/// An external identifier mapped to a managed object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalId {
    pub external_id: String,
    /// Identifier namespace, e.g. `"c8y_Serial"`.
    #[serde(rename = "type")]
    pub id_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_object: Option<SourceRef>,
}

// ── Provisioning ─────────────────────────────────────────────────────

/// A new-device request in the registration workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDeviceRequest {
    /// The device's self-declared ID (often its serial number).
    pub id: String,
    /// One of: `WAITING_FOR_CONNECTION`, `PENDING_ACCEPTANCE`, `ACCEPTED`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateTime<Utc>>,
}

/// Credentials issued to a device once its request is accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCredentials {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

// ── Users ────────────────────────────────────────────────────────────

/// The authenticated user, from `GET /user/currentUser`.
///
/// Fetched once during connect as a credential check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub user_name: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn managed_object_roundtrips_fragments() {
        let raw = json!({
            "id": "4201",
            "name": "pump-17",
            "type": "c8y_Linux",
            "c8y_IsDevice": {},
            "c8y_Hardware": { "serialNumber": "PMP-0017" }
        });

        let mo: ManagedObject = serde_json::from_value(raw).unwrap();
        assert!(mo.is_device());
        assert!(!mo.is_group());
        assert_eq!(
            mo.fragments["c8y_Hardware"]["serialNumber"],
            json!("PMP-0017")
        );

        // Serializing a create body must not emit server-only nulls.
        let body = serde_json::to_value(ManagedObject {
            name: Some("pump-18".into()),
            ..ManagedObject::default()
        })
        .unwrap();
        assert_eq!(body, json!({ "name": "pump-18" }));
    }

    #[test]
    fn measurement_series_extraction() {
        let raw = json!({
            "id": "77",
            "source": { "id": "4201" },
            "type": "c8y_TemperatureMeasurement",
            "time": "2026-03-01T08:00:00Z",
            "c8y_TemperatureMeasurement": {
                "T": { "value": 21.5, "unit": "C" }
            }
        });

        let m: Measurement = serde_json::from_value(raw).unwrap();
        assert_eq!(m.value_of("c8y_TemperatureMeasurement", "T"), Some(21.5));
        assert_eq!(m.unit_of("c8y_TemperatureMeasurement", "T"), Some("C"));
        assert_eq!(m.value_of("c8y_TemperatureMeasurement", "missing"), None);
    }

    #[test]
    fn collection_page_trait_exposes_items() {
        let raw = json!({
            "alarms": [
                { "id": "1", "severity": "MAJOR", "status": "ACTIVE" }
            ],
            "statistics": { "pageSize": 5, "currentPage": 1, "totalPages": 1 }
        });

        let page: AlarmCollection = serde_json::from_value(raw).unwrap();
        assert_eq!(page.statistics().current_page, 1);
        let items = page.into_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].severity.as_deref(), Some("MAJOR"));
    }
}
