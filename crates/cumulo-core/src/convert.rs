// ── Wire → domain conversions ──
//
// Conversions return `None` when the wire object lacks an ID (a create
// body echoed without one, or a malformed notification) — callers skip
// those rather than storing unaddressable entities.

use serde_json::Value;

use cumulo_api::types as wire;

use crate::model::{
    Alarm, AlarmStatus, Device, DeviceState, Event, GId, Group, GroupKind, Measurement,
    MeasurementSeries, Operation, OperationStatus, Severity,
};

/// Fragments lifted into typed `Device` fields; everything else stays
/// in the passthrough map.
const LIFTED_DEVICE_FRAGMENTS: &[&str] = &[
    "c8y_IsDevice",
    "c8y_Hardware",
    "c8y_Firmware",
    "c8y_Availability",
    "com_cumulocity_model_Agent",
];

pub fn device_from_managed_object(mo: &wire::ManagedObject) -> Option<Device> {
    let id = GId::new(mo.id.clone()?);

    let hardware = mo.fragments.get("c8y_Hardware");
    let firmware = mo.fragments.get("c8y_Firmware");

    let state = mo
        .fragments
        .get("c8y_Availability")
        .and_then(|a| a.get("status"))
        .and_then(Value::as_str)
        .map_or(DeviceState::Unknown, |status| match status {
            "AVAILABLE" => DeviceState::Online,
            "UNAVAILABLE" => DeviceState::Offline,
            "MAINTENANCE" => DeviceState::Maintenance,
            _ => DeviceState::Unknown,
        });

    let child_device_ids = mo
        .child_devices
        .as_ref()
        .map(|list| {
            list.references
                .iter()
                .map(|r| GId::new(r.managed_object.id.clone()))
                .collect()
        })
        .unwrap_or_default();

    let fragments = mo
        .fragments
        .iter()
        .filter(|(k, _)| !LIFTED_DEVICE_FRAGMENTS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Some(Device {
        id,
        name: mo.name.clone(),
        device_type: mo.object_type.clone(),
        owner: mo.owner.clone(),
        state,
        serial: str_field(hardware, "serialNumber"),
        hardware_model: str_field(hardware, "model"),
        hardware_revision: str_field(hardware, "revision"),
        firmware_name: str_field(firmware, "name"),
        firmware_version: str_field(firmware, "version"),
        is_agent: mo.fragments.contains_key("com_cumulocity_model_Agent"),
        child_device_ids,
        created_at: mo.creation_time,
        last_updated: mo.last_updated,
        fragments,
    })
}

pub fn group_from_managed_object(mo: &wire::ManagedObject) -> Option<Group> {
    let id = GId::new(mo.id.clone()?);

    let kind = match mo.object_type.as_deref() {
        Some("c8y_DeviceGroup") => GroupKind::Root,
        Some("c8y_DeviceSubgroup") => GroupKind::Subgroup,
        _ => return None,
    };

    let child_asset_ids = mo
        .child_assets
        .as_ref()
        .map(|list| {
            list.references
                .iter()
                .map(|r| GId::new(r.managed_object.id.clone()))
                .collect()
        })
        .unwrap_or_default();

    Some(Group {
        id,
        name: mo.name.clone(),
        kind,
        child_asset_ids,
    })
}

pub fn alarm_from_wire(alarm: &wire::Alarm) -> Option<Alarm> {
    let id = GId::new(alarm.id.clone()?);

    Some(Alarm {
        id,
        source_id: alarm.source.as_ref().map(|s| GId::new(s.id.clone())),
        source_name: alarm.source.as_ref().and_then(|s| s.name.clone()),
        alarm_type: alarm.alarm_type.clone(),
        text: alarm.text.clone(),
        // Unknown strings from the wire degrade to None, not an error.
        severity: alarm
            .severity
            .as_deref()
            .and_then(|s| s.parse::<Severity>().ok()),
        status: alarm
            .status
            .as_deref()
            .and_then(|s| s.parse::<AlarmStatus>().ok()),
        time: alarm.time,
        count: alarm.count.unwrap_or(1),
        first_occurrence: alarm.first_occurrence_time,
    })
}

pub fn event_from_wire(event: &wire::Event) -> Option<Event> {
    let id = GId::new(event.id.clone()?);

    Some(Event {
        id,
        source_id: event.source.as_ref().map(|s| GId::new(s.id.clone())),
        source_name: event.source.as_ref().and_then(|s| s.name.clone()),
        event_type: event.event_type.clone(),
        text: event.text.clone(),
        time: event.time,
        fragments: event.fragments.clone().into_iter().collect(),
    })
}

pub fn operation_from_wire(op: &wire::Operation) -> Option<Operation> {
    let id = GId::new(op.id.clone()?);

    Some(Operation {
        id,
        device_id: op.device_id.clone().map(GId::new),
        status: op
            .status
            .as_deref()
            .and_then(|s| s.parse::<OperationStatus>().ok()),
        failure_reason: op.failure_reason.clone(),
        created_at: op.creation_time,
        fragments: op.fragments.clone().into_iter().collect(),
    })
}

pub fn measurement_from_wire(m: &wire::Measurement) -> Option<Measurement> {
    let id = GId::new(m.id.clone()?);

    // Walk `{fragment: {series: {value, unit}}}` two levels deep;
    // anything without a numeric `value` is not a series.
    let mut series = Vec::new();
    for (fragment, body) in &m.fragments {
        let Some(obj) = body.as_object() else { continue };
        for (series_key, cell) in obj {
            if let Some(value) = cell.get("value").and_then(Value::as_f64) {
                series.push(MeasurementSeries {
                    fragment: fragment.clone(),
                    series: series_key.clone(),
                    value,
                    unit: cell.get("unit").and_then(Value::as_str).map(String::from),
                });
            }
        }
    }

    Some(Measurement {
        id,
        source_id: m.source.as_ref().map(|s| GId::new(s.id.clone())),
        measurement_type: m.measurement_type.clone(),
        time: m.time,
        series,
    })
}

fn str_field(fragment: Option<&Value>, key: &str) -> Option<String> {
    fragment?
        .get(key)
        .and_then(Value::as_str)
        .map(String::from)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn device_conversion_lifts_fragments() {
        let mo: wire::ManagedObject = serde_json::from_value(json!({
            "id": "4201",
            "name": "pump-17",
            "type": "c8y_Linux",
            "owner": "device_pmp0017",
            "c8y_IsDevice": {},
            "com_cumulocity_model_Agent": {},
            "c8y_Hardware": { "serialNumber": "PMP-0017", "model": "P300", "revision": "rev2" },
            "c8y_Firmware": { "name": "pumpos", "version": "3.1.4" },
            "c8y_Availability": { "status": "AVAILABLE" },
            "c8y_Position": { "lat": 51.2, "lng": 6.7 },
            "childDevices": { "references": [ { "managedObject": { "id": "4300" } } ] }
        }))
        .unwrap();

        let device = device_from_managed_object(&mo).unwrap();
        assert_eq!(device.id, GId::new("4201"));
        assert_eq!(device.serial.as_deref(), Some("PMP-0017"));
        assert_eq!(device.firmware_version.as_deref(), Some("3.1.4"));
        assert_eq!(device.state, DeviceState::Online);
        assert!(device.is_agent);
        assert_eq!(device.child_device_ids, vec![GId::new("4300")]);
        // Lifted fragments are gone, the rest survive.
        assert!(!device.fragments.contains_key("c8y_Hardware"));
        assert!(device.fragments.contains_key("c8y_Position"));
    }

    #[test]
    fn device_without_id_is_skipped() {
        let mo = wire::ManagedObject::default();
        assert!(device_from_managed_object(&mo).is_none());
    }

    #[test]
    fn group_conversion_requires_group_type() {
        let group_mo: wire::ManagedObject = serde_json::from_value(json!({
            "id": "10",
            "name": "Plant",
            "type": "c8y_DeviceGroup",
            "childAssets": { "references": [ { "managedObject": { "id": "4201" } } ] }
        }))
        .unwrap();
        let group = group_from_managed_object(&group_mo).unwrap();
        assert_eq!(group.kind, GroupKind::Root);
        assert_eq!(group.child_asset_ids, vec![GId::new("4201")]);

        let device_mo: wire::ManagedObject = serde_json::from_value(json!({
            "id": "11", "type": "c8y_Linux"
        }))
        .unwrap();
        assert!(group_from_managed_object(&device_mo).is_none());
    }

    #[test]
    fn alarm_conversion_parses_enums_leniently() {
        let alarm: wire::Alarm = serde_json::from_value(json!({
            "id": "9001",
            "source": { "id": "4201", "name": "pump-17" },
            "severity": "MAJOR",
            "status": "SOMETHING_NEW",
            "count": 3
        }))
        .unwrap();

        let domain = alarm_from_wire(&alarm).unwrap();
        assert_eq!(domain.severity, Some(Severity::Major));
        assert_eq!(domain.status, None);
        assert_eq!(domain.count, 3);
        assert_eq!(domain.source_name.as_deref(), Some("pump-17"));
    }

    #[test]
    fn measurement_conversion_flattens_series() {
        let m: wire::Measurement = serde_json::from_value(json!({
            "id": "77",
            "source": { "id": "4201" },
            "type": "c8y_EnvironmentMeasurement",
            "time": "2026-03-01T08:00:00Z",
            "c8y_EnvironmentMeasurement": {
                "temperature": { "value": 21.5, "unit": "C" },
                "humidity": { "value": 40.0, "unit": "%RH" }
            }
        }))
        .unwrap();

        let domain = measurement_from_wire(&m).unwrap();
        assert_eq!(domain.series.len(), 2);
        assert_eq!(
            domain.value("c8y_EnvironmentMeasurement", "temperature"),
            Some(21.5)
        );
    }
}
