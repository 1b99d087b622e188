// ── Central reactive data store ──
//
// Thread-safe storage for all domain entities. Mutations are broadcast
// to subscribers via `watch` channels.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::collection::EntityCollection;
use crate::model::{Alarm, AssetTree, Device, Event, GId, Group, Operation};
use crate::stream::EntityStream;

/// A full-refresh result, applied to the store in one shot.
pub struct RefreshSnapshot {
    pub devices: Vec<Device>,
    pub groups: Vec<Group>,
    pub alarms: Vec<Alarm>,
    pub events: Vec<Event>,
    pub operations: Vec<Operation>,
}

/// Central reactive store for all domain entities.
///
/// All reads are wait-free; writes use fine-grained per-shard locks
/// within `DashMap`. Mutations are broadcast to subscribers via
/// `watch` channels.
pub struct DataStore {
    pub(crate) devices: EntityCollection<Device>,
    pub(crate) groups: EntityCollection<Group>,
    pub(crate) alarms: EntityCollection<Alarm>,
    pub(crate) events: EntityCollection<Event>,
    pub(crate) operations: EntityCollection<Operation>,
    pub(crate) last_full_refresh: watch::Sender<Option<DateTime<Utc>>>,
    pub(crate) last_realtime_message: watch::Sender<Option<DateTime<Utc>>>,
}

impl DataStore {
    pub fn new() -> Self {
        let (last_full_refresh, _) = watch::channel(None);
        let (last_realtime_message, _) = watch::channel(None);

        Self {
            devices: EntityCollection::new(),
            groups: EntityCollection::new(),
            alarms: EntityCollection::new(),
            events: EntityCollection::new(),
            operations: EntityCollection::new(),
            last_full_refresh,
            last_realtime_message,
        }
    }

    /// Apply a full-refresh snapshot: each collection is replaced in a
    /// single mutation, so subscribers get one notification per
    /// collection rather than one per entity.
    pub fn apply_refresh(&self, snapshot: RefreshSnapshot) {
        self.devices
            .replace_all(snapshot.devices.into_iter().map(|d| (d.id.clone(), d)));
        self.groups
            .replace_all(snapshot.groups.into_iter().map(|g| (g.id.clone(), g)));
        self.alarms
            .replace_all(snapshot.alarms.into_iter().map(|a| (a.id.clone(), a)));
        self.events
            .replace_all(snapshot.events.into_iter().map(|e| (e.id.clone(), e)));
        self.operations
            .replace_all(snapshot.operations.into_iter().map(|o| (o.id.clone(), o)));
        self.last_full_refresh
            .send_modify(|t| *t = Some(Utc::now()));
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn devices_snapshot(&self) -> Arc<Vec<Arc<Device>>> {
        self.devices.snapshot()
    }

    pub fn groups_snapshot(&self) -> Arc<Vec<Arc<Group>>> {
        self.groups.snapshot()
    }

    pub fn alarms_snapshot(&self) -> Arc<Vec<Arc<Alarm>>> {
        self.alarms.snapshot()
    }

    pub fn events_snapshot(&self) -> Arc<Vec<Arc<Event>>> {
        self.events.snapshot()
    }

    pub fn operations_snapshot(&self) -> Arc<Vec<Arc<Operation>>> {
        self.operations.snapshot()
    }

    /// Materialize the asset tree from the current group + device
    /// snapshots.
    pub fn asset_tree(&self) -> AssetTree {
        AssetTree::build(&self.groups_snapshot(), &self.devices_snapshot())
    }

    // ── Single-entity lookups ────────────────────────────────────────

    pub fn device_by_id(&self, id: &GId) -> Option<Arc<Device>> {
        self.devices.get(id)
    }

    pub fn group_by_id(&self, id: &GId) -> Option<Arc<Group>> {
        self.groups.get(id)
    }

    pub fn alarm_by_id(&self, id: &GId) -> Option<Arc<Alarm>> {
        self.alarms.get(id)
    }

    pub fn operation_by_id(&self, id: &GId) -> Option<Arc<Operation>> {
        self.operations.get(id)
    }

    // ── Count accessors ──────────────────────────────────────────────

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn alarm_count(&self) -> usize {
        self.alarms.len()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_devices(&self) -> EntityStream<Device> {
        EntityStream::new(self.devices.subscribe())
    }

    pub fn subscribe_groups(&self) -> EntityStream<Group> {
        EntityStream::new(self.groups.subscribe())
    }

    pub fn subscribe_alarms(&self) -> EntityStream<Alarm> {
        EntityStream::new(self.alarms.subscribe())
    }

    pub fn subscribe_events(&self) -> EntityStream<Event> {
        EntityStream::new(self.events.subscribe())
    }

    pub fn subscribe_operations(&self) -> EntityStream<Operation> {
        EntityStream::new(self.operations.subscribe())
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn last_full_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_full_refresh.borrow()
    }

    pub fn mark_realtime_message(&self) {
        self.last_realtime_message
            .send_modify(|t| *t = Some(Utc::now()));
    }

    pub fn last_realtime_message(&self) -> Option<DateTime<Utc>> {
        *self.last_realtime_message.borrow()
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{DeviceState, GroupKind};

    fn device(id: &str) -> Device {
        Device {
            id: GId::new(id),
            name: Some(format!("dev-{id}")),
            device_type: None,
            owner: None,
            state: DeviceState::Online,
            serial: None,
            hardware_model: None,
            hardware_revision: None,
            firmware_name: None,
            firmware_version: None,
            is_agent: false,
            child_device_ids: Vec::new(),
            created_at: None,
            last_updated: None,
            fragments: serde_json::Map::new(),
        }
    }

    #[test]
    fn apply_refresh_replaces_collections() {
        let store = DataStore::new();
        store.devices.upsert(GId::new("stale"), device("stale"));

        store.apply_refresh(RefreshSnapshot {
            devices: vec![device("1"), device("2")],
            groups: vec![Group {
                id: GId::new("10"),
                name: Some("Plant".into()),
                kind: GroupKind::Root,
                child_asset_ids: vec![GId::new("1")],
            }],
            alarms: Vec::new(),
            events: Vec::new(),
            operations: Vec::new(),
        });

        assert_eq!(store.device_count(), 2);
        assert!(store.device_by_id(&GId::new("stale")).is_none());
        assert!(store.last_full_refresh().is_some());

        let tree = store.asset_tree();
        assert_eq!(tree.device_count(), 1);
        assert_eq!(tree.orphan_device_ids.len(), 1);
    }
}
