// ── Editable drafts ──
//
// View-model editors for UI forms: snapshot an entity, mutate fields,
// and produce the minimal JSON patch for a PUT. Only touched fields
// serialize, so concurrent edits to other fragments survive.

use serde_json::{Map, Value, json};

use super::device::Device;
use super::group::Group;
use super::ids::GId;

/// An editable working copy of a [`Device`].
#[derive(Debug, Clone)]
pub struct DeviceDraft {
    id: GId,
    original_name: Option<String>,
    original_type: Option<String>,
    name: Option<String>,
    device_type: Option<String>,
    /// Fragment edits staged by key; `Value::Null` marks a removal.
    fragment_edits: Map<String, Value>,
}

impl DeviceDraft {
    pub fn from_device(device: &Device) -> Self {
        Self {
            id: device.id.clone(),
            original_name: device.name.clone(),
            original_type: device.device_type.clone(),
            name: device.name.clone(),
            device_type: device.device_type.clone(),
            fragment_edits: Map::new(),
        }
    }

    pub fn id(&self) -> &GId {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn set_type(&mut self, device_type: impl Into<String>) -> &mut Self {
        self.device_type = Some(device_type.into());
        self
    }

    /// Stage a fragment write, e.g.
    /// `set_fragment("c8y_RequiredAvailability", json!({"responseInterval": 10}))`.
    pub fn set_fragment(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.fragment_edits.insert(key.into(), value);
        self
    }

    /// Stage a fragment removal (the platform deletes fragments set to null).
    pub fn remove_fragment(&mut self, key: impl Into<String>) -> &mut Self {
        self.fragment_edits.insert(key.into(), Value::Null);
        self
    }

    /// Undo all staged edits.
    pub fn revert(&mut self) {
        self.name = self.original_name.clone();
        self.device_type = self.original_type.clone();
        self.fragment_edits.clear();
    }

    pub fn is_dirty(&self) -> bool {
        self.name != self.original_name
            || self.device_type != self.original_type
            || !self.fragment_edits.is_empty()
    }

    /// The minimal PUT body for the staged edits.
    ///
    /// Empty object when nothing changed — callers should check
    /// [`is_dirty`](Self::is_dirty) first and skip the round trip.
    pub fn changes(&self) -> Value {
        let mut patch = Map::new();
        if self.name != self.original_name {
            patch.insert("name".into(), json!(self.name));
        }
        if self.device_type != self.original_type {
            patch.insert("type".into(), json!(self.device_type));
        }
        for (key, value) in &self.fragment_edits {
            patch.insert(key.clone(), value.clone());
        }
        Value::Object(patch)
    }
}

/// An editable working copy of a [`Group`] — groups only expose their
/// name for editing.
#[derive(Debug, Clone)]
pub struct GroupDraft {
    id: GId,
    original_name: Option<String>,
    name: Option<String>,
}

impl GroupDraft {
    pub fn from_group(group: &Group) -> Self {
        Self {
            id: group.id.clone(),
            original_name: group.name.clone(),
            name: group.name.clone(),
        }
    }

    pub fn id(&self) -> &GId {
        &self.id
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_dirty(&self) -> bool {
        self.name != self.original_name
    }

    pub fn changes(&self) -> Value {
        if self.is_dirty() {
            json!({ "name": self.name })
        } else {
            json!({})
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::DeviceState;

    fn device() -> Device {
        Device {
            id: GId::new("4201"),
            name: Some("pump-17".into()),
            device_type: Some("c8y_Linux".into()),
            owner: None,
            state: DeviceState::Online,
            serial: None,
            hardware_model: None,
            hardware_revision: None,
            firmware_name: None,
            firmware_version: None,
            is_agent: true,
            child_device_ids: Vec::new(),
            created_at: None,
            last_updated: None,
            fragments: Map::new(),
        }
    }

    #[test]
    fn fresh_draft_is_clean() {
        let draft = DeviceDraft::from_device(&device());
        assert!(!draft.is_dirty());
        assert_eq!(draft.changes(), json!({}));
    }

    #[test]
    fn rename_produces_minimal_patch() {
        let mut draft = DeviceDraft::from_device(&device());
        draft.set_name("pump-17b");

        assert!(draft.is_dirty());
        assert_eq!(draft.changes(), json!({ "name": "pump-17b" }));
    }

    #[test]
    fn fragment_edit_and_removal() {
        let mut draft = DeviceDraft::from_device(&device());
        draft
            .set_fragment("c8y_RequiredAvailability", json!({ "responseInterval": 10 }))
            .remove_fragment("c8y_Position");

        let patch = draft.changes();
        assert_eq!(patch["c8y_RequiredAvailability"]["responseInterval"], 10);
        assert!(patch["c8y_Position"].is_null());
        assert_eq!(patch.as_object().unwrap().len(), 2);
    }

    #[test]
    fn revert_discards_everything() {
        let mut draft = DeviceDraft::from_device(&device());
        draft.set_name("other").set_fragment("x", json!(1));
        draft.revert();

        assert!(!draft.is_dirty());
        assert_eq!(draft.changes(), json!({}));
    }

    #[test]
    fn setting_name_back_to_original_is_clean() {
        let mut draft = DeviceDraft::from_device(&device());
        draft.set_name("pump-17b");
        draft.set_name("pump-17");
        assert!(!draft.is_dirty());
    }

    #[test]
    fn group_draft_rename() {
        let group = Group {
            id: GId::new("1"),
            name: Some("Plant".into()),
            kind: crate::model::GroupKind::Root,
            child_asset_ids: Vec::new(),
        };
        let mut draft = GroupDraft::from_group(&group);
        assert!(!draft.is_dirty());

        draft.set_name("Plant North");
        assert_eq!(draft.changes(), json!({ "name": "Plant North" }));
    }
}
