// ── Asset tree ──
//
// Groups and devices arranged by their childAsset references. Built
// in-memory from store snapshots; nothing here talks to the network.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;

use super::device::Device;
use super::group::{Group, GroupKind};
use super::ids::GId;

/// What a tree node refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    Group,
    Device,
}

/// One node of the materialized asset tree.
#[derive(Debug, Clone, Serialize)]
pub struct AssetNode {
    pub id: GId,
    pub label: String,
    pub kind: NodeKind,
    pub children: Vec<AssetNode>,
}

impl AssetNode {
    /// Number of devices in this subtree (including self).
    pub fn device_count(&self) -> usize {
        let own = usize::from(self.kind == NodeKind::Device);
        own + self
            .children
            .iter()
            .map(AssetNode::device_count)
            .sum::<usize>()
    }
}

/// The materialized asset hierarchy of a tenant.
///
/// Root groups come first; devices that no group references are
/// collected as orphans so a UI can render an "unassigned" bucket.
/// Reference cycles are tolerated: an ID already placed in the tree is
/// not expanded a second time.
#[derive(Debug, Clone, Serialize)]
pub struct AssetTree {
    pub roots: Vec<AssetNode>,
    pub orphan_device_ids: Vec<GId>,
}

impl AssetTree {
    /// Build the tree from snapshot slices.
    pub fn build(groups: &[Arc<Group>], devices: &[Arc<Device>]) -> Self {
        let group_index: HashMap<&GId, &Arc<Group>> =
            groups.iter().map(|g| (&g.id, g)).collect();
        let device_index: HashMap<&GId, &Arc<Device>> =
            devices.iter().map(|d| (&d.id, d)).collect();

        let mut placed: HashSet<GId> = HashSet::new();
        let mut roots = Vec::new();

        for group in groups.iter().filter(|g| g.kind == GroupKind::Root) {
            if placed.contains(&group.id) {
                continue;
            }
            roots.push(Self::expand(
                group,
                &group_index,
                &device_index,
                &mut placed,
            ));
        }

        // Subgroups nobody references — broken hierarchy, surface them
        // as roots rather than dropping them.
        for group in groups {
            if !placed.contains(&group.id) {
                roots.push(Self::expand(
                    group,
                    &group_index,
                    &device_index,
                    &mut placed,
                ));
            }
        }

        let orphan_device_ids = devices
            .iter()
            .filter(|d| !placed.contains(&d.id))
            .map(|d| d.id.clone())
            .collect();

        Self {
            roots,
            orphan_device_ids,
        }
    }

    fn expand(
        group: &Arc<Group>,
        group_index: &HashMap<&GId, &Arc<Group>>,
        device_index: &HashMap<&GId, &Arc<Device>>,
        placed: &mut HashSet<GId>,
    ) -> AssetNode {
        placed.insert(group.id.clone());

        let mut children = Vec::new();
        for child_id in &group.child_asset_ids {
            if placed.contains(child_id) {
                continue;
            }
            if let Some(child_group) = group_index.get(child_id) {
                children.push(Self::expand(child_group, group_index, device_index, placed));
            } else if let Some(device) = device_index.get(child_id) {
                placed.insert(child_id.clone());
                children.push(AssetNode {
                    id: device.id.clone(),
                    label: device.label().to_owned(),
                    kind: NodeKind::Device,
                    children: Vec::new(),
                });
            }
            // References to objects not in the snapshot are skipped.
        }

        AssetNode {
            id: group.id.clone(),
            label: group.label().to_owned(),
            kind: NodeKind::Group,
            children,
        }
    }

    /// Find the subtree rooted at `id`, if present.
    pub fn subtree(&self, id: &GId) -> Option<&AssetNode> {
        fn walk<'a>(node: &'a AssetNode, id: &GId) -> Option<&'a AssetNode> {
            if &node.id == id {
                return Some(node);
            }
            node.children.iter().find_map(|c| walk(c, id))
        }
        self.roots.iter().find_map(|r| walk(r, id))
    }

    /// Total devices across all roots (orphans excluded).
    pub fn device_count(&self) -> usize {
        self.roots.iter().map(AssetNode::device_count).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::DeviceState;

    fn group(id: &str, name: &str, kind: GroupKind, children: &[&str]) -> Arc<Group> {
        Arc::new(Group {
            id: GId::new(id),
            name: Some(name.into()),
            kind,
            child_asset_ids: children.iter().map(|c| GId::new(*c)).collect(),
        })
    }

    fn device(id: &str, name: &str) -> Arc<Device> {
        Arc::new(Device {
            id: GId::new(id),
            name: Some(name.into()),
            device_type: None,
            owner: None,
            state: DeviceState::Unknown,
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
        })
    }

    #[test]
    fn builds_nested_hierarchy() {
        let groups = vec![
            group("1", "Plant North", GroupKind::Root, &["2", "100"]),
            group("2", "Line A", GroupKind::Subgroup, &["101"]),
        ];
        let devices = vec![device("100", "gateway"), device("101", "pump-17")];

        let tree = AssetTree::build(&groups, &devices);

        assert_eq!(tree.roots.len(), 1);
        assert_eq!(tree.roots[0].label, "Plant North");
        assert_eq!(tree.roots[0].children.len(), 2);
        assert_eq!(tree.device_count(), 2);
        assert!(tree.orphan_device_ids.is_empty());

        let line_a = tree.subtree(&GId::new("2")).unwrap();
        assert_eq!(line_a.children[0].label, "pump-17");
    }

    #[test]
    fn unreferenced_devices_become_orphans() {
        let groups = vec![group("1", "Plant", GroupKind::Root, &["100"])];
        let devices = vec![device("100", "assigned"), device("200", "stray")];

        let tree = AssetTree::build(&groups, &devices);

        assert_eq!(tree.orphan_device_ids, vec![GId::new("200")]);
        assert_eq!(tree.device_count(), 1);
    }

    #[test]
    fn unreferenced_subgroup_surfaces_as_root() {
        let groups = vec![
            group("1", "Plant", GroupKind::Root, &[]),
            group("2", "Detached", GroupKind::Subgroup, &["100"]),
        ];
        let devices = vec![device("100", "pump")];

        let tree = AssetTree::build(&groups, &devices);

        assert_eq!(tree.roots.len(), 2);
        assert_eq!(tree.roots[1].label, "Detached");
    }

    #[test]
    fn reference_cycles_do_not_recurse() {
        // 1 → 2 → 1 — the second visit of "1" must be skipped.
        let groups = vec![
            group("1", "A", GroupKind::Root, &["2"]),
            group("2", "B", GroupKind::Subgroup, &["1"]),
        ];

        let tree = AssetTree::build(&groups, &[]);

        assert_eq!(tree.roots.len(), 1);
        let b = &tree.roots[0].children[0];
        assert_eq!(b.label, "B");
        assert!(b.children.is_empty());
    }
}
