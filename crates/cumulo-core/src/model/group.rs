// ── Group domain types ──

use serde::{Deserialize, Serialize};

use super::ids::GId;

/// Whether a group sits at the asset-tree root or nested under another
/// group. The platform encodes this in the managed object `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupKind {
    /// `c8y_DeviceGroup` — a top-level group.
    Root,
    /// `c8y_DeviceSubgroup` — nested under another group.
    Subgroup,
}

/// A device group: a managed object organizing devices and subgroups
/// into the asset tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: GId,
    pub name: Option<String>,
    pub kind: GroupKind,
    /// Child asset references: subgroups and member devices.
    pub child_asset_ids: Vec<GId>,
}

impl Group {
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.id.as_str())
    }
}
