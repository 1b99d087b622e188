// ── Device domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::GId;

/// Device availability, derived from the `c8y_Availability` fragment.
///
/// `Unknown` covers devices without availability monitoring (no
/// required interval configured).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DeviceState {
    Online,
    Offline,
    Maintenance,
    Unknown,
}

impl DeviceState {
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }
}

/// The canonical device type: a managed object carrying `c8y_IsDevice`,
/// flattened into the fields a UI actually renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: GId,
    pub name: Option<String>,
    /// Application-defined type, e.g. `"c8y_Linux"`.
    pub device_type: Option<String>,
    pub owner: Option<String>,
    pub state: DeviceState,

    // Hardware (from c8y_Hardware)
    pub serial: Option<String>,
    pub hardware_model: Option<String>,
    pub hardware_revision: Option<String>,

    // Firmware (from c8y_Firmware)
    pub firmware_name: Option<String>,
    pub firmware_version: Option<String>,

    /// Whether the object also carries `com_cumulocity_model_Agent`
    /// (it runs an agent and can receive operations).
    pub is_agent: bool,

    /// IDs of child devices linked under this one.
    pub child_device_ids: Vec<GId>,

    // Lifecycle
    pub created_at: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,

    /// Fragments not lifted into typed fields, kept for UI detail views.
    #[serde(default)]
    pub fragments: serde_json::Map<String, serde_json::Value>,
}

impl Device {
    /// Display label: name, falling back to serial, falling back to ID.
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or_else(|| self.serial.as_deref())
            .unwrap_or_else(|| self.id.as_str())
    }

    /// Whether this device can receive device-control operations.
    pub fn accepts_operations(&self) -> bool {
        self.is_agent
    }
}
