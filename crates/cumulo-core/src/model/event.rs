// ── Event domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::GId;

/// An event recorded against a device (location update, button press,
/// application message — anything non-alarming).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: GId,
    pub source_id: Option<GId>,
    pub source_name: Option<String>,
    pub event_type: Option<String>,
    pub text: Option<String>,
    pub time: Option<DateTime<Utc>>,
    /// Application fragments, kept verbatim for detail views.
    #[serde(default)]
    pub fragments: serde_json::Map<String, serde_json::Value>,
}
