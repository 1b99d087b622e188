// ── Operation domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::ids::GId;

/// Device-control operation lifecycle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationStatus {
    Pending,
    Executing,
    Successful,
    Failed,
}

impl OperationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Successful | Self::Failed)
    }
}

/// An operation queued for (or completed by) a device agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub id: GId,
    pub device_id: Option<GId>,
    pub status: Option<OperationStatus>,
    pub failure_reason: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    /// The instruction fragments (`c8y_Restart`, `c8y_Command`, …).
    #[serde(default)]
    pub fragments: serde_json::Map<String, serde_json::Value>,
}

impl Operation {
    /// The instruction kind: the first `c8y_`-prefixed fragment key.
    pub fn kind(&self) -> Option<&str> {
        self.fragments
            .keys()
            .find(|k| k.starts_with("c8y_"))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(OperationStatus::Successful.is_terminal());
        assert!(OperationStatus::Failed.is_terminal());
        assert!(!OperationStatus::Pending.is_terminal());
        assert!(!OperationStatus::Executing.is_terminal());
    }

    #[test]
    fn kind_finds_instruction_fragment() {
        let mut fragments = serde_json::Map::new();
        fragments.insert("description".into(), serde_json::json!("restart please"));
        fragments.insert("c8y_Restart".into(), serde_json::json!({}));

        let op = Operation {
            id: GId::new("701"),
            device_id: None,
            status: Some(OperationStatus::Pending),
            failure_reason: None,
            created_at: None,
            fragments,
        };
        assert_eq!(op.kind(), Some("c8y_Restart"));
    }
}
