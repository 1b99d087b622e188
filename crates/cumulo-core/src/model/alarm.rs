// ── Alarm domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::ids::GId;

/// Alarm severity, ordered most severe first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumString,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    Major,
    Minor,
    Warning,
}

/// Alarm lifecycle status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum AlarmStatus {
    Active,
    Acknowledged,
    Cleared,
}

impl AlarmStatus {
    /// CLEARED alarms are resolved; the other two still need attention.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Cleared)
    }
}

/// An alarm raised against a device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alarm {
    pub id: GId,
    pub source_id: Option<GId>,
    pub source_name: Option<String>,
    pub alarm_type: Option<String>,
    pub text: Option<String>,
    pub severity: Option<Severity>,
    pub status: Option<AlarmStatus>,
    pub time: Option<DateTime<Utc>>,
    /// De-duplication counter maintained by the platform.
    pub count: i64,
    pub first_occurrence: Option<DateTime<Utc>>,
}

impl Alarm {
    pub fn is_active(&self) -> bool {
        self.status == Some(AlarmStatus::Active)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_most_severe_first() {
        assert!(Severity::Critical < Severity::Major);
        assert!(Severity::Major < Severity::Minor);
        assert!(Severity::Minor < Severity::Warning);
    }

    #[test]
    fn severity_string_roundtrip() {
        assert_eq!(Severity::Major.to_string(), "MAJOR");
        assert_eq!("CRITICAL".parse::<Severity>().unwrap(), Severity::Critical);
        assert!("BOGUS".parse::<Severity>().is_err());
    }

    #[test]
    fn status_resolution() {
        assert!(AlarmStatus::Cleared.is_resolved());
        assert!(!AlarmStatus::Acknowledged.is_resolved());
    }
}
