// ── Filter predicates for entity streams ──
//
// Used by UI layers to filter snapshots without re-querying the API.

use crate::model::{Alarm, AlarmStatus, Device, DeviceState, GId, Severity};

/// Filter predicate for device collections.
pub enum DeviceFilter {
    All,
    ByState(DeviceState),
    Online,
    Offline,
    /// Devices running an agent (operation-capable).
    Agents,
    Custom(Box<dyn Fn(&Device) -> bool + Send + Sync>),
}

impl DeviceFilter {
    pub fn matches(&self, device: &Device) -> bool {
        match self {
            Self::All => true,
            Self::ByState(ds) => device.state == *ds,
            Self::Online => device.state.is_online(),
            Self::Offline => matches!(device.state, DeviceState::Offline),
            Self::Agents => device.is_agent,
            Self::Custom(f) => f(device),
        }
    }
}

/// Filter predicate for alarm collections.
pub enum AlarmFilter {
    All,
    BySeverity(Severity),
    ByStatus(AlarmStatus),
    BySource(GId),
    /// Unresolved alarms (ACTIVE or ACKNOWLEDGED).
    Unresolved,
    Custom(Box<dyn Fn(&Alarm) -> bool + Send + Sync>),
}

impl AlarmFilter {
    pub fn matches(&self, alarm: &Alarm) -> bool {
        match self {
            Self::All => true,
            Self::BySeverity(sev) => alarm.severity == Some(*sev),
            Self::ByStatus(status) => alarm.status == Some(*status),
            Self::BySource(id) => alarm.source_id.as_ref() == Some(id),
            Self::Unresolved => !alarm.status.is_some_and(|s| s.is_resolved()),
            Self::Custom(f) => f(alarm),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alarm(severity: Severity, status: AlarmStatus) -> Alarm {
        Alarm {
            id: GId::new("1"),
            source_id: Some(GId::new("4201")),
            source_name: None,
            alarm_type: None,
            text: None,
            severity: Some(severity),
            status: Some(status),
            time: None,
            count: 1,
            first_occurrence: None,
        }
    }

    #[test]
    fn unresolved_excludes_cleared() {
        assert!(AlarmFilter::Unresolved.matches(&alarm(Severity::Major, AlarmStatus::Active)));
        assert!(
            AlarmFilter::Unresolved.matches(&alarm(Severity::Major, AlarmStatus::Acknowledged))
        );
        assert!(!AlarmFilter::Unresolved.matches(&alarm(Severity::Major, AlarmStatus::Cleared)));
    }

    #[test]
    fn severity_filter_is_exact() {
        let filter = AlarmFilter::BySeverity(Severity::Critical);
        assert!(filter.matches(&alarm(Severity::Critical, AlarmStatus::Active)));
        assert!(!filter.matches(&alarm(Severity::Major, AlarmStatus::Active)));
    }
}
