// ── Command API ──
//
// All write operations flow through a unified `Command` enum. The
// platform routes each variant to the matching REST endpoint and
// applies the result to the DataStore before replying.

use serde_json::Value;

use crate::error::CoreError;
use crate::model::{Alarm, Device, Event, GId, Group, Operation, Severity};

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All write operations against a tenant.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Inventory ────────────────────────────────────────────────────
    CreateDevice {
        name: String,
        device_type: Option<String>,
    },
    /// Apply a draft patch (see `DeviceDraft::changes`) to a device.
    UpdateDevice {
        id: GId,
        patch: Value,
    },
    DeleteDevice {
        id: GId,
    },
    CreateGroup {
        name: String,
        /// Nest under this group; `None` creates a root group.
        parent: Option<GId>,
    },
    UpdateGroup {
        id: GId,
        patch: Value,
    },
    DeleteGroup {
        id: GId,
    },
    AssignToGroup {
        group_id: GId,
        child_id: GId,
    },
    UnassignFromGroup {
        group_id: GId,
        child_id: GId,
    },

    // ── Identity ─────────────────────────────────────────────────────
    RegisterExternalId {
        id: GId,
        id_type: String,
        value: String,
    },

    // ── Alarms ───────────────────────────────────────────────────────
    RaiseAlarm {
        source: GId,
        alarm_type: String,
        text: String,
        severity: Severity,
    },
    AcknowledgeAlarm {
        id: GId,
    },
    ClearAlarm {
        id: GId,
    },

    // ── Events ───────────────────────────────────────────────────────
    CreateEvent {
        source: GId,
        event_type: String,
        text: String,
    },

    // ── Operations ───────────────────────────────────────────────────
    /// Queue an operation with an arbitrary instruction fragment.
    CreateOperation {
        device_id: GId,
        fragment: String,
        payload: Value,
    },
    /// Convenience for the most common instruction.
    RestartDevice {
        device_id: GId,
    },
    /// Mark an operation FAILED with a reason (operator-side cancel).
    CancelOperation {
        id: GId,
        reason: String,
    },

    // ── Measurements ─────────────────────────────────────────────────
    CreateMeasurement {
        source: GId,
        measurement_type: String,
        fragment: String,
        series: String,
        value: f64,
        unit: Option<String>,
    },

    // ── Provisioning ─────────────────────────────────────────────────
    RegisterDevice {
        request_id: String,
    },
    AcceptDevice {
        request_id: String,
    },
    CancelDeviceRequest {
        request_id: String,
    },
}

/// What a successfully executed command returns.
#[derive(Debug, Clone)]
pub enum CommandResult {
    Done,
    Device(Device),
    Group(Group),
    Alarm(Alarm),
    Event(Event),
    Operation(Operation),
}
