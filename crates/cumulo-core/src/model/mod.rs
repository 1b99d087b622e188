// ── Domain model ──
//
// Typed, UI-ready representations of the platform's entities.
// Conversions from wire types live in `crate::convert`.

mod alarm;
mod asset_tree;
mod device;
mod draft;
mod event;
mod group;
mod ids;
mod measurement;
mod operation;

pub use alarm::{Alarm, AlarmStatus, Severity};
pub use asset_tree::{AssetNode, AssetTree, NodeKind};
pub use device::{Device, DeviceState};
pub use draft::{DeviceDraft, GroupDraft};
pub use event::Event;
pub use group::{Group, GroupKind};
pub use ids::{GId, SERIAL_ID_TYPE};
pub use measurement::{Measurement, MeasurementSeries};
pub use operation::{Operation, OperationStatus};
