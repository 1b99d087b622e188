//! cumulo-core: domain model, reactive store, and platform lifecycle.
//!
//! Consumers (CLI, UIs) talk to a [`Platform`]: connect once, read
//! entity snapshots or subscribe to reactive streams, and send write
//! operations through the [`Command`] channel. Everything HTTP-shaped
//! stays inside `cumulo-api`; this crate exposes domain types only.

pub mod command;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod platform;
pub mod store;
pub mod stream;

pub use command::{Command, CommandResult};
pub use config::{PlatformConfig, TenantCredentials, TlsVerification};
pub use error::CoreError;
pub use model::{
    Alarm, AlarmStatus, AssetTree, Device, DeviceDraft, DeviceState, Event, GId, Group,
    GroupDraft, Measurement, MeasurementSeries, Operation, OperationStatus, Severity,
};
pub use platform::{ConnectionState, Platform};
pub use store::DataStore;
pub use stream::{AlarmFilter, DeviceFilter, EntityStream};
