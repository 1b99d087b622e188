// ── Platform abstraction ──
//
// Full lifecycle management for a tenant connection. Handles
// authentication, background refresh, command routing, the realtime
// bridge, and reactive data streaming through the DataStore.

use std::sync::Arc;

use serde_json::{Value, json};
use tokio::sync::{Mutex, broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::{Command, CommandEnvelope, CommandResult};
use crate::config::{PlatformConfig, TlsVerification};
use crate::convert;
use crate::error::CoreError;
use crate::model::{Alarm, AssetTree, Device, Event, GId, Group, Measurement, Operation};
use crate::store::{DataStore, RefreshSnapshot};
use crate::stream::EntityStream;

use cumulo_api::alarms::AlarmQuery;
use cumulo_api::events::EventQuery;
use cumulo_api::inventory::InventoryQuery;
use cumulo_api::operations::OperationQuery;
use cumulo_api::realtime::{RealtimeHandle, RealtimeMessage, RealtimeSession, SubscriptionState};
use cumulo_api::types::{
    self as wire, AlarmCollection, ManagedObjectCollection, SourceRef,
};
use cumulo_api::{ApiClient, Credentials, TlsMode, TransportConfig};

const COMMAND_CHANNEL_SIZE: usize = 64;
const FEED_CHANNEL_SIZE: usize = 256;

/// Realtime channels the platform bridges into the store.
const REALTIME_CHANNELS: &[&str] = &[
    "/managedobjects/*",
    "/alarms/*",
    "/events/*",
    "/operations/*",
    "/measurements/*",
];

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ── Platform ─────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<PlatformInner>`. Manages the full
/// connection lifecycle: authentication, background data refresh,
/// command routing, and reactive entity streaming.
#[derive(Clone)]
pub struct Platform {
    inner: Arc<PlatformInner>,
}

struct PlatformInner {
    config: PlatformConfig,
    store: Arc<DataStore>,
    connection_state: watch::Sender<ConnectionState>,
    alarm_tx: broadcast::Sender<Arc<Alarm>>,
    event_tx: broadcast::Sender<Arc<Event>>,
    /// Realtime measurements are broadcast, never stored — the store
    /// would grow without bound.
    measurement_tx: broadcast::Sender<Arc<Measurement>>,
    command_tx: Mutex<mpsc::Sender<CommandEnvelope>>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    /// Child token for the current connection — cancelled on disconnect,
    /// replaced on reconnect (avoids permanent cancellation).
    cancel_child: Mutex<CancellationToken>,
    api: Mutex<Option<ApiClient>>,
    realtime: Mutex<Option<RealtimeHandle>>,
    realtime_state: Mutex<Option<watch::Receiver<SubscriptionState>>>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
    /// Warnings accumulated during connect (e.g. realtime unavailable).
    warnings: Mutex<Vec<String>>,
}

impl Platform {
    /// Create a new Platform from configuration. Does NOT connect --
    /// call [`connect()`](Self::connect) to authenticate and start
    /// background tasks.
    pub fn new(config: PlatformConfig) -> Self {
        let store = Arc::new(DataStore::new());
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (alarm_tx, _) = broadcast::channel(FEED_CHANNEL_SIZE);
        let (event_tx, _) = broadcast::channel(FEED_CHANNEL_SIZE);
        let (measurement_tx, _) = broadcast::channel(FEED_CHANNEL_SIZE);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();

        Self {
            inner: Arc::new(PlatformInner {
                config,
                store,
                connection_state,
                alarm_tx,
                event_tx,
                measurement_tx,
                command_tx: Mutex::new(command_tx),
                command_rx: Mutex::new(Some(command_rx)),
                cancel,
                cancel_child: Mutex::new(cancel_child),
                api: Mutex::new(None),
                realtime: Mutex::new(None),
                realtime_state: Mutex::new(None),
                task_handles: Mutex::new(Vec::new()),
                warnings: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Access the platform configuration.
    pub fn config(&self) -> &PlatformConfig {
        &self.inner.config
    }

    /// Access the underlying DataStore.
    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Connect to the tenant.
    ///
    /// Verifies credentials, performs an initial data refresh, and
    /// spawns background tasks (periodic refresh, command processor,
    /// realtime bridge when enabled).
    pub async fn connect(&self) -> Result<(), CoreError> {
        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Connecting);

        // Fresh child token for this connection (supports reconnect).
        let child = self.inner.cancel.child_token();
        *self.inner.cancel_child.lock().await = child.clone();

        let config = &self.inner.config;
        let transport = build_transport(config);
        let credentials = api_credentials(config);

        let api = match ApiClient::from_credentials(config.url.as_str(), &credentials, &transport)
        {
            Ok(api) => api,
            Err(e) => {
                let _ = self.inner.connection_state.send(ConnectionState::Failed);
                return Err(e.into());
            }
        };

        // Credential check before anything else touches the tenant.
        match api.current_user().await {
            Ok(user) => debug!(user = %user.user_name, "authenticated"),
            Err(e) => {
                let _ = self.inner.connection_state.send(ConnectionState::Failed);
                return Err(e.into());
            }
        }

        *self.inner.api.lock().await = Some(api.clone());

        // Initial data load
        self.full_refresh().await?;

        // Spawn background tasks
        let mut handles = self.inner.task_handles.lock().await;

        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let platform = self.clone();
            let cancel = child.clone();
            handles.push(tokio::spawn(command_processor_task(platform, rx, cancel)));
        }

        let interval_secs = config.refresh_interval_secs;
        if interval_secs > 0 {
            let platform = self.clone();
            let cancel = child.clone();
            handles.push(tokio::spawn(refresh_task(platform, interval_secs, cancel)));
        }

        if config.realtime_enabled {
            self.spawn_realtime(&api, &credentials, &transport, &child, &mut handles)
                .await;
        }

        drop(handles);

        let _ = self.inner.connection_state.send(ConnectionState::Connected);
        info!("connected to tenant");
        Ok(())
    }

    /// Spawn the realtime subscription and a bridge task that applies
    /// decoded messages to the store and re-broadcasts domain values.
    ///
    /// Non-fatal on failure — consumers fall back to periodic refresh.
    async fn spawn_realtime(
        &self,
        api: &ApiClient,
        credentials: &Credentials,
        transport: &TransportConfig,
        cancel: &CancellationToken,
        handles: &mut Vec<JoinHandle<()>>,
    ) {
        // The connect poll is held open server-side; it needs a client
        // without a request timeout.
        let session = credentials
            .default_headers()
            .map_err(CoreError::from)
            .and_then(|headers| {
                transport
                    .build_long_poll_client(headers)
                    .map_err(CoreError::from)
            })
            .and_then(|http| {
                RealtimeSession::with_client(http, api.base_url()).map_err(CoreError::from)
            });

        let session = match session {
            Ok(s) => s,
            Err(e) => {
                let msg = format!("realtime unavailable: {e}");
                warn!("{msg}");
                self.inner.warnings.lock().await.push(msg);
                return;
            }
        };

        let subscriptions: Vec<String> =
            REALTIME_CHANNELS.iter().map(|c| (*c).to_owned()).collect();

        let handle =
            match RealtimeHandle::start(session, &subscriptions, cancel.child_token()).await {
                Ok(h) => h,
                Err(e) => {
                    let msg = format!("realtime subscription failed: {e}");
                    warn!("{msg}");
                    self.inner.warnings.lock().await.push(msg);
                    return;
                }
            };

        let mut rt_rx = handle.subscribe();
        *self.inner.realtime_state.lock().await = Some(handle.state());

        let store = Arc::clone(&self.inner.store);
        let alarm_tx = self.inner.alarm_tx.clone();
        let event_tx = self.inner.event_tx.clone();
        let measurement_tx = self.inner.measurement_tx.clone();
        let bridge_cancel = cancel.child_token();

        handles.push(tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = bridge_cancel.cancelled() => break,
                    result = rt_rx.recv() => {
                        match result {
                            Ok(msg) => {
                                apply_realtime_message(
                                    &store,
                                    &alarm_tx,
                                    &event_tx,
                                    &measurement_tx,
                                    &msg,
                                );
                            }
                            Err(broadcast::error::RecvError::Lagged(n)) => {
                                warn!(skipped = n, "realtime bridge: receiver lagged");
                            }
                            Err(broadcast::error::RecvError::Closed) => break,
                        }
                    }
                }
            }
        }));

        *self.inner.realtime.lock().await = Some(handle);
        info!("realtime subscription active");
    }

    /// Disconnect from the tenant.
    ///
    /// Cancels background tasks and resets the connection state to
    /// [`Disconnected`](ConnectionState::Disconnected).
    pub async fn disconnect(&self) {
        // Cancel the child token (not the parent — allows reconnect).
        self.inner.cancel_child.lock().await.cancel();

        // Stop the realtime loop before joining the bridge task.
        if let Some(handle) = self.inner.realtime.lock().await.take() {
            handle.shutdown();
        }
        *self.inner.realtime_state.lock().await = None;

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        *self.inner.api.lock().await = None;

        // Recreate command channel so reconnects can spawn a fresh receiver.
        // The previous receiver is consumed by the command processor task.
        {
            let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
            *self.inner.command_tx.lock().await = tx;
            *self.inner.command_rx.lock().await = Some(rx);
        }

        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    /// Fetch all data from the tenant and update the DataStore.
    ///
    /// Devices and groups are walked completely; alarms are limited to
    /// unresolved ones, events and operations to the most recent page.
    pub async fn full_refresh(&self) -> Result<(), CoreError> {
        let api = self.api().await?;
        let page_size = self.inner.config.page_size;

        let device_query = InventoryQuery::devices();
        let root_query = InventoryQuery::of_type("c8y_DeviceGroup");
        let sub_query = InventoryQuery::of_type("c8y_DeviceSubgroup");
        let alarm_query = AlarmQuery {
            resolved: Some(false),
            ..AlarmQuery::default()
        };

        let (devices_res, roots_res, subs_res) = tokio::join!(
            api.paginate_all::<ManagedObjectCollection, _, _>(page_size, |p, s| {
                api.list_managed_objects(&device_query, p, s)
            }),
            api.paginate_all::<ManagedObjectCollection, _, _>(page_size, |p, s| {
                api.list_managed_objects(&root_query, p, s)
            }),
            api.paginate_all::<ManagedObjectCollection, _, _>(page_size, |p, s| {
                api.list_managed_objects(&sub_query, p, s)
            }),
        );

        let event_query = EventQuery::default();
        let operation_query = OperationQuery::default();
        let (alarms_res, events_res, operations_res) = tokio::join!(
            api.paginate_all::<AlarmCollection, _, _>(page_size, |p, s| {
                api.list_alarms(&alarm_query, p, s)
            }),
            api.list_events(&event_query, 1, 100),
            api.list_operations(&operation_query, 1, 100),
        );

        // Core endpoints — failure is fatal.
        let devices: Vec<Device> = devices_res?
            .iter()
            .filter_map(convert::device_from_managed_object)
            .collect();
        let groups: Vec<Group> = roots_res?
            .iter()
            .chain(subs_res?.iter())
            .filter_map(convert::group_from_managed_object)
            .collect();

        // Activity endpoints — degrade to empty on failure.
        let alarms: Vec<Alarm> = unwrap_or_empty("alarms", alarms_res)
            .iter()
            .filter_map(convert::alarm_from_wire)
            .collect();
        let events: Vec<Event> = match events_res {
            Ok(page) => page.items.iter().filter_map(convert::event_from_wire).collect(),
            Err(e) => {
                warn!(error = %e, "event fetch failed (non-fatal)");
                Vec::new()
            }
        };
        let operations: Vec<Operation> = match operations_res {
            Ok(page) => page
                .items
                .iter()
                .filter_map(convert::operation_from_wire)
                .collect(),
            Err(e) => {
                warn!(error = %e, "operation fetch failed (non-fatal)");
                Vec::new()
            }
        };

        self.inner.store.apply_refresh(RefreshSnapshot {
            devices,
            groups,
            alarms,
            events,
            operations,
        });

        debug!(
            devices = self.inner.store.device_count(),
            groups = self.inner.store.group_count(),
            alarms = self.inner.store.alarm_count(),
            "data refresh complete"
        );

        Ok(())
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a command against the tenant.
    ///
    /// Sends the command through the internal channel to the command
    /// processor task and awaits the result.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        if *self.inner.connection_state.borrow() != ConnectionState::Connected {
            return Err(CoreError::PlatformDisconnected);
        }

        let (tx, rx) = tokio::sync::oneshot::channel();

        let command_tx = self.inner.command_tx.lock().await.clone();

        command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::PlatformDisconnected)?;

        rx.await.map_err(|_| CoreError::PlatformDisconnected)?
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// One-shot: connect, run closure, disconnect.
    ///
    /// Optimized for CLI: disables realtime and periodic refresh since
    /// we only need a single request-response cycle.
    pub async fn oneshot<F, Fut, T>(config: PlatformConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Platform) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.realtime_enabled = false;
        cfg.refresh_interval_secs = 0;

        let platform = Platform::new(cfg);
        platform.connect().await?;
        let result = f(platform.clone()).await;
        platform.disconnect().await;
        result
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    /// Subscribe to the live alarm feed.
    pub fn alarms_feed(&self) -> broadcast::Receiver<Arc<Alarm>> {
        self.inner.alarm_tx.subscribe()
    }

    /// Subscribe to the live event feed.
    pub fn events_feed(&self) -> broadcast::Receiver<Arc<Event>> {
        self.inner.event_tx.subscribe()
    }

    /// Subscribe to realtime measurements (broadcast only, not stored).
    pub fn measurements_feed(&self) -> broadcast::Receiver<Arc<Measurement>> {
        self.inner.measurement_tx.subscribe()
    }

    /// Observe the realtime subscription lifecycle, if one was started.
    ///
    /// `Stopped { error: true }` means the connect loop died; the data
    /// in the store keeps refreshing on the periodic schedule only.
    pub async fn realtime_state(&self) -> Option<watch::Receiver<SubscriptionState>> {
        self.inner.realtime_state.lock().await.clone()
    }

    /// Drain warnings accumulated during connect.
    pub async fn take_warnings(&self) -> Vec<String> {
        std::mem::take(&mut *self.inner.warnings.lock().await)
    }

    // ── Snapshot accessors (delegate to DataStore) ───────────────

    pub fn devices_snapshot(&self) -> Arc<Vec<Arc<Device>>> {
        self.inner.store.devices_snapshot()
    }

    pub fn groups_snapshot(&self) -> Arc<Vec<Arc<Group>>> {
        self.inner.store.groups_snapshot()
    }

    pub fn alarms_snapshot(&self) -> Arc<Vec<Arc<Alarm>>> {
        self.inner.store.alarms_snapshot()
    }

    pub fn events_snapshot(&self) -> Arc<Vec<Arc<Event>>> {
        self.inner.store.events_snapshot()
    }

    pub fn operations_snapshot(&self) -> Arc<Vec<Arc<Operation>>> {
        self.inner.store.operations_snapshot()
    }

    /// Materialize the asset tree from the current snapshots.
    pub fn asset_tree(&self) -> AssetTree {
        self.inner.store.asset_tree()
    }

    // ── Stream accessors (delegate to DataStore) ─────────────────

    pub fn devices(&self) -> EntityStream<Device> {
        self.inner.store.subscribe_devices()
    }

    pub fn groups(&self) -> EntityStream<Group> {
        self.inner.store.subscribe_groups()
    }

    pub fn alarms(&self) -> EntityStream<Alarm> {
        self.inner.store.subscribe_alarms()
    }

    pub fn events(&self) -> EntityStream<Event> {
        self.inner.store.subscribe_events()
    }

    pub fn operations(&self) -> EntityStream<Operation> {
        self.inner.store.subscribe_operations()
    }

    // ── Ad-hoc queries ───────────────────────────────────────────
    //
    // These bypass the DataStore and query the tenant directly.
    // Intended for data that doesn't need reactive subscriptions.

    /// Resolve a device by its serial-number external ID.
    pub async fn find_device_by_serial(&self, serial: &str) -> Result<Device, CoreError> {
        let api = self.api().await?;
        let ext = api
            .get_external_id(crate::model::SERIAL_ID_TYPE, serial)
            .await?;
        let global_id = ext
            .managed_object
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: serial.to_owned(),
            })?
            .id;
        let mo = api.get_managed_object(&global_id).await?;
        convert::device_from_managed_object(&mo).ok_or_else(|| CoreError::DeviceNotFound {
            identifier: serial.to_owned(),
        })
    }

    /// Fetch historical measurements for a device.
    pub async fn list_measurements(
        &self,
        query: &cumulo_api::measurements::MeasurementQuery,
        limit: i32,
    ) -> Result<Vec<Measurement>, CoreError> {
        let api = self.api().await?;
        let page = api.list_measurements(query, 1, limit).await?;
        Ok(page
            .items
            .iter()
            .filter_map(convert::measurement_from_wire)
            .collect())
    }

    /// List pending new-device requests.
    pub async fn list_device_requests(&self) -> Result<Vec<wire::NewDeviceRequest>, CoreError> {
        let api = self.api().await?;
        let page = api.list_new_device_requests(1, 100).await?;
        Ok(page.items)
    }

    // ── Internals ────────────────────────────────────────────────

    async fn api(&self) -> Result<ApiClient, CoreError> {
        self.inner
            .api
            .lock()
            .await
            .clone()
            .ok_or(CoreError::PlatformDisconnected)
    }
}

// ── Config translation ───────────────────────────────────────────────

fn build_transport(config: &PlatformConfig) -> TransportConfig {
    TransportConfig {
        tls: match &config.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        },
        timeout: config.timeout,
    }
}

fn api_credentials(config: &PlatformConfig) -> Credentials {
    Credentials::new(
        config.credentials.tenant.clone(),
        config.credentials.username.clone(),
        config.credentials.password.clone(),
    )
}

fn unwrap_or_empty<T>(what: &str, res: Result<Vec<T>, cumulo_api::Error>) -> Vec<T> {
    match res {
        Ok(v) => v,
        Err(e) => {
            warn!(endpoint = what, error = %e, "fetch failed (non-fatal)");
            Vec::new()
        }
    }
}

// ── Realtime bridge ──────────────────────────────────────────────────

/// Apply one decoded realtime message to the store and feeds.
fn apply_realtime_message(
    store: &DataStore,
    alarm_tx: &broadcast::Sender<Arc<Alarm>>,
    event_tx: &broadcast::Sender<Arc<Event>>,
    measurement_tx: &broadcast::Sender<Arc<Measurement>>,
    msg: &RealtimeMessage,
) {
    store.mark_realtime_message();

    let deleted = msg.action.as_deref() == Some("DELETE");

    if msg.channel.starts_with("/managedobjects/") {
        if deleted {
            if let Some(id) = deleted_id(&msg.body) {
                store.devices.remove(&id);
                store.groups.remove(&id);
            }
            return;
        }
        let Ok(mo) = serde_json::from_value::<wire::ManagedObject>(msg.body.clone()) else {
            debug!(channel = %msg.channel, "undecodable managed object notification");
            return;
        };
        if let Some(group) = convert::group_from_managed_object(&mo) {
            store.groups.upsert(group.id.clone(), group);
        } else if let Some(device) = convert::device_from_managed_object(&mo) {
            store.devices.upsert(device.id.clone(), device);
        }
    } else if msg.channel.starts_with("/alarms/") {
        if deleted {
            if let Some(id) = deleted_id(&msg.body) {
                store.alarms.remove(&id);
            }
            return;
        }
        if let Some(alarm) = serde_json::from_value::<wire::Alarm>(msg.body.clone())
            .ok()
            .as_ref()
            .and_then(convert::alarm_from_wire)
        {
            store.alarms.upsert(alarm.id.clone(), alarm.clone());
            let _ = alarm_tx.send(Arc::new(alarm));
        }
    } else if msg.channel.starts_with("/events/") {
        if deleted {
            if let Some(id) = deleted_id(&msg.body) {
                store.events.remove(&id);
            }
            return;
        }
        if let Some(event) = serde_json::from_value::<wire::Event>(msg.body.clone())
            .ok()
            .as_ref()
            .and_then(convert::event_from_wire)
        {
            store.events.upsert(event.id.clone(), event.clone());
            let _ = event_tx.send(Arc::new(event));
        }
    } else if msg.channel.starts_with("/operations/") {
        if let Some(op) = serde_json::from_value::<wire::Operation>(msg.body.clone())
            .ok()
            .as_ref()
            .and_then(convert::operation_from_wire)
        {
            store.operations.upsert(op.id.clone(), op);
        }
    } else if msg.channel.starts_with("/measurements/") {
        if let Some(m) = serde_json::from_value::<wire::Measurement>(msg.body.clone())
            .ok()
            .as_ref()
            .and_then(convert::measurement_from_wire)
        {
            let _ = measurement_tx.send(Arc::new(m));
        }
    } else {
        debug!(channel = %msg.channel, "unhandled realtime channel");
    }
}

/// DELETE notifications carry just the removed ID — either as a bare
/// string or as `{"id": …}`.
fn deleted_id(body: &Value) -> Option<GId> {
    body.as_str()
        .map(GId::new)
        .or_else(|| body.get("id").and_then(Value::as_str).map(GId::new))
}

// ── Background tasks ─────────────────────────────────────────────────

async fn refresh_task(platform: Platform, interval_secs: u64, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // The first tick fires immediately; connect() already refreshed.
    interval.tick().await;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = platform.full_refresh().await {
                    warn!(error = %e, "periodic refresh failed");
                }
            }
        }
    }
}

async fn command_processor_task(
    platform: Platform,
    mut rx: mpsc::Receiver<CommandEnvelope>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = run_command(&platform, envelope.command).await;
                // Receiver dropped means the caller gave up — fine.
                let _ = envelope.response_tx.send(result);
            }
        }
    }
    debug!("command processor exiting");
}

#[allow(clippy::too_many_lines)]
async fn run_command(platform: &Platform, cmd: Command) -> Result<CommandResult, CoreError> {
    let api = platform.api().await?;
    let store = &platform.inner.store;

    match cmd {
        // ── Inventory ────────────────────────────────────────────
        Command::CreateDevice { name, device_type } => {
            let mut body = wire::ManagedObject {
                name: Some(name),
                object_type: device_type,
                ..wire::ManagedObject::default()
            };
            body.fragments.insert("c8y_IsDevice".into(), json!({}));

            let created = api.create_managed_object(&body).await?;
            let device = convert::device_from_managed_object(&created)
                .ok_or_else(|| CoreError::Internal("created device has no id".into()))?;
            store.devices.upsert(device.id.clone(), device.clone());
            Ok(CommandResult::Device(device))
        }

        Command::UpdateDevice { id, patch } => {
            let updated = api.patch_managed_object(id.as_str(), &patch).await?;
            let device = convert::device_from_managed_object(&updated)
                .ok_or_else(|| CoreError::Internal("updated device has no id".into()))?;
            store.devices.upsert(device.id.clone(), device.clone());
            Ok(CommandResult::Device(device))
        }

        Command::DeleteDevice { id } => {
            api.delete_managed_object(id.as_str()).await?;
            store.devices.remove(&id);
            Ok(CommandResult::Done)
        }

        Command::CreateGroup { name, parent } => {
            let object_type = if parent.is_some() {
                "c8y_DeviceSubgroup"
            } else {
                "c8y_DeviceGroup"
            };
            let body = wire::ManagedObject {
                name: Some(name),
                object_type: Some(object_type.into()),
                ..wire::ManagedObject::default()
            };

            let created = api.create_managed_object(&body).await?;
            if let (Some(parent), Some(child_id)) = (&parent, created.id.as_deref()) {
                api.add_child_asset(parent.as_str(), child_id).await?;
                refresh_group(&api, store, parent).await;
            }

            let group = convert::group_from_managed_object(&created)
                .ok_or_else(|| CoreError::Internal("created group has no id".into()))?;
            store.groups.upsert(group.id.clone(), group.clone());
            Ok(CommandResult::Group(group))
        }

        Command::UpdateGroup { id, patch } => {
            let updated = api.patch_managed_object(id.as_str(), &patch).await?;
            let group = convert::group_from_managed_object(&updated)
                .ok_or_else(|| CoreError::GroupNotFound {
                    identifier: id.to_string(),
                })?;
            store.groups.upsert(group.id.clone(), group.clone());
            Ok(CommandResult::Group(group))
        }

        Command::DeleteGroup { id } => {
            api.delete_managed_object(id.as_str()).await?;
            store.groups.remove(&id);
            Ok(CommandResult::Done)
        }

        Command::AssignToGroup { group_id, child_id } => {
            api.add_child_asset(group_id.as_str(), child_id.as_str())
                .await?;
            refresh_group(&api, store, &group_id).await;
            Ok(CommandResult::Done)
        }

        Command::UnassignFromGroup { group_id, child_id } => {
            api.remove_child_asset(group_id.as_str(), child_id.as_str())
                .await?;
            refresh_group(&api, store, &group_id).await;
            Ok(CommandResult::Done)
        }

        // ── Identity ─────────────────────────────────────────────
        Command::RegisterExternalId { id, id_type, value } => {
            api.register_external_id(id.as_str(), &id_type, &value)
                .await?;
            Ok(CommandResult::Done)
        }

        // ── Alarms ───────────────────────────────────────────────
        Command::RaiseAlarm {
            source,
            alarm_type,
            text,
            severity,
        } => {
            let body = wire::Alarm {
                source: Some(SourceRef::new(source.as_str())),
                alarm_type: Some(alarm_type),
                text: Some(text),
                severity: Some(severity.to_string()),
                status: Some("ACTIVE".into()),
                time: Some(chrono::Utc::now()),
                ..wire::Alarm::default()
            };
            let created = api.create_alarm(&body).await?;
            let alarm = convert::alarm_from_wire(&created)
                .ok_or_else(|| CoreError::Internal("created alarm has no id".into()))?;
            store.alarms.upsert(alarm.id.clone(), alarm.clone());
            Ok(CommandResult::Alarm(alarm))
        }

        Command::AcknowledgeAlarm { id } => {
            set_alarm_status(&api, store, &id, "ACKNOWLEDGED").await
        }

        Command::ClearAlarm { id } => set_alarm_status(&api, store, &id, "CLEARED").await,

        // ── Events ───────────────────────────────────────────────
        Command::CreateEvent {
            source,
            event_type,
            text,
        } => {
            let body = wire::Event {
                source: Some(SourceRef::new(source.as_str())),
                event_type: Some(event_type),
                text: Some(text),
                time: Some(chrono::Utc::now()),
                ..wire::Event::default()
            };
            let created = api.create_event(&body).await?;
            let event = convert::event_from_wire(&created)
                .ok_or_else(|| CoreError::Internal("created event has no id".into()))?;
            store.events.upsert(event.id.clone(), event.clone());
            Ok(CommandResult::Event(event))
        }

        // ── Operations ───────────────────────────────────────────
        Command::CreateOperation {
            device_id,
            fragment,
            payload,
        } => queue_operation(&api, store, &device_id, &fragment, payload).await,

        Command::RestartDevice { device_id } => {
            queue_operation(&api, store, &device_id, "c8y_Restart", json!({})).await
        }

        Command::CancelOperation { id, reason } => {
            let body = wire::Operation {
                status: Some("FAILED".into()),
                failure_reason: Some(reason),
                ..wire::Operation::default()
            };
            let updated = api.update_operation(id.as_str(), &body).await?;
            let op = convert::operation_from_wire(&updated)
                .ok_or_else(|| CoreError::Internal("updated operation has no id".into()))?;
            store.operations.upsert(op.id.clone(), op.clone());
            Ok(CommandResult::Operation(op))
        }

        // ── Measurements ─────────────────────────────────────────
        Command::CreateMeasurement {
            source,
            measurement_type,
            fragment,
            series,
            value,
            unit,
        } => {
            let mut body = wire::Measurement {
                source: Some(SourceRef::new(source.as_str())),
                measurement_type: Some(measurement_type),
                time: Some(chrono::Utc::now()),
                ..wire::Measurement::default()
            };
            let mut cell = serde_json::Map::new();
            cell.insert("value".into(), json!(value));
            if let Some(unit) = unit {
                cell.insert("unit".into(), json!(unit));
            }
            body.fragments
                .insert(fragment, json!({ series: Value::Object(cell) }));

            api.create_measurement(&body).await?;
            Ok(CommandResult::Done)
        }

        // ── Provisioning ─────────────────────────────────────────
        Command::RegisterDevice { request_id } => {
            api.create_new_device_request(&request_id).await?;
            Ok(CommandResult::Done)
        }

        Command::AcceptDevice { request_id } => {
            api.accept_new_device_request(&request_id).await?;
            Ok(CommandResult::Done)
        }

        Command::CancelDeviceRequest { request_id } => {
            api.delete_new_device_request(&request_id).await?;
            Ok(CommandResult::Done)
        }
    }
}

async fn set_alarm_status(
    api: &ApiClient,
    store: &DataStore,
    id: &GId,
    status: &str,
) -> Result<CommandResult, CoreError> {
    let body = wire::Alarm {
        status: Some(status.into()),
        ..wire::Alarm::default()
    };
    let updated = api.update_alarm(id.as_str(), &body).await?;
    let alarm = convert::alarm_from_wire(&updated).ok_or_else(|| CoreError::NotFound {
        entity_type: "alarm".into(),
        identifier: id.to_string(),
    })?;
    store.alarms.upsert(alarm.id.clone(), alarm.clone());
    Ok(CommandResult::Alarm(alarm))
}

async fn queue_operation(
    api: &ApiClient,
    store: &DataStore,
    device_id: &GId,
    fragment: &str,
    payload: Value,
) -> Result<CommandResult, CoreError> {
    let mut body = wire::Operation {
        device_id: Some(device_id.to_string()),
        ..wire::Operation::default()
    };
    body.fragments.insert(fragment.to_owned(), payload);

    let created = api.create_operation(&body).await?;
    let op = convert::operation_from_wire(&created)
        .ok_or_else(|| CoreError::Internal("created operation has no id".into()))?;
    store.operations.upsert(op.id.clone(), op.clone());
    Ok(CommandResult::Operation(op))
}

/// Re-fetch a group after its child references changed.
/// Best effort — the periodic refresh repairs any miss.
async fn refresh_group(api: &ApiClient, store: &DataStore, id: &GId) {
    match api.get_managed_object(id.as_str()).await {
        Ok(mo) => {
            if let Some(group) = convert::group_from_managed_object(&mo) {
                store.groups.upsert(group.id.clone(), group);
            }
        }
        Err(e) => warn!(group = %id, error = %e, "group refresh failed"),
    }
}
