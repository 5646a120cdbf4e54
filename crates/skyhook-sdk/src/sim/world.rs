use std::sync::{Arc, Weak};

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::SimConfig;
use super::fixtures::{populate_drone, populate_remote};
use crate::command::Envelope;
use crate::component::Entity;
use crate::device::{Device, DeviceKind, Drone, DroneModel, FileReplay, RemoteControl};
use crate::error::SdkError;
use crate::facet::ComponentStore;
use crate::id::Uid;
use crate::model::{
    AutoConnection, AutoConnectionStatus, BatteryInfo, ConnectionCause, DeviceState,
    ManualCopterPiloting, PilotingItfState, PlaybackState, ReplayStream,
};

/// Shared state of the simulated SDK.
pub(crate) struct SimWorld {
    config: SimConfig,
    facilities: ComponentStore,
    devices: DashMap<Uid, Device>,
    pub(super) tickers: DashMap<Uid, CancellationToken>,
    commands: mpsc::UnboundedSender<Envelope>,
    pub(super) cancel: CancellationToken,
}

impl SimWorld {
    /// Create the world and start its command processor on the current runtime.
    pub(crate) fn spawn(config: SimConfig) -> Arc<Self> {
        let (commands, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let world = Arc::new(Self {
            config,
            facilities: ComponentStore::new(),
            devices: DashMap::new(),
            tickers: DashMap::new(),
            commands,
            cancel: cancel.clone(),
        });
        world.facilities.publish(AutoConnection::stopped());
        tokio::spawn(command_processor(Arc::downgrade(&world), rx, cancel));
        world
    }

    pub(crate) fn config(&self) -> &SimConfig {
        &self.config
    }

    pub(crate) fn facilities(&self) -> &ComponentStore {
        &self.facilities
    }

    pub(crate) fn device(&self, uid: &Uid) -> Option<Device> {
        self.devices.get(uid).map(|device| device.clone())
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn shutdown(&self) {
        for ticker in self.tickers.iter() {
            ticker.value().cancel();
        }
        self.tickers.clear();
        self.cancel.cancel();
        info!("simulated SDK closed");
    }

    fn register(&self, uid: &Uid, name: &str, kind: DeviceKind) -> Device {
        let mut entry = self
            .devices
            .entry(uid.clone())
            .or_insert_with(|| Device::new(uid.clone(), name, kind, self.commands.clone()));
        if entry.kind() != kind {
            let replaced = std::mem::replace(
                &mut *entry,
                Device::new(uid.clone(), name, kind, self.commands.clone()),
            );
            Self::disconnect(&replaced, ConnectionCause::UserRequest);
            debug!(%uid, kind = ?kind, "entity replaced under the same uid");
        }
        entry.clone()
    }

    fn disconnect(device: &Device, cause: ConnectionCause) {
        device.store().clear_all();
        device.store().publish(DeviceState::disconnected(cause));
        debug!(uid = %device.uid(), %cause, "entity disconnected");
    }

    // ── Auto connection ─────────────────────────────────────────────

    pub(crate) fn start_auto_connection(&self) {
        let mut started = false;
        self.facilities.update::<AutoConnection>(|auto| {
            if auto.status == AutoConnectionStatus::Stopped {
                auto.status = AutoConnectionStatus::Started;
                started = true;
            }
        });
        if !started {
            return;
        }
        info!("auto connection started");
        if self.config.connect_on_start {
            let config = &self.config;
            self.connect_drone(
                &Uid::from(config.drone_uid.as_str()),
                &config.drone_name,
                config.drone_model,
            );
            self.connect_remote(&Uid::from(config.remote_uid.as_str()), &config.remote_name);
        }
    }

    pub(crate) fn current_drone(&self) -> Option<Drone> {
        self.facilities
            .get::<AutoConnection>()
            .and_then(|auto| auto.drone)
    }

    pub(crate) fn current_remote(&self) -> Option<RemoteControl> {
        self.facilities
            .get::<AutoConnection>()
            .and_then(|auto| auto.remote_control)
    }

    // ── Drones ──────────────────────────────────────────────────────

    pub(crate) fn connect_drone(&self, uid: &Uid, name: &str, model: DroneModel) -> Drone {
        if let Some(previous) = self.current_drone().filter(|drone| drone.uid() != uid) {
            Self::disconnect(previous.device(), ConnectionCause::UserRequest);
        }
        let device = self.register(uid, name, DeviceKind::Drone(model));
        populate_drone(device.store(), model, self.config.drone_battery);
        let drone = Drone::new(device, model);

        let selected = drone.clone();
        self.facilities
            .update::<AutoConnection>(move |auto| auto.drone = Some(selected));
        info!(%uid, %model, "drone connected");
        drone
    }

    pub(crate) fn disconnect_drone(&self) -> bool {
        let Some(drone) = self.current_drone() else {
            return false;
        };
        Self::disconnect(drone.device(), ConnectionCause::ConnectionLost);
        true
    }

    pub(crate) fn remove_drone(&self) -> bool {
        let Some(drone) = self.current_drone() else {
            return false;
        };
        Self::disconnect(drone.device(), ConnectionCause::UserRequest);
        self.facilities
            .update::<AutoConnection>(|auto| auto.drone = None);
        self.devices.remove(drone.uid());
        info!(uid = %drone.uid(), "drone removed");
        true
    }

    // ── Remote controls ─────────────────────────────────────────────

    pub(crate) fn connect_remote(&self, uid: &Uid, name: &str) -> RemoteControl {
        if let Some(previous) = self.current_remote().filter(|remote| remote.uid() != uid) {
            Self::disconnect(previous.device(), ConnectionCause::UserRequest);
        }
        let device = self.register(uid, name, DeviceKind::RemoteControl);
        populate_remote(device.store(), self.config.remote_battery);
        let remote = RemoteControl::new(device);

        let selected = remote.clone();
        self.facilities
            .update::<AutoConnection>(move |auto| auto.remote_control = Some(selected));
        info!(%uid, "remote control connected");
        remote
    }

    pub(crate) fn disconnect_remote(&self) -> bool {
        let Some(remote) = self.current_remote() else {
            return false;
        };
        Self::disconnect(remote.device(), ConnectionCause::ConnectionLost);
        true
    }

    pub(crate) fn remove_remote(&self) -> bool {
        let Some(remote) = self.current_remote() else {
            return false;
        };
        Self::disconnect(remote.device(), ConnectionCause::UserRequest);
        self.facilities
            .update::<AutoConnection>(|auto| auto.remote_control = None);
        self.devices.remove(remote.uid());
        true
    }

    // ── Telemetry ───────────────────────────────────────────────────

    pub(crate) fn set_battery(&self, uid: &Uid, level: u8) -> bool {
        self.device(uid).is_some_and(|device| {
            device
                .store()
                .update::<BatteryInfo>(|battery| battery.level = level.min(100))
        })
    }

    pub(crate) fn set_piloting_available(&self, uid: &Uid, available: bool) -> bool {
        self.device(uid).is_some_and(|device| {
            device.store().update::<ManualCopterPiloting>(|piloting| {
                piloting.state = match (available, piloting.state) {
                    (false, _) => PilotingItfState::Unavailable,
                    (true, PilotingItfState::Unavailable) => PilotingItfState::Idle,
                    (true, state) => state,
                };
            })
        })
    }

    // ── Replays ─────────────────────────────────────────────────────

    pub(crate) fn open_replay(&self, source: &str) -> Result<FileReplay, SdkError> {
        if self.is_closed() {
            return Err(SdkError::Closed);
        }
        let source = source.trim();
        if source.is_empty() {
            return Err(SdkError::Rejected {
                target: Uid::from("replay"),
                command: "open_replay",
                reason: "empty media source".into(),
            });
        }
        let uid = Uid::new(format!("replay:{source}"));
        let device = self.register(&uid, source, DeviceKind::Replay);
        device.store().publish(DeviceState::connected());
        device.store().publish(ReplayStream {
            source: source.to_owned(),
            state: PlaybackState::Stopped,
            position: std::time::Duration::ZERO,
            duration: self.config.replay_duration,
        });
        info!(%uid, "replay opened");
        Ok(FileReplay::new(device))
    }

    pub(crate) fn close_replay(&self, replay: &FileReplay) {
        if let Some((_, ticker)) = self.tickers.remove(replay.uid()) {
            ticker.cancel();
        }
        Self::disconnect(replay.device(), ConnectionCause::UserRequest);
        self.devices.remove(replay.uid());
    }
}

impl Drop for SimWorld {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn command_processor(
    world: Weak<SimWorld>,
    mut commands: mpsc::UnboundedReceiver<Envelope>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = commands.recv() => {
                let Some(envelope) = envelope else { break };
                let Some(world) = world.upgrade() else { break };
                world.apply(envelope);
            }
        }
    }
    debug!("command processor stopped");
}
