//! Handles are cheap clones of an SDK-owned entity. The SDK keeps the
//! component store; handles only read facets and enqueue commands.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::command::{Command, Envelope};
use crate::component::{Component, Entity, Instrument, Peripheral, PilotingItf};
use crate::error::SdkError;
use crate::facet::{ComponentStore, Facet};
use crate::id::Uid;
use crate::model::DeviceState;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DroneModel {
    /// Legacy camera API, no thermal imaging.
    Explorer,
    /// Legacy camera API with a thermal camera.
    ExplorerThermal,
    /// Configuration-draft camera API.
    Voyager,
}

/// Which camera API a drone exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CameraApi {
    Legacy,
    Current,
}

impl DroneModel {
    pub fn camera_api(self) -> CameraApi {
        match self {
            Self::Explorer | Self::ExplorerThermal => CameraApi::Legacy,
            Self::Voyager => CameraApi::Current,
        }
    }

    pub fn has_thermal(self) -> bool {
        self == Self::ExplorerThermal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "model", rename_all = "snake_case")]
pub enum DeviceKind {
    Drone(DroneModel),
    RemoteControl,
    Replay,
}

struct DeviceInner {
    uid: Uid,
    name: String,
    kind: DeviceKind,
    store: ComponentStore,
    commands: mpsc::UnboundedSender<Envelope>,
}

/// Shared handle to any SDK entity.
#[derive(Clone)]
pub struct Device {
    inner: Arc<DeviceInner>,
}

impl Device {
    pub(crate) fn new(
        uid: Uid,
        name: impl Into<String>,
        kind: DeviceKind,
        commands: mpsc::UnboundedSender<Envelope>,
    ) -> Self {
        Self {
            inner: Arc::new(DeviceInner {
                uid,
                name: name.into(),
                kind,
                store: ComponentStore::new(),
                commands,
            }),
        }
    }

    pub fn uid(&self) -> &Uid {
        &self.inner.uid
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn kind(&self) -> DeviceKind {
        self.inner.kind
    }

    pub fn state(&self) -> Facet<DeviceState> {
        self.inner.store.facet()
    }

    pub fn instrument<K: Instrument>(&self) -> Facet<K> {
        self.inner.store.facet()
    }

    pub fn peripheral<K: Peripheral>(&self) -> Facet<K> {
        self.inner.store.facet()
    }

    pub fn piloting_itf<K: PilotingItf>(&self) -> Facet<K> {
        self.inner.store.facet()
    }

    /// Snapshot of any component, regardless of class.
    pub fn snapshot<K: Component>(&self) -> Option<K> {
        self.inner.store.get()
    }

    pub fn is_connected(&self) -> bool {
        self.inner
            .store
            .get::<DeviceState>()
            .is_some_and(|state| state.is_connected())
    }

    /// Enqueue a command. `Ok` means accepted, not applied.
    pub fn send(&self, command: Command) -> Result<(), SdkError> {
        if !self.is_connected() {
            return Err(SdkError::Disconnected {
                target: self.uid().clone(),
            });
        }
        command.validate(self.uid())?;
        tracing::debug!(target_uid = %self.uid(), command = command.name(), "command sent");
        self.inner
            .commands
            .send(Envelope {
                target: self.uid().clone(),
                command,
            })
            .map_err(|_| SdkError::Closed)
    }

    pub(crate) fn store(&self) -> &ComponentStore {
        &self.inner.store
    }

    pub fn ptr_eq(&self, other: &Device) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("uid", &self.inner.uid)
            .field("name", &self.inner.name)
            .field("kind", &self.inner.kind)
            .finish_non_exhaustive()
    }
}

impl Entity for Device {
    fn uid(&self) -> &Uid {
        &self.inner.uid
    }

    fn name(&self) -> &str {
        &self.inner.name
    }

    fn same_entity(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

// ── Typed handles ───────────────────────────────────────────────────

/// A drone.
#[derive(Debug, Clone)]
pub struct Drone {
    device: Device,
    model: DroneModel,
}

impl Drone {
    pub(crate) fn new(device: Device, model: DroneModel) -> Self {
        Self { device, model }
    }

    pub fn model(&self) -> DroneModel {
        self.model
    }

    pub fn camera_api(&self) -> CameraApi {
        self.model.camera_api()
    }

    pub fn device(&self) -> &Device {
        &self.device
    }
}

/// A remote control.
#[derive(Debug, Clone)]
pub struct RemoteControl {
    device: Device,
}

impl RemoteControl {
    pub(crate) fn new(device: Device) -> Self {
        Self { device }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }
}

/// Playback session of a local media file.
#[derive(Debug, Clone)]
pub struct FileReplay {
    device: Device,
}

impl FileReplay {
    pub(crate) fn new(device: Device) -> Self {
        Self { device }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }
}

macro_rules! entity_handle {
    ($($handle:ident),+) => {$(
        impl Deref for $handle {
            type Target = Device;

            fn deref(&self) -> &Device {
                &self.device
            }
        }

        impl Entity for $handle {
            fn uid(&self) -> &Uid {
                self.device.uid()
            }

            fn name(&self) -> &str {
                self.device.name()
            }

            fn same_entity(&self, other: &Self) -> bool {
                self.device.ptr_eq(&other.device)
            }
        }
    )+};
}

entity_handle!(Drone, RemoteControl, FileReplay);

#[cfg(test)]
mod tests {
    use super::*;

    fn device() -> (Device, mpsc::UnboundedReceiver<Envelope>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Device::new(Uid::from("d1"), "Drone 1", DeviceKind::RemoteControl, tx), rx)
    }

    #[test]
    fn disconnected_device_rejects_commands() {
        let (device, mut rx) = device();
        let result = device.send(Command::TakeOff);
        assert!(matches!(result, Err(SdkError::Disconnected { .. })));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn connected_device_enqueues_commands() {
        let (device, mut rx) = device();
        device.store().publish(DeviceState::connected());

        device.send(Command::Land).ok();

        let envelope = rx.try_recv().ok();
        assert_eq!(envelope.map(|e| e.command), Some(Command::Land));
    }

    #[test]
    fn invalid_values_are_rejected_before_enqueueing() {
        let (device, mut rx) = device();
        device.store().publish(DeviceState::connected());

        assert!(device.send(Command::SetEmissivity(-1.0)).is_err());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn same_entity_compares_the_object_not_the_uid() {
        let (first, _rx) = device();
        let (second, _rx2) = device();
        assert!(first.same_entity(&first.clone()));
        assert!(!first.same_entity(&second));
    }

    #[test]
    fn camera_api_follows_model() {
        assert_eq!(DroneModel::Voyager.camera_api(), CameraApi::Current);
        assert_eq!(DroneModel::ExplorerThermal.camera_api(), CameraApi::Legacy);
        assert!(DroneModel::ExplorerThermal.has_thermal());
        assert_eq!("explorer_thermal".parse::<DroneModel>().ok(), Some(DroneModel::ExplorerThermal));
    }
}
