//! Owns every entity and applies commands on a background task, the way a
//! real SDK backend would after a round trip to the device.

mod effects;
mod fixtures;
mod world;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::device::{Device, Drone, DroneModel, RemoteControl};
use crate::id::Uid;

pub(crate) use world::SimWorld;

/// Shape of the simulated fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub drone_model: DroneModel,
    pub drone_uid: String,
    pub drone_name: String,
    pub drone_battery: u8,
    pub remote_uid: String,
    pub remote_name: String,
    pub remote_battery: u8,
    /// Connect the configured drone and remote when auto connection starts.
    pub connect_on_start: bool,
    pub replay_duration: Duration,
    pub playback_tick: Duration,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            drone_model: DroneModel::Explorer,
            drone_uid: "drone-1".into(),
            drone_name: "Explorer 1".into(),
            drone_battery: 100,
            remote_uid: "remote-1".into(),
            remote_name: "Remote 1".into(),
            remote_battery: 100,
            connect_on_start: true,
            replay_duration: Duration::from_secs(60),
            playback_tick: Duration::from_millis(250),
        }
    }
}

/// Drives the simulated world: entities appearing, disconnecting, swapping,
/// and telemetry changing.
#[derive(Clone)]
pub struct SimController {
    world: std::sync::Arc<SimWorld>,
}

impl SimController {
    pub(crate) fn new(world: std::sync::Arc<SimWorld>) -> Self {
        Self { world }
    }

    pub fn config(&self) -> &SimConfig {
        self.world.config()
    }

    /// Connect a drone and make it the auto-connection's current drone.
    /// A different previously selected drone is disconnected first.
    pub fn connect_drone(&self, uid: &str, name: &str, model: DroneModel) -> Drone {
        self.world.connect_drone(&Uid::from(uid), name, model)
    }

    pub fn connect_default_drone(&self) -> Drone {
        let config = self.world.config();
        self.world
            .connect_drone(&Uid::from(config.drone_uid.as_str()), &config.drone_name, config.drone_model)
    }

    /// Disconnect the current drone but keep it selected.
    pub fn disconnect_drone(&self) -> bool {
        self.world.disconnect_drone()
    }

    /// Disconnect the current drone and clear the selection.
    pub fn remove_drone(&self) -> bool {
        self.world.remove_drone()
    }

    pub fn connect_remote(&self, uid: &str, name: &str) -> RemoteControl {
        self.world.connect_remote(&Uid::from(uid), name)
    }

    pub fn connect_default_remote(&self) -> RemoteControl {
        let config = self.world.config();
        self.world
            .connect_remote(&Uid::from(config.remote_uid.as_str()), &config.remote_name)
    }

    pub fn disconnect_remote(&self) -> bool {
        self.world.disconnect_remote()
    }

    pub fn remove_remote(&self) -> bool {
        self.world.remove_remote()
    }

    /// Set the battery level of any connected entity.
    pub fn set_battery(&self, uid: &Uid, level: u8) -> bool {
        self.world.set_battery(uid, level)
    }

    /// Toggle whether the drone's piloting interface can be activated.
    pub fn set_piloting_available(&self, uid: &Uid, available: bool) -> bool {
        self.world.set_piloting_available(uid, available)
    }

    pub fn drone(&self) -> Option<Drone> {
        self.world.current_drone()
    }

    pub fn remote(&self) -> Option<RemoteControl> {
        self.world.current_remote()
    }

    pub fn device(&self, uid: &Uid) -> Option<Device> {
        self.world.device(uid)
    }
}

impl std::fmt::Debug for SimController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimController").finish_non_exhaustive()
    }
}
