//! skyhook-sdk: Drone SDK boundary -- entities, observable component facets,
//! commands, and the simulated backend that owns all state.

pub mod camera_config;
pub mod command;
pub mod component;
pub mod device;
pub mod error;
pub mod facet;
pub mod id;
pub mod model;
pub mod sdk;
pub mod sim;

// ── Primary re-exports ──────────────────────────────────────────────
pub use camera_config::{CameraConfig, ConfigEntry, Draft, DraftEntry, Param, ParamValue};
pub use command::Command;
pub use component::{Component, ComponentClass, Entity, Facility, Instrument, Peripheral, PilotingItf};
pub use device::{CameraApi, Device, DeviceKind, Drone, DroneModel, FileReplay, RemoteControl};
pub use error::SdkError;
pub use facet::{ComponentStore, Facet};
pub use id::Uid;
pub use sdk::GroundSdk;
pub use sim::{SimConfig, SimController};
