use crate::component::component;
use crate::device::{Drone, RemoteControl};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum AutoConnectionStatus {
    Stopped,
    Started,
}

/// Facility selecting the drone and remote control the application works with.
///
/// Either slot may be empty at any time; the selected entity can change
/// without the previous one disconnecting first.
#[derive(Debug, Clone)]
pub struct AutoConnection {
    pub status: AutoConnectionStatus,
    pub drone: Option<Drone>,
    pub remote_control: Option<RemoteControl>,
}

impl AutoConnection {
    pub fn stopped() -> Self {
        Self {
            status: AutoConnectionStatus::Stopped,
            drone: None,
            remote_control: None,
        }
    }
}

component!(AutoConnection, Facility, "auto_connection");
