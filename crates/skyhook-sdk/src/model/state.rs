use serde::{Deserialize, Serialize};

use crate::component::{Component, ComponentClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

/// Why the entity last changed connection state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConnectionCause {
    #[default]
    None,
    UserRequest,
    ConnectionLost,
    Failure,
}

/// Connection state of an entity, always available while the SDK knows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceState {
    pub connection: ConnectionState,
    pub cause: ConnectionCause,
}

impl DeviceState {
    pub fn connected() -> Self {
        Self {
            connection: ConnectionState::Connected,
            cause: ConnectionCause::None,
        }
    }

    pub fn disconnected(cause: ConnectionCause) -> Self {
        Self {
            connection: ConnectionState::Disconnected,
            cause,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection == ConnectionState::Connected
    }
}

impl Component for DeviceState {
    const NAME: &'static str = "device_state";
    const CLASS: ComponentClass = ComponentClass::State;
}
