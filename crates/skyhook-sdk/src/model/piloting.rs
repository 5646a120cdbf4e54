use serde::{Deserialize, Serialize};

use crate::component::component;

/// Activation state shared by all piloting interfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PilotingItfState {
    /// Cannot be activated (drone not ready).
    Unavailable,
    /// Can be activated.
    Idle,
    /// Currently controls the drone.
    Active,
}

/// Manual piloting interface of a copter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualCopterPiloting {
    pub state: PilotingItfState,
    pub can_take_off: bool,
    pub can_land: bool,
}

impl ManualCopterPiloting {
    /// Landed, inactive interface as published right after connection.
    pub fn landed() -> Self {
        Self {
            state: PilotingItfState::Idle,
            can_take_off: false,
            can_land: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == PilotingItfState::Active
    }
}

component!(ManualCopterPiloting, PilotingItf, "manual_copter");
