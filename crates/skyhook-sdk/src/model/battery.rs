use serde::{Deserialize, Serialize};

use crate::component::component;

/// Battery telemetry. Level is a percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatteryInfo {
    pub level: u8,
    pub charging: bool,
}

impl BatteryInfo {
    pub fn new(level: u8) -> Self {
        Self {
            level: level.min(100),
            charging: false,
        }
    }
}

component!(BatteryInfo, Instrument, "battery_info");
