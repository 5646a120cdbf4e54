use serde::Serialize;
use skyhook_sdk::Command;
use skyhook_sdk::model::{BatteryInfo, DeviceState, ManualCopterPiloting};

use super::{ABSENT, ButtonView, ViewRow, ViewRows, button_row, select_first};

#[derive(Debug, Clone, Default)]
pub struct HelloDroneInputs {
    pub drone_state: Option<DeviceState>,
    pub drone_battery: Option<BatteryInfo>,
    pub piloting: Option<ManualCopterPiloting>,
    pub remote_state: Option<DeviceState>,
    pub remote_battery: Option<BatteryInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelloDroneView {
    pub drone_state: String,
    pub drone_battery: String,
    pub remote_state: String,
    pub remote_battery: String,
    pub take_off_land: ButtonView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PilotingAction {
    TakeOff,
    Land,
}

impl PilotingAction {
    pub fn command(self) -> Command {
        match self {
            Self::TakeOff => Command::TakeOff,
            Self::Land => Command::Land,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::TakeOff => "Take off",
            Self::Land => "Land",
        }
    }
}

/// What the take-off/land button does, if anything. Only an active
/// interface can act; landing wins when both are possible.
pub fn piloting_action(itf: Option<&ManualCopterPiloting>) -> Option<PilotingAction> {
    let itf = itf.filter(|itf| itf.is_active())?;
    select_first(&[
        (itf.can_land, PilotingAction::Land),
        (itf.can_take_off, PilotingAction::TakeOff),
    ])
}

fn state_label(state: Option<&DeviceState>) -> String {
    state.map_or_else(|| ABSENT.to_owned(), |state| state.connection.to_string())
}

fn battery_label(battery: Option<&BatteryInfo>) -> String {
    battery.map_or_else(|| ABSENT.to_owned(), |battery| format!("{}%", battery.level))
}

pub fn project(inputs: &HelloDroneInputs) -> HelloDroneView {
    let take_off_land = match piloting_action(inputs.piloting.as_ref()) {
        Some(action) => ButtonView::enabled(action.label()),
        None => ButtonView::disabled(PilotingAction::TakeOff.label()),
    };
    HelloDroneView {
        drone_state: state_label(inputs.drone_state.as_ref()),
        drone_battery: battery_label(inputs.drone_battery.as_ref()),
        remote_state: state_label(inputs.remote_state.as_ref()),
        remote_battery: battery_label(inputs.remote_battery.as_ref()),
        take_off_land,
    }
}

impl ViewRows for HelloDroneView {
    fn rows(&self) -> Vec<ViewRow> {
        vec![
            ViewRow::new("drone state", &self.drone_state),
            ViewRow::new("drone battery", &self.drone_battery),
            ViewRow::new("remote state", &self.remote_state),
            ViewRow::new("remote battery", &self.remote_battery),
            button_row("take off / land", &self.take_off_land),
        ]
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use skyhook_sdk::model::{ConnectionCause, PilotingItfState};

    use super::*;

    fn itf(state: PilotingItfState, can_take_off: bool, can_land: bool) -> ManualCopterPiloting {
        ManualCopterPiloting {
            state,
            can_take_off,
            can_land,
        }
    }

    #[test]
    fn everything_absent_is_cleared() {
        let view = project(&HelloDroneInputs::default());
        assert_eq!(
            view,
            HelloDroneView {
                drone_state: String::new(),
                drone_battery: String::new(),
                remote_state: String::new(),
                remote_battery: String::new(),
                take_off_land: ButtonView::disabled("Take off"),
            }
        );
    }

    #[test]
    fn telemetry_labels() {
        let inputs = HelloDroneInputs {
            drone_state: Some(DeviceState::connected()),
            drone_battery: Some(BatteryInfo::new(73)),
            remote_state: Some(DeviceState::disconnected(ConnectionCause::ConnectionLost)),
            ..HelloDroneInputs::default()
        };
        let view = project(&inputs);
        assert_eq!(view.drone_state, "connected");
        assert_eq!(view.drone_battery, "73%");
        assert_eq!(view.remote_state, "disconnected");
        assert_eq!(view.remote_battery, "");
    }

    #[test]
    fn button_follows_active_interface() {
        let cases = [
            (itf(PilotingItfState::Idle, true, false), ButtonView::disabled("Take off")),
            (itf(PilotingItfState::Unavailable, false, true), ButtonView::disabled("Take off")),
            (itf(PilotingItfState::Active, true, false), ButtonView::enabled("Take off")),
            (itf(PilotingItfState::Active, false, true), ButtonView::enabled("Land")),
            (itf(PilotingItfState::Active, true, true), ButtonView::enabled("Land")),
            (itf(PilotingItfState::Active, false, false), ButtonView::disabled("Take off")),
        ];
        for (piloting, expected) in cases {
            let inputs = HelloDroneInputs {
                piloting: Some(piloting),
                ..HelloDroneInputs::default()
            };
            assert_eq!(project(&inputs).take_off_land, expected, "{piloting:?}");
        }
    }

    #[test]
    fn projection_depends_only_on_latest_inputs() {
        let present = HelloDroneInputs {
            drone_battery: Some(BatteryInfo::new(50)),
            piloting: Some(itf(PilotingItfState::Active, true, false)),
            ..HelloDroneInputs::default()
        };
        let first = project(&present);
        let _absent = project(&HelloDroneInputs::default());
        assert_eq!(project(&present), first);
    }
}
