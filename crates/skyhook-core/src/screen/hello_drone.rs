//! Hello drone: connection state and battery of the drone and the remote,
//! plus a take-off/land button.

use std::sync::Arc;

use skyhook_sdk::model::{
    AutoConnection, BatteryInfo, ManualCopterPiloting, PilotingItfState,
};
use skyhook_sdk::{Command, Drone, GroundSdk, RemoteControl};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::{
    Attached, Outcome, ScreenAction, ScreenKind, auto_connection_keeper, select_drone,
    send_to_drone, unsupported,
};
use crate::config::ScreenConfig;
use crate::error::CoreError;
use crate::observe::DeviceObserve;
use crate::projection::hello::{self, HelloDroneInputs, HelloDroneView, piloting_action};
use crate::queue::DeliveryQueue;
use crate::reference::Reference;
use crate::session::{Binder, ReferenceSet, Session, SessionManager};
use crate::view::ViewModel;

type HelloModel = ViewModel<HelloDroneInputs, HelloDroneView>;

struct DroneBinder {
    view: Arc<HelloModel>,
    auto_activate: bool,
}

impl Binder<Drone> for DroneBinder {
    fn bind(&mut self, drone: &Drone, refs: &mut ReferenceSet) {
        let queue = refs.queue().clone();

        let view = Arc::clone(&self.view);
        refs.track(drone.get_state(&queue, move |state| {
            view.apply(|inputs| inputs.drone_state = state.copied());
        }));

        let view = Arc::clone(&self.view);
        refs.track(drone.get_instrument::<BatteryInfo, _>(&queue, move |battery| {
            view.apply(|inputs| inputs.drone_battery = battery.copied());
        }));

        let view = Arc::clone(&self.view);
        let device = drone.device().clone();
        let auto_activate = self.auto_activate;
        refs.track(drone.get_piloting_itf::<ManualCopterPiloting, _>(&queue, move |itf| {
            view.apply(|inputs| inputs.piloting = itf.copied());
            let idle = itf.is_some_and(|itf| itf.state == PilotingItfState::Idle);
            if auto_activate && idle {
                match device.send(Command::ActivatePiloting) {
                    Ok(()) => debug!(uid = %device.uid(), "activating manual piloting"),
                    Err(e) => warn!(uid = %device.uid(), error = %e, "piloting activation rejected"),
                }
            }
        }));
    }

    fn reset(&mut self) {
        self.view.apply(|inputs| {
            inputs.drone_state = None;
            inputs.drone_battery = None;
            inputs.piloting = None;
        });
    }
}

struct RemoteBinder {
    view: Arc<HelloModel>,
}

impl Binder<RemoteControl> for RemoteBinder {
    fn bind(&mut self, remote: &RemoteControl, refs: &mut ReferenceSet) {
        let queue = refs.queue().clone();

        let view = Arc::clone(&self.view);
        refs.track(remote.get_state(&queue, move |state| {
            view.apply(|inputs| inputs.remote_state = state.copied());
        }));

        let view = Arc::clone(&self.view);
        refs.track(remote.get_instrument::<BatteryInfo, _>(&queue, move |battery| {
            view.apply(|inputs| inputs.remote_battery = battery.copied());
        }));
    }

    fn reset(&mut self) {
        self.view.apply(|inputs| {
            inputs.remote_state = None;
            inputs.remote_battery = None;
        });
    }
}

struct Bindings {
    drone: SessionManager<Drone>,
    remote: SessionManager<RemoteControl>,
    _auto_connection: Reference<AutoConnection>,
}

pub struct HelloDroneScreen {
    view: Arc<HelloModel>,
    attached: Attached<Bindings>,
}

impl HelloDroneScreen {
    pub(crate) async fn open(
        sdk: &GroundSdk,
        queue: DeliveryQueue,
        config: &ScreenConfig,
    ) -> Result<Self, CoreError> {
        let view = ViewModel::new(hello::project);
        let sdk = sdk.clone();
        let auto_activate = config.auto_activate_piloting;
        let auto_start = config.auto_start_connection;
        let binder_view = Arc::clone(&view);

        let attached = Attached::attach(queue, move |queue| {
            let drone = SessionManager::attach(
                queue,
                sdk.facility::<AutoConnection>(),
                select_drone,
                Session::new(
                    "drone",
                    queue.clone(),
                    DroneBinder {
                        view: Arc::clone(&binder_view),
                        auto_activate,
                    },
                ),
            );
            let remote = SessionManager::attach(
                queue,
                sdk.facility::<AutoConnection>(),
                |auto: &AutoConnection| auto.remote_control.clone(),
                Session::new("remote", queue.clone(), RemoteBinder { view: binder_view }),
            );
            Bindings {
                drone,
                remote,
                _auto_connection: auto_connection_keeper(&sdk, queue, auto_start),
            }
        })
        .await?;

        Ok(Self { view, attached })
    }

    pub async fn perform(&self, action: ScreenAction) -> Result<Outcome, CoreError> {
        match action {
            ScreenAction::TakeOffOrLand => {
                let view = Arc::clone(&self.view);
                self.attached
                    .with(move |bindings| {
                        let action = view.inputs(|inputs| piloting_action(inputs.piloting.as_ref()));
                        match action {
                            Some(action) => send_to_drone(&bindings.drone, action.command()),
                            None => Ok(Outcome::Unavailable),
                        }
                    })
                    .await?
            }
            other => Err(unsupported(ScreenKind::HelloDrone, &other)),
        }
    }

    pub fn view(&self) -> HelloDroneView {
        self.view.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<HelloDroneView> {
        self.view.subscribe()
    }

    pub async fn live_references(&self) -> Result<usize, CoreError> {
        self.attached
            .with(|bindings| bindings.drone.live_references() + bindings.remote.live_references())
            .await
    }

    pub async fn flush(&self) -> Result<(), CoreError> {
        self.attached.flush().await
    }

    pub async fn close(&self) -> Result<(), CoreError> {
        self.attached.close().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use skyhook_sdk::{SimConfig, Uid};

    use super::*;
    use crate::projection::ButtonView;
    use crate::screen::testing::settle;

    async fn open(config: SimConfig, screen: ScreenConfig) -> (HelloDroneScreen, skyhook_sdk::SimController) {
        let (sdk, sim) = GroundSdk::simulated(config);
        let screen = HelloDroneScreen::open(&sdk, DeliveryQueue::spawn(), &screen)
            .await
            .unwrap();
        settle().await;
        screen.flush().await.unwrap();
        (screen, sim)
    }

    #[tokio::test]
    async fn auto_connection_binds_drone_and_remote() {
        let (screen, _sim) = open(SimConfig::default(), ScreenConfig::default()).await;

        let view = screen.view();
        assert_eq!(view.drone_state, "connected");
        assert_eq!(view.drone_battery, "100%");
        assert_eq!(view.remote_state, "connected");
        assert_eq!(view.remote_battery, "100%");
        assert_eq!(screen.live_references().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn idle_piloting_is_activated_and_take_off_enabled() {
        let (screen, _sim) = open(SimConfig::default(), ScreenConfig::default()).await;
        assert_eq!(screen.view().take_off_land, ButtonView::enabled("Take off"));

        let outcome = screen.perform(ScreenAction::TakeOffOrLand).await.unwrap();
        assert_eq!(outcome, Outcome::sent(Command::TakeOff));
        settle().await;
        screen.flush().await.unwrap();

        assert_eq!(screen.view().take_off_land, ButtonView::enabled("Land"));
    }

    #[tokio::test]
    async fn without_auto_activation_the_button_stays_disabled() {
        let config = ScreenConfig {
            auto_activate_piloting: false,
            ..ScreenConfig::default()
        };
        let (screen, _sim) = open(SimConfig::default(), config).await;

        assert_eq!(screen.view().take_off_land, ButtonView::disabled("Take off"));
        let outcome = screen.perform(ScreenAction::TakeOffOrLand).await.unwrap();
        assert_eq!(outcome, Outcome::Unavailable);
    }

    #[tokio::test]
    async fn removed_drone_clears_its_half_only() {
        let (screen, sim) = open(SimConfig::default(), ScreenConfig::default()).await;

        sim.remove_drone();
        settle().await;
        screen.flush().await.unwrap();

        let view = screen.view();
        assert_eq!(view.drone_state, "");
        assert_eq!(view.drone_battery, "");
        assert_eq!(view.remote_state, "connected");
        assert_eq!(screen.live_references().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn battery_updates_flow_to_the_view() {
        let (screen, sim) = open(SimConfig::default(), ScreenConfig::default()).await;

        sim.set_battery(&Uid::from("remote-1"), 12);
        settle().await;
        screen.flush().await.unwrap();

        assert_eq!(screen.view().remote_battery, "12%");
    }

    #[tokio::test]
    async fn other_actions_are_refused() {
        let (screen, _sim) = open(SimConfig::default(), ScreenConfig::default()).await;
        let result = screen.perform(ScreenAction::Capture).await;
        assert!(matches!(result, Err(CoreError::UnsupportedAction { .. })));
    }

    #[tokio::test]
    async fn closed_screen_releases_everything() {
        let (screen, _sim) = open(SimConfig::default(), ScreenConfig::default()).await;
        screen.close().await.unwrap();
        screen.close().await.unwrap();
        assert!(screen.live_references().await.is_err());
    }
}
