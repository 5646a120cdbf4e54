//! Thermal: thermal mode picker, palette, rendering and live stream toggle.
//!
//! A thermal setup is sent each time thermal control shows up for the bound
//! drone: on bind, and again after the drone reconnects.

use std::sync::{Arc, Mutex};

use skyhook_sdk::model::{AutoConnection, LiveStream, ThermalControl, ThermalMode};
use skyhook_sdk::{Command, Device, Drone, GroundSdk};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::{
    Attached, Outcome, ScreenAction, ScreenKind, auto_connection_keeper, select_drone,
    send_to_drone, unsupported,
};
use crate::config::{PalettePreset, ScreenConfig, ThermalSetup};
use crate::error::CoreError;
use crate::observe::DeviceObserve;
use crate::projection::thermal::{self, ThermalInputs, ThermalView};
use crate::queue::DeliveryQueue;
use crate::reference::Reference;
use crate::session::{Binder, ReferenceSet, Session, SessionManager};
use crate::sync::lock;
use crate::view::ViewModel;

type ThermalModel = ViewModel<ThermalInputs, ThermalView>;

fn send_setup(device: &Device, thermal: &ThermalControl, setup: &ThermalSetup, palette: PalettePreset) {
    let mut commands = Vec::with_capacity(5);
    if thermal.supports(setup.mode) {
        commands.push(Command::SetThermalMode(setup.mode));
    } else {
        debug!(mode = %setup.mode, "thermal mode unsupported, not requested");
    }
    commands.extend([
        Command::SetEmissivity(setup.emissivity),
        Command::SetBackgroundTemperature(setup.background_temperature),
        Command::SetThermalRendering(setup.rendering),
        Command::SetThermalPalette(palette.build()),
    ]);

    for command in commands {
        let name = command.name();
        if let Err(e) = device.send(command) {
            warn!(uid = %device.uid(), command = name, error = %e, "thermal setup rejected");
        }
    }
    debug!(uid = %device.uid(), %palette, "thermal setup sent");
}

struct ThermalBinder {
    view: Arc<ThermalModel>,
    setup: ThermalSetup,
    palette: Arc<Mutex<PalettePreset>>,
}

impl Binder<Drone> for ThermalBinder {
    fn bind(&mut self, drone: &Drone, refs: &mut ReferenceSet) {
        let queue = refs.queue().clone();

        let view = Arc::clone(&self.view);
        refs.track(drone.get_state(&queue, move |state| {
            view.apply(|inputs| inputs.drone_state = state.copied());
        }));

        let view = Arc::clone(&self.view);
        let device = drone.device().clone();
        let setup = self.setup.clone();
        let palette = Arc::clone(&self.palette);
        let mut configured = false;
        refs.track(drone.get_peripheral::<ThermalControl, _>(&queue, move |thermal| {
            view.apply(|inputs| inputs.thermal = thermal.cloned());
            match thermal {
                // Gone with a disconnect; the next appearance gets the setup again.
                None => configured = false,
                Some(thermal) if !configured => {
                    configured = true;
                    send_setup(&device, thermal, &setup, *lock(&palette));
                }
                Some(_) => {}
            }
        }));

        let view = Arc::clone(&self.view);
        refs.track(drone.get_peripheral::<LiveStream, _>(&queue, move |stream| {
            view.apply(|inputs| inputs.stream = stream.copied());
        }));
    }

    fn reset(&mut self) {
        self.view.reset();
    }
}

struct Bindings {
    drone: SessionManager<Drone>,
    _auto_connection: Reference<AutoConnection>,
}

pub struct ThermalScreen {
    view: Arc<ThermalModel>,
    palette: Arc<Mutex<PalettePreset>>,
    attached: Attached<Bindings>,
}

impl ThermalScreen {
    pub(crate) async fn open(
        sdk: &GroundSdk,
        queue: DeliveryQueue,
        config: &ScreenConfig,
    ) -> Result<Self, CoreError> {
        let view = ViewModel::new(thermal::project);
        let palette = Arc::new(Mutex::new(config.thermal.palette));
        let binder = ThermalBinder {
            view: Arc::clone(&view),
            setup: config.thermal.clone(),
            palette: Arc::clone(&palette),
        };
        let sdk = sdk.clone();
        let auto_start = config.auto_start_connection;

        let attached = Attached::attach(queue, move |queue| Bindings {
            drone: SessionManager::attach(
                queue,
                sdk.facility::<AutoConnection>(),
                select_drone,
                Session::new("thermal", queue.clone(), binder),
            ),
            _auto_connection: auto_connection_keeper(&sdk, queue, auto_start),
        })
        .await?;

        Ok(Self {
            view,
            palette,
            attached,
        })
    }

    pub async fn perform(&self, action: ScreenAction) -> Result<Outcome, CoreError> {
        let view = Arc::clone(&self.view);
        match action {
            ScreenAction::SetThermalMode(mode) => {
                self.attached
                    .with(move |bindings| set_mode(bindings, &view, mode))
                    .await?
            }
            ScreenAction::NextPalette => {
                let palette = Arc::clone(&self.palette);
                self.attached
                    .with(move |bindings| {
                        if view.inputs(|inputs| inputs.thermal.is_none()) {
                            return Ok(Outcome::Unavailable);
                        }
                        let next = {
                            let mut current = lock(&palette);
                            *current = current.next();
                            *current
                        };
                        send_to_drone(&bindings.drone, Command::SetThermalPalette(next.build()))
                    })
                    .await?
            }
            ScreenAction::ToggleStream => {
                self.attached
                    .with(move |bindings| match view.inputs(ThermalInputs::stream_action) {
                        Some(action) => send_to_drone(&bindings.drone, action.command()),
                        None => Ok(Outcome::Unavailable),
                    })
                    .await?
            }
            other => Err(unsupported(ScreenKind::Thermal, &other)),
        }
    }

    /// Palette preset that the next setup or cycle starts from.
    pub fn palette(&self) -> PalettePreset {
        *lock(&self.palette)
    }

    pub fn view(&self) -> ThermalView {
        self.view.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<ThermalView> {
        self.view.subscribe()
    }

    pub async fn live_references(&self) -> Result<usize, CoreError> {
        self.attached
            .with(|bindings| bindings.drone.live_references())
            .await
    }

    pub async fn flush(&self) -> Result<(), CoreError> {
        self.attached.flush().await
    }

    pub async fn close(&self) -> Result<(), CoreError> {
        self.attached.close().await
    }
}

fn set_mode(bindings: &Bindings, view: &ThermalModel, mode: ThermalMode) -> Result<Outcome, CoreError> {
    let supported = view.inputs(|inputs| inputs.thermal.as_ref().map(|t| t.supports(mode)));
    match supported {
        None => Ok(Outcome::Unavailable),
        Some(false) => {
            debug!(%mode, "thermal mode unsupported, skipped");
            Ok(Outcome::Skipped {
                what: format!("thermal mode {mode}"),
            })
        }
        Some(true) => send_to_drone(&bindings.drone, Command::SetThermalMode(mode)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use skyhook_sdk::{DroneModel, SimConfig, SimController};

    use super::*;
    use crate::projection::ButtonView;
    use crate::screen::testing::settle;

    async fn open(model: DroneModel) -> (ThermalScreen, SimController) {
        let config = SimConfig {
            drone_model: model,
            ..SimConfig::default()
        };
        let (sdk, sim) = GroundSdk::simulated(config);
        let screen = ThermalScreen::open(&sdk, DeliveryQueue::spawn(), &ScreenConfig::default())
            .await
            .unwrap();
        settle().await;
        screen.flush().await.unwrap();
        (screen, sim)
    }

    async fn step(screen: &ThermalScreen, action: ScreenAction) -> Outcome {
        let outcome = screen.perform(action).await.unwrap();
        settle().await;
        screen.flush().await.unwrap();
        outcome
    }

    #[tokio::test]
    async fn setup_is_applied_on_bind() {
        let (screen, _sim) = open(DroneModel::ExplorerThermal).await;
        let view = screen.view();

        assert_eq!(view.mode.selected.as_deref(), Some("standard"));
        assert_eq!(view.rendering, "blended 50%");
        assert_eq!(view.palette, "relative, 3 colors");
        assert_eq!(view.stream, ButtonView::enabled("Play"));
        assert_eq!(screen.live_references().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn palette_cycles_through_presets() {
        let (screen, _sim) = open(DroneModel::ExplorerThermal).await;

        step(&screen, ScreenAction::NextPalette).await;
        assert_eq!(screen.palette(), PalettePreset::Absolute);
        assert_eq!(screen.view().palette, "absolute 300.0-310.0 K, 2 colors");

        step(&screen, ScreenAction::NextPalette).await;
        assert_eq!(screen.view().palette, "hot spot above 0.50, 2 colors");
    }

    #[tokio::test]
    async fn stream_toggles() {
        let (screen, _sim) = open(DroneModel::ExplorerThermal).await;

        let outcome = step(&screen, ScreenAction::ToggleStream).await;
        assert_eq!(outcome, Outcome::sent(Command::Play));
        assert_eq!(screen.view().stream, ButtonView::enabled("Pause"));

        step(&screen, ScreenAction::ToggleStream).await;
        assert_eq!(screen.view().stream, ButtonView::enabled("Play"));
    }

    #[tokio::test]
    async fn drone_without_thermal_leaves_controls_cleared() {
        let (screen, _sim) = open(DroneModel::Explorer).await;

        assert_eq!(screen.view().palette, "");
        assert!(!screen.view().mode.enabled);
        assert_eq!(
            step(&screen, ScreenAction::SetThermalMode(ThermalMode::Blended)).await,
            Outcome::Unavailable
        );
        assert_eq!(step(&screen, ScreenAction::NextPalette).await, Outcome::Unavailable);
        assert_eq!(screen.palette(), PalettePreset::Relative);
    }

    #[tokio::test]
    async fn setup_is_resent_after_reconnect() {
        let (screen, sim) = open(DroneModel::ExplorerThermal).await;
        assert_eq!(screen.view().mode.selected.as_deref(), Some("standard"));

        assert!(sim.disconnect_drone());
        settle().await;
        screen.flush().await.unwrap();
        assert_eq!(screen.view().palette, "");

        sim.connect_default_drone();
        settle().await;
        screen.flush().await.unwrap();

        let view = screen.view();
        assert_eq!(view.mode.selected.as_deref(), Some("standard"));
        assert_eq!(view.palette, "relative, 3 colors");
    }

    #[tokio::test]
    async fn mode_change_is_reflected() {
        let (screen, _sim) = open(DroneModel::ExplorerThermal).await;
        step(&screen, ScreenAction::SetThermalMode(ThermalMode::Embedded)).await;
        assert_eq!(screen.view().mode.selected.as_deref(), Some("embedded"));
    }
}
