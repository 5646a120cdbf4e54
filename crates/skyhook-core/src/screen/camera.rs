//! Camera: active state, capture button, mode and white balance pickers.
//!
//! The bound drone's camera API is looked up once per binding; each API has
//! its own reference and its own way of changing settings.

use std::sync::Arc;

use skyhook_sdk::model::{AutoConnection, CameraMode, LegacyCamera, MainCamera, WhiteBalanceMode};
use skyhook_sdk::{CameraApi, Command, Drone, GroundSdk, ParamValue};
use tokio::sync::watch;
use tracing::debug;

use super::{
    Attached, Outcome, ScreenAction, ScreenKind, auto_connection_keeper, select_drone,
    send_to_drone, unsupported,
};
use crate::config::ScreenConfig;
use crate::edit::{EditOutcome, apply_param};
use crate::error::CoreError;
use crate::observe::DeviceObserve;
use crate::projection::camera::{self, CameraFacet, CameraInputs, CameraView};
use crate::queue::DeliveryQueue;
use crate::reference::Reference;
use crate::session::{Binder, ReferenceSet, Session, SessionManager};
use crate::view::ViewModel;

type CameraModel = ViewModel<CameraInputs, CameraView>;

struct CameraBinder {
    view: Arc<CameraModel>,
}

impl Binder<Drone> for CameraBinder {
    fn bind(&mut self, drone: &Drone, refs: &mut ReferenceSet) {
        let queue = refs.queue().clone();
        let api = drone.camera_api();
        self.view.apply(|inputs| inputs.api = Some(api));

        let view = Arc::clone(&self.view);
        match api {
            CameraApi::Legacy => {
                refs.track(drone.get_peripheral::<LegacyCamera, _>(&queue, move |camera| {
                    view.apply(|inputs| inputs.camera = camera.cloned().map(CameraFacet::Legacy));
                }));
            }
            CameraApi::Current => {
                refs.track(drone.get_peripheral::<MainCamera, _>(&queue, move |camera| {
                    view.apply(|inputs| inputs.camera = camera.cloned().map(CameraFacet::Current));
                }));
            }
        }
    }

    fn reset(&mut self) {
        self.view.reset();
    }
}

struct Bindings {
    drone: SessionManager<Drone>,
    _auto_connection: Reference<AutoConnection>,
}

/// A camera setting change, for either API.
#[derive(Debug, Clone, Copy)]
enum Setting {
    Mode(CameraMode),
    WhiteBalance(WhiteBalanceMode),
}

impl Setting {
    fn describe(self) -> String {
        match self {
            Self::Mode(mode) => format!("camera mode {mode}"),
            Self::WhiteBalance(mode) => format!("white balance {mode}"),
        }
    }

    fn legacy_command(self, camera: &LegacyCamera) -> Option<Command> {
        match self {
            Self::Mode(mode) => camera
                .supported_modes
                .contains(&mode)
                .then_some(Command::SetLegacyCameraMode(mode)),
            Self::WhiteBalance(mode) => camera
                .white_balance
                .supported_modes
                .contains(&mode)
                .then_some(Command::SetLegacyWhiteBalance(mode)),
        }
    }

    fn param_value(self) -> ParamValue {
        match self {
            Self::Mode(mode) => ParamValue::Mode(mode),
            Self::WhiteBalance(mode) => ParamValue::WhiteBalanceMode(mode),
        }
    }
}

fn change_setting(
    bindings: &Bindings,
    camera: Option<CameraFacet>,
    setting: Setting,
) -> Result<Outcome, CoreError> {
    let Some(camera) = camera else {
        return Ok(Outcome::Unavailable);
    };
    match camera {
        CameraFacet::Legacy(camera) => match setting.legacy_command(&camera) {
            Some(command) => send_to_drone(&bindings.drone, command),
            None => {
                debug!(setting = %setting.describe(), "unsupported by legacy camera, skipped");
                Ok(Outcome::Skipped {
                    what: setting.describe(),
                })
            }
        },
        CameraFacet::Current(camera) => {
            let Some(drone) = bindings.drone.with_entity(Clone::clone) else {
                return Ok(Outcome::Unavailable);
            };
            match apply_param(drone.device(), &camera.config, setting.param_value())? {
                EditOutcome::Committed(config) => {
                    Ok(Outcome::sent(Command::ApplyCameraConfig(config)))
                }
                EditOutcome::Skipped { .. } => Ok(Outcome::Skipped {
                    what: setting.describe(),
                }),
            }
        }
    }
}

pub struct CameraScreen {
    view: Arc<CameraModel>,
    attached: Attached<Bindings>,
}

impl CameraScreen {
    pub(crate) async fn open(
        sdk: &GroundSdk,
        queue: DeliveryQueue,
        config: &ScreenConfig,
    ) -> Result<Self, CoreError> {
        let view = ViewModel::new(camera::project);
        let sdk = sdk.clone();
        let auto_start = config.auto_start_connection;
        let binder_view = Arc::clone(&view);

        let attached = Attached::attach(queue, move |queue| Bindings {
            drone: SessionManager::attach(
                queue,
                sdk.facility::<AutoConnection>(),
                select_drone,
                Session::new("camera", queue.clone(), CameraBinder { view: binder_view }),
            ),
            _auto_connection: auto_connection_keeper(&sdk, queue, auto_start),
        })
        .await?;

        Ok(Self { view, attached })
    }

    pub async fn perform(&self, action: ScreenAction) -> Result<Outcome, CoreError> {
        let setting = match action {
            ScreenAction::Capture => {
                let view = Arc::clone(&self.view);
                return self
                    .attached
                    .with(move |bindings| match view.inputs(CameraInputs::capture_action) {
                        Some(action) => send_to_drone(&bindings.drone, action.command()),
                        None => Ok(Outcome::Unavailable),
                    })
                    .await?;
            }
            ScreenAction::SetCameraMode(mode) => Setting::Mode(mode),
            ScreenAction::SetWhiteBalance(mode) => Setting::WhiteBalance(mode),
            other => return Err(unsupported(ScreenKind::Camera, &other)),
        };

        let view = Arc::clone(&self.view);
        self.attached
            .with(move |bindings| {
                let camera = view.inputs(|inputs| inputs.camera.clone());
                change_setting(bindings, camera, setting)
            })
            .await?
    }

    pub fn view(&self) -> CameraView {
        self.view.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<CameraView> {
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
