//! A screen owns one delivery queue, the session managers that keep its
//! references bound to the current entities, and one view model. Bindings are
//! created, used and dropped only from jobs on that queue.

pub mod camera;
pub mod hello_drone;
pub mod replay;
pub mod thermal;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use skyhook_sdk::model::{
    AutoConnection, AutoConnectionStatus, CameraMode, ThermalMode, WhiteBalanceMode,
};
use skyhook_sdk::{Command, Drone, GroundSdk, Uid};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::config::ScreenConfig;
use crate::error::CoreError;
use crate::observe::SdkObserve;
use crate::projection::{
    CameraView, HelloDroneView, ReplayView, ThermalView, ViewRow, ViewRows,
};
use crate::queue::DeliveryQueue;
use crate::reference::Reference;
use crate::session::SessionManager;
use crate::sync::lock;

pub use camera::CameraScreen;
pub use hello_drone::HelloDroneScreen;
pub use replay::ReplayScreen;
pub use thermal::ThermalScreen;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ScreenKind {
    HelloDrone,
    Camera,
    Thermal,
    Replay,
}

/// User intent on a screen. Each screen accepts a subset.
#[derive(Debug, Clone, PartialEq, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ScreenAction {
    TakeOffOrLand,
    Capture,
    SetCameraMode(CameraMode),
    SetWhiteBalance(WhiteBalanceMode),
    SetThermalMode(ThermalMode),
    NextPalette,
    ToggleStream,
    OpenReplay(String),
    CloseReplay,
    TogglePlayback,
    SeekTo(Duration),
    SeekBy(i64),
}

impl ScreenAction {
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

/// What performing an action did. Effects show up later in the view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Sent { command: Command },
    Opened { uid: Uid },
    Closed { uid: Uid },
    /// Not supported by the current capability set; nothing was sent.
    Skipped { what: String },
    /// The entity or facet the action needs is absent.
    Unavailable,
}

impl Outcome {
    pub(crate) fn sent(command: Command) -> Self {
        Self::Sent { command }
    }
}

pub(crate) fn unsupported(kind: ScreenKind, action: &ScreenAction) -> CoreError {
    CoreError::UnsupportedAction {
        screen: kind.to_string(),
        action: action.name().to_owned(),
    }
}

// ── Bindings on the queue ───────────────────────────────────────────

/// Screen state that lives on the delivery queue.
pub(crate) struct Attached<B> {
    queue: DeliveryQueue,
    bindings: Arc<Mutex<Option<B>>>,
}

impl<B: Send + 'static> Attached<B> {
    /// Build the bindings as a queue job.
    pub(crate) async fn attach<F>(queue: DeliveryQueue, build: F) -> Result<Self, CoreError>
    where
        F: FnOnce(&DeliveryQueue) -> B + Send + 'static,
    {
        let job_queue = queue.clone();
        let bindings = queue.call(move || build(&job_queue)).await?;
        Ok(Self {
            queue,
            bindings: Arc::new(Mutex::new(Some(bindings))),
        })
    }

    pub(crate) async fn with<R, F>(&self, f: F) -> Result<R, CoreError>
    where
        F: FnOnce(&B) -> R + Send + 'static,
        R: Send + 'static,
    {
        let bindings = Arc::clone(&self.bindings);
        self.queue
            .call(move || lock(&bindings).as_ref().map(f))
            .await?
            .ok_or(CoreError::ScreenClosed)
    }

    /// Wait for every delivery posted so far.
    pub(crate) async fn flush(&self) -> Result<(), CoreError> {
        self.queue.flush().await
    }

    /// Drop the bindings on the queue, then stop the queue. Idempotent.
    pub(crate) async fn close(&self) -> Result<(), CoreError> {
        if self.queue.is_closed() {
            return Ok(());
        }
        let bindings = Arc::clone(&self.bindings);
        let result = self.queue.call(move || drop(lock(&bindings).take())).await;
        self.queue.close();
        result
    }
}

/// Keeps auto connection running: starts it whenever the facility reports
/// it stopped.
pub(crate) fn auto_connection_keeper(
    sdk: &GroundSdk,
    queue: &DeliveryQueue,
    enabled: bool,
) -> Reference<AutoConnection> {
    let starter = sdk.clone();
    sdk.get_facility::<AutoConnection, _>(queue, move |auto| {
        let stopped = auto.is_some_and(|auto| auto.status == AutoConnectionStatus::Stopped);
        if !enabled || !stopped {
            return;
        }
        match starter.start_auto_connection() {
            Ok(()) => info!("auto connection requested"),
            Err(e) => warn!(error = %e, "could not start auto connection"),
        }
    })
}

/// The drone selected by auto connection.
pub(crate) fn select_drone(auto: &AutoConnection) -> Option<Drone> {
    auto.drone.clone()
}

/// Send to the drone bound to `manager`, or report it absent.
pub(crate) fn send_to_drone(
    manager: &SessionManager<Drone>,
    command: Command,
) -> Result<Outcome, CoreError> {
    match manager.with_entity(Clone::clone) {
        Some(drone) => {
            drone.send(command.clone())?;
            Ok(Outcome::sent(command))
        }
        None => Ok(Outcome::Unavailable),
    }
}

// ── Active screen ───────────────────────────────────────────────────

/// One open screen of any kind.
pub enum ActiveScreen {
    HelloDrone(HelloDroneScreen),
    Camera(CameraScreen),
    Thermal(ThermalScreen),
    Replay(ReplayScreen),
}

impl ActiveScreen {
    /// Open a screen on its own delivery queue.
    pub async fn open(
        kind: ScreenKind,
        sdk: &GroundSdk,
        config: &ScreenConfig,
    ) -> Result<Self, CoreError> {
        let queue = DeliveryQueue::spawn();
        let screen = match kind {
            ScreenKind::HelloDrone => {
                Self::HelloDrone(HelloDroneScreen::open(sdk, queue, config).await?)
            }
            ScreenKind::Camera => Self::Camera(CameraScreen::open(sdk, queue, config).await?),
            ScreenKind::Thermal => Self::Thermal(ThermalScreen::open(sdk, queue, config).await?),
            ScreenKind::Replay => Self::Replay(ReplayScreen::open(sdk, queue, config).await?),
        };
        info!(screen = %kind, "screen opened");
        Ok(screen)
    }

    pub fn kind(&self) -> ScreenKind {
        match self {
            Self::HelloDrone(_) => ScreenKind::HelloDrone,
            Self::Camera(_) => ScreenKind::Camera,
            Self::Thermal(_) => ScreenKind::Thermal,
            Self::Replay(_) => ScreenKind::Replay,
        }
    }

    pub async fn perform(&self, action: ScreenAction) -> Result<Outcome, CoreError> {
        match self {
            Self::HelloDrone(screen) => screen.perform(action).await,
            Self::Camera(screen) => screen.perform(action).await,
            Self::Thermal(screen) => screen.perform(action).await,
            Self::Replay(screen) => screen.perform(action).await,
        }
    }

    pub fn current(&self) -> ScreenView {
        match self {
            Self::HelloDrone(screen) => ScreenView::HelloDrone(screen.view()),
            Self::Camera(screen) => ScreenView::Camera(screen.view()),
            Self::Thermal(screen) => ScreenView::Thermal(screen.view()),
            Self::Replay(screen) => ScreenView::Replay(screen.view()),
        }
    }

    pub fn receiver(&self) -> ViewReceiver {
        match self {
            Self::HelloDrone(screen) => ViewReceiver::HelloDrone(screen.subscribe()),
            Self::Camera(screen) => ViewReceiver::Camera(screen.subscribe()),
            Self::Thermal(screen) => ViewReceiver::Thermal(screen.subscribe()),
            Self::Replay(screen) => ViewReceiver::Replay(screen.subscribe()),
        }
    }

    /// Wait until every delivery posted so far has reached the view.
    pub async fn flush(&self) -> Result<(), CoreError> {
        match self {
            Self::HelloDrone(screen) => screen.flush().await,
            Self::Camera(screen) => screen.flush().await,
            Self::Thermal(screen) => screen.flush().await,
            Self::Replay(screen) => screen.flush().await,
        }
    }

    /// Live references across every session of the screen.
    pub async fn live_references(&self) -> Result<usize, CoreError> {
        match self {
            Self::HelloDrone(screen) => screen.live_references().await,
            Self::Camera(screen) => screen.live_references().await,
            Self::Thermal(screen) => screen.live_references().await,
            Self::Replay(screen) => screen.live_references().await,
        }
    }

    pub async fn close(&self) -> Result<(), CoreError> {
        match self {
            Self::HelloDrone(screen) => screen.close().await,
            Self::Camera(screen) => screen.close().await,
            Self::Thermal(screen) => screen.close().await,
            Self::Replay(screen) => screen.close().await,
        }?;
        info!(screen = %self.kind(), "screen closed");
        Ok(())
    }
}

/// Snapshot of any screen's view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "kebab-case")]
pub enum ScreenView {
    HelloDrone(HelloDroneView),
    Camera(CameraView),
    Thermal(ThermalView),
    Replay(ReplayView),
}

impl ScreenView {
    pub fn rows(&self) -> Vec<ViewRow> {
        match self {
            Self::HelloDrone(view) => view.rows(),
            Self::Camera(view) => view.rows(),
            Self::Thermal(view) => view.rows(),
            Self::Replay(view) => view.rows(),
        }
    }
}

/// Change notifications of any screen's view.
#[derive(Debug, Clone)]
pub enum ViewReceiver {
    HelloDrone(watch::Receiver<HelloDroneView>),
    Camera(watch::Receiver<CameraView>),
    Thermal(watch::Receiver<ThermalView>),
    Replay(watch::Receiver<ReplayView>),
}

impl ViewReceiver {
    /// Wait for the next published view. Fails once the screen is gone.
    pub async fn changed(&mut self) -> Result<(), CoreError> {
        let result = match self {
            Self::HelloDrone(rx) => rx.changed().await,
            Self::Camera(rx) => rx.changed().await,
            Self::Thermal(rx) => rx.changed().await,
            Self::Replay(rx) => rx.changed().await,
        };
        result.map_err(|_| CoreError::ScreenClosed)
    }

    pub fn has_changed(&self) -> bool {
        let result = match self {
            Self::HelloDrone(rx) => rx.has_changed(),
            Self::Camera(rx) => rx.has_changed(),
            Self::Thermal(rx) => rx.has_changed(),
            Self::Replay(rx) => rx.has_changed(),
        };
        result.unwrap_or(false)
    }

    /// Latest view, marking it seen.
    pub fn current(&mut self) -> ScreenView {
        match self {
            Self::HelloDrone(rx) => ScreenView::HelloDrone(rx.borrow_and_update().clone()),
            Self::Camera(rx) => ScreenView::Camera(rx.borrow_and_update().clone()),
            Self::Thermal(rx) => ScreenView::Thermal(rx.borrow_and_update().clone()),
            Self::Replay(rx) => ScreenView::Replay(rx.borrow_and_update().clone()),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::time::Duration;

    /// Let SDK tasks and reference forwarders run.
    pub(crate) async fn settle() {
        tokio::time::sleep(Duration::from_millis(30)).await;
    }
}
