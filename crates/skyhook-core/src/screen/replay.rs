//! Replay: playback of a local media file.
//!
//! The screen itself is the upstream of its session: opening a file publishes
//! a new current replay, and the session rebinds to it like it would to a new
//! drone.

use std::sync::Arc;

use skyhook_sdk::model::ReplayStream;
use skyhook_sdk::{Command, Entity, Facet, FileReplay, GroundSdk};
use tokio::sync::watch;
use tracing::{info, warn};

use super::{Attached, Outcome, ScreenAction, ScreenKind, unsupported};
use crate::config::ScreenConfig;
use crate::error::CoreError;
use crate::observe::DeviceObserve;
use crate::projection::replay::{self, ReplayInputs, ReplayView, seek_target};
use crate::queue::DeliveryQueue;
use crate::session::{Binder, ReferenceSet, Session, SessionManager};
use crate::view::ViewModel;

type ReplayModel = ViewModel<ReplayInputs, ReplayView>;

struct ReplayBinder {
    view: Arc<ReplayModel>,
}

impl Binder<FileReplay> for ReplayBinder {
    fn bind(&mut self, replay: &FileReplay, refs: &mut ReferenceSet) {
        let view = Arc::clone(&self.view);
        refs.track(replay.get_peripheral::<ReplayStream, _>(refs.queue(), move |stream| {
            view.apply(|inputs| inputs.stream = stream.cloned());
        }));
    }

    fn reset(&mut self) {
        self.view.reset();
    }
}

struct Bindings {
    sdk: GroundSdk,
    current: watch::Sender<Option<FileReplay>>,
    session: SessionManager<FileReplay>,
}

impl Bindings {
    fn open(&self, source: &str) -> Result<Outcome, CoreError> {
        let replay = self.sdk.open_replay(source)?;
        let uid = replay.uid().clone();
        if let Some(previous) = self.current.send_replace(Some(replay)) {
            if previous.uid() != &uid {
                self.sdk.close_replay(&previous);
            }
        }
        info!(%uid, "replay selected");
        Ok(Outcome::Opened { uid })
    }

    fn close(&self) -> Outcome {
        match self.current.send_replace(None) {
            Some(replay) => {
                self.sdk.close_replay(&replay);
                Outcome::Closed {
                    uid: replay.uid().clone(),
                }
            }
            None => Outcome::Unavailable,
        }
    }

    fn send(&self, command: Command) -> Result<Outcome, CoreError> {
        match self.session.with_entity(Clone::clone) {
            Some(replay) => {
                replay.send(command.clone())?;
                Ok(Outcome::sent(command))
            }
            None => Ok(Outcome::Unavailable),
        }
    }
}

pub struct ReplayScreen {
    view: Arc<ReplayModel>,
    attached: Attached<Bindings>,
}

impl ReplayScreen {
    pub(crate) async fn open(
        sdk: &GroundSdk,
        queue: DeliveryQueue,
        _config: &ScreenConfig,
    ) -> Result<Self, CoreError> {
        let view = ViewModel::new(replay::project);
        let binder = ReplayBinder {
            view: Arc::clone(&view),
        };
        let sdk = sdk.clone();

        let attached = Attached::attach(queue, move |queue| {
            let (current, receiver) = watch::channel(None);
            let session = SessionManager::attach(
                queue,
                Facet::from_receiver(receiver),
                |replay: &FileReplay| Some(replay.clone()),
                Session::new("replay", queue.clone(), binder),
            );
            Bindings {
                sdk,
                current,
                session,
            }
        })
        .await?;

        Ok(Self { view, attached })
    }

    pub async fn perform(&self, action: ScreenAction) -> Result<Outcome, CoreError> {
        let view = Arc::clone(&self.view);
        let stream = move || view.inputs(|inputs| inputs.stream.clone());

        match action {
            ScreenAction::OpenReplay(source) => {
                self.attached
                    .with(move |bindings| bindings.open(&source))
                    .await?
            }
            ScreenAction::CloseReplay => self.attached.with(Bindings::close).await,
            ScreenAction::TogglePlayback => {
                let view = Arc::clone(&self.view);
                self.attached
                    .with(move |bindings| match view.inputs(ReplayInputs::playback_action) {
                        Some(action) => bindings.send(action.command()),
                        None => Ok(Outcome::Unavailable),
                    })
                    .await?
            }
            ScreenAction::SeekTo(position) => {
                self.attached
                    .with(move |bindings| match stream() {
                        Some(stream) => bindings.send(Command::SeekTo(position.min(stream.duration))),
                        None => Ok(Outcome::Unavailable),
                    })
                    .await?
            }
            ScreenAction::SeekBy(delta) => {
                self.attached
                    .with(move |bindings| match stream() {
                        Some(stream) => bindings.send(Command::SeekTo(seek_target(&stream, delta))),
                        None => Ok(Outcome::Unavailable),
                    })
                    .await?
            }
            other => Err(unsupported(ScreenKind::Replay, &other)),
        }
    }

    pub fn view(&self) -> ReplayView {
        self.view.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<ReplayView> {
        self.view.subscribe()
    }

    pub async fn live_references(&self) -> Result<usize, CoreError> {
        self.attached
            .with(|bindings| bindings.session.live_references())
            .await
    }

    pub async fn flush(&self) -> Result<(), CoreError> {
        self.attached.flush().await
    }

    /// Closes the open file too.
    pub async fn close(&self) -> Result<(), CoreError> {
        match self.attached.with(Bindings::close).await {
            Ok(Outcome::Closed { uid }) => info!(%uid, "replay closed with its screen"),
            Ok(_) | Err(CoreError::ScreenClosed | CoreError::QueueClosed) => {}
            Err(e) => warn!(error = %e, "open replay not closed"),
        }
        self.attached.close().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use skyhook_sdk::SimConfig;
    use skyhook_sdk::model::PlaybackState;

    use super::*;
    use crate::projection::ButtonView;
    use crate::screen::testing::settle;

    async fn open() -> ReplayScreen {
        let config = SimConfig {
            replay_duration: Duration::from_secs(90),
            ..SimConfig::default()
        };
        let (sdk, _sim) = GroundSdk::simulated(config);
        ReplayScreen::open(&sdk, DeliveryQueue::spawn(), &ScreenConfig::default())
            .await
            .unwrap()
    }

    async fn step(screen: &ReplayScreen, action: ScreenAction) -> Outcome {
        let outcome = screen.perform(action).await.unwrap();
        settle().await;
        screen.flush().await.unwrap();
        outcome
    }

    #[tokio::test]
    async fn nothing_open_is_cleared() {
        let screen = open().await;
        assert_eq!(screen.view().play_pause, ButtonView::disabled("Play"));
        assert_eq!(step(&screen, ScreenAction::TogglePlayback).await, Outcome::Unavailable);
        assert_eq!(step(&screen, ScreenAction::CloseReplay).await, Outcome::Unavailable);
    }

    #[tokio::test]
    async fn open_seek_and_play() {
        let screen = open().await;

        let outcome = step(&screen, ScreenAction::OpenReplay("flight.mp4".into())).await;
        assert!(matches!(outcome, Outcome::Opened { .. }));
        assert_eq!(screen.view().source, "flight.mp4");
        assert_eq!(screen.view().position, "00:00 / 01:30");

        step(&screen, ScreenAction::SeekBy(45)).await;
        assert_eq!(screen.view().position, "00:45 / 01:30");
        step(&screen, ScreenAction::SeekBy(-60)).await;
        assert_eq!(screen.view().position, "00:00 / 01:30");
        step(&screen, ScreenAction::SeekTo(Duration::from_secs(600))).await;
        assert_eq!(screen.view().position, "01:30 / 01:30");

        step(&screen, ScreenAction::TogglePlayback).await;
        let view = screen.view();
        assert_eq!(view.state, PlaybackState::Playing.to_string());
        assert_eq!(view.play_pause, ButtonView::enabled("Pause"));
    }

    #[tokio::test]
    async fn opening_another_file_rebinds() {
        let screen = open().await;
        step(&screen, ScreenAction::OpenReplay("a.mp4".into())).await;
        step(&screen, ScreenAction::OpenReplay("b.mp4".into())).await;

        assert_eq!(screen.view().source, "b.mp4");
        assert_eq!(screen.live_references().await.unwrap(), 1);

        let outcome = step(&screen, ScreenAction::CloseReplay).await;
        assert!(matches!(outcome, Outcome::Closed { .. }));
        assert_eq!(screen.view().source, "");
        assert_eq!(screen.live_references().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn closing_the_screen_closes_the_open_file() {
        let (sdk, sim) = GroundSdk::simulated(SimConfig::default());
        let screen = ReplayScreen::open(&sdk, DeliveryQueue::spawn(), &ScreenConfig::default())
            .await
            .unwrap();
        step(&screen, ScreenAction::OpenReplay("a.mp4".into())).await;
        let uid = skyhook_sdk::Uid::from("replay:a.mp4");
        assert!(sim.device(&uid).is_some());

        screen.close().await.unwrap();
        assert!(sim.device(&uid).is_none());
        screen.close().await.unwrap();
    }

    #[tokio::test]
    async fn empty_source_is_an_sdk_error() {
        let screen = open().await;
        let result = screen.perform(ScreenAction::OpenReplay(String::new())).await;
        assert!(matches!(result, Err(CoreError::Sdk(_))));
    }
}
