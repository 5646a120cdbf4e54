//! Command effects. Each handler returns whether the command changed anything;
//! requests that do not apply to the current state are dropped, as a device
//! would.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::SimWorld;
use crate::command::{Command, Envelope};
use crate::device::{Device, DeviceKind};
use crate::facet::ComponentStore;
use crate::model::{
    CameraMode, CaptureState, LegacyCamera, LiveStream, MainCamera, ManualCopterPiloting,
    PhotoMode, PilotingItfState, PlaybackState, ReplayStream, ThermalControl,
};

impl SimWorld {
    pub(crate) fn apply(self: &Arc<Self>, envelope: Envelope) {
        let Envelope { target, command } = envelope;
        let Some(device) = self.device(&target) else {
            warn!(target_uid = %target, "command for unknown entity dropped");
            return;
        };
        if !device.is_connected() {
            debug!(target_uid = %target, command = command.name(), "entity disconnected, command dropped");
            return;
        }

        let name = command.name();
        let applied = match device.kind() {
            DeviceKind::Drone(_) => apply_to_drone(device.store(), command),
            DeviceKind::RemoteControl => false,
            DeviceKind::Replay => self.apply_to_replay(&device, command),
        };
        if applied {
            debug!(target_uid = %target, command = name, "command applied");
        } else {
            warn!(target_uid = %target, command = name, "command had no effect");
        }
    }

    fn apply_to_replay(self: &Arc<Self>, device: &Device, command: Command) -> bool {
        let store = device.store();
        match command {
            Command::Play => {
                let applied = modify(store, |stream: &mut ReplayStream| {
                    if stream.state == PlaybackState::Playing {
                        return false;
                    }
                    if stream.is_at_end() {
                        stream.position = Duration::ZERO;
                    }
                    stream.state = PlaybackState::Playing;
                    true
                });
                if applied {
                    self.start_ticker(device);
                }
                applied
            }
            Command::Pause => {
                self.stop_ticker(device);
                modify(store, |stream: &mut ReplayStream| {
                    let playing = stream.state == PlaybackState::Playing;
                    if playing {
                        stream.state = PlaybackState::Paused;
                    }
                    playing
                })
            }
            Command::Stop => {
                self.stop_ticker(device);
                modify(store, |stream: &mut ReplayStream| {
                    stream.state = PlaybackState::Stopped;
                    stream.position = Duration::ZERO;
                    true
                })
            }
            Command::SeekTo(position) => modify(store, |stream: &mut ReplayStream| {
                stream.position = position.min(stream.duration);
                true
            }),
            _ => false,
        }
    }

    fn start_ticker(&self, device: &Device) {
        let token = self.cancel.child_token();
        if let Some(previous) = self.tickers.insert(device.uid().clone(), token.clone()) {
            previous.cancel();
        }
        let tick = self.config().playback_tick.max(Duration::from_millis(1));
        let device = device.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.tick().await;
            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = interval.tick() => {
                        let mut finished = true;
                        device.store().update::<ReplayStream>(|stream| {
                            if stream.state != PlaybackState::Playing {
                                return;
                            }
                            stream.position = (stream.position + tick).min(stream.duration);
                            if stream.is_at_end() {
                                stream.state = PlaybackState::Paused;
                            } else {
                                finished = false;
                            }
                        });
                        if finished {
                            break;
                        }
                    }
                }
            }
        });
    }

    fn stop_ticker(&self, device: &Device) {
        if let Some((_, ticker)) = self.tickers.remove(device.uid()) {
            ticker.cancel();
        }
    }
}

/// Apply `f` to an available component, notifying only when it reports a change.
fn modify<K: crate::component::Component>(
    store: &ComponentStore,
    f: impl FnOnce(&mut K) -> bool,
) -> bool {
    let mut applied = false;
    store.update::<K>(|value| applied = f(value));
    applied
}

fn apply_to_drone(store: &ComponentStore, command: Command) -> bool {
    match command {
        Command::ActivatePiloting | Command::TakeOff | Command::Land => piloting(store, &command),
        Command::StartPhotoCapture
        | Command::StopPhotoCapture
        | Command::StartRecording
        | Command::StopRecording => {
            if store.get::<MainCamera>().is_some() {
                main_camera_capture(store, &command)
            } else {
                legacy_camera_capture(store, &command)
            }
        }
        Command::ApplyCameraConfig(config) => modify(store, |camera: &mut MainCamera| {
            if !config.is_complete() {
                return false;
            }
            let mode = config.mode();
            let mode_changed = camera.config.mode() != mode;
            camera.config = config;
            if mode_changed {
                let photo = mode == Some(CameraMode::Photo);
                camera.photo_capture = photo.then_some(CaptureState::Ready);
                camera.recording = (!photo).then_some(CaptureState::Ready);
            }
            true
        }),
        Command::SetLegacyCameraMode(mode) => modify(store, |camera: &mut LegacyCamera| {
            if camera.mode == mode || !camera.supported_modes.contains(&mode) {
                return false;
            }
            camera.mode = mode;
            let (photo, recording) = match mode {
                CameraMode::Photo => (CaptureState::Ready, CaptureState::Unavailable),
                CameraMode::Recording => (CaptureState::Unavailable, CaptureState::Ready),
            };
            camera.photo = photo;
            camera.recording = recording;
            true
        }),
        Command::SetLegacyWhiteBalance(mode) => modify(store, |camera: &mut LegacyCamera| {
            let setting = &mut camera.white_balance;
            if setting.mode == mode || !setting.supported_modes.contains(&mode) {
                return false;
            }
            setting.mode = mode;
            true
        }),
        Command::SetThermalMode(mode) => modify(store, |thermal: &mut ThermalControl| {
            if thermal.mode == mode || !thermal.supports(mode) {
                return false;
            }
            thermal.mode = mode;
            true
        }),
        Command::SetThermalPalette(palette) => modify(store, |thermal: &mut ThermalControl| {
            thermal.palette = Some(palette);
            true
        }),
        Command::SetThermalRendering(rendering) => modify(store, |thermal: &mut ThermalControl| {
            thermal.rendering = rendering;
            true
        }),
        Command::SetEmissivity(value) => modify(store, |thermal: &mut ThermalControl| {
            thermal.emissivity = value;
            true
        }),
        Command::SetBackgroundTemperature(kelvin) => modify(store, |thermal: &mut ThermalControl| {
            thermal.background_temperature = kelvin;
            true
        }),
        Command::Play | Command::Pause | Command::Stop => live_stream(store, &command),
        Command::SeekTo(_) => false,
    }
}

fn piloting(store: &ComponentStore, command: &Command) -> bool {
    modify(store, |itf: &mut ManualCopterPiloting| match command {
        Command::ActivatePiloting if itf.state == PilotingItfState::Idle => {
            itf.state = PilotingItfState::Active;
            itf.can_take_off = !itf.can_land;
            true
        }
        Command::TakeOff if itf.is_active() && itf.can_take_off => {
            itf.can_take_off = false;
            itf.can_land = true;
            true
        }
        Command::Land if itf.is_active() && itf.can_land => {
            itf.can_land = false;
            itf.can_take_off = true;
            true
        }
        _ => false,
    })
}

fn main_camera_capture(store: &ComponentStore, command: &Command) -> bool {
    let single_shot = store
        .get::<MainCamera>()
        .and_then(|camera| camera.config.photo_mode())
        == Some(PhotoMode::Single);
    let applied = modify(store, |camera: &mut MainCamera| match command {
        Command::StartPhotoCapture if camera.can_start_photo_capture() => {
            camera.photo_capture = Some(CaptureState::Started);
            true
        }
        Command::StopPhotoCapture if camera.can_stop_photo_capture() => {
            camera.photo_capture = Some(CaptureState::Ready);
            true
        }
        Command::StartRecording if camera.can_start_recording() => {
            camera.recording = Some(CaptureState::Started);
            true
        }
        Command::StopRecording if camera.can_stop_recording() => {
            camera.recording = Some(CaptureState::Ready);
            true
        }
        _ => false,
    });
    if applied && single_shot && matches!(command, Command::StartPhotoCapture) {
        modify(store, |camera: &mut MainCamera| {
            camera.photo_capture = Some(CaptureState::Ready);
            true
        });
    }
    applied
}

fn legacy_camera_capture(store: &ComponentStore, command: &Command) -> bool {
    let applied = modify(store, |camera: &mut LegacyCamera| match command {
        Command::StartPhotoCapture if camera.can_start_photo_capture() => {
            camera.photo = CaptureState::Started;
            true
        }
        Command::StopPhotoCapture if camera.can_stop_photo_capture() => {
            camera.photo = CaptureState::Ready;
            true
        }
        Command::StartRecording if camera.can_start_recording() => {
            camera.recording = CaptureState::Started;
            true
        }
        Command::StopRecording if camera.can_stop_recording() => {
            camera.recording = CaptureState::Ready;
            true
        }
        _ => false,
    });
    // The legacy API only takes single photos.
    if applied && matches!(command, Command::StartPhotoCapture) {
        modify(store, |camera: &mut LegacyCamera| {
            camera.photo = CaptureState::Ready;
            true
        });
    }
    applied
}

fn live_stream(store: &ComponentStore, command: &Command) -> bool {
    modify(store, |stream: &mut LiveStream| {
        let next = match command {
            Command::Play => PlaybackState::Playing,
            Command::Pause if stream.state == PlaybackState::Playing => PlaybackState::Paused,
            Command::Stop => PlaybackState::Stopped,
            _ => return false,
        };
        let changed = stream.state != next;
        stream.state = next;
        changed
    })
}
