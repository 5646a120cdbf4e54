use std::fmt;
use std::sync::Arc;

use crate::component::Facility;
use crate::device::FileReplay;
use crate::error::SdkError;
use crate::facet::Facet;
use crate::sim::{SimConfig, SimController, SimWorld};

/// SDK context.
///
/// Constructed explicitly and passed to whoever needs it; there is no global
/// instance. Cloning is cheap. The context stays usable until [`close`] is
/// called or the last clone (including the paired [`SimController`]) drops.
///
/// [`close`]: GroundSdk::close
#[derive(Clone)]
pub struct GroundSdk {
    world: Arc<SimWorld>,
}

impl GroundSdk {
    /// Start a simulated SDK on the current tokio runtime.
    pub fn simulated(config: SimConfig) -> (Self, SimController) {
        let world = SimWorld::spawn(config);
        (
            Self {
                world: Arc::clone(&world),
            },
            SimController::new(world),
        )
    }

    pub fn facility<K: Facility>(&self) -> Facet<K> {
        self.world.facilities().facet()
    }

    /// Start selecting and connecting a drone and remote control.
    pub fn start_auto_connection(&self) -> Result<(), SdkError> {
        if self.world.is_closed() {
            return Err(SdkError::Closed);
        }
        self.world.start_auto_connection();
        Ok(())
    }

    /// Open a local media file for playback.
    pub fn open_replay(&self, source: &str) -> Result<FileReplay, SdkError> {
        self.world.open_replay(source)
    }

    pub fn close_replay(&self, replay: &FileReplay) {
        self.world.close_replay(replay);
    }

    pub fn is_closed(&self) -> bool {
        self.world.is_closed()
    }

    /// Stop processing commands. Facets keep their last values.
    pub fn close(&self) {
        self.world.shutdown();
    }
}

impl fmt::Debug for GroundSdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroundSdk")
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
