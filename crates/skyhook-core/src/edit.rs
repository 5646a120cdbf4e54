//! One-parameter edit of the current camera API: draft from the current
//! configuration, set, auto-complete, commit. The camera's next published
//! configuration is what the screen shows, not the committed draft.

use skyhook_sdk::{CameraConfig, Device, Param, ParamValue};
use tracing::debug;

use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// The draft was sent; holds the configuration that was requested.
    Committed(CameraConfig),
    /// The camera has no entry for the parameter, rejects the value, or
    /// cannot complete a configuration around it. Nothing was sent.
    Skipped { param: Param },
}

/// Change one parameter of `config` on `device`.
///
/// An unsupported parameter, or one auto-complete cannot build a
/// consistent configuration around, is not an error: the edit is skipped
/// and only logged at debug level.
pub fn apply_param(
    device: &Device,
    config: &CameraConfig,
    value: ParamValue,
) -> Result<EditOutcome, CoreError> {
    let param = value.param();
    let mut draft = config.edit(false);

    let accepted = draft
        .entry_mut(param)
        .is_some_and(|mut entry| entry.set(value));
    if !accepted {
        debug!(uid = %device.uid(), %param, %value, "unsupported camera parameter, edit skipped");
        return Ok(EditOutcome::Skipped { param });
    }

    draft.auto_complete();
    let unresolved = draft.config().unresolved();
    if !unresolved.is_empty() {
        debug!(
            uid = %device.uid(),
            %param,
            %value,
            ?unresolved,
            "no consistent camera configuration, edit skipped"
        );
        return Ok(EditOutcome::Skipped { param });
    }
    let committed = draft.commit(device)?;
    debug!(uid = %device.uid(), %param, %value, "camera configuration committed");
    Ok(EditOutcome::Committed(committed))
}
