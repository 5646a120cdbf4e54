//! The current camera API is configured through whole-configuration edits:
//! open a draft, change parameters, let auto-complete make the rest
//! consistent, then commit. Parameters the camera does not support have no
//! entry at all.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::device::Device;
use crate::error::SdkError;
use crate::model::{CameraMode, PhotoMode, RecordingMode, WhiteBalanceMode};

/// Lowest framerate accepted by high-framerate recording.
pub const HIGH_FRAMERATE_MIN: u32 = 100;
/// Highest framerate accepted by every other recording mode.
pub const STANDARD_FRAMERATE_MAX: u32 = 60;
/// Temperature picked when custom white balance has no previous value.
pub const DEFAULT_WHITE_BALANCE_TEMPERATURE: u32 = 5000;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, strum::Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Param {
    Mode,
    PhotoMode,
    RecordingMode,
    RecordingFramerate,
    WhiteBalanceMode,
    WhiteBalanceTemperature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "param", content = "value", rename_all = "snake_case")]
pub enum ParamValue {
    Mode(CameraMode),
    PhotoMode(PhotoMode),
    RecordingMode(RecordingMode),
    RecordingFramerate(u32),
    WhiteBalanceMode(WhiteBalanceMode),
    WhiteBalanceTemperature(u32),
}

impl ParamValue {
    pub const fn param(self) -> Param {
        match self {
            Self::Mode(_) => Param::Mode,
            Self::PhotoMode(_) => Param::PhotoMode,
            Self::RecordingMode(_) => Param::RecordingMode,
            Self::RecordingFramerate(_) => Param::RecordingFramerate,
            Self::WhiteBalanceMode(_) => Param::WhiteBalanceMode,
            Self::WhiteBalanceTemperature(_) => Param::WhiteBalanceTemperature,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mode(v) => write!(f, "{v}"),
            Self::PhotoMode(v) => write!(f, "{v}"),
            Self::RecordingMode(v) => write!(f, "{v}"),
            Self::RecordingFramerate(fps) => write!(f, "{fps} fps"),
            Self::WhiteBalanceMode(v) => write!(f, "{v}"),
            Self::WhiteBalanceTemperature(k) => write!(f, "{k} K"),
        }
    }
}

/// A supported parameter: its current value and the values it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigEntry {
    pub value: Option<ParamValue>,
    pub supported: Vec<ParamValue>,
}

impl ConfigEntry {
    pub fn supports(&self, value: ParamValue) -> bool {
        self.supported.contains(&value)
    }
}

/// Whether `fps` is acceptable for `mode`.
pub fn framerate_allowed(mode: RecordingMode, fps: u32) -> bool {
    match mode {
        RecordingMode::HighFramerate => fps >= HIGH_FRAMERATE_MIN,
        RecordingMode::Standard | RecordingMode::Hyperlapse => fps <= STANDARD_FRAMERATE_MAX,
    }
}

// ── Configuration ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CameraConfig {
    entries: BTreeMap<Param, ConfigEntry>,
}

macro_rules! typed_getter {
    ($name:ident, $variant:ident, $ty:ty) => {
        pub fn $name(&self) -> Option<$ty> {
            match self.value(Param::$variant) {
                Some(ParamValue::$variant(v)) => Some(v),
                _ => None,
            }
        }
    };
}

impl CameraConfig {
    /// Declare `param` supported with the given values and current value.
    pub fn with_entry(
        mut self,
        param: Param,
        supported: Vec<ParamValue>,
        value: Option<ParamValue>,
    ) -> Self {
        self.entries.insert(param, ConfigEntry { value, supported });
        self
    }

    pub fn entry(&self, param: Param) -> Option<&ConfigEntry> {
        self.entries.get(&param)
    }

    pub fn entries(&self) -> impl Iterator<Item = (Param, &ConfigEntry)> {
        self.entries.iter().map(|(param, entry)| (*param, entry))
    }

    pub fn supports(&self, param: Param) -> bool {
        self.entries.contains_key(&param)
    }

    pub fn value(&self, param: Param) -> Option<ParamValue> {
        self.entries.get(&param).and_then(|entry| entry.value)
    }

    pub fn supported(&self, param: Param) -> &[ParamValue] {
        self.entries
            .get(&param)
            .map_or(&[], |entry| entry.supported.as_slice())
    }

    typed_getter!(mode, Mode, CameraMode);
    typed_getter!(photo_mode, PhotoMode, PhotoMode);
    typed_getter!(recording_mode, RecordingMode, RecordingMode);
    typed_getter!(recording_framerate, RecordingFramerate, u32);
    typed_getter!(white_balance_mode, WhiteBalanceMode, WhiteBalanceMode);
    typed_getter!(white_balance_temperature, WhiteBalanceTemperature, u32);

    pub fn supported_modes(&self) -> Vec<CameraMode> {
        self.supported(Param::Mode)
            .iter()
            .filter_map(|v| match v {
                ParamValue::Mode(mode) => Some(*mode),
                _ => None,
            })
            .collect()
    }

    pub fn supported_white_balance_modes(&self) -> Vec<WhiteBalanceMode> {
        self.supported(Param::WhiteBalanceMode)
            .iter()
            .filter_map(|v| match v {
                ParamValue::WhiteBalanceMode(mode) => Some(*mode),
                _ => None,
            })
            .collect()
    }

    /// Whether `param` must carry a value given the other values.
    pub fn is_relevant(&self, param: Param) -> bool {
        match param {
            Param::Mode | Param::WhiteBalanceMode => true,
            Param::PhotoMode => self.mode() == Some(CameraMode::Photo),
            Param::RecordingMode | Param::RecordingFramerate => {
                self.mode() == Some(CameraMode::Recording)
            }
            Param::WhiteBalanceTemperature => {
                self.white_balance_mode() == Some(WhiteBalanceMode::Custom)
            }
        }
    }

    /// Parameters preventing this configuration from being applied:
    /// relevant ones without a value, irrelevant ones with a value,
    /// values outside the supported set, and framerate conflicts.
    pub fn unresolved(&self) -> Vec<Param> {
        let mut unresolved: Vec<Param> = self
            .entries
            .iter()
            .filter(|(param, entry)| {
                let relevant = self.is_relevant(**param);
                match entry.value {
                    Some(value) => !relevant || !entry.supports(value),
                    None => relevant,
                }
            })
            .map(|(param, _)| *param)
            .collect();

        if let (Some(mode), Some(fps)) = (self.recording_mode(), self.recording_framerate()) {
            if self.is_relevant(Param::RecordingFramerate)
                && !framerate_allowed(mode, fps)
                && !unresolved.contains(&Param::RecordingFramerate)
            {
                unresolved.push(Param::RecordingFramerate);
            }
        }
        unresolved
    }

    pub fn is_complete(&self) -> bool {
        self.unresolved().is_empty()
    }

    /// Open a draft. `from_scratch` starts with every value unset and lets
    /// auto-complete fall back to defaults instead of the current values.
    pub fn edit(&self, from_scratch: bool) -> Draft {
        let mut config = self.clone();
        let previous = if from_scratch {
            for entry in config.entries.values_mut() {
                entry.value = None;
            }
            CameraConfig::default()
        } else {
            self.clone()
        };
        Draft {
            config,
            previous,
            pinned: BTreeSet::new(),
        }
    }
}

// ── Draft ───────────────────────────────────────────────────────────

/// Editable copy of a camera configuration.
///
/// Values set through the draft are pinned: auto-complete works around them
/// and only touches parameters the caller did not set, except where a
/// documented rule has no other way to resolve a conflict.
#[derive(Debug, Clone)]
pub struct Draft {
    config: CameraConfig,
    previous: CameraConfig,
    pinned: BTreeSet<Param>,
}

/// Mutable view of one supported parameter inside a draft.
pub struct DraftEntry<'a> {
    param: Param,
    entry: &'a mut ConfigEntry,
    pinned: &'a mut BTreeSet<Param>,
}

impl DraftEntry<'_> {
    pub fn value(&self) -> Option<ParamValue> {
        self.entry.value
    }

    pub fn supported(&self) -> &[ParamValue] {
        &self.entry.supported
    }

    /// Set and pin a value. Returns `false` when the value belongs to another
    /// parameter or is not in the supported set.
    pub fn set(&mut self, value: ParamValue) -> bool {
        if value.param() != self.param || !self.entry.supports(value) {
            return false;
        }
        self.entry.value = Some(value);
        self.pinned.insert(self.param);
        true
    }

    pub fn clear(&mut self) {
        self.entry.value = None;
        self.pinned.remove(&self.param);
    }
}

impl Draft {
    /// Entry for `param`, or `None` when the camera does not support it.
    pub fn entry_mut(&mut self, param: Param) -> Option<DraftEntry<'_>> {
        let entry = self.config.entries.get_mut(&param)?;
        Some(DraftEntry {
            param,
            entry,
            pinned: &mut self.pinned,
        })
    }

    /// Shorthand for `entry_mut(value.param())?.set(value)`.
    pub fn set(&mut self, value: ParamValue) -> bool {
        self.entry_mut(value.param())
            .is_some_and(|mut entry| entry.set(value))
    }

    pub fn value(&self, param: Param) -> Option<ParamValue> {
        self.config.value(param)
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn is_complete(&self) -> bool {
        self.config.is_complete()
    }

    /// Make the draft consistent.
    ///
    /// Rules, applied in order:
    /// 1. a missing mode is restored from the previous configuration, else
    ///    the first supported mode;
    /// 2. mode-specific parameters are unset outside their mode and filled
    ///    (previous value, else first supported) inside it;
    /// 3. a framerate outside the recording mode's range either switches an
    ///    unpinned recording mode or is replaced by the nearest allowed
    ///    supported framerate;
    /// 4. white balance temperature is unset unless the mode is custom, and
    ///    defaults to the previous value, else 5000 K or the nearest
    ///    supported temperature.
    pub fn auto_complete(&mut self) {
        self.fill(Param::Mode);

        for param in [Param::PhotoMode, Param::RecordingMode, Param::RecordingFramerate] {
            if self.config.is_relevant(param) {
                self.fill(param);
            } else {
                self.unset(param);
            }
        }
        self.resolve_framerate();

        self.fill(Param::WhiteBalanceMode);
        if self.config.is_relevant(Param::WhiteBalanceTemperature) {
            self.fill_temperature();
        } else {
            self.unset(Param::WhiteBalanceTemperature);
        }
    }

    /// Send the draft to `device`, returning the configuration that was
    /// requested. The camera's next published state is authoritative.
    pub fn commit(self, device: &Device) -> Result<CameraConfig, SdkError> {
        let missing = self.config.unresolved();
        if !missing.is_empty() {
            return Err(SdkError::IncompleteConfig { missing });
        }
        device.send(Command::ApplyCameraConfig(self.config.clone()))?;
        Ok(self.config)
    }

    fn fill(&mut self, param: Param) {
        let fallback = self.previous.value(param);
        let Some(entry) = self.config.entries.get_mut(&param) else {
            return;
        };
        if entry.value.is_some() {
            return;
        }
        entry.value = fallback
            .filter(|value| entry.supports(*value))
            .or_else(|| entry.supported.first().copied());
    }

    fn unset(&mut self, param: Param) {
        if let Some(entry) = self.config.entries.get_mut(&param) {
            entry.value = None;
        }
        self.pinned.remove(&param);
    }

    fn resolve_framerate(&mut self) {
        let (Some(mode), Some(fps)) = (self.config.recording_mode(), self.config.recording_framerate())
        else {
            return;
        };
        if framerate_allowed(mode, fps) {
            return;
        }

        let framerate_pinned = self.pinned.contains(&Param::RecordingFramerate);
        let mode_pinned = self.pinned.contains(&Param::RecordingMode);
        if framerate_pinned && !mode_pinned {
            let wanted = if fps >= HIGH_FRAMERATE_MIN {
                RecordingMode::HighFramerate
            } else {
                RecordingMode::Standard
            };
            if self.replace(ParamValue::RecordingMode(wanted)) {
                return;
            }
        }

        let substitute = self
            .config
            .supported(Param::RecordingFramerate)
            .iter()
            .filter_map(|value| match value {
                ParamValue::RecordingFramerate(candidate) if framerate_allowed(mode, *candidate) => {
                    Some(*candidate)
                }
                _ => None,
            })
            .min_by_key(|candidate| candidate.abs_diff(fps));
        if let Some(substitute) = substitute {
            self.replace(ParamValue::RecordingFramerate(substitute));
        }
    }

    fn fill_temperature(&mut self) {
        let previous = self.previous.value(Param::WhiteBalanceTemperature);
        let Some(entry) = self.config.entries.get_mut(&Param::WhiteBalanceTemperature) else {
            return;
        };
        if entry.value.is_some() {
            return;
        }
        let preferred = ParamValue::WhiteBalanceTemperature(DEFAULT_WHITE_BALANCE_TEMPERATURE);
        entry.value = previous
            .filter(|value| entry.supports(*value))
            .or_else(|| entry.supports(preferred).then_some(preferred))
            .or_else(|| {
                entry
                    .supported
                    .iter()
                    .copied()
                    .filter_map(|value| match value {
                        ParamValue::WhiteBalanceTemperature(k) => Some(k),
                        _ => None,
                    })
                    .min_by_key(|k| k.abs_diff(DEFAULT_WHITE_BALANCE_TEMPERATURE))
                    .map(ParamValue::WhiteBalanceTemperature)
            });
    }

    /// Overwrite a value without pinning it.
    fn replace(&mut self, value: ParamValue) -> bool {
        match self.config.entries.get_mut(&value.param()) {
            Some(entry) if entry.supports(value) => {
                entry.value = Some(value);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn config() -> CameraConfig {
        CameraConfig::default()
            .with_entry(
                Param::Mode,
                vec![
                    ParamValue::Mode(CameraMode::Photo),
                    ParamValue::Mode(CameraMode::Recording),
                ],
                Some(ParamValue::Mode(CameraMode::Photo)),
            )
            .with_entry(
                Param::PhotoMode,
                vec![
                    ParamValue::PhotoMode(PhotoMode::Single),
                    ParamValue::PhotoMode(PhotoMode::Burst),
                ],
                Some(ParamValue::PhotoMode(PhotoMode::Single)),
            )
            .with_entry(
                Param::RecordingMode,
                vec![
                    ParamValue::RecordingMode(RecordingMode::Standard),
                    ParamValue::RecordingMode(RecordingMode::HighFramerate),
                ],
                None,
            )
            .with_entry(
                Param::RecordingFramerate,
                [24, 30, 60, 120]
                    .into_iter()
                    .map(ParamValue::RecordingFramerate)
                    .collect(),
                None,
            )
            .with_entry(
                Param::WhiteBalanceMode,
                vec![
                    ParamValue::WhiteBalanceMode(WhiteBalanceMode::Automatic),
                    ParamValue::WhiteBalanceMode(WhiteBalanceMode::Custom),
                ],
                Some(ParamValue::WhiteBalanceMode(WhiteBalanceMode::Automatic)),
            )
            .with_entry(
                Param::WhiteBalanceTemperature,
                [3000, 5000, 6500]
                    .into_iter()
                    .map(ParamValue::WhiteBalanceTemperature)
                    .collect(),
                None,
            )
    }

    #[test]
    fn initial_config_is_complete() {
        assert!(config().is_complete());
    }

    #[test]
    fn switching_to_recording_fills_and_clears_dependents() {
        let mut draft = config().edit(false);
        assert!(draft.set(ParamValue::Mode(CameraMode::Recording)));
        assert!(!draft.is_complete());

        draft.auto_complete();

        let result = draft.config();
        assert_eq!(result.mode(), Some(CameraMode::Recording));
        assert_eq!(result.photo_mode(), None);
        assert_eq!(result.recording_mode(), Some(RecordingMode::Standard));
        assert_eq!(result.recording_framerate(), Some(24));
        assert!(result.is_complete());
    }

    #[test]
    fn pinned_high_framerate_switches_recording_mode() {
        let mut draft = config().edit(false);
        draft.set(ParamValue::Mode(CameraMode::Recording));
        draft.set(ParamValue::RecordingFramerate(120));

        draft.auto_complete();

        assert_eq!(draft.config().recording_mode(), Some(RecordingMode::HighFramerate));
        assert_eq!(draft.config().recording_framerate(), Some(120));
    }

    #[test]
    fn pinned_recording_mode_substitutes_framerate() {
        let mut draft = config().edit(false);
        draft.set(ParamValue::Mode(CameraMode::Recording));
        draft.set(ParamValue::RecordingMode(RecordingMode::HighFramerate));
        draft.set(ParamValue::RecordingFramerate(30));

        draft.auto_complete();

        assert_eq!(draft.config().recording_mode(), Some(RecordingMode::HighFramerate));
        assert_eq!(draft.config().recording_framerate(), Some(120));
    }

    #[test]
    fn custom_white_balance_gets_default_temperature() {
        let mut draft = config().edit(false);
        draft.set(ParamValue::WhiteBalanceMode(WhiteBalanceMode::Custom));

        draft.auto_complete();

        assert_eq!(draft.config().white_balance_temperature(), Some(5000));
        assert_eq!(draft.config().mode(), Some(CameraMode::Photo));
        assert!(draft.is_complete());
    }

    #[test]
    fn unsupported_parameter_has_no_entry() {
        let partial = CameraConfig::default().with_entry(
            Param::Mode,
            vec![ParamValue::Mode(CameraMode::Photo)],
            Some(ParamValue::Mode(CameraMode::Photo)),
        );
        let mut draft = partial.edit(false);
        assert!(draft.entry_mut(Param::WhiteBalanceMode).is_none());
        assert!(!draft.set(ParamValue::WhiteBalanceMode(WhiteBalanceMode::Custom)));
    }

    #[test]
    fn unsupported_value_is_refused() {
        let mut draft = config().edit(false);
        assert!(!draft.set(ParamValue::RecordingFramerate(48)));
        assert!(!draft.set(ParamValue::WhiteBalanceMode(WhiteBalanceMode::Candle)));
    }

    #[test]
    fn from_scratch_falls_back_to_first_supported() {
        let mut draft = config().edit(true);
        assert_eq!(draft.value(Param::Mode), None);

        draft.auto_complete();

        assert_eq!(draft.config().mode(), Some(CameraMode::Photo));
        assert_eq!(draft.config().photo_mode(), Some(PhotoMode::Single));
        assert_eq!(draft.config().white_balance_mode(), Some(WhiteBalanceMode::Automatic));
        assert!(draft.is_complete());
    }

    #[test]
    fn previous_values_survive_a_round_trip() {
        let mut draft = config().edit(false);
        draft.set(ParamValue::PhotoMode(PhotoMode::Burst));
        draft.auto_complete();
        let committed = draft.config().clone();

        let mut back = committed.edit(false);
        back.set(ParamValue::Mode(CameraMode::Recording));
        back.auto_complete();
        back.set(ParamValue::Mode(CameraMode::Photo));
        back.auto_complete();

        assert_eq!(back.config().photo_mode(), Some(PhotoMode::Burst));
    }
}
