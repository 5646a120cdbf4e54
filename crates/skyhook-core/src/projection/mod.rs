//! Pure functions from the latest reference values to what a screen shows.
//! Every input is optional and every combination is handled; nothing here
//! remembers a previous input.

pub mod camera;
pub mod hello;
pub mod replay;
pub mod thermal;

use serde::Serialize;

pub use camera::{CameraFacet, CameraInputs, CameraView, CaptureAction, CaptureFlags};
pub use hello::{HelloDroneInputs, HelloDroneView, PilotingAction};
pub use replay::{PlaybackAction, ReplayInputs, ReplayView};
pub use thermal::{StreamAction, ThermalInputs, ThermalView};

/// Title and enablement of an action button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonView {
    pub label: String,
    pub enabled: bool,
}

impl ButtonView {
    pub fn enabled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            enabled: true,
        }
    }

    pub fn disabled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            enabled: false,
        }
    }
}

/// Options and selection of a picker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PickerView {
    pub options: Vec<String>,
    pub selected: Option<String>,
    pub enabled: bool,
}

impl PickerView {
    pub fn new<T: ToString>(options: &[T], selected: Option<&T>) -> Self {
        Self {
            options: options.iter().map(ToString::to_string).collect(),
            selected: selected.map(ToString::to_string),
            enabled: !options.is_empty(),
        }
    }

    /// Empty, disabled picker shown while the facet is absent.
    pub fn cleared() -> Self {
        Self::default()
    }
}

/// First action whose capability flag is set, in slice order.
pub fn select_first<A: Copy>(candidates: &[(bool, A)]) -> Option<A> {
    candidates
        .iter()
        .find_map(|&(allowed, action)| allowed.then_some(action))
}

/// Text shown for an absent value.
pub(crate) const ABSENT: &str = "";

// ── Tabular rendering ───────────────────────────────────────────────

/// One labelled field of a view, for table and plain output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewRow {
    pub field: &'static str,
    pub value: String,
}

impl ViewRow {
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

pub trait ViewRows {
    fn rows(&self) -> Vec<ViewRow>;
}

pub(crate) fn button_row(field: &'static str, button: &ButtonView) -> ViewRow {
    let state = if button.enabled { "" } else { " (disabled)" };
    ViewRow::new(field, format!("{}{state}", button.label))
}

pub(crate) fn picker_row(field: &'static str, picker: &PickerView) -> ViewRow {
    let value = match (&picker.selected, picker.enabled) {
        (_, false) => ABSENT.to_owned(),
        (Some(selected), true) => format!("{selected} [{}]", picker.options.join(", ")),
        (None, true) => format!("[{}]", picker.options.join(", ")),
    };
    ViewRow::new(field, value)
}
