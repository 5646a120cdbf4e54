//! Every facet value type names itself and its class. The marker traits
//! restrict which entry point can hand out which kind, so asking a drone for
//! a facility or an SDK context for an instrument does not compile.

use serde::Serialize;

use crate::id::Uid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ComponentClass {
    /// SDK-wide service (auto connection).
    Facility,
    /// Controllable device subsystem (camera, thermal control, streams).
    Peripheral,
    /// Read-only telemetry (battery).
    Instrument,
    /// Piloting interface.
    PilotingItf,
    /// Connection state of the entity itself.
    State,
}

/// A value type published through a component facet.
pub trait Component: Clone + Send + Sync + 'static {
    const NAME: &'static str;
    const CLASS: ComponentClass;
}

pub trait Facility: Component {}
pub trait Peripheral: Component {}
pub trait Instrument: Component {}
pub trait PilotingItf: Component {}

/// An externally owned object addressed by a stable uid.
pub trait Entity: Clone + Send + Sync + 'static {
    fn uid(&self) -> &Uid;
    fn name(&self) -> &str;

    /// Whether both handles point at the same SDK-owned object. A uid can
    /// be reused by a new object after the old one is replaced.
    fn same_entity(&self, other: &Self) -> bool;
}

/// Declares a component kind: `component!(BatteryInfo, Instrument, "battery_info")`.
macro_rules! component {
    ($ty:ty, $class:ident, $name:literal) => {
        impl $crate::component::Component for $ty {
            const NAME: &'static str = $name;
            const CLASS: $crate::component::ComponentClass =
                $crate::component::ComponentClass::$class;
        }

        impl $crate::component::$class for $ty {}
    };
}

pub(crate) use component;
