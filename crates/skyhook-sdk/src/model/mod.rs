//! Plain data published by the SDK through component facets. Everything here
//! is a snapshot; mutation goes through `Command`.

pub mod auto_connection;
pub mod battery;
pub mod camera;
pub mod piloting;
pub mod state;
pub mod stream;
pub mod thermal;

pub use auto_connection::{AutoConnection, AutoConnectionStatus};
pub use battery::BatteryInfo;
pub use camera::{
    CameraMode, CaptureState, LegacyCamera, MainCamera, PhotoMode, RecordingMode, WhiteBalanceMode,
    WhiteBalanceSetting,
};
pub use piloting::{ManualCopterPiloting, PilotingItfState};
pub use state::{ConnectionCause, ConnectionState, DeviceState};
pub use stream::{LiveStream, PlaybackState, ReplayStream};
pub use thermal::{
    OutsideColorization, RenderingMode, SpotType, ThermalColor, ThermalControl, ThermalMode,
    ThermalPalette, ThermalRendering, ThermalSensitivity,
};
