//! Tab order and number keys for the four screens.

use skyhook_core::ScreenKind;

/// All screens in tab-bar order.
pub const ALL: [ScreenKind; 4] = [
    ScreenKind::HelloDrone,
    ScreenKind::Camera,
    ScreenKind::Thermal,
    ScreenKind::Replay,
];

/// Navigation helpers for [`ScreenKind`], numbered 1-4 in tab order.
pub trait ScreenTab: Sized {
    fn number(self) -> u8;
    fn from_number(n: u8) -> Option<Self>;
    fn next(self) -> Self;
    fn prev(self) -> Self;
    fn label(self) -> &'static str;
}

impl ScreenTab for ScreenKind {
    fn number(self) -> u8 {
        match self {
            Self::HelloDrone => 1,
            Self::Camera => 2,
            Self::Thermal => 3,
            Self::Replay => 4,
        }
    }

    fn from_number(n: u8) -> Option<Self> {
        ALL.into_iter().find(|kind| kind.number() == n)
    }

    /// Next screen in tab order (wraps around).
    fn next(self) -> Self {
        let idx = ALL.iter().position(|&s| s == self).unwrap_or(0);
        ALL[(idx + 1) % ALL.len()]
    }

    /// Previous screen in tab order (wraps around).
    fn prev(self) -> Self {
        let idx = ALL.iter().position(|&s| s == self).unwrap_or(0);
        ALL[(idx + ALL.len() - 1) % ALL.len()]
    }

    fn label(self) -> &'static str {
        match self {
            Self::HelloDrone => "Hello Drone",
            Self::Camera => "Camera",
            Self::Thermal => "Thermal",
            Self::Replay => "Replay",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_round_trip_in_tab_order() {
        for (idx, kind) in ALL.into_iter().enumerate() {
            assert_eq!(usize::from(kind.number()), idx + 1);
            assert_eq!(ScreenKind::from_number(kind.number()), Some(kind));
        }
        assert_eq!(ScreenKind::from_number(0), None);
        assert_eq!(ScreenKind::from_number(5), None);
    }

    #[test]
    fn next_and_prev_wrap() {
        assert_eq!(ScreenKind::Replay.next(), ScreenKind::HelloDrone);
        assert_eq!(ScreenKind::HelloDrone.prev(), ScreenKind::Replay);
        assert_eq!(ScreenKind::Camera.next().prev(), ScreenKind::Camera);
    }
}
