//! Plain data types shared by the session state, the input trackers and the backends.

use std::fmt;

use bitflags::bitflags;

// =============================================================================
// Identifiers
// =============================================================================

/// Stable identifier of a tracked output.
///
/// Identifiers are never reused, so a stale `OutputId` simply fails to resolve once the output
/// is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutputId(pub u64);

/// Stable identifier of a tracked seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeatId(pub u64);

/// Protocol identity of a client surface, as seen in input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u32);

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "output-{}", self.0)
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seat-{}", self.0)
    }
}

// =============================================================================
// Capabilities
// =============================================================================

bitflags! {
    /// Seat capabilities, with the bit values of `wl_seat.capability`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u32 {
        const POINTER = 1;
        const KEYBOARD = 2;
        const TOUCH = 4;
    }
}

// =============================================================================
// VisualMode
// =============================================================================

/// Which color the bar is cleared to, picked from the configured height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisualMode {
    #[default]
    Regular,
    Extended,
}

impl VisualMode {
    pub fn for_height(height: u32, regular_height: u32) -> Self {
        if height <= regular_height {
            Self::Regular
        } else {
            Self::Extended
        }
    }
}

// =============================================================================
// FrameState
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameState {
    /// Nothing is outstanding; the next draw has to be triggered manually.
    #[default]
    Idle,
    /// A frame callback was requested and its `done` has not arrived yet.
    WaitingForFrameCallback,
}

// =============================================================================
// ButtonState / KeyState
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Released,
    Pressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Released,
    Pressed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visual_mode_threshold() {
        assert_eq!(VisualMode::for_height(40, 40), VisualMode::Regular);
        assert_eq!(VisualMode::for_height(12, 40), VisualMode::Regular);
        assert_eq!(VisualMode::for_height(41, 40), VisualMode::Extended);
        assert_eq!(VisualMode::for_height(1080, 40), VisualMode::Extended);
    }

    #[test]
    fn capabilities_match_wl_seat_bits() {
        let caps = Capabilities::from_bits_truncate(0b111 | 0b1000);
        assert_eq!(caps, Capabilities::all());
        assert!(Capabilities::from_bits_truncate(5).contains(Capabilities::TOUCH));
    }
}
