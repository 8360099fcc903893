//! Mapping of resolved input to bar actions.
//!
//! Nothing here touches device state, so the hit testing can be exercised without any
//! protocol events.

use crate::session::OutputId;

pub const BTN_LEFT: u32 = 0x110;
pub const BTN_RIGHT: u32 = 0x111;
pub const BTN_MIDDLE: u32 = 0x112;

/// What activated a hotspot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// A pointer button press, with its evdev code.
    Button(u32),
    /// A short touch contact, treated as a primary click.
    Tap,
}

impl Trigger {
    pub fn is_primary(self) -> bool {
        matches!(self, Self::Tap | Self::Button(BTN_LEFT))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Grow the bar to its extended height, or shrink it back.
    ToggleExtended(OutputId),
    /// A horizontal touch drag crossed into a new step.
    GestureStep { output: OutputId, step: i32 },
    Quit,
}

/// The output an input position is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotspotTarget {
    pub output: OutputId,
    pub width: u32,
    pub height: u32,
    pub scale: i32,
}

/// Resolves a surface-local position on `target` into an action.
pub fn resolve(target: HotspotTarget, x: f64, y: f64, trigger: Trigger) -> Option<Action> {
    let scale = f64::from(target.scale.max(1));
    let (x, y) = (x * scale, y * scale);
    let width = f64::from(target.width) * scale;
    let height = f64::from(target.height) * scale;

    if !(0. ..width).contains(&x) || !(0. ..height).contains(&y) {
        trace!("{trigger:?} at ({x}, {y}) is outside of {}", target.output);
        return None;
    }

    if trigger.is_primary() {
        Some(Action::ToggleExtended(target.output))
    } else {
        None
    }
}
