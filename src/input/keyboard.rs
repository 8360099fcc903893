//! Keyboard input event handling.
//!
//! The bar has no keyboard-driven behavior. Focus changes and keys are logged so that
//! `keyboard-interactive` can be checked against a compositor.

use super::KeyboardKeyEvent;
use crate::session::{KeyState, SeatId, Session, SurfaceId};

/// Trait for keyboard input event handling.
pub(crate) trait KeyboardInput {
    fn on_keyboard_enter(&mut self, seat: SeatId, surface: SurfaceId);
    fn on_keyboard_leave(&mut self, seat: SeatId, surface: SurfaceId);
    fn on_keyboard_key(&mut self, evt: KeyboardKeyEvent);
}

impl KeyboardInput for Session {
    fn on_keyboard_enter(&mut self, seat: SeatId, surface: SurfaceId) {
        match self.outputs.find_by_surface(surface) {
            Some(output) => debug!("{seat}: keyboard focus on {output}"),
            None => debug!("{seat}: keyboard focus on unknown surface {surface:?}"),
        }
    }

    fn on_keyboard_leave(&mut self, seat: SeatId, surface: SurfaceId) {
        debug!("{seat}: keyboard left {surface:?}");
    }

    fn on_keyboard_key(&mut self, evt: KeyboardKeyEvent) {
        let action = match evt.state {
            KeyState::Pressed => "pressed",
            KeyState::Released => "released",
        };
        debug!("{}: key {} {action} at {}", evt.seat, evt.key, evt.time);
    }
}
