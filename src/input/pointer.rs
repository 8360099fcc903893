//! Pointer event handling.

use super::actions::{self, Trigger, BTN_RIGHT};
use super::{PointerButtonEvent, PointerEnterEvent, PointerMotionEvent};
use crate::backend::Backend;
use crate::session::{ButtonState, OutputId, SeatId, Session};

/// Where the pointer currently is, as far as the bar is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerFocus {
    Idle,
    Hovering(OutputId),
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct PointerTracker {
    /// Surface-local position, unset while idle.
    pub position: Option<(f64, f64)>,
    pub output: Option<OutputId>,
    /// Serial of the last enter, needed to set the cursor image.
    pub serial: Option<u32>,
    pub pressed: u32,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self) -> PointerFocus {
        match self.output {
            Some(output) => PointerFocus::Hovering(output),
            None => PointerFocus::Idle,
        }
    }

    pub fn enter(&mut self, output: OutputId, serial: u32, pos: (f64, f64)) {
        self.output = Some(output);
        self.serial = Some(serial);
        self.position = Some(pos);
    }

    pub fn leave(&mut self) {
        self.output = None;
        self.position = None;
        self.pressed = 0;
    }

    /// Returns `false` if the pointer is not over any bar.
    pub fn motion(&mut self, pos: (f64, f64)) -> bool {
        if self.output.is_none() {
            return false;
        }
        self.position = Some(pos);
        true
    }

    pub fn button(&mut self, state: ButtonState) {
        match state {
            ButtonState::Pressed => self.pressed += 1,
            ButtonState::Released => self.pressed = self.pressed.saturating_sub(1),
        }
    }

    /// Drops the focus if it is on `output`. Returns whether it was.
    pub fn forget_output(&mut self, output: OutputId) -> bool {
        if self.output != Some(output) {
            return false;
        }
        self.leave();
        true
    }
}

/// Trait for pointer input event handling.
pub(crate) trait PointerInput {
    fn on_pointer_enter(&mut self, backend: &mut Backend, evt: PointerEnterEvent);
    fn on_pointer_leave(&mut self, seat: SeatId);
    fn on_pointer_motion(&mut self, evt: PointerMotionEvent);
    fn on_pointer_button(&mut self, backend: &mut Backend, evt: PointerButtonEvent);
}

impl PointerInput for Session {
    fn on_pointer_enter(&mut self, backend: &mut Backend, evt: PointerEnterEvent) {
        let Some(pointer) = self.seats.pointer_mut(evt.seat) else {
            debug!("{}: pointer enter without a pointer device", evt.seat);
            return;
        };

        let Some(output) = self.outputs.find_by_surface(evt.surface) else {
            error!("{}: pointer entered unknown surface {:?}", evt.seat, evt.surface);
            return;
        };
        let scale = self.outputs.get(output).map_or(1, |output| output.scale);

        pointer.enter(output, evt.serial, (evt.x, evt.y));
        trace!("{}: pointer entered {output}", evt.seat);

        backend.set_cursor(evt.seat, evt.serial, scale);
    }

    fn on_pointer_leave(&mut self, seat: SeatId) {
        if let Some(pointer) = self.seats.pointer_mut(seat) {
            pointer.leave();
        }
    }

    fn on_pointer_motion(&mut self, evt: PointerMotionEvent) {
        let Some(pointer) = self.seats.pointer_mut(evt.seat) else {
            return;
        };
        if !pointer.motion((evt.x, evt.y)) {
            trace!("{}: pointer motion while idle", evt.seat);
        }
    }

    fn on_pointer_button(&mut self, backend: &mut Backend, evt: PointerButtonEvent) {
        let Some(pointer) = self.seats.pointer_mut(evt.seat) else {
            debug!("{}: pointer button without a pointer device", evt.seat);
            return;
        };

        let (PointerFocus::Hovering(output), Some((x, y))) = (pointer.focus(), pointer.position)
        else {
            debug!("{}: dropping button {:#x} while idle", evt.seat, evt.button);
            return;
        };

        pointer.button(evt.state);
        if evt.state == ButtonState::Released {
            return;
        }

        if evt.button == BTN_RIGHT {
            info!("{}: right button pressed, exiting", evt.seat);
            self.stop();
            return;
        }

        let Some(target) = self.outputs.hotspot_target(output) else {
            return;
        };
        if let Some(action) = actions::resolve(target, x, y, Trigger::Button(evt.button)) {
            self.apply_action(backend, action);
        }
    }
}
