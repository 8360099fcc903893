//! Seat input: pointer, touch and keyboard events routed to the bar surfaces.

use crate::backend::Backend;
use crate::session::{ButtonState, KeyState, SeatId, Session, SurfaceId};

pub mod actions;
mod keyboard;
pub mod pointer;
pub mod touch;

use keyboard::KeyboardInput;
use pointer::PointerInput;
use touch::TouchInput;

pub use pointer::{PointerFocus, PointerTracker};
pub use touch::{TouchTracker, MAX_TOUCH_POINTS};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEnterEvent {
    pub seat: SeatId,
    pub serial: u32,
    pub surface: SurfaceId,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerMotionEvent {
    pub seat: SeatId,
    pub time: u32,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerButtonEvent {
    pub seat: SeatId,
    pub time: u32,
    pub button: u32,
    pub state: ButtonState,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchDownEvent {
    pub seat: SeatId,
    pub time: u32,
    pub surface: SurfaceId,
    pub id: i32,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchUpEvent {
    pub seat: SeatId,
    pub time: u32,
    pub id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchMotionEvent {
    pub seat: SeatId,
    pub time: u32,
    pub id: i32,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardKeyEvent {
    pub seat: SeatId,
    pub time: u32,
    pub key: u32,
    pub state: KeyState,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerEnter { event: PointerEnterEvent },
    PointerLeave { seat: SeatId },
    PointerMotion { event: PointerMotionEvent },
    PointerButton { event: PointerButtonEvent },
    TouchDown { event: TouchDownEvent },
    TouchUp { event: TouchUpEvent },
    TouchMotion { event: TouchMotionEvent },
    TouchFrame { seat: SeatId },
    TouchCancel { seat: SeatId },
    KeyboardEnter { seat: SeatId, surface: SurfaceId },
    KeyboardLeave { seat: SeatId, surface: SurfaceId },
    KeyboardKey { event: KeyboardKeyEvent },
}

impl Session {
    pub fn process_input_event(&mut self, backend: &mut Backend, event: InputEvent) {
        let _span = tracy_client::span!("process_input_event");

        use InputEvent::*;
        match event {
            PointerEnter { event } => PointerInput::on_pointer_enter(self, backend, event),
            PointerLeave { seat } => PointerInput::on_pointer_leave(self, seat),
            PointerMotion { event } => PointerInput::on_pointer_motion(self, event),
            PointerButton { event } => PointerInput::on_pointer_button(self, backend, event),
            TouchDown { event } => TouchInput::on_touch_down(self, backend, event),
            TouchUp { event } => TouchInput::on_touch_up(self, backend, event),
            TouchMotion { event } => TouchInput::on_touch_motion(self, backend, event),
            TouchFrame { seat } => TouchInput::on_touch_frame(self, seat),
            TouchCancel { seat } => TouchInput::on_touch_cancel(self, seat),
            KeyboardEnter { seat, surface } => {
                KeyboardInput::on_keyboard_enter(self, seat, surface)
            }
            KeyboardLeave { seat, surface } => {
                KeyboardInput::on_keyboard_leave(self, seat, surface)
            }
            KeyboardKey { event } => KeyboardInput::on_keyboard_key(self, event),
        }
    }
}
