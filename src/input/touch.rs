//! Touch screen event handling.

use std::fmt;

use arrayvec::ArrayVec;

use super::actions::{self, Action, Trigger};
use super::{TouchDownEvent, TouchMotionEvent, TouchUpEvent};
use crate::backend::Backend;
use crate::session::{OutputId, SeatId, Session};

/// Maximum number of concurrent contacts tracked per seat.
pub const MAX_TOUCH_POINTS: usize = 16;

/// One contact in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchPoint {
    pub id: i32,
    /// Output the contact went down on. Motion stays relative to it.
    pub output: OutputId,
    pub start: (f64, f64),
    pub current: (f64, f64),
    /// Timestamp of the down event, in milliseconds.
    pub start_time: u32,
    /// `progress / step_percent` at the last motion.
    pub step: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchError {
    PoolExhausted,
    DuplicateId(i32),
    UnknownId(i32),
}

impl fmt::Display for TouchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TouchError::PoolExhausted => {
                write!(f, "all {MAX_TOUCH_POINTS} touch points are in use")
            }
            TouchError::DuplicateId(id) => write!(f, "touch point {id} is already down"),
            TouchError::UnknownId(id) => write!(f, "touch point {id} is not down"),
        }
    }
}

impl std::error::Error for TouchError {}

/// A contact lifted off the screen.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchRelease {
    pub point: TouchPoint,
    pub is_tap: bool,
}

/// Horizontal travel since `start_x` in whole percent of `width`, truncated toward zero.
pub fn gesture_progress(start_x: f64, x: f64, width: u32) -> Option<i32> {
    if width == 0 {
        return None;
    }
    Some(((x - start_x) * 100. / f64::from(width)) as i32)
}

/// Fixed-capacity pool of the contacts currently down on a seat.
#[derive(Debug, Default)]
pub struct TouchTracker {
    points: ArrayVec<TouchPoint, MAX_TOUCH_POINTS>,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, id: i32) -> Option<&TouchPoint> {
        self.points.iter().find(|point| point.id == id)
    }

    pub fn points(&self) -> impl Iterator<Item = &TouchPoint> + '_ {
        self.points.iter()
    }

    pub fn down(
        &mut self,
        id: i32,
        output: OutputId,
        pos: (f64, f64),
        time: u32,
    ) -> Result<(), TouchError> {
        if self.get(id).is_some() {
            return Err(TouchError::DuplicateId(id));
        }

        self.points
            .try_push(TouchPoint {
                id,
                output,
                start: pos,
                current: pos,
                start_time: time,
                step: 0,
            })
            .map_err(|_| TouchError::PoolExhausted)
    }

    /// Moves a contact. Returns the new step when the drag crossed into a different one.
    pub fn motion(
        &mut self,
        id: i32,
        pos: (f64, f64),
        width: u32,
        step_percent: i32,
    ) -> Result<Option<i32>, TouchError> {
        let point = self
            .points
            .iter_mut()
            .find(|point| point.id == id)
            .ok_or(TouchError::UnknownId(id))?;
        point.current = pos;

        let Some(progress) = gesture_progress(point.start.0, pos.0, width) else {
            return Ok(None);
        };

        let step = progress / step_percent.max(1);
        if step == point.step {
            return Ok(None);
        }

        point.step = step;
        Ok(Some(step))
    }

    /// Frees a contact. It counts as a tap when lifted within `tap_timeout_ms`.
    pub fn up(
        &mut self,
        id: i32,
        time: u32,
        tap_timeout_ms: u32,
    ) -> Result<TouchRelease, TouchError> {
        let idx = self
            .points
            .iter()
            .position(|point| point.id == id)
            .ok_or(TouchError::UnknownId(id))?;
        let point = self.points.swap_remove(idx);

        // Timestamps are a wrapping millisecond counter.
        let is_tap = time.wrapping_sub(point.start_time) < tap_timeout_ms;
        Ok(TouchRelease { point, is_tap })
    }

    /// Frees every contact, returning how many there were.
    pub fn cancel(&mut self) -> usize {
        let count = self.points.len();
        self.points.clear();
        count
    }

    /// Frees the contacts that started on `output`.
    pub fn forget_output(&mut self, output: OutputId) -> usize {
        let before = self.points.len();
        self.points.retain(|point| point.output != output);
        before - self.points.len()
    }
}

/// Trait for touch screen input event handling.
pub(crate) trait TouchInput {
    fn on_touch_down(&mut self, backend: &mut Backend, evt: TouchDownEvent);
    fn on_touch_up(&mut self, backend: &mut Backend, evt: TouchUpEvent);
    fn on_touch_motion(&mut self, backend: &mut Backend, evt: TouchMotionEvent);
    fn on_touch_frame(&mut self, seat: SeatId);
    fn on_touch_cancel(&mut self, seat: SeatId);
}

impl TouchInput for Session {
    fn on_touch_down(&mut self, _backend: &mut Backend, evt: TouchDownEvent) {
        let Some(touch) = self.seats.touch_mut(evt.seat) else {
            debug!("{}: touch down without a touch device", evt.seat);
            return;
        };

        let Some(output) = self.outputs.find_by_surface(evt.surface) else {
            warn!("{}: touch down on unknown surface {:?}", evt.seat, evt.surface);
            return;
        };

        match touch.down(evt.id, output, (evt.x, evt.y), evt.time) {
            Ok(()) => trace!("{}: touch {} down on {output}", evt.seat, evt.id),
            Err(err) => warn!("{}: dropping touch down: {err}", evt.seat),
        }
    }

    fn on_touch_up(&mut self, backend: &mut Backend, evt: TouchUpEvent) {
        let tap_timeout_ms = self.config.touch.tap_timeout_ms;
        let Some(touch) = self.seats.touch_mut(evt.seat) else {
            debug!("{}: touch up without a touch device", evt.seat);
            return;
        };

        let release = match touch.up(evt.id, evt.time, tap_timeout_ms) {
            Ok(release) => release,
            Err(err) => {
                warn!("{}: dropping touch up: {err}", evt.seat);
                return;
            }
        };

        if !release.is_tap {
            return;
        }

        let point = release.point;
        let Some(target) = self.outputs.hotspot_target(point.output) else {
            return;
        };
        let (x, y) = point.current;
        if let Some(action) = actions::resolve(target, x, y, Trigger::Tap) {
            self.apply_action(backend, action);
        }
    }

    fn on_touch_motion(&mut self, backend: &mut Backend, evt: TouchMotionEvent) {
        let step_percent = self.config.touch.gesture_step_percent;
        let Some(touch) = self.seats.touch_mut(evt.seat) else {
            debug!("{}: touch motion without a touch device", evt.seat);
            return;
        };

        let Some(output) = touch.get(evt.id).map(|point| point.output) else {
            warn!("{}: dropping touch motion: {}", evt.seat, TouchError::UnknownId(evt.id));
            return;
        };
        let width = self.outputs.get(output).map_or(0, |output| output.width);

        match touch.motion(evt.id, (evt.x, evt.y), width, step_percent) {
            Ok(Some(step)) => self.apply_action(backend, Action::GestureStep { output, step }),
            Ok(None) => (),
            Err(err) => warn!("{}: dropping touch motion: {err}", evt.seat),
        }
    }

    fn on_touch_frame(&mut self, _seat: SeatId) {}

    fn on_touch_cancel(&mut self, seat: SeatId) {
        if let Some(touch) = self.seats.touch_mut(seat) {
            let count = touch.cancel();
            debug!("{seat}: touch cancelled, dropped {count} points");
        }
    }
}
