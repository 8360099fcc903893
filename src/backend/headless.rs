//! Headless backend for testing.
//!
//! Nothing is shown anywhere. Every request is recorded, and frame callback bookkeeping is
//! checked the same way a compositor would.

use std::collections::HashSet;

use layerbar_config::{Color, Margin};

use crate::session::{OutputId, SeatId, SurfaceId};

/// A request the session made, in the order it made it.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    CreateOutputSurface {
        output: OutputId,
        global_name: u32,
        surface: SurfaceId,
    },
    AckConfigure {
        output: OutputId,
        serial: u32,
    },
    CreateDrawable {
        output: OutputId,
        size: (u32, u32),
        scale: i32,
    },
    ResizeDrawable {
        output: OutputId,
        size: (u32, u32),
        scale: i32,
    },
    DestroyDrawable(OutputId),
    DestroySurface(OutputId),
    DestroyLayerSurface(OutputId),
    MakeCurrent(OutputId),
    Clear {
        output: OutputId,
        color: Color,
    },
    RequestFrame(OutputId),
    SwapBuffers(OutputId),
    SetLayerSize {
        output: OutputId,
        width: u32,
        height: u32,
    },
    SetMargin {
        output: OutputId,
        margin: Margin,
    },
    BindSeat {
        seat: SeatId,
        global_name: u32,
    },
    ReleaseSeat(SeatId),
    AcquirePointer(SeatId),
    ReleasePointer(SeatId),
    AcquireTouch(SeatId),
    ReleaseTouch(SeatId),
    AcquireKeyboard(SeatId),
    ReleaseKeyboard(SeatId),
    CreateCursorSurface(SeatId),
    SetCursor {
        seat: SeatId,
        serial: u32,
        scale: i32,
    },
}

impl Request {
    /// The output this request is about, if any.
    pub fn output(&self) -> Option<OutputId> {
        match *self {
            Request::CreateOutputSurface { output, .. }
            | Request::AckConfigure { output, .. }
            | Request::CreateDrawable { output, .. }
            | Request::ResizeDrawable { output, .. }
            | Request::DestroyDrawable(output)
            | Request::DestroySurface(output)
            | Request::DestroyLayerSurface(output)
            | Request::MakeCurrent(output)
            | Request::Clear { output, .. }
            | Request::RequestFrame(output)
            | Request::SwapBuffers(output)
            | Request::SetLayerSize { output, .. }
            | Request::SetMargin { output, .. } => Some(output),
            _ => None,
        }
    }
}

pub struct Headless {
    requests: Vec<Request>,
    next_surface: u32,
    pending_frames: HashSet<OutputId>,
    drawables: HashSet<OutputId>,
}

impl Headless {
    pub fn new() -> Self {
        Self {
            requests: Vec::new(),
            next_surface: 1,
            pending_frames: HashSet::new(),
            drawables: HashSet::new(),
        }
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn take_requests(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.requests)
    }

    pub fn has_pending_frame(&self, output: OutputId) -> bool {
        self.pending_frames.contains(&output)
    }

    pub fn has_drawable(&self, output: OutputId) -> bool {
        self.drawables.contains(&output)
    }

    pub fn create_output_surface(&mut self, output: OutputId, global_name: u32) -> SurfaceId {
        let surface = SurfaceId(self.next_surface);
        self.next_surface += 1;
        self.requests.push(Request::CreateOutputSurface {
            output,
            global_name,
            surface,
        });
        surface
    }

    pub fn ack_configure(&mut self, output: OutputId, serial: u32) {
        self.requests.push(Request::AckConfigure { output, serial });
    }

    pub fn create_drawable(
        &mut self,
        output: OutputId,
        size: (u32, u32),
        scale: i32,
    ) -> anyhow::Result<()> {
        assert!(
            self.drawables.insert(output),
            "{output} already has a drawable"
        );
        self.requests.push(Request::CreateDrawable {
            output,
            size,
            scale,
        });
        Ok(())
    }

    pub fn resize_drawable(
        &mut self,
        output: OutputId,
        size: (u32, u32),
        scale: i32,
    ) -> anyhow::Result<()> {
        assert!(self.drawables.contains(&output), "{output} has no drawable");
        self.requests.push(Request::ResizeDrawable {
            output,
            size,
            scale,
        });
        Ok(())
    }

    pub fn destroy_drawable(&mut self, output: OutputId) {
        self.drawables.remove(&output);
        self.requests.push(Request::DestroyDrawable(output));
    }

    pub fn destroy_surface(&mut self, output: OutputId) {
        // The frame callback dies with its surface.
        self.pending_frames.remove(&output);
        self.requests.push(Request::DestroySurface(output));
    }

    pub fn destroy_layer_surface(&mut self, output: OutputId) {
        self.requests.push(Request::DestroyLayerSurface(output));
    }

    pub fn make_current(&mut self, output: OutputId) {
        assert!(self.drawables.contains(&output), "{output} has no drawable");
        self.requests.push(Request::MakeCurrent(output));
    }

    pub fn clear(&mut self, output: OutputId, color: Color) {
        self.requests.push(Request::Clear { output, color });
    }

    pub fn request_frame(&mut self, output: OutputId) {
        assert!(
            self.pending_frames.insert(output),
            "{output} already has a frame callback pending"
        );
        self.requests.push(Request::RequestFrame(output));
    }

    pub fn swap_buffers(&mut self, output: OutputId) {
        self.requests.push(Request::SwapBuffers(output));
    }

    pub fn set_layer_size(&mut self, output: OutputId, width: u32, height: u32) {
        self.requests.push(Request::SetLayerSize {
            output,
            width,
            height,
        });
    }

    pub fn set_margin(&mut self, output: OutputId, margin: Margin) {
        self.requests.push(Request::SetMargin { output, margin });
    }

    /// Marks the frame callback of `output` as done, as the compositor would right before
    /// sending the event.
    pub fn complete_frame(&mut self, output: OutputId) -> bool {
        self.pending_frames.remove(&output)
    }

    pub fn bind_seat(&mut self, seat: SeatId, global_name: u32) {
        self.requests.push(Request::BindSeat { seat, global_name });
    }

    pub fn release_seat(&mut self, seat: SeatId) {
        self.requests.push(Request::ReleaseSeat(seat));
    }

    pub fn acquire_pointer(&mut self, seat: SeatId) {
        self.requests.push(Request::AcquirePointer(seat));
    }

    pub fn release_pointer(&mut self, seat: SeatId) {
        self.requests.push(Request::ReleasePointer(seat));
    }

    pub fn acquire_touch(&mut self, seat: SeatId) {
        self.requests.push(Request::AcquireTouch(seat));
    }

    pub fn release_touch(&mut self, seat: SeatId) {
        self.requests.push(Request::ReleaseTouch(seat));
    }

    pub fn acquire_keyboard(&mut self, seat: SeatId) {
        self.requests.push(Request::AcquireKeyboard(seat));
    }

    pub fn release_keyboard(&mut self, seat: SeatId) {
        self.requests.push(Request::ReleaseKeyboard(seat));
    }

    pub fn create_cursor_surface(&mut self, seat: SeatId) {
        self.requests.push(Request::CreateCursorSurface(seat));
    }

    pub fn set_cursor(&mut self, seat: SeatId, serial: u32, scale: i32) {
        self.requests.push(Request::SetCursor {
            seat,
            serial,
            scale,
        });
    }
}
