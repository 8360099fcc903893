//! Outbound side of the session: everything the bar asks of the compositor.
//!
//! The session never talks to protocol objects directly. It addresses outputs and seats by id
//! and the backend owns whatever those ids map to: real Wayland objects for [`Wayland`], or a
//! request log for [`Headless`].

use layerbar_config::{Color, Margin};

use crate::session::{OutputId, SeatId, SurfaceId};

pub mod headless;
pub mod wayland;

pub use headless::Headless;
pub use wayland::Wayland;

pub enum Backend {
    Wayland(Wayland),
    Headless(Headless),
}

impl Backend {
    /// Binds the output global and creates its surface and layer surface.
    pub fn create_output_surface(&mut self, output: OutputId, global_name: u32) -> SurfaceId {
        match self {
            Backend::Wayland(wayland) => wayland.create_output_surface(output, global_name),
            Backend::Headless(headless) => headless.create_output_surface(output, global_name),
        }
    }

    pub fn ack_configure(&mut self, output: OutputId, serial: u32) {
        match self {
            Backend::Wayland(wayland) => wayland.ack_configure(output, serial),
            Backend::Headless(headless) => headless.ack_configure(output, serial),
        }
    }

    /// Creates the drawable for an output, `size` in buffer pixels.
    pub fn create_drawable(
        &mut self,
        output: OutputId,
        size: (u32, u32),
        scale: i32,
    ) -> anyhow::Result<()> {
        match self {
            Backend::Wayland(wayland) => wayland.create_drawable(output, size, scale),
            Backend::Headless(headless) => headless.create_drawable(output, size, scale),
        }
    }

    pub fn resize_drawable(
        &mut self,
        output: OutputId,
        size: (u32, u32),
        scale: i32,
    ) -> anyhow::Result<()> {
        match self {
            Backend::Wayland(wayland) => wayland.resize_drawable(output, size, scale),
            Backend::Headless(headless) => headless.resize_drawable(output, size, scale),
        }
    }

    pub fn destroy_drawable(&mut self, output: OutputId) {
        match self {
            Backend::Wayland(wayland) => wayland.destroy_drawable(output),
            Backend::Headless(headless) => headless.destroy_drawable(output),
        }
    }

    pub fn destroy_surface(&mut self, output: OutputId) {
        match self {
            Backend::Wayland(wayland) => wayland.destroy_surface(output),
            Backend::Headless(headless) => headless.destroy_surface(output),
        }
    }

    pub fn destroy_layer_surface(&mut self, output: OutputId) {
        match self {
            Backend::Wayland(wayland) => wayland.destroy_layer_surface(output),
            Backend::Headless(headless) => headless.destroy_layer_surface(output),
        }
    }

    pub fn make_current(&mut self, output: OutputId) {
        match self {
            Backend::Wayland(wayland) => wayland.make_current(output),
            Backend::Headless(headless) => headless.make_current(output),
        }
    }

    pub fn clear(&mut self, output: OutputId, color: Color) {
        match self {
            Backend::Wayland(wayland) => wayland.clear(output, color),
            Backend::Headless(headless) => headless.clear(output, color),
        }
    }

    /// Requests a frame callback for the output's surface.
    ///
    /// There must be no outstanding frame callback for this output.
    pub fn request_frame(&mut self, output: OutputId) {
        match self {
            Backend::Wayland(wayland) => wayland.request_frame(output),
            Backend::Headless(headless) => headless.request_frame(output),
        }
    }

    pub fn swap_buffers(&mut self, output: OutputId) {
        match self {
            Backend::Wayland(wayland) => wayland.swap_buffers(output),
            Backend::Headless(headless) => headless.swap_buffers(output),
        }
    }

    /// Asks the compositor for a new layer surface size and commits.
    pub fn set_layer_size(&mut self, output: OutputId, width: u32, height: u32) {
        match self {
            Backend::Wayland(wayland) => wayland.set_layer_size(output, width, height),
            Backend::Headless(headless) => headless.set_layer_size(output, width, height),
        }
    }

    /// Changes the layer surface margins and commits.
    pub fn set_margin(&mut self, output: OutputId, margin: Margin) {
        match self {
            Backend::Wayland(wayland) => wayland.set_margin(output, margin),
            Backend::Headless(headless) => headless.set_margin(output, margin),
        }
    }

    pub fn bind_seat(&mut self, seat: SeatId, global_name: u32) {
        match self {
            Backend::Wayland(wayland) => wayland.bind_seat(seat, global_name),
            Backend::Headless(headless) => headless.bind_seat(seat, global_name),
        }
    }

    pub fn release_seat(&mut self, seat: SeatId) {
        match self {
            Backend::Wayland(wayland) => wayland.release_seat(seat),
            Backend::Headless(headless) => headless.release_seat(seat),
        }
    }

    pub fn acquire_pointer(&mut self, seat: SeatId) {
        match self {
            Backend::Wayland(wayland) => wayland.acquire_pointer(seat),
            Backend::Headless(headless) => headless.acquire_pointer(seat),
        }
    }

    pub fn release_pointer(&mut self, seat: SeatId) {
        match self {
            Backend::Wayland(wayland) => wayland.release_pointer(seat),
            Backend::Headless(headless) => headless.release_pointer(seat),
        }
    }

    pub fn acquire_touch(&mut self, seat: SeatId) {
        match self {
            Backend::Wayland(wayland) => wayland.acquire_touch(seat),
            Backend::Headless(headless) => headless.acquire_touch(seat),
        }
    }

    pub fn release_touch(&mut self, seat: SeatId) {
        match self {
            Backend::Wayland(wayland) => wayland.release_touch(seat),
            Backend::Headless(headless) => headless.release_touch(seat),
        }
    }

    pub fn acquire_keyboard(&mut self, seat: SeatId) {
        match self {
            Backend::Wayland(wayland) => wayland.acquire_keyboard(seat),
            Backend::Headless(headless) => headless.acquire_keyboard(seat),
        }
    }

    pub fn release_keyboard(&mut self, seat: SeatId) {
        match self {
            Backend::Wayland(wayland) => wayland.release_keyboard(seat),
            Backend::Headless(headless) => headless.release_keyboard(seat),
        }
    }

    pub fn create_cursor_surface(&mut self, seat: SeatId) {
        match self {
            Backend::Wayland(wayland) => wayland.create_cursor_surface(seat),
            Backend::Headless(headless) => headless.create_cursor_surface(seat),
        }
    }

    /// Loads the cursor image for `scale` and shows it for the seat's pointer.
    pub fn set_cursor(&mut self, seat: SeatId, serial: u32, scale: i32) {
        match self {
            Backend::Wayland(wayland) => wayland.set_cursor(seat, serial, scale),
            Backend::Headless(headless) => headless.set_cursor(seat, serial, scale),
        }
    }

    pub fn flush(&mut self) -> anyhow::Result<()> {
        match self {
            Backend::Wayland(wayland) => wayland.flush(),
            Backend::Headless(_) => Ok(()),
        }
    }

    pub fn wayland(&mut self) -> &mut Wayland {
        if let Self::Wayland(v) = self {
            v
        } else {
            panic!("backend is not Wayland");
        }
    }

    pub fn headless(&mut self) -> &mut Headless {
        if let Self::Headless(v) = self {
            v
        } else {
            panic!("backend is not Headless")
        }
    }
}
