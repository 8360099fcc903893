//! Wayland backend: a layer-shell client talking to a real compositor.

use std::collections::HashMap;

use anyhow::Context;
use layerbar_config::{Color, Config, Layer, Margin};
use wayland_client::globals::registry_queue_init;
use wayland_client::protocol::wl_callback::WlCallback;
use wayland_client::protocol::wl_compositor::WlCompositor;
use wayland_client::protocol::wl_keyboard::WlKeyboard;
use wayland_client::protocol::wl_output::WlOutput;
use wayland_client::protocol::wl_pointer::WlPointer;
use wayland_client::protocol::wl_registry::WlRegistry;
use wayland_client::protocol::wl_seat::WlSeat;
use wayland_client::protocol::wl_shm::WlShm;
use wayland_client::protocol::wl_surface::WlSurface;
use wayland_client::protocol::wl_touch::WlTouch;
use wayland_client::{Connection, EventQueue, Proxy, QueueHandle};
use wayland_protocols_wlr::layer_shell::v1::client::zwlr_layer_shell_v1::{self, ZwlrLayerShellV1};
use wayland_protocols_wlr::layer_shell::v1::client::zwlr_layer_surface_v1::{
    Anchor, KeyboardInteractivity, ZwlrLayerSurfaceV1,
};

use crate::cursor::CursorManager;
use crate::session::{Event, OutputId, SeatId, State, SurfaceId};
use crate::utils::argb8888_premultiplied;

mod handlers;
mod shm;

use shm::{ShmBuffer, ShmDrawable};

const COMPOSITOR_VERSION: u32 = 4;
const OUTPUT_VERSION: u32 = 4;
const SEAT_VERSION: u32 = 7;
const LAYER_SHELL_VERSION: u32 = 4;

/// How new layer surfaces are set up.
struct SurfaceSettings {
    namespace: String,
    layer: Layer,
    height: u32,
    margin: Margin,
    keyboard_interactive: bool,
}

struct OutputHandles {
    output: WlOutput,
    surface: WlSurface,
    layer_surface: Option<ZwlrLayerSurfaceV1>,
    drawable: Option<ShmDrawable>,
    frame_callback: Option<WlCallback>,
}

struct SeatHandles {
    seat: WlSeat,
    pointer: Option<WlPointer>,
    touch: Option<WlTouch>,
    keyboard: Option<WlKeyboard>,
    cursor_surface: Option<WlSurface>,
    /// Keeps the attached cursor image alive.
    cursor_buffer: Option<ShmBuffer>,
}

pub struct Wayland {
    connection: Connection,
    qh: QueueHandle<State>,
    registry: WlRegistry,
    compositor: WlCompositor,
    shm: WlShm,
    layer_shell: ZwlrLayerShellV1,
    /// Advertised versions of every global by name.
    versions: HashMap<u32, u32>,
    settings: SurfaceSettings,
    cursors: CursorManager,
    outputs: HashMap<OutputId, OutputHandles>,
    seats: HashMap<SeatId, SeatHandles>,
}

impl Wayland {
    /// Connects to the compositor and binds the globals the bar cannot work without.
    ///
    /// Also returns the globals announced so far, translated into session events.
    pub fn new(config: &Config) -> anyhow::Result<(Self, EventQueue<State>, Vec<Event>)> {
        let connection =
            Connection::connect_to_env().context("error connecting to the Wayland display")?;
        let (globals, event_queue) = registry_queue_init::<State>(&connection)
            .context("error initializing the registry")?;
        let qh = event_queue.handle();

        let compositor = globals
            .bind::<WlCompositor, _, _>(&qh, 4..=COMPOSITOR_VERSION, ())
            .context("wl_compositor v4 is not available")?;
        let shm = globals
            .bind::<WlShm, _, _>(&qh, 1..=1, ())
            .context("wl_shm is not available")?;
        let layer_shell = globals
            .bind::<ZwlrLayerShellV1, _, _>(&qh, 1..=LAYER_SHELL_VERSION, ())
            .context("zwlr_layer_shell_v1 is not available")?;

        let list = globals.contents().clone_list();
        let versions = list.iter().map(|global| (global.name, global.version)).collect();
        let events = list
            .iter()
            .filter_map(|global| global_event(global.name, &global.interface))
            .collect();

        let wayland = Self {
            connection,
            qh,
            registry: globals.registry().clone(),
            compositor,
            shm,
            layer_shell,
            versions,
            settings: SurfaceSettings {
                namespace: config.namespace.clone(),
                layer: config.layer,
                height: config.height.regular,
                margin: config.margin,
                keyboard_interactive: config.keyboard_interactive,
            },
            cursors: CursorManager::new(&config.cursor.xcursor_theme, config.cursor.xcursor_size),
            outputs: HashMap::new(),
            seats: HashMap::new(),
        };

        Ok((wayland, event_queue, events))
    }

    pub fn connection(&self) -> Connection {
        self.connection.clone()
    }

    pub fn flush(&mut self) -> anyhow::Result<()> {
        self.connection
            .flush()
            .context("error flushing the Wayland connection")
    }

    pub(super) fn global_added(&mut self, name: u32, version: u32) {
        self.versions.insert(name, version);
    }

    pub(super) fn global_removed(&mut self, name: u32) {
        self.versions.remove(&name);
    }

    fn version(&self, name: u32, max: u32) -> u32 {
        self.versions.get(&name).copied().unwrap_or(1).min(max)
    }

    // =========================================================================
    // Outputs
    // =========================================================================

    pub fn create_output_surface(&mut self, id: OutputId, global_name: u32) -> SurfaceId {
        let version = self.version(global_name, OUTPUT_VERSION);
        let output: WlOutput = self.registry.bind(global_name, version, &self.qh, id);

        let surface = self.compositor.create_surface(&self.qh, ());
        let layer = match self.settings.layer {
            Layer::Background => zwlr_layer_shell_v1::Layer::Background,
            Layer::Bottom => zwlr_layer_shell_v1::Layer::Bottom,
            Layer::Top => zwlr_layer_shell_v1::Layer::Top,
            Layer::Overlay => zwlr_layer_shell_v1::Layer::Overlay,
        };
        let layer_surface = self.layer_shell.get_layer_surface(
            &surface,
            Some(&output),
            layer,
            self.settings.namespace.clone(),
            &self.qh,
            id,
        );

        let height = self.settings.height;
        let margin = self.settings.margin;
        layer_surface.set_size(0, height);
        layer_surface.set_anchor(Anchor::Top | Anchor::Left | Anchor::Right);
        layer_surface.set_exclusive_zone(height as i32);
        layer_surface.set_margin(margin.top, margin.right, margin.bottom, margin.left);
        layer_surface.set_keyboard_interactivity(if self.settings.keyboard_interactive {
            KeyboardInteractivity::Exclusive
        } else {
            KeyboardInteractivity::None
        });
        surface.commit();

        let surface_id = SurfaceId(surface.id().protocol_id());
        self.outputs.insert(
            id,
            OutputHandles {
                output,
                surface,
                layer_surface: Some(layer_surface),
                drawable: None,
                frame_callback: None,
            },
        );

        surface_id
    }

    pub fn ack_configure(&mut self, id: OutputId, serial: u32) {
        if let Some(layer_surface) = self.layer_surface(id) {
            layer_surface.ack_configure(serial);
        }
    }

    pub fn create_drawable(
        &mut self,
        id: OutputId,
        size: (u32, u32),
        scale: i32,
    ) -> anyhow::Result<()> {
        let Some(handles) = self.outputs.get_mut(&id) else {
            return Ok(());
        };

        let drawable = ShmDrawable::new(&self.shm, &self.qh, size)
            .with_context(|| format!("error creating drawable for {id}"))?;
        handles.surface.set_buffer_scale(scale);
        handles.drawable = Some(drawable);
        Ok(())
    }

    pub fn resize_drawable(
        &mut self,
        id: OutputId,
        size: (u32, u32),
        scale: i32,
    ) -> anyhow::Result<()> {
        let Some(handles) = self.outputs.get_mut(&id) else {
            return Ok(());
        };

        handles.surface.set_buffer_scale(scale);
        if handles.drawable.as_ref().map(ShmDrawable::size) == Some(size) {
            return Ok(());
        }

        // Drop the old buffers first so the two sizes never coexist.
        handles.drawable = None;
        let drawable = ShmDrawable::new(&self.shm, &self.qh, size)
            .with_context(|| format!("error resizing drawable for {id}"))?;
        handles.drawable = Some(drawable);
        Ok(())
    }

    pub fn destroy_drawable(&mut self, id: OutputId) {
        if let Some(handles) = self.outputs.get_mut(&id) {
            handles.drawable = None;
        }
    }

    pub fn destroy_surface(&mut self, id: OutputId) {
        if let Some(handles) = self.outputs.get_mut(&id) {
            handles.frame_callback = None;
            handles.surface.destroy();
        }
    }

    pub fn destroy_layer_surface(&mut self, id: OutputId) {
        let Some(mut handles) = self.outputs.remove(&id) else {
            return;
        };
        if let Some(layer_surface) = handles.layer_surface.take() {
            layer_surface.destroy();
        }
        if handles.output.version() >= 3 {
            handles.output.release();
        }
    }

    pub fn make_current(&mut self, id: OutputId) {
        if let Some(drawable) = self.drawable(id) {
            drawable.make_current();
        }
    }

    pub fn clear(&mut self, id: OutputId, color: Color) {
        if let Some(drawable) = self.drawable(id) {
            drawable.clear(argb8888_premultiplied(color));
        }
    }

    pub fn request_frame(&mut self, id: OutputId) {
        let Some(handles) = self.outputs.get_mut(&id) else {
            return;
        };
        assert!(
            handles.frame_callback.is_none(),
            "{id} already has a frame callback pending"
        );
        handles.frame_callback = Some(handles.surface.frame(&self.qh, id));
    }

    pub fn swap_buffers(&mut self, id: OutputId) {
        let Some(handles) = self.outputs.get_mut(&id) else {
            return;
        };
        if let Some(drawable) = &mut handles.drawable {
            drawable.swap_buffers(&handles.surface);
        }
    }

    pub fn set_layer_size(&mut self, id: OutputId, width: u32, height: u32) {
        let Some(handles) = self.outputs.get(&id) else {
            return;
        };
        if let Some(layer_surface) = &handles.layer_surface {
            layer_surface.set_size(width, height);
            handles.surface.commit();
        }
    }

    pub fn set_margin(&mut self, id: OutputId, margin: Margin) {
        let Some(handles) = self.outputs.get(&id) else {
            return;
        };
        if let Some(layer_surface) = &handles.layer_surface {
            layer_surface.set_margin(margin.top, margin.right, margin.bottom, margin.left);
            handles.surface.commit();
        }
    }

    pub(super) fn frame_done(&mut self, id: OutputId) {
        if let Some(handles) = self.outputs.get_mut(&id) {
            handles.frame_callback = None;
        }
    }

    fn layer_surface(&self, id: OutputId) -> Option<&ZwlrLayerSurfaceV1> {
        self.outputs.get(&id)?.layer_surface.as_ref()
    }

    fn drawable(&mut self, id: OutputId) -> Option<&mut ShmDrawable> {
        self.outputs.get_mut(&id)?.drawable.as_mut()
    }

    // =========================================================================
    // Seats
    // =========================================================================

    pub fn bind_seat(&mut self, id: SeatId, global_name: u32) {
        let version = self.version(global_name, SEAT_VERSION);
        let seat: WlSeat = self.registry.bind(global_name, version, &self.qh, id);
        self.seats.insert(
            id,
            SeatHandles {
                seat,
                pointer: None,
                touch: None,
                keyboard: None,
                cursor_surface: None,
                cursor_buffer: None,
            },
        );
    }

    pub fn release_seat(&mut self, id: SeatId) {
        let Some(handles) = self.seats.remove(&id) else {
            return;
        };
        if let Some(surface) = handles.cursor_surface {
            surface.destroy();
        }
        if handles.seat.version() >= 5 {
            handles.seat.release();
        }
    }

    pub fn acquire_pointer(&mut self, id: SeatId) {
        if let Some(handles) = self.seats.get_mut(&id) {
            handles.pointer = Some(handles.seat.get_pointer(&self.qh, id));
        }
    }

    pub fn release_pointer(&mut self, id: SeatId) {
        let Some(pointer) = self.seats.get_mut(&id).and_then(|h| h.pointer.take()) else {
            return;
        };
        if pointer.version() >= 3 {
            pointer.release();
        }
    }

    pub fn acquire_touch(&mut self, id: SeatId) {
        if let Some(handles) = self.seats.get_mut(&id) {
            handles.touch = Some(handles.seat.get_touch(&self.qh, id));
        }
    }

    pub fn release_touch(&mut self, id: SeatId) {
        let Some(touch) = self.seats.get_mut(&id).and_then(|h| h.touch.take()) else {
            return;
        };
        if touch.version() >= 3 {
            touch.release();
        }
    }

    pub fn acquire_keyboard(&mut self, id: SeatId) {
        if let Some(handles) = self.seats.get_mut(&id) {
            handles.keyboard = Some(handles.seat.get_keyboard(&self.qh, id));
        }
    }

    pub fn release_keyboard(&mut self, id: SeatId) {
        let Some(keyboard) = self.seats.get_mut(&id).and_then(|h| h.keyboard.take()) else {
            return;
        };
        if keyboard.version() >= 3 {
            keyboard.release();
        }
    }

    pub fn create_cursor_surface(&mut self, id: SeatId) {
        if let Some(handles) = self.seats.get_mut(&id) {
            handles.cursor_surface = Some(self.compositor.create_surface(&self.qh, ()));
        }
    }

    pub fn set_cursor(&mut self, id: SeatId, serial: u32, scale: i32) {
        let Some(handles) = self.seats.get_mut(&id) else {
            return;
        };
        let (Some(pointer), Some(surface)) = (&handles.pointer, &handles.cursor_surface) else {
            return;
        };

        let Some(image) = self.cursors.get(scale) else {
            // Leave whatever the compositor shows.
            return;
        };

        let mut buffer = match ShmBuffer::new(&self.shm, &self.qh, image.width, image.height) {
            Ok(buffer) => buffer,
            Err(err) => {
                warn!("{id}: error creating cursor buffer: {err:?}");
                return;
            }
        };
        buffer.pixels_mut().copy_from_slice(&image.pixels);

        surface.set_buffer_scale(scale);
        buffer.attach_to(surface);
        surface.commit();

        let scale = scale.max(1).unsigned_abs();
        pointer.set_cursor(
            serial,
            Some(surface),
            (image.xhot / scale) as i32,
            (image.yhot / scale) as i32,
        );

        handles.cursor_buffer = Some(buffer);
    }
}

/// Translates an announced global into the session event for it, if the session cares.
fn global_event(name: u32, interface: &str) -> Option<Event> {
    match interface {
        "wl_output" => Some(Event::OutputAnnounced { global_name: name }),
        "wl_seat" => Some(Event::SeatAnnounced { global_name: name }),
        _ => None,
    }
}
