//! Protocol event dispatch.
//!
//! Objects carry the id of the output or seat they belong to as user data, so every event
//! translates directly into a session [`Event`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use wayland_client::globals::GlobalListContents;
use wayland_client::protocol::wl_buffer::{self, WlBuffer};
use wayland_client::protocol::wl_callback::{self, WlCallback};
use wayland_client::protocol::wl_compositor::WlCompositor;
use wayland_client::protocol::wl_keyboard::{self, WlKeyboard};
use wayland_client::protocol::wl_output::{self, WlOutput};
use wayland_client::protocol::wl_pointer::{self, WlPointer};
use wayland_client::protocol::wl_registry::{self, WlRegistry};
use wayland_client::protocol::wl_seat::{self, WlSeat};
use wayland_client::protocol::wl_shm::WlShm;
use wayland_client::protocol::wl_shm_pool::WlShmPool;
use wayland_client::protocol::wl_surface::WlSurface;
use wayland_client::protocol::wl_touch::{self, WlTouch};
use wayland_client::{delegate_noop, Connection, Dispatch, Proxy, QueueHandle, WEnum};
use wayland_protocols_wlr::layer_shell::v1::client::zwlr_layer_shell_v1::ZwlrLayerShellV1;
use wayland_protocols_wlr::layer_shell::v1::client::zwlr_layer_surface_v1::{
    self, ZwlrLayerSurfaceV1,
};

use super::global_event;
use crate::input::{
    InputEvent, KeyboardKeyEvent, PointerButtonEvent, PointerEnterEvent, PointerMotionEvent,
    TouchDownEvent, TouchMotionEvent, TouchUpEvent,
};
use crate::session::{
    ButtonState, Capabilities, Event, KeyState, OutputId, SeatId, State, SurfaceId,
};

fn surface_id(surface: &WlSurface) -> SurfaceId {
    SurfaceId(surface.id().protocol_id())
}

impl Dispatch<WlRegistry, GlobalListContents> for State {
    fn event(
        state: &mut Self,
        _registry: &WlRegistry,
        event: wl_registry::Event,
        _data: &GlobalListContents,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        match event {
            wl_registry::Event::Global {
                name,
                interface,
                version,
            } => {
                trace!("global {name} announced: {interface} v{version}");
                state.backend.wayland().global_added(name, version);
                if let Some(event) = global_event(name, &interface) {
                    state.handle(event);
                }
            }
            wl_registry::Event::GlobalRemove { name } => {
                state.backend.wayland().global_removed(name);
                state.handle(Event::GlobalRemoved { global_name: name });
            }
            _ => (),
        }
    }
}

impl Dispatch<WlOutput, OutputId> for State {
    fn event(
        state: &mut Self,
        _output: &WlOutput,
        event: wl_output::Event,
        id: &OutputId,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        if let wl_output::Event::Scale { factor } = event {
            state.handle(Event::OutputScale {
                output: *id,
                factor,
            });
        }
    }
}

impl Dispatch<ZwlrLayerSurfaceV1, OutputId> for State {
    fn event(
        state: &mut Self,
        _layer_surface: &ZwlrLayerSurfaceV1,
        event: zwlr_layer_surface_v1::Event,
        id: &OutputId,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        match event {
            zwlr_layer_surface_v1::Event::Configure {
                serial,
                width,
                height,
            } => state.handle(Event::LayerConfigure {
                output: *id,
                serial,
                width,
                height,
            }),
            zwlr_layer_surface_v1::Event::Closed => {
                state.handle(Event::LayerClosed { output: *id })
            }
            _ => (),
        }
    }
}

impl Dispatch<WlCallback, OutputId> for State {
    fn event(
        state: &mut Self,
        _callback: &WlCallback,
        event: wl_callback::Event,
        id: &OutputId,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        if let wl_callback::Event::Done { .. } = event {
            state.backend.wayland().frame_done(*id);
            state.handle(Event::FrameDone { output: *id });
        }
    }
}

impl Dispatch<WlBuffer, Arc<AtomicBool>> for State {
    fn event(
        _state: &mut Self,
        _buffer: &WlBuffer,
        event: wl_buffer::Event,
        busy: &Arc<AtomicBool>,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        if let wl_buffer::Event::Release = event {
            busy.store(false, Ordering::Release);
        }
    }
}

impl Dispatch<WlSeat, SeatId> for State {
    fn event(
        state: &mut Self,
        _seat: &WlSeat,
        event: wl_seat::Event,
        id: &SeatId,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        match event {
            wl_seat::Event::Capabilities { capabilities } => {
                let bits = match capabilities {
                    WEnum::Value(capabilities) => capabilities.bits(),
                    WEnum::Unknown(bits) => bits,
                };
                state.handle(Event::SeatCapabilities {
                    seat: *id,
                    capabilities: Capabilities::from_bits_truncate(bits),
                });
            }
            wl_seat::Event::Name { name } => debug!("{id} is named {name:?}"),
            _ => (),
        }
    }
}

impl Dispatch<WlPointer, SeatId> for State {
    fn event(
        state: &mut Self,
        _pointer: &WlPointer,
        event: wl_pointer::Event,
        id: &SeatId,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        let seat = *id;
        let event = match event {
            wl_pointer::Event::Enter {
                serial,
                surface,
                surface_x,
                surface_y,
            } => InputEvent::PointerEnter {
                event: PointerEnterEvent {
                    seat,
                    serial,
                    surface: surface_id(&surface),
                    x: surface_x,
                    y: surface_y,
                },
            },
            wl_pointer::Event::Leave { .. } => InputEvent::PointerLeave { seat },
            wl_pointer::Event::Motion {
                time,
                surface_x,
                surface_y,
            } => InputEvent::PointerMotion {
                event: PointerMotionEvent {
                    seat,
                    time,
                    x: surface_x,
                    y: surface_y,
                },
            },
            wl_pointer::Event::Button {
                time,
                button,
                state: button_state,
                ..
            } => InputEvent::PointerButton {
                event: PointerButtonEvent {
                    seat,
                    time,
                    button,
                    state: match button_state {
                        WEnum::Value(wl_pointer::ButtonState::Pressed) => ButtonState::Pressed,
                        _ => ButtonState::Released,
                    },
                },
            },
            _ => return,
        };

        state.handle(Event::Input(event));
    }
}

impl Dispatch<WlTouch, SeatId> for State {
    fn event(
        state: &mut Self,
        _touch: &WlTouch,
        event: wl_touch::Event,
        id: &SeatId,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        let seat = *id;
        let event = match event {
            wl_touch::Event::Down {
                time,
                surface,
                id,
                x,
                y,
                ..
            } => InputEvent::TouchDown {
                event: TouchDownEvent {
                    seat,
                    time,
                    surface: surface_id(&surface),
                    id,
                    x,
                    y,
                },
            },
            wl_touch::Event::Up { time, id, .. } => InputEvent::TouchUp {
                event: TouchUpEvent { seat, time, id },
            },
            wl_touch::Event::Motion { time, id, x, y } => InputEvent::TouchMotion {
                event: TouchMotionEvent {
                    seat,
                    time,
                    id,
                    x,
                    y,
                },
            },
            wl_touch::Event::Frame => InputEvent::TouchFrame { seat },
            wl_touch::Event::Cancel => InputEvent::TouchCancel { seat },
            _ => return,
        };

        state.handle(Event::Input(event));
    }
}

impl Dispatch<WlKeyboard, SeatId> for State {
    fn event(
        state: &mut Self,
        _keyboard: &WlKeyboard,
        event: wl_keyboard::Event,
        id: &SeatId,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        let seat = *id;
        let event = match event {
            wl_keyboard::Event::Enter { surface, .. } => InputEvent::KeyboardEnter {
                seat,
                surface: surface_id(&surface),
            },
            wl_keyboard::Event::Leave { surface, .. } => InputEvent::KeyboardLeave {
                seat,
                surface: surface_id(&surface),
            },
            wl_keyboard::Event::Key {
                time,
                key,
                state: key_state,
                ..
            } => InputEvent::KeyboardKey {
                event: KeyboardKeyEvent {
                    seat,
                    time,
                    key,
                    state: match key_state {
                        WEnum::Value(wl_keyboard::KeyState::Pressed) => KeyState::Pressed,
                        _ => KeyState::Released,
                    },
                },
            },
            // The keymap fd is closed when the event is dropped.
            _ => return,
        };

        state.handle(Event::Input(event));
    }
}

delegate_noop!(State: WlCompositor);
delegate_noop!(State: WlShmPool);
delegate_noop!(State: ZwlrLayerShellV1);
delegate_noop!(State: ignore WlShm);
delegate_noop!(State: ignore WlSurface);
