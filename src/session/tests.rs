use layerbar_config::{Color, Config, Margin};
use proptest::prelude::*;
use proptest_derive::Arbitrary;

use super::*;
use crate::backend::headless::Request;
use crate::backend::Headless;
use crate::input::actions::{BTN_LEFT, BTN_MIDDLE, BTN_RIGHT};
use crate::input::{
    PointerButtonEvent, PointerEnterEvent, PointerFocus, PointerMotionEvent, TouchDownEvent,
    TouchMotionEvent, TouchUpEvent, MAX_TOUCH_POINTS,
};

const REGULAR: Color = layerbar_config::DEFAULT_REGULAR_COLOR;
const EXTENDED: Color = layerbar_config::DEFAULT_EXTENDED_COLOR;

struct Fixture {
    backend: Backend,
    session: Session,
    next_global: u32,
    next_serial: u32,
}

impl Fixture {
    fn new() -> Self {
        Self::with_config(Config::default())
    }

    fn with_config(config: Config) -> Self {
        Self {
            backend: Backend::Headless(Headless::new()),
            session: Session::new(config),
            next_global: 1,
            next_serial: 1,
        }
    }

    fn headless(&mut self) -> &mut Headless {
        self.backend.headless()
    }

    fn take(&mut self) -> Vec<Request> {
        self.headless().take_requests()
    }

    fn handle(&mut self, event: Event) {
        self.session.handle_event(&mut self.backend, event);
    }

    fn input(&mut self, event: InputEvent) {
        self.handle(Event::Input(event));
    }

    fn refresh(&mut self) {
        self.session.refresh(&mut self.backend).unwrap();
    }

    fn global(&mut self) -> u32 {
        let name = self.next_global;
        self.next_global += 1;
        name
    }

    fn add_output(&mut self) -> OutputId {
        let global_name = self.global();
        self.handle(Event::OutputAnnounced { global_name });
        self.session.outputs.find_by_global(global_name).unwrap()
    }

    fn configure(&mut self, output: OutputId, width: u32, height: u32) -> u32 {
        let serial = self.next_serial;
        self.next_serial += 1;
        self.handle(Event::LayerConfigure {
            output,
            serial,
            width,
            height,
        });
        serial
    }

    /// An output that is configured to 1000×40 and has drawn its first frame.
    fn add_drawn_output(&mut self) -> OutputId {
        let output = self.add_output();
        self.configure(output, 1000, 40);
        self.refresh();
        self.take();
        output
    }

    fn frame_done(&mut self, output: OutputId) {
        assert!(self.headless().complete_frame(output));
        self.handle(Event::FrameDone { output });
    }

    fn add_seat(&mut self, capabilities: Capabilities) -> SeatId {
        let global_name = self.global();
        self.handle(Event::SeatAnnounced { global_name });
        let seat = self.session.seats.find_by_global(global_name).unwrap();
        self.handle(Event::SeatCapabilities { seat, capabilities });
        self.take();
        seat
    }

    fn surface(&self, output: OutputId) -> SurfaceId {
        self.session.outputs.get(output).unwrap().surface
    }

    fn pointer_enter(&mut self, seat: SeatId, output: OutputId, serial: u32, x: f64, y: f64) {
        let surface = self.surface(output);
        self.input(InputEvent::PointerEnter {
            event: PointerEnterEvent {
                seat,
                serial,
                surface,
                x,
                y,
            },
        });
    }

    fn button(&mut self, seat: SeatId, button: u32, state: ButtonState) {
        self.input(InputEvent::PointerButton {
            event: PointerButtonEvent {
                seat,
                time: 0,
                button,
                state,
            },
        });
    }

    fn touch_down(&mut self, seat: SeatId, output: OutputId, id: i32, x: f64, time: u32) {
        let surface = self.surface(output);
        self.input(InputEvent::TouchDown {
            event: TouchDownEvent {
                seat,
                time,
                surface,
                id,
                x,
                y: 10.,
            },
        });
    }

    fn touch_motion(&mut self, seat: SeatId, id: i32, x: f64) {
        self.input(InputEvent::TouchMotion {
            event: TouchMotionEvent {
                seat,
                time: 0,
                id,
                x,
                y: 10.,
            },
        });
    }

    fn touch_up(&mut self, seat: SeatId, id: i32, time: u32) {
        self.input(InputEvent::TouchUp {
            event: TouchUpEvent { seat, time, id },
        });
    }

    fn pointer_focus(&self, seat: SeatId) -> PointerFocus {
        let seat = self.session.seats.get(seat).unwrap();
        seat.pointer.as_ref().unwrap().focus()
    }

    fn touch_len(&self, seat: SeatId) -> usize {
        let seat = self.session.seats.get(seat).unwrap();
        seat.touch.as_ref().unwrap().len()
    }
}

// =============================================================================
// Outputs and rendering
// =============================================================================

#[test]
fn configure_is_acked_and_drawable_created_on_refresh() {
    let mut f = Fixture::new();
    let output = f.add_output();
    assert_eq!(
        f.take(),
        [Request::CreateOutputSurface {
            output,
            global_name: 1,
            surface: SurfaceId(1),
        }]
    );

    let serial = f.configure(output, 1000, 40);
    assert_eq!(f.take(), [Request::AckConfigure { output, serial }]);

    f.refresh();
    assert_eq!(
        f.take(),
        [
            Request::CreateDrawable {
                output,
                size: (1000, 40),
                scale: 1,
            },
            Request::MakeCurrent(output),
            Request::Clear {
                output,
                color: REGULAR,
            },
            Request::RequestFrame(output),
            Request::SwapBuffers(output),
        ]
    );
    assert_eq!(
        f.session.outputs.get(output).unwrap().frame_state,
        FrameState::WaitingForFrameCallback
    );
}

#[test]
fn zero_size_configure_creates_no_drawable() {
    let mut f = Fixture::new();
    let output = f.add_output();
    f.configure(output, 0, 0);
    f.take();

    f.refresh();
    assert!(f.take().is_empty());
    assert!(!f.session.outputs.get(output).unwrap().has_drawable);
}

#[test]
fn empty_reconfigure_drops_the_drawable() {
    let mut f = Fixture::new();
    let output = f.add_drawn_output();

    let serial = f.configure(output, 0, 0);
    assert_eq!(
        f.take(),
        [
            Request::DestroyDrawable(output),
            Request::AckConfigure { output, serial },
        ]
    );
    assert!(!f.session.outputs.get(output).unwrap().has_drawable);

    // The pending frame completes without drawing.
    f.refresh();
    f.frame_done(output);
    assert!(f.take().is_empty());

    // A usable size brings the drawable back on the next refresh.
    let serial = f.configure(output, 1000, 40);
    assert_eq!(f.take(), [Request::AckConfigure { output, serial }]);
    f.refresh();
    assert_eq!(
        f.take()[0],
        Request::CreateDrawable {
            output,
            size: (1000, 40),
            scale: 1,
        }
    );

    // One empty dimension is enough.
    f.frame_done(output);
    f.take();
    f.configure(output, 1000, 0);
    assert_eq!(f.take()[0], Request::DestroyDrawable(output));
    assert!(!f.headless().has_drawable(output));
}

#[test]
fn reconfigure_resizes_then_acks() {
    let mut f = Fixture::new();
    let output = f.add_drawn_output();

    let serial = f.configure(output, 1000, 1080);
    assert_eq!(
        f.take(),
        [
            Request::ResizeDrawable {
                output,
                size: (1000, 1080),
                scale: 1,
            },
            Request::AckConfigure { output, serial },
        ]
    );
    assert_eq!(
        f.session.outputs.get(output).unwrap().visual_mode,
        VisualMode::Extended
    );

    // The next frame uses the extended color.
    f.frame_done(output);
    assert!(f.take().contains(&Request::Clear {
        output,
        color: EXTENDED,
    }));
}

#[test]
fn frames_are_paced_by_callbacks() {
    let mut f = Fixture::new();
    let output = f.add_drawn_output();

    // Nothing happens until the callback is done.
    f.refresh();
    f.session.draw(&mut f.backend, output);
    assert!(f.take().is_empty());

    f.frame_done(output);
    let requests = f.take();
    let frames = requests
        .iter()
        .filter(|r| **r == Request::RequestFrame(output))
        .count();
    assert_eq!(frames, 1);
    assert!(f.headless().has_pending_frame(output));
}

#[test]
fn opacity_applies_to_clear_color() {
    let config = Config {
        opacity: 0.5,
        ..Config::default()
    };
    let mut f = Fixture::with_config(config);
    let output = f.add_output();
    f.configure(output, 100, 40);
    f.take();
    f.refresh();

    assert!(f.take().contains(&Request::Clear {
        output,
        color: Color::new_unpremul(0.5, 0.5, 0.5, 0.5),
    }));
}

#[test]
fn animation_sets_margin_before_drawing() {
    let config = Config {
        animate: true,
        margin: Margin {
            left: 8,
            ..Margin::default()
        },
        ..Config::default()
    };
    let mut f = Fixture::with_config(config);
    let output = f.add_output();
    f.configure(output, 100, 40);
    f.take();
    f.refresh();

    let requests = f.take();
    assert_eq!(
        requests[1],
        Request::SetMargin {
            output,
            margin: Margin {
                top: -20,
                left: 8,
                ..Margin::default()
            },
        }
    );
    assert_eq!(requests[2], Request::MakeCurrent(output));
}

#[test]
fn scale_change_resizes_and_rebuilds_cursor() {
    let mut f = Fixture::new();
    let output = f.add_drawn_output();
    let seat = f.add_seat(Capabilities::POINTER);
    f.pointer_enter(seat, output, 5, 10., 10.);
    assert_eq!(
        f.take(),
        [Request::SetCursor {
            seat,
            serial: 5,
            scale: 1,
        }]
    );

    f.handle(Event::OutputScale { output, factor: 2 });
    assert_eq!(
        f.take(),
        [
            Request::ResizeDrawable {
                output,
                size: (2000, 80),
                scale: 2,
            },
            Request::SetCursor {
                seat,
                serial: 5,
                scale: 2,
            },
        ]
    );

    // Same scale again does nothing.
    f.handle(Event::OutputScale { output, factor: 2 });
    assert!(f.take().is_empty());

    // Nonsense factors are clamped.
    f.handle(Event::OutputScale { output, factor: 0 });
    assert_eq!(f.session.outputs.get(output).unwrap().scale, 1);
}

#[test]
fn scale_change_on_other_output_keeps_cursor() {
    let mut f = Fixture::new();
    let a = f.add_drawn_output();
    let b = f.add_drawn_output();
    let seat = f.add_seat(Capabilities::POINTER);
    f.pointer_enter(seat, a, 1, 0., 0.);
    f.take();

    f.handle(Event::OutputScale {
        output: b,
        factor: 3,
    });
    assert!(!f
        .take()
        .iter()
        .any(|r| matches!(r, Request::SetCursor { .. })));
}

#[test]
fn close_invalidates_and_stops() {
    let mut f = Fixture::new();
    let output = f.add_drawn_output();
    let other = f.add_drawn_output();
    let seat = f.add_seat(Capabilities::POINTER | Capabilities::TOUCH);
    f.pointer_enter(seat, output, 1, 10., 10.);
    f.touch_down(seat, output, 0, 10., 0);
    f.touch_down(seat, other, 1, 10., 0);
    f.take();

    f.handle(Event::LayerClosed { output });
    assert_eq!(
        f.take(),
        [
            Request::DestroyDrawable(output),
            Request::DestroySurface(output),
            Request::DestroyLayerSurface(output),
        ]
    );
    assert_eq!(f.pointer_focus(seat), PointerFocus::Idle);
    assert_eq!(f.touch_len(seat), 1);
    assert!(f.session.outputs.get(output).is_none());
    assert!(!f.session.is_running());

    // Stale events for the closed output are ignored.
    f.handle(Event::FrameDone { output });
    f.configure(output, 100, 100);
    f.button(seat, BTN_LEFT, ButtonState::Pressed);
    assert!(f.take().is_empty());
}

#[test]
fn close_before_configure() {
    let mut f = Fixture::new();
    let output = f.add_output();
    f.take();

    f.handle(Event::LayerClosed { output });
    assert_eq!(
        f.take(),
        [
            Request::DestroySurface(output),
            Request::DestroyLayerSurface(output),
        ]
    );
    assert!(!f.session.is_running());
}

#[test]
fn output_index_selection() {
    let config = Config {
        output: Some(1),
        ..Config::default()
    };
    let mut f = Fixture::with_config(config);

    f.handle(Event::OutputAnnounced { global_name: 10 });
    assert!(f.take().is_empty());
    assert!(f.session.outputs.is_empty());

    f.handle(Event::OutputAnnounced { global_name: 11 });
    assert!(matches!(
        f.take()[..],
        [Request::CreateOutputSurface {
            global_name: 11,
            ..
        }]
    ));

    f.handle(Event::OutputAnnounced { global_name: 12 });
    assert!(f.take().is_empty());
    assert_eq!(f.session.outputs.len(), 1);
}

// =============================================================================
// Seats
// =============================================================================

#[test]
fn capability_reconciliation() {
    let mut f = Fixture::new();
    f.handle(Event::SeatAnnounced { global_name: 7 });
    let seat = f.session.seats.find_by_global(7).unwrap();
    assert_eq!(
        f.take(),
        [Request::BindSeat {
            seat,
            global_name: 7,
        }]
    );

    let caps = |f: &mut Fixture, capabilities: Capabilities| {
        f.handle(Event::SeatCapabilities { seat, capabilities });
        f.take()
    };

    assert_eq!(
        caps(&mut f, Capabilities::POINTER | Capabilities::TOUCH),
        [
            Request::AcquirePointer(seat),
            Request::CreateCursorSurface(seat),
            Request::AcquireTouch(seat),
        ]
    );
    assert!(caps(&mut f, Capabilities::POINTER | Capabilities::TOUCH).is_empty());
    assert_eq!(
        caps(&mut f, Capabilities::TOUCH),
        [Request::ReleasePointer(seat)]
    );
    // The cursor surface is reused.
    assert_eq!(
        caps(&mut f, Capabilities::POINTER | Capabilities::KEYBOARD),
        [
            Request::AcquirePointer(seat),
            Request::ReleaseTouch(seat),
            Request::AcquireKeyboard(seat),
        ]
    );

    let state = f.session.seats.get(seat).unwrap();
    assert_eq!(state.held(), Capabilities::POINTER | Capabilities::KEYBOARD);

    f.handle(Event::GlobalRemoved { global_name: 7 });
    assert_eq!(
        f.take(),
        [
            Request::ReleasePointer(seat),
            Request::ReleaseKeyboard(seat),
            Request::ReleaseSeat(seat),
        ]
    );
    assert!(f.session.seats.ids().is_empty());

    // Unknown globals are ignored.
    f.handle(Event::GlobalRemoved { global_name: 7 });
    assert!(f.take().is_empty());
}

// =============================================================================
// Pointer
// =============================================================================

#[test]
fn click_toggles_extended_height() {
    let mut f = Fixture::new();
    let output = f.add_drawn_output();
    let seat = f.add_seat(Capabilities::POINTER);
    f.pointer_enter(seat, output, 1, 10., 10.);
    f.take();

    f.button(seat, BTN_LEFT, ButtonState::Pressed);
    assert_eq!(
        f.take(),
        [Request::SetLayerSize {
            output,
            width: 1000,
            height: 1080,
        }]
    );
    f.button(seat, BTN_LEFT, ButtonState::Released);
    assert!(f.take().is_empty());

    f.button(seat, BTN_LEFT, ButtonState::Pressed);
    assert_eq!(
        f.take(),
        [Request::SetLayerSize {
            output,
            width: 1000,
            height: 40,
        }]
    );

    f.button(seat, BTN_MIDDLE, ButtonState::Pressed);
    assert!(f.take().is_empty());
    assert!(f.session.is_running());
}

#[test]
fn right_click_stops() {
    let mut f = Fixture::new();
    let output = f.add_drawn_output();
    let seat = f.add_seat(Capabilities::POINTER);
    f.pointer_enter(seat, output, 1, 10., 10.);
    f.take();

    f.button(seat, BTN_RIGHT, ButtonState::Pressed);
    assert!(f.take().is_empty());
    assert!(!f.session.is_running());
}

#[test]
fn pointer_idle_and_unknown_surface() {
    let mut f = Fixture::new();
    let output = f.add_drawn_output();
    let seat = f.add_seat(Capabilities::POINTER);

    f.button(seat, BTN_RIGHT, ButtonState::Pressed);
    assert!(f.session.is_running());

    f.input(InputEvent::PointerEnter {
        event: PointerEnterEvent {
            seat,
            serial: 1,
            surface: SurfaceId(999),
            x: 0.,
            y: 0.,
        },
    });
    assert!(f.take().is_empty());
    assert_eq!(f.pointer_focus(seat), PointerFocus::Idle);

    f.pointer_enter(seat, output, 2, 1., 2.);
    f.input(InputEvent::PointerMotion {
        event: PointerMotionEvent {
            seat,
            time: 0,
            x: 3.,
            y: 4.,
        },
    });
    let pointer = f.session.seats.get(seat).unwrap().pointer.clone().unwrap();
    assert_eq!(pointer.position, Some((3., 4.)));

    f.input(InputEvent::PointerLeave { seat });
    assert_eq!(f.pointer_focus(seat), PointerFocus::Idle);
}

#[test]
fn pointer_events_without_pointer_are_dropped() {
    let mut f = Fixture::new();
    let output = f.add_drawn_output();
    let seat = f.add_seat(Capabilities::TOUCH);

    f.pointer_enter(seat, output, 1, 10., 10.);
    f.button(seat, BTN_RIGHT, ButtonState::Pressed);
    assert!(f.take().is_empty());
    assert!(f.session.is_running());
}

// =============================================================================
// Touch
// =============================================================================

#[test]
fn gesture_step_at_twenty_percent() {
    let mut f = Fixture::new();
    let output = f.add_drawn_output();
    let seat = f.add_seat(Capabilities::TOUCH);

    f.touch_down(seat, output, 4, 0., 0);
    let step = |f: &Fixture| {
        let seat = f.session.seats.get(seat).unwrap();
        seat.touch.as_ref().unwrap().get(4).unwrap().step
    };

    f.touch_motion(seat, 4, 199.);
    assert_eq!(step(&f), 0);
    f.touch_motion(seat, 4, 200.);
    assert_eq!(step(&f), 1);
    assert!(f.take().is_empty());
}

#[test]
fn tap_resolves_within_timeout() {
    let mut f = Fixture::new();
    let output = f.add_drawn_output();
    let seat = f.add_seat(Capabilities::TOUCH);

    f.touch_down(seat, output, 0, 10., 1000);
    f.touch_up(seat, 0, 1499);
    assert_eq!(
        f.take(),
        [Request::SetLayerSize {
            output,
            width: 1000,
            height: 1080,
        }]
    );

    f.touch_down(seat, output, 0, 10., 2000);
    f.touch_up(seat, 0, 2500);
    assert!(f.take().is_empty());
    assert_eq!(f.touch_len(seat), 0);
}

#[test]
fn seventeenth_touch_is_dropped() {
    let mut f = Fixture::new();
    let output = f.add_drawn_output();
    let seat = f.add_seat(Capabilities::TOUCH);

    for id in 0..MAX_TOUCH_POINTS as i32 {
        f.touch_down(seat, output, id, f64::from(id), 0);
    }
    f.touch_down(seat, output, 100, 0., 0);
    assert_eq!(f.touch_len(seat), MAX_TOUCH_POINTS);

    let touch = f.session.seats.get(seat).unwrap().touch.as_ref().unwrap();
    assert!(touch.get(100).is_none());
    assert_eq!(touch.get(15).unwrap().start.0, 15.);

    // Up for the dropped contact is an unknown id.
    f.touch_up(seat, 100, 1);
    assert_eq!(f.touch_len(seat), MAX_TOUCH_POINTS);

    f.input(InputEvent::TouchCancel { seat });
    assert_eq!(f.touch_len(seat), 0);
    assert!(f.take().is_empty());
}

#[test]
fn touch_on_unknown_surface_is_dropped() {
    let mut f = Fixture::new();
    f.add_drawn_output();
    let seat = f.add_seat(Capabilities::TOUCH);

    f.input(InputEvent::TouchDown {
        event: TouchDownEvent {
            seat,
            time: 0,
            surface: SurfaceId(999),
            id: 0,
            x: 0.,
            y: 0.,
        },
    });
    assert_eq!(f.touch_len(seat), 0);
}

// =============================================================================
// Random operations
// =============================================================================

#[derive(Debug, Clone, Copy, Arbitrary)]
enum Op {
    AddOutput,
    AddSeat,
    RemoveSeat(#[proptest(strategy = "0..4usize")] usize),
    Configure {
        #[proptest(strategy = "0..4usize")]
        output: usize,
        #[proptest(strategy = "0..3000u32")]
        width: u32,
        #[proptest(strategy = "0..1200u32")]
        height: u32,
    },
    Scale {
        #[proptest(strategy = "0..4usize")]
        output: usize,
        #[proptest(strategy = "-1..4i32")]
        factor: i32,
    },
    FrameDone(#[proptest(strategy = "0..4usize")] usize),
    Close(#[proptest(strategy = "0..4usize")] usize),
    Refresh,
    Capabilities {
        #[proptest(strategy = "0..4usize")]
        seat: usize,
        #[proptest(strategy = "0..8u32")]
        bits: u32,
    },
    PointerEnter {
        #[proptest(strategy = "0..4usize")]
        seat: usize,
        #[proptest(strategy = "0..5usize")]
        output: usize,
        #[proptest(strategy = "-10f64..2000f64")]
        x: f64,
        #[proptest(strategy = "-10f64..100f64")]
        y: f64,
    },
    PointerLeave(#[proptest(strategy = "0..4usize")] usize),
    PointerMotion {
        #[proptest(strategy = "0..4usize")]
        seat: usize,
        #[proptest(strategy = "-10f64..2000f64")]
        x: f64,
        #[proptest(strategy = "-10f64..100f64")]
        y: f64,
    },
    PointerButton {
        #[proptest(strategy = "0..4usize")]
        seat: usize,
        #[proptest(strategy = "prop_oneof![Just(BTN_LEFT), Just(BTN_MIDDLE), Just(BTN_RIGHT)]")]
        button: u32,
        pressed: bool,
    },
    TouchDown {
        #[proptest(strategy = "0..4usize")]
        seat: usize,
        #[proptest(strategy = "0..5usize")]
        output: usize,
        #[proptest(strategy = "0..20i32")]
        id: i32,
        #[proptest(strategy = "-10f64..2000f64")]
        x: f64,
        #[proptest(strategy = "0..2000u32")]
        time: u32,
    },
    TouchMotion {
        #[proptest(strategy = "0..4usize")]
        seat: usize,
        #[proptest(strategy = "0..20i32")]
        id: i32,
        #[proptest(strategy = "-2000f64..4000f64")]
        x: f64,
    },
    TouchUp {
        #[proptest(strategy = "0..4usize")]
        seat: usize,
        #[proptest(strategy = "0..20i32")]
        id: i32,
        #[proptest(strategy = "0..3000u32")]
        time: u32,
    },
    TouchCancel(#[proptest(strategy = "0..4usize")] usize),
}

impl Fixture {
    fn output_at(&self, idx: usize) -> OutputId {
        let ids = self.session.outputs.ids();
        ids.get(idx).copied().unwrap_or(OutputId(u64::MAX))
    }

    fn surface_at(&self, idx: usize) -> SurfaceId {
        let output = self.output_at(idx);
        self.session
            .outputs
            .get(output)
            .map_or(SurfaceId(u32::MAX), |output| output.surface)
    }

    fn seat_at(&self, idx: usize) -> SeatId {
        let ids = self.session.seats.ids();
        ids.get(idx).copied().unwrap_or(SeatId(u64::MAX))
    }

    fn apply(&mut self, op: Op) {
        match op {
            Op::AddOutput => {
                let global_name = self.global();
                self.handle(Event::OutputAnnounced { global_name });
            }
            Op::AddSeat => {
                let global_name = self.global();
                self.handle(Event::SeatAnnounced { global_name });
            }
            Op::RemoveSeat(idx) => {
                let seat = self.seat_at(idx);
                let global_name = self
                    .session
                    .seats
                    .get(seat)
                    .map_or(u32::MAX, |seat| seat.global_name);
                self.handle(Event::GlobalRemoved { global_name });
            }
            Op::Configure {
                output,
                width,
                height,
            } => {
                let output = self.output_at(output);
                self.take();
                let serial = self.configure(output, width, height);

                if self.session.outputs.get(output).is_some() {
                    let acks: Vec<_> = self
                        .take()
                        .into_iter()
                        .filter(|r| r.output() == Some(output))
                        .collect();
                    assert_eq!(
                        acks.last(),
                        Some(&Request::AckConfigure { output, serial })
                    );
                    let count = acks
                        .iter()
                        .filter(|r| matches!(r, Request::AckConfigure { .. }))
                        .count();
                    assert_eq!(count, 1);
                }
            }
            Op::Scale { output, factor } => {
                let output = self.output_at(output);
                self.handle(Event::OutputScale { output, factor });
            }
            Op::FrameDone(idx) => {
                let output = self.output_at(idx);
                if self.headless().complete_frame(output) {
                    self.handle(Event::FrameDone { output });
                }
            }
            Op::Close(idx) => {
                let output = self.output_at(idx);
                self.handle(Event::LayerClosed { output });
            }
            Op::Refresh => self.refresh(),
            Op::Capabilities { seat, bits } => {
                let seat = self.seat_at(seat);
                let before = self.session.seats.get(seat).map(SeatState::held);
                self.take();

                let capabilities = Capabilities::from_bits_truncate(bits);
                self.handle(Event::SeatCapabilities { seat, capabilities });

                if let Some(before) = before {
                    let changes = (before ^ capabilities).bits().count_ones() as usize;
                    let device_requests = self
                        .take()
                        .into_iter()
                        .filter(|r| !matches!(r, Request::CreateCursorSurface(_)))
                        .count();
                    assert_eq!(device_requests, changes);
                }
            }
            Op::PointerEnter { seat, output, x, y } => {
                let seat = self.seat_at(seat);
                let surface = self.surface_at(output);
                let serial = self.next_serial;
                self.next_serial += 1;
                self.input(InputEvent::PointerEnter {
                    event: PointerEnterEvent {
                        seat,
                        serial,
                        surface,
                        x,
                        y,
                    },
                });
            }
            Op::PointerLeave(seat) => {
                let seat = self.seat_at(seat);
                self.input(InputEvent::PointerLeave { seat });
            }
            Op::PointerMotion { seat, x, y } => {
                let seat = self.seat_at(seat);
                self.input(InputEvent::PointerMotion {
                    event: PointerMotionEvent { seat, time: 0, x, y },
                });
            }
            Op::PointerButton {
                seat,
                button,
                pressed,
            } => {
                let seat = self.seat_at(seat);
                let state = if pressed {
                    ButtonState::Pressed
                } else {
                    ButtonState::Released
                };
                self.button(seat, button, state);
            }
            Op::TouchDown {
                seat,
                output,
                id,
                x,
                time,
            } => {
                let seat = self.seat_at(seat);
                let surface = self.surface_at(output);
                self.input(InputEvent::TouchDown {
                    event: TouchDownEvent {
                        seat,
                        time,
                        surface,
                        id,
                        x,
                        y: 10.,
                    },
                });
            }
            Op::TouchMotion { seat, id, x } => {
                let seat = self.seat_at(seat);
                self.touch_motion(seat, id, x);
            }
            Op::TouchUp { seat, id, time } => {
                let seat = self.seat_at(seat);
                self.touch_up(seat, id, time);
            }
            Op::TouchCancel(seat) => {
                let seat = self.seat_at(seat);
                self.input(InputEvent::TouchCancel { seat });
            }
        }
    }

    fn verify_invariants(&mut self) {
        let headless = self.backend.headless();

        for output in self.session.outputs.iter() {
            assert_eq!(
                output.frame_state == FrameState::WaitingForFrameCallback,
                headless.has_pending_frame(output.id),
                "{} frame state is out of sync",
                output.id
            );
            assert_eq!(output.has_drawable, headless.has_drawable(output.id));
            if output.has_drawable {
                assert!(output.configured);
                assert!(output.width > 0 && output.height > 0);
            }
            assert!(output.scale >= 1);
        }

        for seat in self.session.seats.iter() {
            assert_eq!(seat.held(), seat.capabilities);
            if seat.pointer.is_some() {
                assert!(seat.cursor_surface);
            }

            if let Some(pointer) = &seat.pointer {
                if let Some(output) = pointer.output {
                    assert!(self.session.outputs.get(output).is_some());
                    assert!(pointer.position.is_some());
                }
            }

            if let Some(touch) = &seat.touch {
                assert!(touch.len() <= MAX_TOUCH_POINTS);
                let mut ids: Vec<_> = touch.points().map(|point| point.id).collect();
                ids.sort_unstable();
                ids.dedup();
                assert_eq!(ids.len(), touch.len());
                for point in touch.points() {
                    assert!(self.session.outputs.get(point.output).is_some());
                }
            }
        }
    }
}

fn check_ops(ops: impl IntoIterator<Item = Op>) -> Fixture {
    let mut f = Fixture::new();
    for op in ops {
        f.apply(op);
        f.verify_invariants();
    }
    f
}

#[test]
fn operations_dont_panic() {
    let ops = [
        Op::AddOutput,
        Op::AddSeat,
        Op::Capabilities { seat: 0, bits: 7 },
        Op::Configure {
            output: 0,
            width: 1000,
            height: 40,
        },
        Op::Refresh,
        Op::PointerEnter {
            seat: 0,
            output: 0,
            x: 5.,
            y: 5.,
        },
        Op::TouchDown {
            seat: 0,
            output: 0,
            id: 1,
            x: 0.,
            time: 0,
        },
        Op::Scale {
            output: 0,
            factor: 2,
        },
        Op::FrameDone(0),
        Op::Close(0),
        Op::FrameDone(0),
        Op::Refresh,
    ];
    let f = check_ops(ops);
    assert!(!f.session.is_running());
}

proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 10_000,
        ..ProptestConfig::default()
    })]

    #[test]
    fn random_operations_keep_invariants(ops: Vec<Op>) {
        check_ops(ops);
    }
}
