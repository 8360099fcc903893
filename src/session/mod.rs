//! Session state: every output and seat the bar knows about, and the routing of compositor
//! events to them.

use layerbar_config::{Color, Config};

use crate::backend::Backend;
use crate::input::actions::Action;
use crate::input::InputEvent;

mod frame_callbacks;
mod output;
mod seat;
pub mod subsystems;
mod types;

#[cfg(test)]
mod tests;

pub use subsystems::{OutputState, OutputSubsystem, SeatState, SeatSubsystem};
pub use types::*;

/// An inbound event, already translated from the protocol into ids.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    OutputAnnounced {
        global_name: u32,
    },
    SeatAnnounced {
        global_name: u32,
    },
    GlobalRemoved {
        global_name: u32,
    },
    OutputScale {
        output: OutputId,
        factor: i32,
    },
    LayerConfigure {
        output: OutputId,
        serial: u32,
        width: u32,
        height: u32,
    },
    LayerClosed {
        output: OutputId,
    },
    FrameDone {
        output: OutputId,
    },
    SeatCapabilities {
        seat: SeatId,
        capabilities: Capabilities,
    },
    Input(InputEvent),
}

pub struct State {
    pub backend: Backend,
    pub session: Session,
}

pub struct Session {
    pub config: Config,
    pub outputs: OutputSubsystem,
    pub seats: SeatSubsystem,
    /// Output globals seen so far, for `output` index selection.
    announced_outputs: usize,
    running: bool,
}

impl State {
    pub fn new(backend: Backend, config: Config) -> Self {
        Self {
            backend,
            session: Session::new(config),
        }
    }

    pub fn handle(&mut self, event: Event) {
        self.session.handle_event(&mut self.backend, event);
    }

    pub fn refresh_and_flush(&mut self) -> anyhow::Result<()> {
        let _span = tracy_client::span!("State::refresh_and_flush");

        self.session.refresh(&mut self.backend)?;
        self.backend.flush()
    }
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            outputs: OutputSubsystem::new(),
            seats: SeatSubsystem::new(),
            announced_outputs: 0,
            running: true,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        if self.running {
            debug!("stopping the session");
        }
        self.running = false;
    }

    pub fn handle_event(&mut self, backend: &mut Backend, event: Event) {
        let _span = tracy_client::span!("Session::handle_event");

        match event {
            Event::OutputAnnounced { global_name } => {
                self.add_output(backend, global_name);
            }
            Event::SeatAnnounced { global_name } => {
                self.add_seat(backend, global_name);
            }
            Event::GlobalRemoved { global_name } => self.remove_global(backend, global_name),
            Event::OutputScale { output, factor } => self.set_output_scale(backend, output, factor),
            Event::LayerConfigure {
                output,
                serial,
                width,
                height,
            } => self.configure_output(backend, output, serial, width, height),
            Event::LayerClosed { output } => self.close_output(backend, output),
            Event::FrameDone { output } => self.on_frame_done(backend, output),
            Event::SeatCapabilities { seat, capabilities } => {
                self.update_capabilities(backend, seat, capabilities)
            }
            Event::Input(event) => self.process_input_event(backend, event),
        }
    }

    /// Runs once per event loop iteration, after dispatching.
    pub fn refresh(&mut self, backend: &mut Backend) -> anyhow::Result<()> {
        self.create_pending_drawables(backend)
    }

    pub fn apply_action(&mut self, backend: &mut Backend, action: Action) {
        match action {
            Action::ToggleExtended(output) => self.toggle_extended(backend, output),
            Action::GestureStep { output, step } => {
                info!("gesture step {step} on {output}");
            }
            Action::Quit => self.stop(),
        }
    }

    /// Color the output is cleared to, with the configured opacity applied.
    pub fn clear_color(&self, mode: VisualMode) -> Color {
        let color = match mode {
            VisualMode::Regular => self.config.regular_color,
            VisualMode::Extended => self.config.extended_color,
        };
        color.with_opacity(self.config.opacity as f32)
    }

    fn remove_global(&mut self, backend: &mut Backend, global_name: u32) {
        if self.remove_seat(backend, global_name) {
            return;
        }

        if let Some(output) = self.outputs.find_by_global(global_name) {
            // The compositor follows up with a closed event for the layer surface.
            debug!("global of {output} removed");
        }
    }
}
