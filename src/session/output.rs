//! Output lifecycle: announcement, configure, scale changes and closing.

use super::{OutputId, OutputState, Session, VisualMode};
use crate::backend::Backend;

impl Session {
    /// Starts tracking an announced output and creates its layer surface.
    ///
    /// Returns `None` when the output is skipped because another index was selected.
    pub fn add_output(&mut self, backend: &mut Backend, global_name: u32) -> Option<OutputId> {
        let index = self.announced_outputs;
        self.announced_outputs += 1;

        if let Some(selected) = self.config.output {
            if index != selected {
                debug!("skipping output {index}, only output {selected} was selected");
                return None;
            }
        }

        let id = self.outputs.next_id();
        let surface = backend.create_output_surface(id, global_name);
        self.outputs.insert(OutputState::new(id, global_name, surface));
        debug!("added {id} for global {global_name}");

        Some(id)
    }

    pub fn configure_output(
        &mut self,
        backend: &mut Backend,
        id: OutputId,
        serial: u32,
        width: u32,
        height: u32,
    ) {
        let regular_height = self.config.height.regular;
        let Some(output) = self.outputs.get_mut(id) else {
            debug!("configure for unknown {id}");
            return;
        };

        trace!("{id}: configure {serial} to {width}×{height}");
        output.width = width;
        output.height = height;
        output.visual_mode = VisualMode::for_height(height, regular_height);

        if output.has_drawable && (width == 0 || height == 0) {
            debug!("{id}: configured to an empty size, dropping the drawable");
            backend.destroy_drawable(id);
            output.has_drawable = false;
        } else if output.has_drawable {
            if let Err(err) = backend.resize_drawable(id, output.buffer_size(), output.scale) {
                warn!("{id}: error resizing drawable: {err:?}");
                backend.destroy_drawable(id);
                output.has_drawable = false;
            }
        }

        backend.ack_configure(id, serial);
        output.configured = true;
    }

    pub fn set_output_scale(&mut self, backend: &mut Backend, id: OutputId, factor: i32) {
        let Some(output) = self.outputs.get_mut(id) else {
            return;
        };

        let scale = factor.max(1);
        if output.scale == scale {
            return;
        }

        debug!("{id}: scale changed to {scale}");
        output.scale = scale;

        if output.has_drawable {
            if let Err(err) = backend.resize_drawable(id, output.buffer_size(), scale) {
                warn!("{id}: error resizing drawable: {err:?}");
                backend.destroy_drawable(id);
                output.has_drawable = false;
            }
        }

        for (seat, serial) in self.seats.hovering(id) {
            backend.set_cursor(seat, serial, scale);
        }
    }

    /// Tears down a closed output and stops the session.
    pub fn close_output(&mut self, backend: &mut Backend, id: OutputId) {
        let Some(output) = self.outputs.get(id) else {
            debug!("close for unknown {id}");
            return;
        };
        let has_drawable = output.has_drawable;

        info!("{id} closed");
        self.seats.forget_output(id);

        if has_drawable {
            backend.destroy_drawable(id);
        }
        backend.destroy_surface(id);
        backend.destroy_layer_surface(id);

        self.outputs.remove(id);
        self.stop();
    }

    pub fn toggle_extended(&mut self, backend: &mut Backend, id: OutputId) {
        let height = self.config.height;
        let Some(output) = self.outputs.get_mut(id) else {
            return;
        };

        output.extended = !output.extended;
        let new_height = if output.extended {
            height.extended
        } else {
            height.regular
        };

        debug!("{id}: resizing to {new_height}");
        backend.set_layer_size(id, output.width, new_height);
    }
}
