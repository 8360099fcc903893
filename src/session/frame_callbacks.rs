//! Render loop paced by frame callbacks.
//!
//! Every output redraws only when the compositor tells it to: a draw requests exactly one
//! frame callback, and its `done` triggers the next draw.

use std::time::Instant;

use layerbar_config::Margin;

use super::subsystems::Animation;
use super::{FrameState, OutputId, Session};
use crate::backend::Backend;

// =============================================================================
// Margin animation
// =============================================================================

/// Milliseconds per animation frame.
const ANIMATION_FRAME_MS: f64 = 50.;
/// Number of animation frames in one slide.
const ANIMATION_FRAMES: i64 = 20;

impl Animation {
    /// Advances the slide-in animation to `now`. Returns the new top margin if it changed.
    pub fn advance(&mut self, now: Instant) -> Option<i32> {
        if let Some(last_frame) = self.last_frame {
            let elapsed = now.saturating_duration_since(last_frame);
            self.frame += elapsed.as_millis() as f64 / ANIMATION_FRAME_MS;
        }
        self.last_frame = Some(now);

        let margin_top = -(ANIMATION_FRAMES - self.frame as i64 % ANIMATION_FRAMES) as i32;
        if margin_top == self.margin_top {
            return None;
        }

        self.margin_top = margin_top;
        Some(margin_top)
    }
}

// =============================================================================
// Frame Callback Methods
// =============================================================================

impl Session {
    /// Creates drawables for outputs that got their first configure, and starts their
    /// render loops.
    pub(super) fn create_pending_drawables(&mut self, backend: &mut Backend) -> anyhow::Result<()> {
        let pending: Vec<OutputId> = self
            .outputs
            .iter()
            .filter(|output| output.needs_drawable())
            .map(|output| output.id)
            .collect();

        for id in pending {
            let Some(output) = self.outputs.get_mut(id) else {
                continue;
            };

            backend.create_drawable(id, output.buffer_size(), output.scale)?;
            output.has_drawable = true;
            debug!("{id}: created drawable");

            self.draw(backend, id);
        }

        Ok(())
    }

    /// Draws one frame of the output.
    ///
    /// Does nothing while a frame callback is outstanding or without a drawable.
    pub fn draw(&mut self, backend: &mut Backend, id: OutputId) {
        let _span = tracy_client::span!("Session::draw");

        let animate = self.config.animate;
        let margin = self.config.margin;
        let Some(output) = self.outputs.get(id) else {
            return;
        };
        if output.frame_state == FrameState::WaitingForFrameCallback || !output.has_drawable {
            return;
        }
        let color = self.clear_color(output.visual_mode);

        let Some(output) = self.outputs.get_mut(id) else {
            return;
        };

        if animate {
            if let Some(top) = output.animation.advance(Instant::now()) {
                backend.set_margin(id, Margin { top, ..margin });
            }
        }

        backend.make_current(id);
        backend.clear(id, color);
        backend.request_frame(id);
        backend.swap_buffers(id);

        output.frame_state = FrameState::WaitingForFrameCallback;
    }

    pub fn on_frame_done(&mut self, backend: &mut Backend, id: OutputId) {
        let Some(output) = self.outputs.get_mut(id) else {
            trace!("frame done for unknown {id}");
            return;
        };

        output.frame_state = FrameState::Idle;
        self.draw(backend, id);
    }
}
