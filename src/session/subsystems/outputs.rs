//! Output registry.
//!
//! Owns the per-output state: the surface the bar lives on, its configured size and scale,
//! whether it has a drawable, and where its render loop is at.
//!
//! # Example
//!
//! ```ignore
//! // Resolve the surface of an input event.
//! if let Some(output) = session.outputs.find_by_surface(surface) {
//!     let target = session.outputs.hotspot_target(output);
//! }
//! ```

use std::time::Instant;

use crate::input::actions::HotspotTarget;
use crate::session::{FrameState, OutputId, SurfaceId, VisualMode};

/// Margin animation bookkeeping.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Animation {
    pub frame: f64,
    pub margin_top: i32,
    pub last_frame: Option<Instant>,
}

#[derive(Debug)]
pub struct OutputState {
    pub id: OutputId,
    /// Registry name of the `wl_output` global.
    pub global_name: u32,
    pub surface: SurfaceId,
    /// Logical size from the last configure, 0 until then.
    pub width: u32,
    pub height: u32,
    pub scale: i32,
    /// Whether a configure has been acknowledged.
    pub configured: bool,
    pub has_drawable: bool,
    pub visual_mode: VisualMode,
    /// Whether the bar was toggled to its extended height.
    pub extended: bool,
    pub frame_state: FrameState,
    pub animation: Animation,
}

impl OutputState {
    pub fn new(id: OutputId, global_name: u32, surface: SurfaceId) -> Self {
        Self {
            id,
            global_name,
            surface,
            width: 0,
            height: 0,
            scale: 1,
            configured: false,
            has_drawable: false,
            visual_mode: VisualMode::Regular,
            extended: false,
            frame_state: FrameState::Idle,
            animation: Animation::default(),
        }
    }

    /// Size of the drawable in buffer pixels.
    pub fn buffer_size(&self) -> (u32, u32) {
        let scale = self.scale.max(1).unsigned_abs();
        (
            self.width.saturating_mul(scale),
            self.height.saturating_mul(scale),
        )
    }

    /// Whether the refresh step should create a drawable for this output.
    pub fn needs_drawable(&self) -> bool {
        self.configured && !self.has_drawable && self.width > 0 && self.height > 0
    }
}

/// Output registry.
pub struct OutputSubsystem {
    outputs: Vec<OutputState>,
    next_id: u64,
}

impl OutputSubsystem {
    pub fn new() -> Self {
        Self {
            outputs: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocates an identifier for an output about to be added.
    pub fn next_id(&mut self) -> OutputId {
        let id = OutputId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn insert(&mut self, state: OutputState) {
        debug_assert!(self.get(state.id).is_none());
        self.outputs.push(state);
    }

    pub fn remove(&mut self, id: OutputId) -> Option<OutputState> {
        let idx = self.outputs.iter().position(|output| output.id == id)?;
        Some(self.outputs.remove(idx))
    }

    pub fn get(&self, id: OutputId) -> Option<&OutputState> {
        self.outputs.iter().find(|output| output.id == id)
    }

    pub fn get_mut(&mut self, id: OutputId) -> Option<&mut OutputState> {
        self.outputs.iter_mut().find(|output| output.id == id)
    }

    pub fn find_by_surface(&self, surface: SurfaceId) -> Option<OutputId> {
        self.outputs
            .iter()
            .find(|output| output.surface == surface)
            .map(|output| output.id)
    }

    pub fn find_by_global(&self, global_name: u32) -> Option<OutputId> {
        self.outputs
            .iter()
            .find(|output| output.global_name == global_name)
            .map(|output| output.id)
    }

    pub fn hotspot_target(&self, id: OutputId) -> Option<HotspotTarget> {
        let output = self.get(id)?;
        Some(HotspotTarget {
            output: id,
            width: output.width,
            height: output.height,
            scale: output.scale,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutputState> + '_ {
        self.outputs.iter()
    }

    pub fn ids(&self) -> Vec<OutputId> {
        self.outputs.iter().map(|output| output.id).collect()
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}
