//! Seat registry.
//!
//! Each seat holds the devices its last capability announcement asked for. The trackers
//! refer to outputs by id only; [`SeatSubsystem::forget_output`] drops those references.

use crate::input::{PointerTracker, TouchTracker};
use crate::session::{Capabilities, OutputId, SeatId};

#[derive(Debug)]
pub struct SeatState {
    pub id: SeatId,
    /// Registry name of the `wl_seat` global.
    pub global_name: u32,
    pub capabilities: Capabilities,
    pub pointer: Option<PointerTracker>,
    pub touch: Option<TouchTracker>,
    pub keyboard: bool,
    /// Created with the first pointer and kept across capability changes.
    pub cursor_surface: bool,
}

impl SeatState {
    pub fn new(id: SeatId, global_name: u32) -> Self {
        Self {
            id,
            global_name,
            capabilities: Capabilities::empty(),
            pointer: None,
            touch: None,
            keyboard: false,
            cursor_surface: false,
        }
    }

    /// Capabilities the seat currently holds devices for.
    pub fn held(&self) -> Capabilities {
        let mut caps = Capabilities::empty();
        caps.set(Capabilities::POINTER, self.pointer.is_some());
        caps.set(Capabilities::KEYBOARD, self.keyboard);
        caps.set(Capabilities::TOUCH, self.touch.is_some());
        caps
    }
}

pub struct SeatSubsystem {
    seats: Vec<SeatState>,
    next_id: u64,
}

impl SeatSubsystem {
    pub fn new() -> Self {
        Self {
            seats: Vec::new(),
            next_id: 1,
        }
    }

    pub fn add(&mut self, global_name: u32) -> SeatId {
        let id = SeatId(self.next_id);
        self.next_id += 1;
        self.seats.push(SeatState::new(id, global_name));
        id
    }

    pub fn remove(&mut self, id: SeatId) -> Option<SeatState> {
        let idx = self.seats.iter().position(|seat| seat.id == id)?;
        Some(self.seats.remove(idx))
    }

    pub fn get(&self, id: SeatId) -> Option<&SeatState> {
        self.seats.iter().find(|seat| seat.id == id)
    }

    pub fn get_mut(&mut self, id: SeatId) -> Option<&mut SeatState> {
        self.seats.iter_mut().find(|seat| seat.id == id)
    }

    pub fn find_by_global(&self, global_name: u32) -> Option<SeatId> {
        self.seats
            .iter()
            .find(|seat| seat.global_name == global_name)
            .map(|seat| seat.id)
    }

    pub fn pointer_mut(&mut self, id: SeatId) -> Option<&mut PointerTracker> {
        self.get_mut(id)?.pointer.as_mut()
    }

    pub fn touch_mut(&mut self, id: SeatId) -> Option<&mut TouchTracker> {
        self.get_mut(id)?.touch.as_mut()
    }

    /// Seats whose pointer hovers `output`, with the serial of their enter.
    pub fn hovering(&self, output: OutputId) -> Vec<(SeatId, u32)> {
        self.seats
            .iter()
            .filter_map(|seat| {
                let pointer = seat.pointer.as_ref()?;
                if pointer.output != Some(output) {
                    return None;
                }
                Some((seat.id, pointer.serial?))
            })
            .collect()
    }

    /// Drops every tracker reference to `output`.
    pub fn forget_output(&mut self, output: OutputId) {
        for seat in &mut self.seats {
            if let Some(pointer) = &mut seat.pointer {
                if pointer.forget_output(output) {
                    debug!("{}: pointer left closed {output}", seat.id);
                }
            }
            if let Some(touch) = &mut seat.touch {
                let count = touch.forget_output(output);
                if count > 0 {
                    debug!("{}: dropped {count} touch points on closed {output}", seat.id);
                }
            }
        }
    }

    pub fn ids(&self) -> Vec<SeatId> {
        self.seats.iter().map(|seat| seat.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeatState> + '_ {
        self.seats.iter()
    }
}
