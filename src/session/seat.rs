//! Seat lifecycle and capability reconciliation.

use super::{Capabilities, SeatId, Session};
use crate::backend::Backend;
use crate::input::{PointerTracker, TouchTracker};

impl Session {
    pub fn add_seat(&mut self, backend: &mut Backend, global_name: u32) -> SeatId {
        let id = self.seats.add(global_name);
        backend.bind_seat(id, global_name);
        debug!("added {id} for global {global_name}");
        id
    }

    /// Drops the seat bound to `global_name`, releasing its devices.
    ///
    /// Returns `false` if no seat has that global.
    pub fn remove_seat(&mut self, backend: &mut Backend, global_name: u32) -> bool {
        let Some(id) = self.seats.find_by_global(global_name) else {
            return false;
        };

        self.update_capabilities(backend, id, Capabilities::empty());
        backend.release_seat(id);
        self.seats.remove(id);
        debug!("removed {id}");
        true
    }

    /// Acquires or releases devices so that the seat holds exactly `capabilities`.
    pub fn update_capabilities(
        &mut self,
        backend: &mut Backend,
        id: SeatId,
        capabilities: Capabilities,
    ) {
        let Some(seat) = self.seats.get_mut(id) else {
            debug!("capabilities for unknown {id}");
            return;
        };

        seat.capabilities = capabilities;

        let has_pointer = capabilities.contains(Capabilities::POINTER);
        if has_pointer && seat.pointer.is_none() {
            backend.acquire_pointer(id);
            seat.pointer = Some(PointerTracker::new());

            if !seat.cursor_surface {
                backend.create_cursor_surface(id);
                seat.cursor_surface = true;
            }
        } else if !has_pointer && seat.pointer.is_some() {
            backend.release_pointer(id);
            seat.pointer = None;
        }

        let has_touch = capabilities.contains(Capabilities::TOUCH);
        if has_touch && seat.touch.is_none() {
            backend.acquire_touch(id);
            seat.touch = Some(TouchTracker::new());
        } else if !has_touch && seat.touch.is_some() {
            backend.release_touch(id);
            seat.touch = None;
        }

        let has_keyboard = capabilities.contains(Capabilities::KEYBOARD);
        if has_keyboard && !seat.keyboard {
            backend.acquire_keyboard(id);
            seat.keyboard = true;
        } else if !has_keyboard && seat.keyboard {
            backend.release_keyboard(id);
            seat.keyboard = false;
        }

        trace!("{id}: capabilities {capabilities:?}");
    }
}
