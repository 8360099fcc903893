//! Session subsystems.
//!
//! Each subsystem owns a domain of state and exposes a small API over it.

mod outputs;
mod seats;

pub use outputs::{Animation, OutputState, OutputSubsystem};
pub use seats::{SeatState, SeatSubsystem};
