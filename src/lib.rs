#[macro_use]
extern crate tracing;

pub mod backend;
pub mod cli;
pub mod cursor;
pub mod input;
pub mod session;
pub mod utils;
