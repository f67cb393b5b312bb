//! Run coordination.
//!
//! `machine` holds the pure lifecycle transitions, `controller` applies their
//! effects against the presentation tree and background tasks, and `renderer`
//! performs the final authoritative write of a completed run.

mod controller;
mod machine;
mod renderer;

pub(crate) use controller::{run_controller, Coordinator, UiCommand, ViewSnapshot};
pub use machine::RunState;
