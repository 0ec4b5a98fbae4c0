//! Session engine for the Pomodoro loop.
//!
//! This module contains the timing core:
//! - `session`: The work/break state machine
//! - `event`: Events emitted on every transition

pub mod event;
pub mod session;

pub use event::SessionEvent;
pub use session::{SessionEngine, BREAK_END_PREPLAY_WINDOW, BREAK_START_PREPLAY_WINDOW};
