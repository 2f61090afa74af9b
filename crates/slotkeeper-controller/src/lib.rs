//! Keypad entry logic and event loop for the slot controller.
//!
//! This crate contains the state machine that turns key presses into locker
//! operations, the screens it shows on a 2×16 character display, and the
//! async [`Controller`] that drives both from a keypad.
//!
//! # Architecture
//!
//! - [`EntryStateMachine`]: pure transition logic over a [`Locker`]
//! - [`Screen`] and [`DisplayCommand`]: presentation, kept out of the
//!   transition logic
//! - [`Controller`]: awaits keys, applies steps, holds messages
//! - [`VirtualDisplay`]: in-memory character display
//! - [`ControllerConfig`]: master code, hold durations, PIN seed
//!
//! [`Locker`]: slotkeeper_storage::Locker

pub mod config;
pub mod controller;
pub mod display;
pub mod messages;
pub mod screen;
pub mod state_machine;

pub use config::{ConfigError, ControllerConfig};
pub use controller::Controller;
pub use display::{VirtualDisplay, VirtualDisplayBuilder, truncate_text};
pub use messages::DisplayMessages;
pub use screen::{DisplayCommand, Screen};
pub use state_machine::{
    EntryBuffer, EntryStateMachine, Hold, MAX_HISTORY_SIZE, Mode, ModeTransition, Step,
};
