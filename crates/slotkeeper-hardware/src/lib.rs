//! Peripheral abstraction layer for the slot controller.
//!
//! This crate provides trait-based abstractions for the three peripherals
//! the controller talks to, plus the implementations used in development,
//! testing and the command-line front end.
//!
//! # Device Traits
//!
//! - [`KeypadDevice`]: a 4×4 keypad delivering [`Key`] presses
//!   (`0-9`, `A-D`, `*`, `#`). Reads are async; a non-blocking poll is used
//!   to discard keys pressed while a message is on screen.
//! - [`DisplayDevice`]: a character display addressed by row and column.
//! - [`ByteStorage`]: a small byte-addressable persistent store (EEPROM).
//!
//! ```no_run
//! use slotkeeper_hardware::{ByteStorage, Key, KeypadDevice, Result};
//!
//! async fn count_until_hash<K: KeypadDevice, S: ByteStorage>(
//!     keypad: &mut K,
//!     storage: &mut S,
//! ) -> Result<()> {
//!     let mut presses = 0u8;
//!     while keypad.read_input().await? != Key::Hash {
//!         presses += 1;
//!     }
//!     storage.write_byte(0, presses)
//! }
//! ```
//!
//! # Implementations
//!
//! - [`VirtualKeypad`] / [`VirtualKeypadHandle`]: channel-backed keypad.
//! - [`MemoryEeprom`]: RAM image with write counting and failure injection.
//! - [`FileEeprom`]: file image synced on every write.
//!
//! # Error Handling
//!
//! All operations return [`Result<T>`][error::Result] with [`HardwareError`].
//! Hardware errors convert into [`slotkeeper_core::Error`] so the controller
//! can propagate them with `?`.

pub mod eeprom;
pub mod error;
pub mod keypad;
pub mod traits;

// Re-export commonly used types for convenience
pub use eeprom::{FileEeprom, MemoryEeprom};
pub use error::{HardwareError, Result};
pub use keypad::{VirtualKeypad, VirtualKeypadHandle};
pub use traits::{ByteStorage, DisplayDevice, Key, KeypadDevice};
