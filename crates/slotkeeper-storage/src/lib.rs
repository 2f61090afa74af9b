//! Persistent state for the slot controller.
//!
//! This crate keeps the slot table and the panel lock on a small byte
//! storage device and mirrors both in memory. Every mutation is written
//! through before the call returns, so a power cycle at any point resumes
//! from the last completed operation.
//!
//! # Components
//!
//! - [`PersistentImage`]: byte layout codec over a [`ByteStorage`] device
//! - [`SlotStore`]: slot records with unique PIN assignment
//! - [`LockoutGuard`]: consecutive wrong-PIN counter and persistent lock
//! - [`PinGenerator`]: seeded random PIN source
//! - [`Locker`]: facade tying the above together
//!
//! # Image Layout
//!
//! | Address | Content |
//! |---------|---------|
//! | 0 | Format marker (`0x2A`) |
//! | 1-4 | Occupancy flag per slot |
//! | 5-12 | PIN per slot, `u16` little-endian |
//! | 13 | Lock flag |
//!
//! Blank storage (no marker) is formatted on boot with every slot free and
//! the panel unlocked.
//!
//! # Examples
//!
//! ```
//! use slotkeeper_core::SlotIndex;
//! use slotkeeper_hardware::MemoryEeprom;
//! use slotkeeper_storage::{Locker, PinGenerator};
//!
//! let mut locker = Locker::boot(MemoryEeprom::new(), PinGenerator::from_seed(42)).unwrap();
//!
//! let slot = SlotIndex::from_number(1).unwrap();
//! let pin = locker.assign(slot).unwrap();
//! assert_eq!(locker.find_by_pin(pin), Some(slot));
//!
//! locker.release(slot).unwrap();
//! assert!(locker.is_free(slot));
//! ```
//!
//! [`ByteStorage`]: slotkeeper_hardware::ByteStorage

pub mod image;
pub mod locker;
pub mod lockout;
pub mod pin;
pub mod slots;

pub use image::{ImageReport, PersistentImage};
pub use locker::Locker;
pub use lockout::LockoutGuard;
pub use pin::PinGenerator;
pub use slots::{Initialization, SlotStore};
