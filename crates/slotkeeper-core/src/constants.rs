//! Core constants for the slot controller.
//!
//! This module centralizes the fixed parameters of the controller: the number
//! of slots, the PIN domain, the lockout threshold, the persistent image byte
//! layout and the display geometry.
//!
//! # Persistent Image Layout
//!
//! The controller persists its state in a small byte-addressable store
//! (typically an EEPROM). The layout is fixed:
//!
//! | Address | Size | Content |
//! |---------|------|---------|
//! | 0 | 1 | Format marker ([`FORMAT_MARKER`] when initialized) |
//! | 1..5 | 4 × 1 | Occupancy flags, one per slot |
//! | 5..13 | 4 × 2 | Slot PINs, `u16` little-endian |
//! | 13 | 1 | Lock flag |
//! | 14..16 | 2 | Reserved |
//!
//! ```
//! use slotkeeper_core::constants::*;
//!
//! assert_eq!(pin_address(0), PIN_BASE_ADDR);
//! assert_eq!(pin_address(3) + 2, LOCK_FLAG_ADDR);
//! assert!(LOCK_FLAG_ADDR < IMAGE_SIZE);
//! ```

// ============================================================================
// Slots and PINs
// ============================================================================

/// Number of physical slots managed by the controller.
pub const SLOT_COUNT: usize = 4;

/// Smallest PIN that can be assigned to a slot.
///
/// PINs always have four decimal digits with a nonzero leading digit.
pub const MIN_PIN: u16 = 1000;

/// Largest PIN that can be assigned to a slot.
pub const MAX_PIN: u16 = 9999;

/// Number of symbols in a PIN or in the master code.
pub const PIN_LENGTH: usize = 4;

/// Maximum number of random draws before PIN generation gives up.
///
/// At most [`SLOT_COUNT`] values are excluded out of 9000, so this limit is
/// never reached in practice.
pub const MAX_PIN_DRAWS: u32 = 1000;

/// Master code used when no other code is configured.
pub const DEFAULT_MASTER_CODE: &str = "CBAD";

// ============================================================================
// Lockout
// ============================================================================

/// Consecutive failed PIN submissions that lock the panel.
pub const LOCKOUT_THRESHOLD: u8 = 3;

// ============================================================================
// Persistent Image Layout
// ============================================================================

/// Total footprint of the persistent image in bytes.
pub const IMAGE_SIZE: usize = 16;

/// Address of the format marker byte.
pub const FORMAT_MARKER_ADDR: usize = 0;

/// Value of the format marker once storage has been initialized.
pub const FORMAT_MARKER: u8 = 0x2A;

/// Address of the first occupancy byte.
pub const OCCUPANCY_BASE_ADDR: usize = 1;

/// Address of the first PIN field.
pub const PIN_BASE_ADDR: usize = 5;

/// Address of the lock flag byte.
pub const LOCK_FLAG_ADDR: usize = 13;

/// Value of a freshly erased storage byte.
pub const ERASED_BYTE: u8 = 0xFF;

/// Address of the occupancy byte for a slot.
#[must_use]
pub const fn occupancy_address(slot: usize) -> usize {
    OCCUPANCY_BASE_ADDR + slot
}

/// Address of the first byte of the PIN field for a slot.
#[must_use]
pub const fn pin_address(slot: usize) -> usize {
    PIN_BASE_ADDR + slot * 2
}

// ============================================================================
// Display
// ============================================================================

/// Number of rows on the character display.
pub const DISPLAY_ROWS: usize = 2;

/// Number of columns on the character display.
pub const DISPLAY_COLUMNS: usize = 16;

/// Default duration of a transient message, in milliseconds.
pub const DEFAULT_MESSAGE_HOLD_MS: u64 = 2000;

/// Default duration of the full slot table, in milliseconds.
pub const DEFAULT_TABLE_HOLD_MS: u64 = 4000;
