//! Hardware device trait definitions.
//!
//! This module defines the boundary between the controller and its
//! peripherals: the keypad that produces key presses, the character display
//! that shows text, and the byte-addressable storage that holds the
//! persistent image. Implementations can be swapped between in-memory
//! devices (for development and testing) and real drivers.
//!
//! The keypad read uses native `async fn` in traits (Rust 1.90 + Edition
//! 2024 RPITIT). Display and storage operations are synchronous: a write is
//! complete when the call returns.

#![allow(async_fn_in_trait)]

use std::fmt;

use slotkeeper_core::is_entry_symbol;

use crate::error::{HardwareError, Result};

/// A key press from the 4×4 keypad.
///
/// The keypad alphabet is `0-9`, `A-D`, `*` and `#`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Numeric digit (0-9).
    Digit(u8),

    /// Letter key (A-D).
    Letter(char),

    /// Star key (*), clears entry.
    Star,

    /// Hash key (#), submits entry.
    Hash,
}

impl Key {
    /// Create a digit key.
    ///
    /// # Errors
    ///
    /// Returns an error if the digit is greater than 9.
    ///
    /// # Examples
    ///
    /// ```
    /// use slotkeeper_hardware::Key;
    ///
    /// let key = Key::digit(5).unwrap();
    /// assert_eq!(key.as_digit(), Some(5));
    ///
    /// assert!(Key::digit(10).is_err());
    /// ```
    pub fn digit(d: u8) -> Result<Self> {
        if d > 9 {
            return Err(HardwareError::invalid_data(format!(
                "Digit must be 0-9, got {}",
                d
            )));
        }
        Ok(Self::Digit(d))
    }

    /// Map a keypad character to a key.
    ///
    /// Letter keys are accepted in either case.
    ///
    /// # Errors
    ///
    /// Returns an error if the character is not on the keypad.
    ///
    /// # Examples
    ///
    /// ```
    /// use slotkeeper_hardware::Key;
    ///
    /// assert_eq!(Key::from_char('7').unwrap(), Key::Digit(7));
    /// assert_eq!(Key::from_char('b').unwrap(), Key::Letter('B'));
    /// assert_eq!(Key::from_char('#').unwrap(), Key::Hash);
    /// assert!(Key::from_char('E').is_err());
    /// ```
    pub fn from_char(c: char) -> Result<Self> {
        match c.to_ascii_uppercase() {
            '*' => Ok(Self::Star),
            '#' => Ok(Self::Hash),
            d @ '0'..='9' => Ok(Self::Digit(d as u8 - b'0')),
            l @ 'A'..='D' => Ok(Self::Letter(l)),
            other => Err(HardwareError::invalid_data(format!(
                "Key {:?} is not on the keypad",
                other
            ))),
        }
    }

    /// Character printed on the key.
    pub fn as_char(&self) -> char {
        match self {
            Self::Digit(d) => (b'0' + d) as char,
            Self::Letter(l) => *l,
            Self::Star => '*',
            Self::Hash => '#',
        }
    }

    /// Get the entry symbol for this key.
    ///
    /// Returns `None` for the control keys `*` and `#`.
    pub fn symbol(&self) -> Option<char> {
        let c = self.as_char();
        is_entry_symbol(c).then_some(c)
    }

    /// Get the digit value if this is a digit key.
    pub fn as_digit(&self) -> Option<u8> {
        match self {
            Self::Digit(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Keypad device abstraction.
///
/// The controller awaits one key at a time with [`read_input`] and drains
/// keys that arrived while it was busy with [`try_read_input`]. Keypads do
/// not debounce in this layer; a driver that reports repeats must suppress
/// them itself.
///
/// **NOTE**: This trait is NOT object-safe because `async fn` methods return
/// `impl Future`. Use generic type parameters:
///
/// ```no_run
/// use slotkeeper_hardware::{Key, KeypadDevice, Result};
///
/// async fn read_entry<K: KeypadDevice>(keypad: &mut K) -> Result<String> {
///     let mut entry = String::new();
///
///     loop {
///         match keypad.read_input().await? {
///             Key::Hash => break,
///             Key::Star => entry.clear(),
///             key => entry.extend(key.symbol()),
///         }
///     }
///
///     Ok(entry)
/// }
/// ```
///
/// [`read_input`]: KeypadDevice::read_input
/// [`try_read_input`]: KeypadDevice::try_read_input
pub trait KeypadDevice: Send {
    /// Wait for the next key press.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::Disconnected` once the key source is gone.
    async fn read_input(&mut self) -> Result<Key>;

    /// Poll for a pending key press without waiting.
    ///
    /// Returns `Ok(None)` when no key is pending.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::Disconnected` once the key source is gone
    /// and no keys remain.
    fn try_read_input(&mut self) -> Result<Option<Key>>;
}

/// Character display abstraction.
///
/// The display is a fixed grid of rows and columns. The controller never
/// reads back what is on the display.
pub trait DisplayDevice {
    /// Blank the entire display.
    fn clear(&mut self) -> Result<()>;

    /// Write text starting at the given row and column.
    ///
    /// Text running past the last column is cut off.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::InvalidPosition` if the row or column is
    /// outside the grid.
    fn write_at(&mut self, row: usize, column: usize, text: &str) -> Result<()>;

    /// Called after a complete screen has been written.
    ///
    /// Buffered displays present their content here; the default does
    /// nothing.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Byte-addressable persistent storage (EEPROM-like).
///
/// Writes are durable as soon as they return; there is no separate sync
/// step. Erased cells read as `0xFF`.
pub trait ByteStorage {
    /// Number of addressable bytes.
    fn capacity(&self) -> usize;

    /// Read one byte.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::OutOfBounds` for addresses past the capacity.
    fn read_byte(&self, address: usize) -> Result<u8>;

    /// Write one byte durably.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::OutOfBounds` for addresses past the capacity,
    /// or `HardwareError::WriteFailed`/`HardwareError::Io` if the write did
    /// not complete.
    fn write_byte(&mut self, address: usize, value: u8) -> Result<()>;

    /// Read a little-endian `u16` from two consecutive bytes.
    fn read_u16(&self, address: usize) -> Result<u16> {
        let low = self.read_byte(address)?;
        let high = self.read_byte(address + 1)?;
        Ok(u16::from_le_bytes([low, high]))
    }

    /// Write a little-endian `u16` to two consecutive bytes.
    fn write_u16(&mut self, address: usize, value: u16) -> Result<()> {
        let [low, high] = value.to_le_bytes();
        self.write_byte(address, low)?;
        self.write_byte(address + 1, high)
    }
}

impl<T: ByteStorage + ?Sized> ByteStorage for &mut T {
    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn read_byte(&self, address: usize) -> Result<u8> {
        (**self).read_byte(address)
    }

    fn write_byte(&mut self, address: usize, value: u8) -> Result<()> {
        (**self).write_byte(address, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case('0', Key::Digit(0))]
    #[case('9', Key::Digit(9))]
    #[case('A', Key::Letter('A'))]
    #[case('d', Key::Letter('D'))]
    #[case('*', Key::Star)]
    #[case('#', Key::Hash)]
    fn test_key_from_char(#[case] c: char, #[case] expected: Key) {
        let key = Key::from_char(c).unwrap();
        assert_eq!(key, expected);
        assert_eq!(key.as_char(), c.to_ascii_uppercase());
    }

    #[rstest]
    #[case('E')]
    #[case(' ')]
    #[case('\n')]
    fn test_key_from_char_rejects_unknown(#[case] c: char) {
        assert!(Key::from_char(c).is_err());
    }

    #[test]
    fn test_key_symbol() {
        assert_eq!(Key::Digit(4).symbol(), Some('4'));
        assert_eq!(Key::Letter('C').symbol(), Some('C'));
        assert_eq!(Key::Star.symbol(), None);
        assert_eq!(Key::Hash.symbol(), None);
    }

    #[test]
    fn test_key_display() {
        assert_eq!(Key::Digit(3).to_string(), "3");
        assert_eq!(Key::Hash.to_string(), "#");
    }
}
