//! Channel-backed keypad.
//!
//! This module provides a keypad device that receives key presses through an
//! internal channel. Tests drive it programmatically; the command-line
//! front end feeds it from standard input.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use crate::{
    HardwareError, Result,
    traits::{Key, KeypadDevice},
};

/// Number of key presses buffered between the handle and the keypad.
const CHANNEL_CAPACITY: usize = 32;

/// Keypad fed through a [`VirtualKeypadHandle`].
///
/// # Examples
///
/// ```
/// use slotkeeper_hardware::{Key, KeypadDevice, VirtualKeypad};
///
/// #[tokio::main]
/// async fn main() -> slotkeeper_hardware::Result<()> {
///     let (mut keypad, handle) = VirtualKeypad::new();
///
///     tokio::spawn(async move {
///         handle.send_keys("*12#").await.unwrap();
///     });
///
///     assert_eq!(keypad.read_input().await?, Key::Star);
///     assert_eq!(keypad.read_input().await?, Key::Digit(1));
///     assert_eq!(keypad.read_input().await?, Key::Digit(2));
///     assert_eq!(keypad.read_input().await?, Key::Hash);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct VirtualKeypad {
    /// Channel receiver for key presses
    input_rx: mpsc::Receiver<Key>,
}

impl VirtualKeypad {
    /// Create a new keypad.
    ///
    /// Returns a tuple of (VirtualKeypad, VirtualKeypadHandle) where the
    /// handle is used to press keys.
    pub fn new() -> (Self, VirtualKeypadHandle) {
        let (input_tx, input_rx) = mpsc::channel(CHANNEL_CAPACITY);
        (Self { input_rx }, VirtualKeypadHandle { input_tx })
    }
}

impl KeypadDevice for VirtualKeypad {
    async fn read_input(&mut self) -> Result<Key> {
        self.input_rx
            .recv()
            .await
            .ok_or_else(|| HardwareError::disconnected("Keypad input channel closed"))
    }

    fn try_read_input(&mut self) -> Result<Option<Key>> {
        match self.input_rx.try_recv() {
            Ok(key) => Ok(Some(key)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(HardwareError::disconnected(
                "Keypad input channel closed",
            )),
        }
    }
}

/// Handle for pressing keys on a [`VirtualKeypad`].
///
/// It can be cloned and shared across tasks.
#[derive(Debug, Clone)]
pub struct VirtualKeypadHandle {
    /// Channel sender for key presses
    input_tx: mpsc::Sender<Key>,
}

impl VirtualKeypadHandle {
    /// Press a single key.
    ///
    /// # Errors
    ///
    /// Returns an error if the keypad has been dropped.
    pub async fn send_key(&self, key: Key) -> Result<()> {
        self.input_tx
            .send(key)
            .await
            .map_err(|_| HardwareError::disconnected("Keypad input channel closed"))
    }

    /// Press a sequence of keys given as keypad characters.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Any character is not on the keypad (nothing is sent in that case)
    /// - The keypad has been dropped
    pub async fn send_keys(&self, keys: &str) -> Result<()> {
        let keys = keys
            .chars()
            .map(Key::from_char)
            .collect::<Result<Vec<_>>>()?;

        for key in keys {
            self.send_key(key).await?;
        }
        Ok(())
    }
}
