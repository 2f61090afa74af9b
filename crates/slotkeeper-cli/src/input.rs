//! Keypad input read from a byte stream.

use slotkeeper_hardware::{Key, VirtualKeypadHandle};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

/// Press one key for each keypad character read from `reader`.
///
/// Letters are case-insensitive. Whitespace is skipped silently and any
/// other character is ignored. Returns at end of input or once the keypad
/// has been dropped; the handle is dropped on return, which disconnects
/// the keypad.
pub async fn feed_keys<R: AsyncRead + Unpin>(
    mut reader: R,
    handle: VirtualKeypadHandle,
) -> std::io::Result<()> {
    let mut buffer = [0u8; 64];

    loop {
        let count = reader.read(&mut buffer).await?;
        if count == 0 {
            debug!("Input closed");
            return Ok(());
        }

        for &byte in &buffer[..count] {
            let c = char::from(byte);
            match Key::from_char(c) {
                Ok(key) => {
                    if handle.send_key(key).await.is_err() {
                        return Ok(());
                    }
                }
                Err(_) if c.is_ascii_whitespace() => {}
                Err(_) => debug!("Ignoring input {:?}", c),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotkeeper_hardware::{KeypadDevice, VirtualKeypad};

    #[tokio::test]
    async fn test_feeds_keypad_characters() {
        let (mut keypad, handle) = VirtualKeypad::new();

        feed_keys(&b"1a x\n#"[..], handle).await.unwrap();

        assert_eq!(keypad.read_input().await.unwrap(), Key::Digit(1));
        assert_eq!(keypad.read_input().await.unwrap(), Key::Letter('A'));
        assert_eq!(keypad.read_input().await.unwrap(), Key::Hash);
        assert!(keypad.read_input().await.unwrap_err().is_disconnected());
    }

    #[tokio::test]
    async fn test_stops_when_keypad_dropped() {
        let (keypad, handle) = VirtualKeypad::new();
        drop(keypad);

        assert!(feed_keys(&b"1234"[..], handle).await.is_ok());
    }
}
