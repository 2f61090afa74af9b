use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Slot errors
    #[error("Invalid slot {index}: {reason}")]
    InvalidSlot { index: usize, reason: String },

    #[error("PIN space exhausted after {attempts} draws")]
    PinSpaceExhausted { attempts: u32 },

    #[error("Invalid PIN: {0}")]
    InvalidPin(String),

    // Persistence errors
    #[error("Storage I/O failure at address {address}: {message}")]
    StorageIo { address: usize, message: String },

    #[error("Corrupt persistent image: {0}")]
    CorruptImage(String),

    // Input errors
    #[error("Invalid master code: {0}")]
    InvalidMasterCode(String),

    // Display errors
    #[error("Invalid display line {line} (max {max})")]
    InvalidLine { line: usize, max: usize },

    // Device errors
    #[error("Device error: {0}")]
    Device(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create an invalid slot error.
    pub fn invalid_slot(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidSlot {
            index,
            reason: reason.into(),
        }
    }

    /// Create a storage I/O error.
    pub fn storage_io(address: usize, message: impl Into<String>) -> Self {
        Self::StorageIo {
            address,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_slot_display() {
        let error = Error::invalid_slot(2, "slot already occupied");
        assert_eq!(error.to_string(), "Invalid slot 2: slot already occupied");
    }

    #[test]
    fn test_storage_io_display() {
        let error = Error::storage_io(13, "write rejected");
        assert_eq!(
            error.to_string(),
            "Storage I/O failure at address 13: write rejected"
        );
    }

    #[test]
    fn test_pin_space_exhausted_display() {
        let error = Error::PinSpaceExhausted { attempts: 1000 };
        assert_eq!(error.to_string(), "PIN space exhausted after 1000 draws");
    }
}
