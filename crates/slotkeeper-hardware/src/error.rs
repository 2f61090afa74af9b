//! Error types for hardware operations.
//!
//! This module defines error types specific to peripheral operations: keypad
//! disconnection, invalid symbols, display positioning and byte storage
//! access failures.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Invalid data received from or sent to a device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Storage address outside the device capacity.
    #[error("Address {address} out of bounds (capacity {capacity})")]
    OutOfBounds { address: usize, capacity: usize },

    /// Storage write did not complete.
    #[error("Write failed at address {address}: {message}")]
    WriteFailed { address: usize, message: String },

    /// Display position outside the character grid.
    #[error("Invalid display position: row {row}, column {column}")]
    InvalidPosition { row: usize, column: usize },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new out of bounds error.
    pub fn out_of_bounds(address: usize, capacity: usize) -> Self {
        Self::OutOfBounds { address, capacity }
    }

    /// Create a new write failed error.
    pub fn write_failed(address: usize, message: impl Into<String>) -> Self {
        Self::WriteFailed {
            address,
            message: message.into(),
        }
    }

    /// Check whether this error means the device is gone for good.
    pub fn is_disconnected(&self) -> bool {
        matches!(self, Self::Disconnected { .. })
    }
}

impl From<HardwareError> for slotkeeper_core::Error {
    fn from(error: HardwareError) -> Self {
        match error {
            HardwareError::OutOfBounds { address, .. } => {
                slotkeeper_core::Error::storage_io(address, error.to_string())
            }
            HardwareError::WriteFailed { address, message } => {
                slotkeeper_core::Error::storage_io(address, message)
            }
            other => slotkeeper_core::Error::Device(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_error() {
        let error = HardwareError::disconnected("keypad");
        assert!(error.is_disconnected());
        assert_eq!(error.to_string(), "Device disconnected: keypad");
    }

    #[test]
    fn test_out_of_bounds_error() {
        let error = HardwareError::out_of_bounds(20, 16);
        assert_eq!(error.to_string(), "Address 20 out of bounds (capacity 16)");
    }

    #[test]
    fn test_write_failed_maps_to_storage_io() {
        let error: slotkeeper_core::Error = HardwareError::write_failed(13, "cell worn out").into();
        assert!(matches!(
            error,
            slotkeeper_core::Error::StorageIo { address: 13, .. }
        ));
    }

    #[test]
    fn test_other_errors_map_to_device() {
        let error: slotkeeper_core::Error = HardwareError::invalid_data("bad key").into();
        assert!(matches!(error, slotkeeper_core::Error::Device(_)));
    }
}
