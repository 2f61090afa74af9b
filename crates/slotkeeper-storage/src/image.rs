//! Persistent image codec.
//!
//! [`PersistentImage`] owns the byte storage device and translates between
//! the fixed byte layout (see [`slotkeeper_core::constants`]) and typed slot
//! and lock records. It does not cache anything: every call goes to the
//! device.
//!
//! # Decoding Rules
//!
//! - Any nonzero occupancy byte means occupied.
//! - An occupied slot must hold a PIN in `MIN_PIN..=MAX_PIN`; anything else is
//!   [`Error::CorruptImage`].
//! - The lock flag reads as unlocked only when it is exactly `0`. Erased or
//!   unexpected values read as locked, so a half-written image fails secure.

use serde::Serialize;
use slotkeeper_core::{
    Error, Pin, Result, SlotIndex, SlotView,
    constants::{
        FORMAT_MARKER, FORMAT_MARKER_ADDR, IMAGE_SIZE, LOCK_FLAG_ADDR, occupancy_address,
        pin_address,
    },
};
use slotkeeper_hardware::ByteStorage;

/// Typed access to the persistent image on a byte storage device.
#[derive(Debug)]
pub struct PersistentImage<S> {
    storage: S,
}

impl<S: ByteStorage> PersistentImage<S> {
    /// Wrap a storage device.
    ///
    /// # Errors
    ///
    /// Returns `Error::StorageIo` if the device is smaller than the image.
    pub fn new(storage: S) -> Result<Self> {
        if storage.capacity() < IMAGE_SIZE {
            return Err(Error::storage_io(
                storage.capacity(),
                format!(
                    "device holds {} bytes, image needs {}",
                    storage.capacity(),
                    IMAGE_SIZE
                ),
            ));
        }
        Ok(Self { storage })
    }

    /// Check whether the format marker is present.
    pub fn is_formatted(&self) -> Result<bool> {
        Ok(self.read(FORMAT_MARKER_ADDR)? == FORMAT_MARKER)
    }

    /// Write the format marker.
    pub fn write_format_marker(&mut self) -> Result<()> {
        self.write(FORMAT_MARKER_ADDR, FORMAT_MARKER)
    }

    /// Read one slot record.
    ///
    /// # Errors
    ///
    /// Returns `Error::CorruptImage` if the slot is marked occupied but its
    /// PIN field is out of range.
    pub fn read_slot(&self, slot: SlotIndex) -> Result<Option<Pin>> {
        let occupied = self.read(occupancy_address(slot.as_usize()))? != 0;
        if !occupied {
            return Ok(None);
        }

        let raw = self.read_u16(pin_address(slot.as_usize()))?;
        Pin::new(raw).map(Some).map_err(|_| {
            Error::CorruptImage(format!("slot {slot} is occupied with invalid PIN {raw}"))
        })
    }

    /// Write one slot record.
    ///
    /// When occupying, the PIN is written before the occupancy flag; when
    /// freeing, the flag is cleared before the PIN. An interrupted write
    /// therefore never leaves an occupied slot with a stale PIN.
    pub fn write_slot(&mut self, slot: SlotIndex, pin: Option<Pin>) -> Result<()> {
        let flag_addr = occupancy_address(slot.as_usize());
        let pin_addr = pin_address(slot.as_usize());

        match pin {
            Some(pin) => {
                self.write_u16(pin_addr, pin.value())?;
                self.write(flag_addr, 1)
            }
            None => {
                self.write(flag_addr, 0)?;
                self.write_u16(pin_addr, 0)
            }
        }
    }

    /// Read the lock flag.
    pub fn read_lock_flag(&self) -> Result<bool> {
        Ok(self.read(LOCK_FLAG_ADDR)? != 0)
    }

    /// Write the lock flag.
    pub fn write_lock_flag(&mut self, locked: bool) -> Result<()> {
        self.write(LOCK_FLAG_ADDR, u8::from(locked))
    }

    /// Decode the whole image without modifying it.
    pub fn report(&self) -> Result<ImageReport> {
        if !self.is_formatted()? {
            return Ok(ImageReport {
                initialized: false,
                slots: Vec::new(),
                locked: false,
            });
        }

        let slots = SlotIndex::all()
            .map(|slot| {
                self.read_slot(slot).map(|pin| SlotView { slot, pin })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ImageReport {
            initialized: true,
            slots,
            locked: self.read_lock_flag()?,
        })
    }

    /// Get the underlying device.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Consume the image, returning the underlying device.
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn read(&self, address: usize) -> Result<u8> {
        self.storage
            .read_byte(address)
            .map_err(|e| Error::storage_io(address, e.to_string()))
    }

    fn read_u16(&self, address: usize) -> Result<u16> {
        self.storage
            .read_u16(address)
            .map_err(|e| Error::storage_io(address, e.to_string()))
    }

    fn write(&mut self, address: usize, value: u8) -> Result<()> {
        self.storage
            .write_byte(address, value)
            .map_err(|e| Error::storage_io(address, e.to_string()))
    }

    fn write_u16(&mut self, address: usize, value: u16) -> Result<()> {
        self.storage
            .write_u16(address, value)
            .map_err(|e| Error::storage_io(address, e.to_string()))
    }
}

/// Decoded content of a persistent image.
///
/// A blank image reports `initialized: false` and no slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageReport {
    pub initialized: bool,
    pub slots: Vec<SlotView>,
    pub locked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use slotkeeper_core::constants::ERASED_BYTE;
    use slotkeeper_hardware::MemoryEeprom;

    fn slot(i: usize) -> SlotIndex {
        SlotIndex::new(i).unwrap()
    }

    #[test]
    fn test_rejects_small_device() {
        let result = PersistentImage::new(MemoryEeprom::with_capacity(8));
        assert!(matches!(result, Err(Error::StorageIo { .. })));
    }

    #[test]
    fn test_blank_image_is_not_formatted() {
        let image = PersistentImage::new(MemoryEeprom::new()).unwrap();
        assert!(!image.is_formatted().unwrap());

        let report = image.report().unwrap();
        assert!(!report.initialized);
        assert!(report.slots.is_empty());
    }

    #[test]
    fn test_format_marker() {
        let mut image = PersistentImage::new(MemoryEeprom::new()).unwrap();
        image.write_format_marker().unwrap();
        assert!(image.is_formatted().unwrap());
        assert_eq!(image.storage().as_bytes()[0], FORMAT_MARKER);
    }

    #[test]
    fn test_slot_record_layout() {
        let mut image = PersistentImage::new(MemoryEeprom::new()).unwrap();
        image.write_slot(slot(2), Some(Pin::new(4821).unwrap())).unwrap();

        let bytes = image.storage().as_bytes();
        assert_eq!(bytes[occupancy_address(2)], 1);
        assert_eq!(
            u16::from_le_bytes([bytes[pin_address(2)], bytes[pin_address(2) + 1]]),
            4821
        );
        assert_eq!(image.read_slot(slot(2)).unwrap(), Some(Pin::new(4821).unwrap()));
    }

    #[test]
    fn test_free_slot_clears_pin() {
        let mut image = PersistentImage::new(MemoryEeprom::new()).unwrap();
        image.write_slot(slot(0), Some(Pin::new(1234).unwrap())).unwrap();
        image.write_slot(slot(0), None).unwrap();

        let bytes = image.storage().as_bytes();
        assert_eq!(bytes[occupancy_address(0)], 0);
        assert_eq!(bytes[pin_address(0)], 0);
        assert_eq!(bytes[pin_address(0) + 1], 0);
        assert_eq!(image.read_slot(slot(0)).unwrap(), None);
    }

    #[test]
    fn test_occupied_slot_with_bad_pin_is_corrupt() {
        let mut bytes = vec![ERASED_BYTE; IMAGE_SIZE];
        bytes[FORMAT_MARKER_ADDR] = FORMAT_MARKER;
        bytes[occupancy_address(1)] = 1;
        bytes[pin_address(1)] = 0x05;
        bytes[pin_address(1) + 1] = 0x00;

        let image = PersistentImage::new(MemoryEeprom::from_bytes(bytes)).unwrap();
        assert!(matches!(
            image.read_slot(slot(1)),
            Err(Error::CorruptImage(_))
        ));
    }

    #[rstest]
    #[case(0x00, false)]
    #[case(0x01, true)]
    #[case(ERASED_BYTE, true)]
    fn test_lock_flag_decoding(#[case] raw: u8, #[case] locked: bool) {
        let mut bytes = vec![0; IMAGE_SIZE];
        bytes[LOCK_FLAG_ADDR] = raw;

        let image = PersistentImage::new(MemoryEeprom::from_bytes(bytes)).unwrap();
        assert_eq!(image.read_lock_flag().unwrap(), locked);
    }

    #[test]
    fn test_write_failure_is_storage_io() {
        let mut eeprom = MemoryEeprom::new();
        eeprom.set_write_failure(true);

        let mut image = PersistentImage::new(eeprom).unwrap();
        assert!(matches!(
            image.write_lock_flag(true),
            Err(Error::StorageIo {
                address: LOCK_FLAG_ADDR,
                ..
            })
        ));
    }

    #[test]
    fn test_report_serialization() {
        let mut image = PersistentImage::new(MemoryEeprom::new()).unwrap();
        image.write_format_marker().unwrap();
        for s in SlotIndex::all() {
            image.write_slot(s, None).unwrap();
        }
        image.write_slot(slot(3), Some(Pin::new(9000).unwrap())).unwrap();
        image.write_lock_flag(false).unwrap();

        let json = serde_json::to_value(image.report().unwrap()).unwrap();
        assert_eq!(json["initialized"], true);
        assert_eq!(json["locked"], false);
        assert_eq!(json["slots"][3]["pin"], 9000);
        assert!(json["slots"][0]["pin"].is_null());
    }
}
