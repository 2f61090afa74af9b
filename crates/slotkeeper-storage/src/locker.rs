//! Locker facade owning the persistent image, the slot table and the
//! lockout guard.

use slotkeeper_core::{Pin, Result, SlotIndex, SlotView, constants::SLOT_COUNT};
use slotkeeper_hardware::ByteStorage;
use tracing::{info, warn};

use crate::image::{ImageReport, PersistentImage};
use crate::lockout::LockoutGuard;
use crate::pin::PinGenerator;
use crate::slots::{Initialization, SlotStore};

/// Persistent locker state.
///
/// All mutations are written through to storage before returning.
///
/// # Examples
///
/// ```
/// use slotkeeper_core::SlotIndex;
/// use slotkeeper_hardware::MemoryEeprom;
/// use slotkeeper_storage::{Locker, PinGenerator};
///
/// let mut locker = Locker::boot(MemoryEeprom::new(), PinGenerator::from_seed(1)).unwrap();
/// let slot = SlotIndex::from_number(2).unwrap();
///
/// let pin = locker.assign(slot).unwrap();
/// assert_eq!(locker.find_by_pin(pin), Some(slot));
///
/// // Reboot from the same bytes
/// let eeprom = locker.into_storage();
/// let locker = Locker::boot(eeprom, PinGenerator::from_seed(2)).unwrap();
/// assert_eq!(locker.find_by_pin(pin), Some(slot));
/// ```
#[derive(Debug)]
pub struct Locker<S> {
    image: PersistentImage<S>,
    slots: SlotStore,
    lockout: LockoutGuard,
}

impl<S: ByteStorage> Locker<S> {
    /// Initialize storage if blank, then load the slot table and lock flag.
    ///
    /// # Errors
    ///
    /// - `Error::StorageIo` if storage is too small or cannot be accessed
    /// - `Error::CorruptImage` if an occupied slot holds an invalid PIN
    pub fn boot(storage: S, generator: PinGenerator) -> Result<Self> {
        let mut image = PersistentImage::new(storage)?;
        let mut slots = SlotStore::new(generator);
        let mut lockout = LockoutGuard::new();

        // The format marker is the last byte written on first boot
        lockout.initialize(&mut image)?;
        let initialization = slots.initialize(&mut image)?;
        slots.load(&image)?;
        lockout.load(&image)?;

        let occupied = slots.occupied_pins().len();
        match initialization {
            Initialization::Formatted => info!("Locker formatted ({} slots)", SLOT_COUNT),
            Initialization::AlreadyInitialized => {
                info!("Locker loaded ({}/{} slots occupied)", occupied, SLOT_COUNT)
            }
        }
        if lockout.is_locked() {
            warn!("Panel is locked; master code required");
        }

        Ok(Self {
            image,
            slots,
            lockout,
        })
    }

    /// Occupy a free slot and return its new PIN.
    pub fn assign(&mut self, slot: SlotIndex) -> Result<Pin> {
        self.slots.assign(&mut self.image, slot)
    }

    /// Free an occupied slot.
    pub fn release(&mut self, slot: SlotIndex) -> Result<()> {
        self.slots.release(&mut self.image, slot)
    }

    pub fn find_by_pin(&self, pin: Pin) -> Option<SlotIndex> {
        self.slots.find_by_pin(pin)
    }

    pub fn is_free(&self, slot: SlotIndex) -> bool {
        self.slots.is_free(slot)
    }

    /// PINs currently excluded from new assignments.
    pub fn occupied_pins(&self) -> Vec<Pin> {
        self.slots.occupied_pins()
    }

    pub fn snapshot(&self) -> [SlotView; SLOT_COUNT] {
        self.slots.snapshot()
    }

    /// Count a wrong PIN. Returns `true` if the panel is now locked.
    pub fn record_failure(&mut self) -> Result<bool> {
        self.lockout.record_failure(&mut self.image)
    }

    pub fn record_success(&mut self) {
        self.lockout.record_success();
    }

    /// Clear the persistent lock.
    pub fn unlock(&mut self) -> Result<()> {
        self.lockout.unlock(&mut self.image)
    }

    pub fn is_locked(&self) -> bool {
        self.lockout.is_locked()
    }

    pub fn failed_attempts(&self) -> u8 {
        self.lockout.failed_attempts()
    }

    /// Decode the persistent image as currently stored.
    pub fn report(&self) -> Result<ImageReport> {
        self.image.report()
    }

    pub fn storage(&self) -> &S {
        self.image.storage()
    }

    /// Consume the locker, returning the storage device.
    pub fn into_storage(self) -> S {
        self.image.into_storage()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotkeeper_core::{
        Error,
        constants::{ERASED_BYTE, FORMAT_MARKER, IMAGE_SIZE, LOCK_FLAG_ADDR, LOCKOUT_THRESHOLD},
    };
    use slotkeeper_hardware::MemoryEeprom;

    fn slot(number: u8) -> SlotIndex {
        SlotIndex::from_number(number).unwrap()
    }

    #[test]
    fn test_boot_formats_blank_storage() {
        let locker = Locker::boot(MemoryEeprom::new(), PinGenerator::from_seed(1)).unwrap();

        assert!(!locker.is_locked());
        assert!(locker.snapshot().iter().all(|v| !v.is_occupied()));

        let bytes = locker.storage().as_bytes();
        assert_eq!(bytes[0], FORMAT_MARKER);
        assert_eq!(bytes[LOCK_FLAG_ADDR], 0);
        assert!(bytes[1..LOCK_FLAG_ADDR].iter().all(|b| *b == 0));
        assert!(bytes[LOCK_FLAG_ADDR + 1..].iter().all(|b| *b == ERASED_BYTE));
    }

    #[test]
    fn test_interrupted_first_boot_recovers_unlocked() {
        let full_format = Locker::boot(MemoryEeprom::new(), PinGenerator::from_seed(1))
            .unwrap()
            .storage()
            .write_count();

        for writes in 0..full_format {
            let mut eeprom = MemoryEeprom::new();
            eeprom.fail_after(writes);
            let result = Locker::boot(&mut eeprom, PinGenerator::from_seed(1));
            assert!(matches!(result, Err(Error::StorageIo { .. })));
            assert_ne!(eeprom.as_bytes()[0], FORMAT_MARKER);

            // Power comes back with the partially written image
            let eeprom = MemoryEeprom::from_bytes(eeprom.as_bytes().to_vec());
            let locker = Locker::boot(eeprom, PinGenerator::from_seed(1)).unwrap();
            assert!(!locker.is_locked(), "locked after {writes} writes");
            assert!(locker.snapshot().iter().all(|v| !v.is_occupied()));
        }
    }

    #[test]
    fn test_boot_loads_existing_state() {
        let mut locker = Locker::boot(MemoryEeprom::new(), PinGenerator::from_seed(1)).unwrap();
        let pin = locker.assign(slot(4)).unwrap();
        for _ in 0..LOCKOUT_THRESHOLD {
            locker.record_failure().unwrap();
        }

        let locker = Locker::boot(locker.into_storage(), PinGenerator::from_seed(5)).unwrap();
        assert!(locker.is_locked());
        assert_eq!(locker.find_by_pin(pin), Some(slot(4)));
        assert_eq!(locker.failed_attempts(), 0);
    }

    #[test]
    fn test_boot_rejects_corrupt_slot() {
        let mut bytes = vec![0; IMAGE_SIZE];
        bytes[0] = FORMAT_MARKER;
        bytes[1] = 1;

        let result = Locker::boot(MemoryEeprom::from_bytes(bytes), PinGenerator::from_seed(1));
        assert!(matches!(result, Err(Error::CorruptImage(_))));
    }

    #[test]
    fn test_report_matches_state() {
        let mut locker = Locker::boot(MemoryEeprom::new(), PinGenerator::from_seed(3)).unwrap();
        let pin = locker.assign(slot(1)).unwrap();

        let report = locker.report().unwrap();
        assert!(report.initialized);
        assert!(!report.locked);
        assert_eq!(report.slots, locker.snapshot().to_vec());
        assert_eq!(report.slots[0].pin, Some(pin));
    }

    #[test]
    fn test_release_then_reassign() {
        let mut locker = Locker::boot(MemoryEeprom::new(), PinGenerator::from_seed(3)).unwrap();
        locker.assign(slot(2)).unwrap();
        locker.release(slot(2)).unwrap();
        assert!(locker.is_free(slot(2)));

        let pin = locker.assign(slot(2)).unwrap();
        assert_eq!(locker.find_by_pin(pin), Some(slot(2)));
    }

    #[test]
    fn test_released_pin_leaves_exclusion_set() {
        let mut locker = Locker::boot(MemoryEeprom::new(), PinGenerator::from_seed(3)).unwrap();
        let kept = locker.assign(slot(1)).unwrap();
        let released = locker.assign(slot(2)).unwrap();
        locker.release(slot(2)).unwrap();

        let pins = locker.occupied_pins();
        assert_eq!(pins, vec![kept]);
        assert!(!pins.contains(&released));
        assert_eq!(locker.find_by_pin(released), None);
    }
}
