//! Failed-attempt counting and the persistent panel lock.
//!
//! The attempt counter lives only in memory and starts at zero on every boot.
//! The lock itself is persisted, so a power cycle never clears it.

use slotkeeper_core::{Result, constants::LOCKOUT_THRESHOLD};
use slotkeeper_hardware::ByteStorage;
use tracing::{debug, info, warn};

use crate::image::PersistentImage;

/// Tracks consecutive wrong PINs and owns the lock flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockoutGuard {
    failed_attempts: u8,
    locked: bool,
}

impl LockoutGuard {
    /// Create an unlocked guard with no failures recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the initial (unlocked) lock flag to blank storage.
    ///
    /// Must run before the slot table is formatted: once the format marker
    /// is present this does nothing, so the flag has to be in place before
    /// the marker is written.
    pub fn initialize<S: ByteStorage>(&mut self, image: &mut PersistentImage<S>) -> Result<()> {
        if image.is_formatted()? {
            return Ok(());
        }

        image.write_lock_flag(false)?;
        self.locked = false;
        debug!("Wrote initial lock flag");
        Ok(())
    }

    /// Read the lock flag from storage and reset the attempt counter.
    pub fn load<S: ByteStorage>(&mut self, image: &PersistentImage<S>) -> Result<()> {
        self.locked = image.read_lock_flag()?;
        self.failed_attempts = 0;

        debug!("Loaded lock flag (locked: {})", self.locked);
        Ok(())
    }

    /// Count one wrong PIN.
    ///
    /// Reaching [`LOCKOUT_THRESHOLD`] engages the lock, persists it and resets
    /// the counter. Returns `true` if this failure locked the panel.
    ///
    /// # Errors
    ///
    /// Returns `Error::StorageIo` if the lock flag could not be persisted.
    pub fn record_failure<S: ByteStorage>(
        &mut self,
        image: &mut PersistentImage<S>,
    ) -> Result<bool> {
        self.failed_attempts = self.failed_attempts.saturating_add(1);
        debug!("Wrong PIN ({}/{})", self.failed_attempts, LOCKOUT_THRESHOLD);

        if self.failed_attempts < LOCKOUT_THRESHOLD {
            return Ok(false);
        }

        image.write_lock_flag(true)?;
        self.locked = true;
        self.failed_attempts = 0;

        warn!(
            "Panel locked after {} consecutive wrong PINs",
            LOCKOUT_THRESHOLD
        );
        Ok(true)
    }

    /// Reset the attempt counter after a correct PIN.
    pub fn record_success(&mut self) {
        self.failed_attempts = 0;
    }

    /// Clear the lock and persist the change.
    pub fn unlock<S: ByteStorage>(&mut self, image: &mut PersistentImage<S>) -> Result<()> {
        image.write_lock_flag(false)?;
        self.locked = false;
        self.failed_attempts = 0;

        info!("Panel unlocked");
        Ok(())
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn failed_attempts(&self) -> u8 {
        self.failed_attempts
    }
}
