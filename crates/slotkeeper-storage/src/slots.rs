//! Slot table with write-through persistence.
//!
//! [`SlotStore`] keeps the in-memory mirror of the four slot records. Every
//! mutation is written to the persistent image before the call returns, so
//! memory and storage never diverge by more than one call.

use slotkeeper_core::{Error, Pin, Result, SlotIndex, SlotView, constants::SLOT_COUNT};
use slotkeeper_hardware::ByteStorage;
use tracing::{debug, info};

use crate::image::PersistentImage;
use crate::pin::PinGenerator;

/// Outcome of [`SlotStore::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Initialization {
    /// Storage was blank and has been formatted.
    Formatted,

    /// Storage already carried the format marker and was left untouched.
    AlreadyInitialized,
}

/// In-memory slot records, synchronized to the persistent image.
#[derive(Debug)]
pub struct SlotStore {
    /// `Some(pin)` for occupied slots.
    slots: [Option<Pin>; SLOT_COUNT],

    generator: PinGenerator,
}

impl SlotStore {
    /// Create a store with every slot free.
    ///
    /// Call [`initialize`](Self::initialize) and [`load`](Self::load) before
    /// anything else.
    pub fn new(generator: PinGenerator) -> Self {
        Self {
            slots: [None; SLOT_COUNT],
            generator,
        }
    }

    /// Format blank storage.
    ///
    /// If the format marker is missing, writes every slot as free and then
    /// the marker. Otherwise leaves storage untouched, so repeated calls are
    /// harmless.
    pub fn initialize<S: ByteStorage>(
        &mut self,
        image: &mut PersistentImage<S>,
    ) -> Result<Initialization> {
        if image.is_formatted()? {
            return Ok(Initialization::AlreadyInitialized);
        }

        for slot in SlotIndex::all() {
            image.write_slot(slot, None)?;
        }
        image.write_format_marker()?;
        self.slots = [None; SLOT_COUNT];

        info!("Formatted blank storage with {} free slots", SLOT_COUNT);
        Ok(Initialization::Formatted)
    }

    /// Populate the in-memory records from storage.
    pub fn load<S: ByteStorage>(&mut self, image: &PersistentImage<S>) -> Result<()> {
        for slot in SlotIndex::all() {
            self.slots[slot.as_usize()] = image.read_slot(slot)?;
        }

        debug!(
            "Loaded slot table ({} occupied)",
            self.slots.iter().flatten().count()
        );
        Ok(())
    }

    /// Occupy a free slot with a fresh PIN.
    ///
    /// The PIN is unique among the currently occupied slots.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidSlot` if the slot is already occupied
    /// - `Error::PinSpaceExhausted` if no unique PIN could be drawn
    /// - `Error::StorageIo` if the slot table could not be persisted
    pub fn assign<S: ByteStorage>(
        &mut self,
        image: &mut PersistentImage<S>,
        slot: SlotIndex,
    ) -> Result<Pin> {
        if !self.is_free(slot) {
            return Err(Error::invalid_slot(slot.as_usize(), "slot already occupied"));
        }

        let pin = self.generator.generate(&self.occupied_pins())?;
        let mut table = self.slots;
        table[slot.as_usize()] = Some(pin);
        self.commit(image, table)?;

        info!("Assigned slot {}", slot);
        Ok(pin)
    }

    /// Free an occupied slot.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidSlot` if the slot is already free
    /// - `Error::StorageIo` if the slot table could not be persisted
    pub fn release<S: ByteStorage>(
        &mut self,
        image: &mut PersistentImage<S>,
        slot: SlotIndex,
    ) -> Result<()> {
        if self.is_free(slot) {
            return Err(Error::invalid_slot(slot.as_usize(), "slot already free"));
        }

        let mut table = self.slots;
        table[slot.as_usize()] = None;
        self.commit(image, table)?;

        info!("Released slot {}", slot);
        Ok(())
    }

    /// Find the lowest occupied slot holding `pin`.
    pub fn find_by_pin(&self, pin: Pin) -> Option<SlotIndex> {
        SlotIndex::all().find(|slot| self.slots[slot.as_usize()] == Some(pin))
    }

    /// Check whether a slot is free.
    pub fn is_free(&self, slot: SlotIndex) -> bool {
        self.slots[slot.as_usize()].is_none()
    }

    /// PINs of all occupied slots, in slot order.
    pub fn occupied_pins(&self) -> Vec<Pin> {
        self.slots.iter().flatten().copied().collect()
    }

    /// Read-only view of every slot.
    pub fn snapshot(&self) -> [SlotView; SLOT_COUNT] {
        SlotIndex::per_slot(|slot| SlotView {
            slot,
            pin: self.slots[slot.as_usize()],
        })
    }

    /// Write the full slot table, then adopt it in memory.
    ///
    /// On a write error the in-memory table is left as it was.
    fn commit<S: ByteStorage>(
        &mut self,
        image: &mut PersistentImage<S>,
        table: [Option<Pin>; SLOT_COUNT],
    ) -> Result<()> {
        for slot in SlotIndex::all() {
            image.write_slot(slot, table[slot.as_usize()])?;
        }
        self.slots = table;
        Ok(())
    }
}
