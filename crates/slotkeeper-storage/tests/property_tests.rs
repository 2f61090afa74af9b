//! Property-based tests for locker state invariants.
//!
//! Random sequences of slot and lockout operations, interleaved with
//! reboots, must keep the persisted state consistent with memory.

use proptest::prelude::*;
use slotkeeper_core::{SlotIndex, constants::SLOT_COUNT};
use slotkeeper_hardware::MemoryEeprom;
use slotkeeper_storage::{Locker, PinGenerator};

#[derive(Debug, Clone)]
enum Op {
    Assign(usize),
    Release(usize),
    Failure,
    Success,
    Unlock,
    Reboot,
}

/// Strategy for generating locker operations.
fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..SLOT_COUNT).prop_map(Op::Assign),
        2 => (0..SLOT_COUNT).prop_map(Op::Release),
        2 => Just(Op::Failure),
        1 => Just(Op::Success),
        1 => Just(Op::Unlock),
        1 => Just(Op::Reboot),
    ]
}

fn apply(locker: Locker<MemoryEeprom>, op: &Op, seed: u64) -> Locker<MemoryEeprom> {
    let mut locker = locker;
    match *op {
        Op::Assign(i) => {
            let slot = SlotIndex::new(i).unwrap();
            let was_free = locker.is_free(slot);
            assert_eq!(locker.assign(slot).is_ok(), was_free);
        }
        Op::Release(i) => {
            let slot = SlotIndex::new(i).unwrap();
            let was_free = locker.is_free(slot);
            assert_eq!(locker.release(slot).is_ok(), !was_free);
        }
        Op::Failure => {
            locker.record_failure().unwrap();
        }
        Op::Success => locker.record_success(),
        Op::Unlock => locker.unlock().unwrap(),
        Op::Reboot => {
            locker = Locker::boot(locker.into_storage(), PinGenerator::from_seed(seed)).unwrap();
        }
    }
    locker
}

proptest! {
    /// Property: occupied slots always hold pairwise distinct PINs.
    #[test]
    fn prop_pins_unique(seed in any::<u64>(), ops in prop::collection::vec(op(), 0..60)) {
        let mut locker = Locker::boot(MemoryEeprom::new(), PinGenerator::from_seed(seed)).unwrap();

        for (i, op) in ops.iter().enumerate() {
            locker = apply(locker, op, seed.wrapping_add(i as u64));

            let mut pins: Vec<_> = locker.snapshot().iter().filter_map(|v| v.pin).collect();
            let occupied = pins.len();
            pins.sort();
            pins.dedup();
            prop_assert_eq!(pins.len(), occupied);
        }
    }

    /// Property: every occupied slot is found by its own PIN.
    #[test]
    fn prop_pin_lookup(seed in any::<u64>(), ops in prop::collection::vec(op(), 0..60)) {
        let mut locker = Locker::boot(MemoryEeprom::new(), PinGenerator::from_seed(seed)).unwrap();

        for (i, op) in ops.iter().enumerate() {
            locker = apply(locker, op, seed.wrapping_add(i as u64));
        }

        for view in locker.snapshot() {
            if let Some(pin) = view.pin {
                prop_assert_eq!(locker.find_by_pin(pin), Some(view.slot));
            }
            prop_assert_eq!(locker.is_free(view.slot), view.pin.is_none());
        }
    }

    /// Property: rebooting from the stored bytes reproduces the in-memory state.
    #[test]
    fn prop_reboot_preserves_state(seed in any::<u64>(), ops in prop::collection::vec(op(), 0..60)) {
        let mut locker = Locker::boot(MemoryEeprom::new(), PinGenerator::from_seed(seed)).unwrap();

        for (i, op) in ops.iter().enumerate() {
            locker = apply(locker, op, seed.wrapping_add(i as u64));
        }

        let snapshot = locker.snapshot();
        let locked = locker.is_locked();
        let bytes = locker.storage().as_bytes().to_vec();

        let rebooted = Locker::boot(locker.into_storage(), PinGenerator::from_seed(!seed)).unwrap();
        prop_assert_eq!(rebooted.snapshot(), snapshot);
        prop_assert_eq!(rebooted.is_locked(), locked);
        prop_assert_eq!(rebooted.failed_attempts(), 0);

        // Booting formatted storage does not write anything
        prop_assert_eq!(rebooted.storage().as_bytes(), bytes.as_slice());
    }

    /// Property: the failure counter never reaches the lockout threshold.
    #[test]
    fn prop_counter_below_threshold(ops in prop::collection::vec(op(), 0..60)) {
        let mut locker = Locker::boot(MemoryEeprom::new(), PinGenerator::from_seed(0)).unwrap();

        for (i, op) in ops.iter().enumerate() {
            locker = apply(locker, op, i as u64);
            prop_assert!(locker.failed_attempts() < slotkeeper_core::constants::LOCKOUT_THRESHOLD);
        }
    }
}
