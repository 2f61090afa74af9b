//! Display texts shown on the 2×16 panel.
//!
//! All texts are ASCII and fit in one 16-column row. Screens that embed
//! runtime values (slot numbers, PINs) are assembled in [`crate::screen`]
//! from the prefixes and marks defined here.
//!
//! # Usage
//!
//! ```
//! use slotkeeper_controller::messages::DisplayMessages;
//!
//! assert_eq!(DisplayMessages::WRONG_PIN, "Wrong PIN!");
//! ```

/// Display texts for every screen of the controller.
///
/// # Message Format
///
/// - At most 16 characters per row (panel limitation)
/// - ASCII only
pub struct DisplayMessages;

impl DisplayMessages {
    /// Title row of the free-slot view.
    pub const FREE_SLOTS: &'static str = "Free slots:";

    /// Prompt for a retrieval PIN (or the master code).
    pub const ENTER_PIN: &'static str = "Enter PIN:";

    /// Prompt shown while the panel is locked.
    pub const ADMIN_PIN: &'static str = "Admin PIN:";

    /// Prefix of the assignment screen, followed by `N: PPPP`.
    pub const SLOT_PREFIX: &'static str = "Slot ";

    /// Prefix of the release confirmation, followed by the slot number.
    pub const RELEASING_PREFIX: &'static str = "Releasing ";

    /// Shown for a complete entry matching no occupied slot.
    pub const WRONG_PIN: &'static str = "Wrong PIN!";

    /// Shown when the failure threshold engages the lock.
    pub const LOCKED: &'static str = "Locked!";

    /// Shown after the master code clears the lock.
    pub const UNLOCKED: &'static str = "Unlocked!";

    /// First row of the refusal shown for a wrong code while locked.
    pub const STILL_LOCKED_TITLE: &'static str = "Panel";

    /// Second row of the refusal shown for a wrong code while locked.
    pub const STILL_LOCKED_DETAIL: &'static str = "still locked";

    /// Stands in for an occupied slot in the free-slot view and slot table.
    pub const OCCUPIED_MARK: char = '-';

    /// Separator between slots in the free-slot view.
    pub const SLOT_SEPARATOR: char = '/';

    /// Placeholder for symbols not yet entered.
    pub const ENTRY_PLACEHOLDER: char = '_';
}
