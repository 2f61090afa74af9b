//! Screen presentation.
//!
//! A [`Screen`] describes what the panel should show; [`Screen::render`]
//! turns it into [`DisplayCommand`]s for a [`DisplayDevice`]. Transition
//! logic only ever picks a screen, it never formats text.
//!
//! [`DisplayDevice`]: slotkeeper_hardware::DisplayDevice

use slotkeeper_core::{
    Pin, SlotIndex, SlotView,
    constants::{PIN_LENGTH, SLOT_COUNT},
};
use slotkeeper_hardware::DisplayDevice;

use crate::messages::DisplayMessages;

/// One primitive display operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayCommand {
    /// Blank the whole panel.
    Clear,

    /// Write text starting at a position.
    Write {
        row: usize,
        column: usize,
        text: String,
    },
}

impl DisplayCommand {
    fn write(row: usize, text: impl Into<String>) -> Self {
        Self::Write {
            row,
            column: 0,
            text: text.into(),
        }
    }

    /// Apply this command to a display.
    pub fn apply<D: DisplayDevice>(&self, display: &mut D) -> slotkeeper_hardware::Result<()> {
        match self {
            Self::Clear => display.clear(),
            Self::Write { row, column, text } => display.write_at(*row, *column, text),
        }
    }
}

/// Everything the controller can show.
#[derive(Clone, PartialEq, Eq)]
pub enum Screen {
    /// `Free slots:` over `1/-/3/4`.
    FreeSlots([SlotView; SLOT_COUNT]),

    /// PIN handed out for a newly occupied slot.
    Assigned { slot: SlotIndex, pin: Pin },

    /// Retrieval prompt with an empty entry row.
    PinPrompt,

    /// Master code prompt shown while locked.
    AdminPrompt,

    /// Entry row update; only row 1 is rewritten.
    Entry(String),

    /// Every slot with its PIN, two per row.
    SlotTable([SlotView; SLOT_COUNT]),

    Releasing(SlotIndex),
    WrongPin,
    LockedOut,
    Unlocked,
    StillLocked,
}

impl Screen {
    /// Produce the display commands for this screen.
    ///
    /// Every screen except [`Screen::Entry`] starts with a clear.
    ///
    /// # Examples
    ///
    /// ```
    /// use slotkeeper_controller::{DisplayCommand, Screen};
    ///
    /// let commands = Screen::Entry("12".to_string()).render();
    /// assert_eq!(
    ///     commands,
    ///     vec![DisplayCommand::Write { row: 1, column: 0, text: "12__".to_string() }]
    /// );
    /// ```
    pub fn render(&self) -> Vec<DisplayCommand> {
        match self {
            Screen::Entry(entry) => vec![DisplayCommand::write(1, entry_row(entry))],
            _ => {
                let (top, bottom) = self.rows();
                let mut commands = vec![DisplayCommand::Clear, DisplayCommand::write(0, top)];
                if !bottom.is_empty() {
                    commands.push(DisplayCommand::write(1, bottom));
                }
                commands
            }
        }
    }

    /// Short name for log lines. Never includes PIN values.
    pub fn name(&self) -> &'static str {
        match self {
            Screen::FreeSlots(_) => "free-slots",
            Screen::Assigned { .. } => "assigned",
            Screen::PinPrompt => "pin-prompt",
            Screen::AdminPrompt => "admin-prompt",
            Screen::Entry(_) => "entry",
            Screen::SlotTable(_) => "slot-table",
            Screen::Releasing(_) => "releasing",
            Screen::WrongPin => "wrong-pin",
            Screen::LockedOut => "locked-out",
            Screen::Unlocked => "unlocked",
            Screen::StillLocked => "still-locked",
        }
    }

    fn rows(&self) -> (String, String) {
        match self {
            Screen::FreeSlots(views) => (DisplayMessages::FREE_SLOTS.to_string(), free_slot_row(views)),
            Screen::Assigned { slot, pin } => (
                format!("{}{}: {}", DisplayMessages::SLOT_PREFIX, slot, pin),
                String::new(),
            ),
            Screen::PinPrompt => (DisplayMessages::ENTER_PIN.to_string(), entry_row("")),
            Screen::AdminPrompt => (DisplayMessages::ADMIN_PIN.to_string(), entry_row("")),
            Screen::Entry(entry) => (String::new(), entry_row(entry)),
            Screen::SlotTable(views) => {
                let (first, second) = views.split_at(SLOT_COUNT / 2);
                (table_row(first), table_row(second))
            }
            Screen::Releasing(slot) => (
                format!("{}{}", DisplayMessages::RELEASING_PREFIX, slot),
                String::new(),
            ),
            Screen::WrongPin => (DisplayMessages::WRONG_PIN.to_string(), String::new()),
            Screen::LockedOut => (DisplayMessages::LOCKED.to_string(), String::new()),
            Screen::Unlocked => (DisplayMessages::UNLOCKED.to_string(), String::new()),
            Screen::StillLocked => (
                DisplayMessages::STILL_LOCKED_TITLE.to_string(),
                DisplayMessages::STILL_LOCKED_DETAIL.to_string(),
            ),
        }
    }
}

// PINs stay out of debug output; screens end up in logs and panic messages.
impl std::fmt::Debug for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Screen({})", self.name())
    }
}

/// `1/-/3/4`: slot number when free, the occupied mark otherwise.
fn free_slot_row(views: &[SlotView]) -> String {
    views
        .iter()
        .map(|view| {
            if view.is_occupied() {
                DisplayMessages::OCCUPIED_MARK.to_string()
            } else {
                view.slot.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(&DisplayMessages::SLOT_SEPARATOR.to_string())
}

/// `1:4821 2:-`
fn table_row(views: &[SlotView]) -> String {
    views
        .iter()
        .map(|view| match view.pin {
            Some(pin) => format!("{}:{}", view.slot, pin),
            None => format!("{}:{}", view.slot, DisplayMessages::OCCUPIED_MARK),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Entered symbols padded with placeholders to the PIN length.
fn entry_row(entry: &str) -> String {
    let mut row: String = entry.chars().take(PIN_LENGTH).collect();
    let missing = PIN_LENGTH - row.chars().count();
    row.extend(std::iter::repeat_n(DisplayMessages::ENTRY_PLACEHOLDER, missing));
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn slot(number: u8) -> SlotIndex {
        SlotIndex::from_number(number).unwrap()
    }

    fn pin(value: u16) -> Pin {
        Pin::new(value).unwrap()
    }

    fn views(pins: [Option<u16>; SLOT_COUNT]) -> [SlotView; SLOT_COUNT] {
        SlotIndex::per_slot(|s| SlotView {
            slot: s,
            pin: pins[s.as_usize()].map(pin),
        })
    }

    fn lines(screen: &Screen) -> Vec<(usize, String)> {
        screen
            .render()
            .into_iter()
            .filter_map(|c| match c {
                DisplayCommand::Write { row, text, .. } => Some((row, text)),
                DisplayCommand::Clear => None,
            })
            .collect()
    }

    #[test]
    fn test_free_slot_view() {
        let screen = Screen::FreeSlots(views([None, Some(4821), None, None]));
        assert_eq!(
            lines(&screen),
            vec![(0, "Free slots:".to_string()), (1, "1/-/3/4".to_string())]
        );
        assert_eq!(screen.render()[0], DisplayCommand::Clear);
    }

    #[test]
    fn test_assigned_screen() {
        let screen = Screen::Assigned {
            slot: slot(2),
            pin: pin(4821),
        };
        assert_eq!(lines(&screen), vec![(0, "Slot 2: 4821".to_string())]);
    }

    #[test]
    fn test_slot_table() {
        let screen = Screen::SlotTable(views([Some(4821), None, None, Some(1000)]));
        assert_eq!(
            lines(&screen),
            vec![(0, "1:4821 2:-".to_string()), (1, "3:- 4:1000".to_string())]
        );
    }

    #[rstest]
    #[case("", "____")]
    #[case("1", "1___")]
    #[case("12A", "12A_")]
    #[case("12AB", "12AB")]
    fn test_entry_row(#[case] entry: &str, #[case] expected: &str) {
        let commands = Screen::Entry(entry.to_string()).render();
        assert_eq!(
            commands,
            vec![DisplayCommand::Write {
                row: 1,
                column: 0,
                text: expected.to_string()
            }]
        );
    }

    #[rstest]
    #[case(Screen::PinPrompt, "Enter PIN:", Some("____"))]
    #[case(Screen::AdminPrompt, "Admin PIN:", Some("____"))]
    #[case(Screen::Releasing(SlotIndex::from_number(3).unwrap()), "Releasing 3", None)]
    #[case(Screen::WrongPin, "Wrong PIN!", None)]
    #[case(Screen::LockedOut, "Locked!", None)]
    #[case(Screen::Unlocked, "Unlocked!", None)]
    #[case(Screen::StillLocked, "Panel", Some("still locked"))]
    fn test_fixed_screens(#[case] screen: Screen, #[case] top: &str, #[case] bottom: Option<&str>) {
        let mut expected = vec![(0, top.to_string())];
        if let Some(bottom) = bottom {
            expected.push((1, bottom.to_string()));
        }
        assert_eq!(lines(&screen), expected);
    }

    #[test]
    fn test_debug_hides_pin() {
        let screen = Screen::Assigned {
            slot: slot(1),
            pin: pin(4821),
        };
        assert!(!format!("{screen:?}").contains("4821"));
    }
}
