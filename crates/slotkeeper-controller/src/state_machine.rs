//! Keypad entry state machine.
//!
//! This module turns single key presses into locker operations and screens.
//! It owns the entry buffer and the current [`Mode`]; the slot table and the
//! lock live in the [`Locker`] passed to every call.
//!
//! # Modes
//!
//! - `Browsing`: the free-slot view. `1`-`4` occupy a free slot, `*` starts a
//!   retrieval.
//! - `AwaitingRetrievalPin`: collects up to four symbols; `#` submits,
//!   `*` clears.
//! - `Locked`: entered after repeated wrong PINs. Only the master code
//!   followed by `#` leaves it.
//!
//! # Valid Transitions
//!
//! - Browsing → AwaitingRetrievalPin
//! - AwaitingRetrievalPin → Browsing | Locked
//! - Locked → Browsing
//!
//! # Examples
//!
//! ```
//! use slotkeeper_controller::{EntryStateMachine, Mode, Screen, Step};
//! use slotkeeper_core::MasterCode;
//! use slotkeeper_hardware::{Key, MemoryEeprom};
//! use slotkeeper_storage::{Locker, PinGenerator};
//!
//! let mut locker = Locker::boot(MemoryEeprom::new(), PinGenerator::from_seed(1)).unwrap();
//! let mut machine = EntryStateMachine::new(MasterCode::default(), locker.is_locked());
//!
//! let steps = machine.handle_key(Key::Star, &mut locker).unwrap();
//! assert_eq!(steps, vec![Step::Show(Screen::PinPrompt)]);
//! assert_eq!(machine.mode(), Mode::AwaitingRetrievalPin);
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use slotkeeper_core::{MasterCode, Pin, Result, SlotIndex, constants::PIN_LENGTH};
use slotkeeper_hardware::{ByteStorage, Key};
use slotkeeper_storage::Locker;
use tracing::{debug, info, warn};

use crate::screen::Screen;

/// Maximum number of mode transitions kept for diagnostics.
pub const MAX_HISTORY_SIZE: usize = 32;

/// Input mode of the keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Showing free slots, waiting for a slot number or `*`.
    Browsing,

    /// Collecting a retrieval PIN (or the master code).
    AwaitingRetrievalPin,

    /// Panel locked; collecting the master code.
    Locked,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode_str = match self {
            Mode::Browsing => "Browsing",
            Mode::AwaitingRetrievalPin => "AwaitingRetrievalPin",
            Mode::Locked => "Locked",
        };
        write!(f, "{}", mode_str)
    }
}

impl Mode {
    /// Mode to start in after boot.
    pub fn initial(locked: bool) -> Self {
        if locked { Mode::Locked } else { Mode::Browsing }
    }

    /// Check if a transition to `target` is allowed from this mode.
    ///
    /// ```
    /// use slotkeeper_controller::Mode;
    ///
    /// assert!(Mode::Browsing.can_transition_to(&Mode::AwaitingRetrievalPin));
    /// assert!(!Mode::Browsing.can_transition_to(&Mode::Locked));
    /// ```
    pub fn can_transition_to(&self, target: &Mode) -> bool {
        matches!(
            (self, target),
            (Mode::Browsing, Mode::AwaitingRetrievalPin)
                | (Mode::AwaitingRetrievalPin, Mode::Browsing | Mode::Locked)
                | (Mode::Locked, Mode::Browsing)
        )
    }
}

/// A single mode change with timestamp.
///
/// The `timestamp` field is not serialized since `Instant` is
/// process-specific; deserialized records carry the time of deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeTransition {
    pub from: Mode,
    pub to: Mode,

    #[serde(skip, default = "Instant::now")]
    pub timestamp: Instant,
}

impl ModeTransition {
    pub fn new(from: Mode, to: Mode) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }

    /// Time since the transition happened.
    pub fn elapsed(&self) -> Duration {
        self.timestamp.elapsed()
    }
}

/// Symbols typed since the last clear, at most [`PIN_LENGTH`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct EntryBuffer {
    symbols: String,
}

impl EntryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a symbol. Returns `false` (and drops it) if the buffer is full.
    pub fn push(&mut self, symbol: char) -> bool {
        if self.is_full() {
            return false;
        }
        self.symbols.push(symbol);
        true
    }

    pub fn clear(&mut self) {
        self.symbols.clear();
    }

    /// Take the contents, leaving the buffer empty.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.symbols)
    }

    pub fn as_str(&self) -> &str {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.len() >= PIN_LENGTH
    }
}

// Entry may hold a PIN; only the length is shown.
impl fmt::Debug for EntryBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryBuffer({} symbols)", self.len())
    }
}

/// How long a held screen stays up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hold {
    /// Short confirmation or refusal message.
    Message,

    /// Full slot table shown for the master code.
    Table,
}

/// Display work produced by one key press, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Render a screen and continue.
    Show(Screen),

    /// Render a screen, keep it up for the hold, then discard keys pressed
    /// in the meantime.
    Hold { screen: Screen, hold: Hold },
}

impl Step {
    fn hold(screen: Screen, hold: Hold) -> Self {
        Step::Hold { screen, hold }
    }
}

/// Keypad state machine.
///
/// Every call to [`handle_key`](Self::handle_key) completes its locker
/// writes before returning the screens to show.
pub struct EntryStateMachine {
    mode: Mode,
    entry: EntryBuffer,
    master_code: MasterCode,

    /// Most recent mode changes, oldest first.
    history: VecDeque<ModeTransition>,
}

impl EntryStateMachine {
    /// Create a machine in `Locked` mode if the panel is locked, else in
    /// `Browsing`.
    pub fn new(master_code: MasterCode, locked: bool) -> Self {
        Self {
            mode: Mode::initial(locked),
            entry: EntryBuffer::new(),
            master_code,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn entry(&self) -> &EntryBuffer {
        &self.entry
    }

    /// Recent mode transitions, oldest first.
    pub fn history(&self) -> &VecDeque<ModeTransition> {
        &self.history
    }

    /// Get the last `count` transitions.
    pub fn last_transitions(&self, count: usize) -> Vec<ModeTransition> {
        self.history
            .iter()
            .rev()
            .take(count)
            .rev()
            .cloned()
            .collect()
    }

    /// Screen for the current mode, shown at boot.
    pub fn current_screen<S: ByteStorage>(&self, locker: &Locker<S>) -> Screen {
        match self.mode {
            Mode::Browsing => Screen::FreeSlots(locker.snapshot()),
            Mode::AwaitingRetrievalPin => Screen::PinPrompt,
            Mode::Locked => Screen::AdminPrompt,
        }
    }

    /// Process one key press.
    ///
    /// Returns the screens to show, in order. An empty list means the key
    /// was ignored.
    ///
    /// # Errors
    ///
    /// Returns any locker error (`StorageIo`, `PinSpaceExhausted`). Those
    /// are fatal; the machine state is unspecified afterwards.
    pub fn handle_key<S: ByteStorage>(
        &mut self,
        key: Key,
        locker: &mut Locker<S>,
    ) -> Result<Vec<Step>> {
        match self.mode {
            Mode::Browsing => self.on_browsing(key, locker),
            Mode::AwaitingRetrievalPin => self.on_retrieval(key, locker),
            Mode::Locked => self.on_locked(key, locker),
        }
    }

    fn on_browsing<S: ByteStorage>(
        &mut self,
        key: Key,
        locker: &mut Locker<S>,
    ) -> Result<Vec<Step>> {
        match key {
            Key::Digit(d) => match SlotIndex::from_number(d) {
                Some(slot) => self.assign(slot, locker),
                None => Ok(Vec::new()),
            },
            Key::Star => {
                self.enter(Mode::AwaitingRetrievalPin);
                Ok(vec![Step::Show(Screen::PinPrompt)])
            }
            _ => Ok(Vec::new()),
        }
    }

    fn assign<S: ByteStorage>(
        &mut self,
        slot: SlotIndex,
        locker: &mut Locker<S>,
    ) -> Result<Vec<Step>> {
        if !locker.is_free(slot) {
            debug!("Slot {} is occupied, ignoring", slot);
            return Ok(Vec::new());
        }

        let pin = locker.assign(slot)?;
        Ok(vec![
            Step::hold(Screen::Assigned { slot, pin }, Hold::Message),
            Step::Show(Screen::FreeSlots(locker.snapshot())),
        ])
    }

    fn on_retrieval<S: ByteStorage>(
        &mut self,
        key: Key,
        locker: &mut Locker<S>,
    ) -> Result<Vec<Step>> {
        match key {
            Key::Star => {
                self.entry.clear();
                Ok(vec![Step::Show(Screen::PinPrompt)])
            }
            Key::Hash => self.submit_retrieval(locker),
            _ => Ok(self.append(key)),
        }
    }

    fn submit_retrieval<S: ByteStorage>(&mut self, locker: &mut Locker<S>) -> Result<Vec<Step>> {
        let entry = self.entry.take();

        if self.master_code.matches(&entry) {
            info!("Master code accepted, showing slot table");
            self.enter(Mode::Browsing);
            return Ok(vec![
                Step::hold(Screen::SlotTable(locker.snapshot()), Hold::Table),
                Step::Show(Screen::FreeSlots(locker.snapshot())),
            ]);
        }

        if let Some(slot) = Pin::from_entry(&entry).and_then(|pin| locker.find_by_pin(pin)) {
            locker.release(slot)?;
            locker.record_success();
            self.enter(Mode::Browsing);
            return Ok(vec![
                Step::hold(Screen::Releasing(slot), Hold::Message),
                Step::Show(Screen::FreeSlots(locker.snapshot())),
            ]);
        }

        if entry.chars().count() < PIN_LENGTH {
            debug!("Incomplete entry submitted, back to browsing");
            self.enter(Mode::Browsing);
            return Ok(vec![Step::Show(Screen::FreeSlots(locker.snapshot()))]);
        }

        let locked_now = locker.record_failure()?;
        let mut steps = vec![Step::hold(Screen::WrongPin, Hold::Message)];

        if locked_now {
            self.enter(Mode::Locked);
            steps.push(Step::hold(Screen::LockedOut, Hold::Message));
            steps.push(Step::Show(Screen::AdminPrompt));
        } else {
            info!("Wrong PIN ({} consecutive)", locker.failed_attempts());
            self.enter(Mode::Browsing);
            steps.push(Step::Show(Screen::FreeSlots(locker.snapshot())));
        }
        Ok(steps)
    }

    fn on_locked<S: ByteStorage>(
        &mut self,
        key: Key,
        locker: &mut Locker<S>,
    ) -> Result<Vec<Step>> {
        match key {
            Key::Star => {
                self.entry.clear();
                Ok(vec![Step::Show(Screen::AdminPrompt)])
            }
            Key::Hash => {
                let entry = self.entry.take();
                if self.master_code.matches(&entry) {
                    locker.unlock()?;
                    self.enter(Mode::Browsing);
                    Ok(vec![
                        Step::hold(Screen::Unlocked, Hold::Message),
                        Step::Show(Screen::FreeSlots(locker.snapshot())),
                    ])
                } else {
                    warn!("Wrong master code while locked");
                    Ok(vec![
                        Step::hold(Screen::StillLocked, Hold::Message),
                        Step::Show(Screen::AdminPrompt),
                    ])
                }
            }
            _ => Ok(self.append(key)),
        }
    }

    /// Add an entry symbol and redraw the entry row.
    fn append(&mut self, key: Key) -> Vec<Step> {
        let Some(symbol) = key.symbol() else {
            return Vec::new();
        };

        if !self.entry.push(symbol) {
            debug!("Entry full, ignoring {}", key);
            return Vec::new();
        }
        vec![Step::Show(Screen::Entry(self.entry.as_str().to_string()))]
    }

    /// Switch mode, clearing the entry and recording the transition.
    fn enter(&mut self, mode: Mode) {
        debug_assert!(
            self.mode.can_transition_to(&mode),
            "invalid transition {} -> {}",
            self.mode,
            mode
        );

        let transition = ModeTransition::new(self.mode, mode);
        debug!("Mode {} -> {}", transition.from, transition.to);

        self.mode = mode;
        self.entry.clear();
        self.history.push_back(transition);
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
    }
}

impl fmt::Debug for EntryStateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryStateMachine")
            .field("mode", &self.mode)
            .field("entry", &self.entry)
            .field("history", &self.history.len())
            .finish_non_exhaustive()
    }
}
