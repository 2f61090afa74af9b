use crate::{
    Result,
    constants::{MAX_PIN, MIN_PIN, PIN_LENGTH, SLOT_COUNT},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// Check whether a character is an entry symbol of the keypad.
///
/// Entry symbols are the digits `0-9` and the letter keys `A-D`. The control
/// keys `*` and `#` are not entry symbols.
#[must_use]
pub fn is_entry_symbol(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, 'A'..='D')
}

/// Slot identifier (0-based, below [`SLOT_COUNT`]).
///
/// Users address slots by number (1-4) on the keypad; the controller stores
/// them 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SlotIndex(u8);

impl SlotIndex {
    /// Create a slot index with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidSlot` if the index is not below [`SLOT_COUNT`].
    pub fn new(index: usize) -> Result<Self> {
        if index >= SLOT_COUNT {
            return Err(Error::invalid_slot(
                index,
                format!("index must be below {SLOT_COUNT}"),
            ));
        }
        Ok(SlotIndex(index as u8))
    }

    /// Map a 1-based slot number (as printed on the keypad) to an index.
    ///
    /// Returns `None` if the number is not a valid slot number.
    #[must_use]
    pub fn from_number(number: u8) -> Option<Self> {
        (1..=SLOT_COUNT as u8)
            .contains(&number)
            .then(|| SlotIndex(number - 1))
    }

    /// Iterate over every slot in ascending order.
    pub fn all() -> impl Iterator<Item = SlotIndex> {
        (0..SLOT_COUNT as u8).map(SlotIndex)
    }

    /// Build an array with one value per slot, in slot order.
    pub fn per_slot<T>(mut f: impl FnMut(SlotIndex) -> T) -> [T; SLOT_COUNT] {
        std::array::from_fn(|i| f(SlotIndex(i as u8)))
    }

    /// Get the 0-based index.
    #[must_use]
    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }

    /// Get the 1-based slot number shown to users.
    #[must_use]
    pub fn number(&self) -> u8 {
        self.0 + 1
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl TryFrom<u8> for SlotIndex {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        SlotIndex::new(value as usize)
    }
}

impl From<SlotIndex> for u8 {
    fn from(index: SlotIndex) -> Self {
        index.0
    }
}

/// Slot PIN (four decimal digits, leading digit nonzero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Pin(u16);

impl Pin {
    /// Create a PIN with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidPin` if the value is outside `MIN_PIN..=MAX_PIN`.
    pub fn new(value: u16) -> Result<Self> {
        if !(MIN_PIN..=MAX_PIN).contains(&value) {
            return Err(Error::InvalidPin(format!(
                "PIN must be {MIN_PIN}-{MAX_PIN}, got {value}"
            )));
        }
        Ok(Pin(value))
    }

    /// Interpret keypad entry as a PIN.
    ///
    /// The entry must consist of exactly four decimal digits forming a valid
    /// PIN. Entries containing letters never match a PIN.
    ///
    /// ```
    /// use slotkeeper_core::Pin;
    ///
    /// assert_eq!(Pin::from_entry("4821").map(|p| p.value()), Some(4821));
    /// assert!(Pin::from_entry("0821").is_none());
    /// assert!(Pin::from_entry("48A1").is_none());
    /// assert!(Pin::from_entry("482").is_none());
    /// ```
    #[must_use]
    pub fn from_entry(entry: &str) -> Option<Self> {
        if entry.len() != PIN_LENGTH || !entry.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        entry.parse().ok().and_then(|value| Pin::new(value).ok())
    }

    /// Get the numeric value.
    #[must_use]
    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

impl TryFrom<u16> for Pin {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self> {
        Pin::new(value)
    }
}

impl From<Pin> for u16 {
    fn from(pin: Pin) -> Self {
        pin.0
    }
}

impl std::str::FromStr for Pin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value: u16 = s
            .trim()
            .parse()
            .map_err(|_| Error::InvalidPin(format!("not a number: {s}")))?;
        Pin::new(value)
    }
}

/// Administrator master code.
///
/// The master code is four keypad symbols and must contain at least one
/// letter key, so it can never be equal to a numeric slot PIN.
///
/// # Security
/// Comparison runs in constant time. `Debug` output is redacted and the type
/// is deliberately not `Serialize`.
#[derive(Clone, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct MasterCode(String);

impl MasterCode {
    /// Create a master code with validation.
    ///
    /// The code is normalized (trimmed and uppercased) before validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidMasterCode` if the code does not have exactly
    /// four entry symbols or contains no letter key.
    pub fn new(code: &str) -> Result<Self> {
        let code = code.trim().to_uppercase();

        if code.chars().count() != PIN_LENGTH {
            return Err(Error::InvalidMasterCode(format!(
                "must be {PIN_LENGTH} symbols long"
            )));
        }

        if let Some(c) = code.chars().find(|c| !is_entry_symbol(*c)) {
            return Err(Error::InvalidMasterCode(format!(
                "symbol {c:?} is not on the keypad"
            )));
        }

        if code.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::InvalidMasterCode(
                "must contain at least one letter key (A-D)".to_string(),
            ));
        }

        Ok(MasterCode(code))
    }

    /// Compare keypad entry against the master code in constant time.
    #[must_use]
    pub fn matches(&self, entry: &str) -> bool {
        self.0.as_bytes().ct_eq(entry.as_bytes()).into()
    }
}

impl PartialEq for MasterCode {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.0)
    }
}

impl Default for MasterCode {
    fn default() -> Self {
        MasterCode(crate::constants::DEFAULT_MASTER_CODE.to_string())
    }
}

impl fmt::Debug for MasterCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("MasterCode(****)")
    }
}

impl TryFrom<String> for MasterCode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        MasterCode::new(&value)
    }
}

impl std::str::FromStr for MasterCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        MasterCode::new(s)
    }
}

/// Read-only view of a slot, used for rendering and diagnostics.
///
/// A slot is occupied exactly when it holds a PIN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotView {
    pub slot: SlotIndex,
    pub pin: Option<Pin>,
}

impl SlotView {
    /// View of a free slot.
    #[must_use]
    pub fn free(slot: SlotIndex) -> Self {
        Self { slot, pin: None }
    }

    /// View of an occupied slot.
    #[must_use]
    pub fn occupied(slot: SlotIndex, pin: Pin) -> Self {
        Self {
            slot,
            pin: Some(pin),
        }
    }

    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.pin.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 1)]
    #[case(3, 4)]
    fn test_slot_index_valid(#[case] index: usize, #[case] number: u8) {
        let slot = SlotIndex::new(index).unwrap();
        assert_eq!(slot.as_usize(), index);
        assert_eq!(slot.number(), number);
        assert_eq!(slot.to_string(), number.to_string());
    }

    #[rstest]
    #[case(4)]
    #[case(255)]
    fn test_slot_index_invalid(#[case] index: usize) {
        let result = SlotIndex::new(index);
        assert!(matches!(result, Err(Error::InvalidSlot { .. })));
    }

    #[rstest]
    #[case(1, Some(0))]
    #[case(4, Some(3))]
    #[case(0, None)]
    #[case(5, None)]
    fn test_slot_index_from_number(#[case] number: u8, #[case] expected: Option<usize>) {
        let slot = SlotIndex::from_number(number);
        assert_eq!(slot.map(|s| s.as_usize()), expected);
    }

    #[test]
    fn test_slot_index_all_ascending() {
        let all: Vec<usize> = SlotIndex::all().map(|s| s.as_usize()).collect();
        assert_eq!(all, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_slot_index_per_slot() {
        let numbers = SlotIndex::per_slot(|slot| slot.number());
        assert_eq!(numbers, [1, 2, 3, 4]);
    }

    #[rstest]
    #[case(1000)]
    #[case(4821)]
    #[case(9999)]
    fn test_pin_valid(#[case] value: u16) {
        let pin = Pin::new(value).unwrap();
        assert_eq!(pin.value(), value);
        assert_eq!(pin.to_string(), value.to_string());
    }

    #[rstest]
    #[case(0)]
    #[case(999)]
    #[case(10000)]
    fn test_pin_invalid(#[case] value: u16) {
        assert!(matches!(Pin::new(value), Err(Error::InvalidPin(_))));
    }

    #[rstest]
    #[case("1234", Some(1234))]
    #[case("9999", Some(9999))]
    #[case("0999", None)]
    #[case("123", None)]
    #[case("12345", None)]
    #[case("12C4", None)]
    #[case("", None)]
    fn test_pin_from_entry(#[case] entry: &str, #[case] expected: Option<u16>) {
        assert_eq!(Pin::from_entry(entry).map(|p| p.value()), expected);
    }

    #[rstest]
    #[case("CBAD")]
    #[case("12A4")]
    #[case(" cbad ")]
    fn test_master_code_valid(#[case] code: &str) {
        assert!(MasterCode::new(code).is_ok());
    }

    #[rstest]
    #[case("1234")] // numeric only
    #[case("ABC")] // too short
    #[case("ABCDA")] // too long
    #[case("AB*D")] // control key
    #[case("ABEF")] // not on keypad
    fn test_master_code_invalid(#[case] code: &str) {
        assert!(matches!(
            MasterCode::new(code),
            Err(Error::InvalidMasterCode(_))
        ));
    }

    #[test]
    fn test_master_code_matches_exactly() {
        let code = MasterCode::new("cbad").unwrap();
        assert!(code.matches("CBAD"));
        assert!(!code.matches("CBA"));
        assert!(!code.matches("CBADD"));
        assert!(!code.matches("DBAC"));
        assert!(!code.matches(""));
    }

    #[test]
    fn test_master_code_debug_is_redacted() {
        let code = MasterCode::default();
        let debug = format!("{:?}", code);
        assert!(!debug.contains("CBAD"));
    }

    #[test]
    fn test_master_code_deserialize_validates() {
        let ok: std::result::Result<MasterCode, _> = serde_json::from_str("\"A1B2\"");
        assert!(ok.is_ok());

        let err: std::result::Result<MasterCode, _> = serde_json::from_str("\"1234\"");
        assert!(err.is_err());
    }

    #[test]
    fn test_slot_view_serialization() {
        let view = SlotView::occupied(SlotIndex::new(1).unwrap(), Pin::new(4821).unwrap());
        let json = serde_json::to_string(&view).unwrap();
        assert_eq!(json, r#"{"slot":1,"pin":4821}"#);

        let free = SlotView::free(SlotIndex::new(0).unwrap());
        assert!(!free.is_occupied());
        assert_eq!(serde_json::to_string(&free).unwrap(), r#"{"slot":0,"pin":null}"#);
    }

    #[test]
    fn test_is_entry_symbol() {
        for c in "0123456789ABCD".chars() {
            assert!(is_entry_symbol(c));
        }
        for c in "*#EFa ".chars() {
            assert!(!is_entry_symbol(c));
        }
    }
}
