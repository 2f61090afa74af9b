//! Virtual character display for the slot controller.
//!
//! This module provides a 2-row × 16-column character display kept in
//! memory. It implements [`DisplayDevice`], so the controller drives it
//! exactly like a physical panel, and tests or the console front end read
//! its contents back.
//!
//! # Character Encoding
//!
//! Only printable ASCII (0x20-0x7E) is stored. Control characters are
//! dropped and any other character is shown as `?`, which is what a
//! character LCD without a custom font would do.
//!
//! # Examples
//!
//! ```
//! use slotkeeper_controller::VirtualDisplay;
//! use slotkeeper_hardware::DisplayDevice;
//!
//! let mut display = VirtualDisplay::new(2, 16);
//! display.write_at(0, 0, "Free slots:").unwrap();
//! display.write_at(1, 0, "1/2/3/4").unwrap();
//!
//! assert_eq!(display.get_line(0).unwrap(), "Free slots:     ");
//! assert_eq!(display.get_line(1).unwrap().trim_end(), "1/2/3/4");
//! ```
//!
//! ## Builder Pattern
//!
//! ```
//! use slotkeeper_controller::VirtualDisplay;
//!
//! let display = VirtualDisplay::builder().with_size(4, 20).build();
//! assert_eq!(display.get_all_lines().len(), 4);
//! ```

use std::fmt;

use slotkeeper_core::{
    Error, Result,
    constants::{DISPLAY_COLUMNS, DISPLAY_ROWS},
};
use slotkeeper_hardware::{DisplayDevice, HardwareError};

/// Character shown in place of anything outside printable ASCII.
const REPLACEMENT_CHAR: char = '?';

/// In-memory character display.
///
/// Writes past the right edge are cut off. Rows keep their content until
/// overwritten or cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualDisplay {
    /// Number of rows.
    rows: usize,

    /// Number of columns per row.
    columns: usize,

    /// One fixed-width line per row, padded with spaces.
    buffer: Vec<String>,
}

impl VirtualDisplay {
    /// Create a blank display with the given geometry.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            buffer: vec![" ".repeat(columns); rows],
        }
    }

    /// Create a builder for constructing a display with custom geometry.
    pub fn builder() -> VirtualDisplayBuilder {
        VirtualDisplayBuilder::default()
    }

    /// Write text starting at `(row, column)`, overwriting what is there.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidLine` if the row is out of bounds. A column at
    /// or past the right edge is reported the same way, with the column as
    /// the offending index.
    ///
    /// # Examples
    ///
    /// ```
    /// use slotkeeper_controller::VirtualDisplay;
    ///
    /// let mut display = VirtualDisplay::new(2, 16);
    /// display.set_text(1, 0, "____").unwrap();
    /// display.set_text(1, 0, "12").unwrap();
    /// assert_eq!(display.get_line(1).unwrap().trim_end(), "12__");
    /// ```
    pub fn set_text(&mut self, row: usize, column: usize, text: &str) -> Result<()> {
        if row >= self.rows {
            return Err(Error::InvalidLine {
                line: row,
                max: self.rows.saturating_sub(1),
            });
        }
        if column >= self.columns {
            return Err(Error::InvalidLine {
                line: column,
                max: self.columns.saturating_sub(1),
            });
        }

        let visible = truncate_text(&sanitize_text(text), self.columns - column);
        let line = &mut self.buffer[row];

        // Buffer is ASCII only, so byte offsets equal columns
        line.replace_range(column..column + visible.len(), &visible);
        Ok(())
    }

    /// Replace a whole row.
    pub fn set_line(&mut self, row: usize, text: &str) -> Result<()> {
        self.clear_line(row)?;
        self.set_text(row, 0, text)
    }

    /// Blank one row.
    pub fn clear_line(&mut self, row: usize) -> Result<()> {
        if row >= self.rows {
            return Err(Error::InvalidLine {
                line: row,
                max: self.rows.saturating_sub(1),
            });
        }
        self.buffer[row] = " ".repeat(self.columns);
        Ok(())
    }

    /// Blank every row.
    pub fn clear_all(&mut self) {
        for line in &mut self.buffer {
            *line = " ".repeat(self.columns);
        }
    }

    /// Get one row, padded to the column width.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidLine` if the row is out of bounds.
    pub fn get_line(&self, row: usize) -> Result<&str> {
        self.buffer
            .get(row)
            .map(String::as_str)
            .ok_or(Error::InvalidLine {
                line: row,
                max: self.rows.saturating_sub(1),
            })
    }

    /// Get every row, top to bottom.
    pub fn get_all_lines(&self) -> Vec<&str> {
        self.buffer.iter().map(String::as_str).collect()
    }

    /// Check whether every row is blank.
    pub fn is_blank(&self) -> bool {
        self.buffer.iter().all(|line| line.trim().is_empty())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }
}

impl Default for VirtualDisplay {
    fn default() -> Self {
        Self::new(DISPLAY_ROWS, DISPLAY_COLUMNS)
    }
}

impl DisplayDevice for VirtualDisplay {
    fn clear(&mut self) -> slotkeeper_hardware::Result<()> {
        self.clear_all();
        Ok(())
    }

    fn write_at(
        &mut self,
        row: usize,
        column: usize,
        text: &str,
    ) -> slotkeeper_hardware::Result<()> {
        self.set_text(row, column, text)
            .map_err(|_| HardwareError::InvalidPosition { row, column })
    }
}

/// Draws the panel with a frame, one row per line.
///
/// ```text
/// +----------------+
/// |Free slots:     |
/// |1/-/3/4         |
/// +----------------+
/// ```
impl fmt::Display for VirtualDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let border = format!("+{}+", "-".repeat(self.columns));
        writeln!(f, "{border}")?;
        for line in &self.buffer {
            writeln!(f, "|{line}|")?;
        }
        write!(f, "{border}")
    }
}

/// Builder for [`VirtualDisplay`].
#[derive(Debug)]
pub struct VirtualDisplayBuilder {
    rows: usize,
    columns: usize,
}

impl VirtualDisplayBuilder {
    /// Set the display size (rows and columns).
    pub fn with_size(mut self, rows: usize, columns: usize) -> Self {
        self.rows = rows;
        self.columns = columns;
        self
    }

    pub fn build(self) -> VirtualDisplay {
        VirtualDisplay::new(self.rows, self.columns)
    }
}

impl Default for VirtualDisplayBuilder {
    fn default() -> Self {
        Self {
            rows: DISPLAY_ROWS,
            columns: DISPLAY_COLUMNS,
        }
    }
}

/// Truncate text to a maximum number of characters.
///
/// # Examples
///
/// ```
/// use slotkeeper_controller::truncate_text;
///
/// assert_eq!(truncate_text("Releasing 3", 9), "Releasing");
/// assert_eq!(truncate_text("Short", 10), "Short");
/// ```
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Drop control characters and replace anything not printable ASCII.
fn sanitize_text(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control())
        .map(|c| {
            if c.is_ascii() {
                c
            } else {
                REPLACEMENT_CHAR
            }
        })
        .collect()
}
