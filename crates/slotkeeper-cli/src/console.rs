//! Console rendering of the character display.

use std::io::{self, Write};

use slotkeeper_controller::VirtualDisplay;
use slotkeeper_hardware::{DisplayDevice, Result};

/// Character display printed to a writer after every complete screen.
#[derive(Debug)]
pub struct ConsoleDisplay<W> {
    panel: VirtualDisplay,
    out: W,
}

impl ConsoleDisplay<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W) -> Self {
        Self {
            panel: VirtualDisplay::default(),
            out,
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DisplayDevice for ConsoleDisplay<W> {
    fn clear(&mut self) -> Result<()> {
        self.panel.clear()
    }

    fn write_at(&mut self, row: usize, column: usize, text: &str) -> Result<()> {
        self.panel.write_at(row, column, text)
    }

    fn flush(&mut self) -> Result<()> {
        writeln!(self.out, "{}", self.panel)?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_prints_framed_panel() {
        let mut display = ConsoleDisplay::new(Vec::new());
        display.write_at(0, 0, "Free slots:").unwrap();
        display.write_at(1, 0, "1/2/3/4").unwrap();
        display.flush().unwrap();

        let printed = String::from_utf8(display.into_inner()).unwrap();
        assert_eq!(
            printed,
            "+----------------+\n\
             |Free slots:     |\n\
             |1/2/3/4         |\n\
             +----------------+\n"
        );
    }

    #[test]
    fn test_nothing_printed_before_flush() {
        let mut display = ConsoleDisplay::new(Vec::new());
        display.write_at(0, 0, "Wrong PIN!").unwrap();
        assert!(display.into_inner().is_empty());
    }
}
