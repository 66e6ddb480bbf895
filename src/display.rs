//! Text frame model for the 128x32 monochrome panel.

use core::fmt::{self, Write as _};

use heapless::String;

/// 8x8 font on a 128 pixel wide panel
pub const COLS: usize = 16;
/// 8 pixel rows on a 32 pixel high panel
pub const ROWS: usize = 4;

/// One screenful of text, built by the menu every loop and flushed once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    rows: [String<COLS>; ROWS],
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `text` at `row`, replacing what was there. Text past the right
    /// edge is cut off; rows past the bottom are ignored.
    pub fn line(&mut self, row: usize, text: &str) -> &mut Self {
        if let Some(slot) = self.rows.get_mut(row) {
            slot.clear();
            for c in text.chars() {
                if slot.push(c).is_err() {
                    break;
                }
            }
        }
        self
    }

    /// `line` with formatting.
    pub fn line_fmt(&mut self, row: usize, args: fmt::Arguments<'_>) -> &mut Self {
        let mut buf: String<COLS> = String::new();
        let _ = Clip(&mut buf).write_fmt(args);
        self.line(row, &buf)
    }

    pub fn row(&self, row: usize) -> &str {
        self.rows.get(row).map(|r| r.as_str()).unwrap_or("")
    }

    pub fn rows(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.as_str())
    }
}

// Truncates instead of failing when the row is full.
struct Clip<'a>(&'a mut String<COLS>);

impl fmt::Write for Clip<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// Frame shown before the device stops for good.
pub fn fatal_frame(reason: &str) -> Frame {
    let mut frame = Frame::new();
    frame.line(0, "FATAL").line(1, reason).line(3, "Power cycle");
    frame
}

/// A panel that can show a [`Frame`]
pub trait Display {
    /// Draw every row at column 0 of its text row and flush once.
    fn show(&mut self, frame: &Frame) -> Result<(), crate::Error>;
}
