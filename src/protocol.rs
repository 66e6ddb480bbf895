//! Host report line.
//!
//! One ASCII line per generation, no ack and no checksum:
//!
//! ```text
//! LEN:<password length>,COMPLEX:<complexity 0..=5>,KEY:<32 hex digits>\n
//! ```

use core::fmt::Write as _;

use embedded_hal::serial;
use heapless::String;

use crate::config::KEY_LEN;
use crate::key::ProtectedKey;
use crate::settings::{Complexity, Settings};

/// Longest line: `LEN:64,COMPLEX:5,KEY:` + 32 hex digits + newline.
pub const MAX_LINE: usize = 64;

pub fn format_report(settings: &Settings, key: &ProtectedKey) -> String<MAX_LINE> {
    let mut line = String::new();
    // capacity covers the longest report, so the writes cannot fail
    let _ = write!(
        line,
        "LEN:{},COMPLEX:{},KEY:",
        settings.password_len(),
        settings.complexity.as_u8()
    );
    for byte in key.as_bytes() {
        let _ = write!(line, "{:02X}", byte);
    }
    let _ = line.push('\n');
    line
}

/// Write the report line to `tx`. Fire and forget: a failed write drops the
/// rest of the line and is only logged.
pub fn send<W: serial::Write<u8>>(tx: &mut W, settings: &Settings, key: ProtectedKey) {
    let line = format_report(settings, &key);
    for byte in line.bytes() {
        if nb::block!(tx.write(byte)).is_err() {
            trace!("serial write failed, report dropped");
            return;
        }
    }
    if nb::block!(tx.flush()).is_err() {
        trace!("serial flush failed");
    }
}

/// A report as seen by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub settings: Settings,
    pub key: [u8; KEY_LEN],
}

/// Validate and decode one report line. The trailing newline is optional and
/// hex digits may be either case. Lengths outside `8..=64` are rejected.
pub fn parse(line: &str) -> Option<Report> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let mut fields = line.split(',');

    let len = decimal(fields.next()?.strip_prefix("LEN:")?)?;
    let complexity = decimal(fields.next()?.strip_prefix("COMPLEX:")?)?;
    let hex = fields.next()?.strip_prefix("KEY:")?;
    if fields.next().is_some() {
        return None;
    }

    let settings = Settings::new(len, Complexity::from_u8(complexity)?);
    if settings.password_len() != len {
        return None;
    }

    if hex.len() != KEY_LEN * 2 {
        return None;
    }
    let mut key = [0u8; KEY_LEN];
    for (byte, pair) in key.iter_mut().zip(hex.as_bytes().chunks(2)) {
        *byte = (nibble(pair[0])? << 4) | nibble(pair[1])?;
    }

    Some(Report { settings, key })
}

// Plain digits only: no sign, no leading zero.
fn decimal(field: &str) -> Option<u8> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if field.len() > 1 && field.starts_with('0') {
        return None;
    }
    field.parse().ok()
}

fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}
