//! Build time constants and runtime tunables.

use crate::settings::Complexity;

/// Bytes in a generated key.
pub const KEY_LEN: usize = 16;

/// AES block size.
pub const BLOCK_SIZE: usize = 16;

/// Key used to wrap generated keys before they go on the wire.
///
/// Every device of this model carries the same value, so the wrap only hides
/// the raw entropy from someone watching the serial line.
pub const DEVICE_KEY: [u8; KEY_LEN] = [
    0x2B, 0x7E, 0x15, 0x16, 0x28, 0xAE, 0xD2, 0xA6, 0xAB, 0xF7, 0x15, 0x88, 0x09, 0xCF, 0x4F, 0x3C,
];

/// Fixed IV for the padding demo.
pub const DEMO_IV: [u8; BLOCK_SIZE] = [
    0xFF, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F,
];

pub const MIN_PASSWORD_LEN: u8 = 8;
pub const MAX_PASSWORD_LEN: u8 = 64;
pub const DEFAULT_PASSWORD_LEN: u8 = 16;
pub const DEFAULT_COMPLEXITY: Complexity = Complexity::AllSymbols;

/// Timing and layout values for the device
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Config {
    /// Wall clock time spent gating before one counter byte is read
    pub acquisition_window_us: u32,

    /// Width of the counter reset pulse. Must cover the counter's minimum
    /// reset pulse width.
    pub reset_pulse_us: u32,

    /// Idle time after the gate closes
    pub gate_settle_us: u32,

    /// Minimum spacing between two accepted button edges
    pub debounce_ms: u32,

    /// How long the "done" screen stays up after a generation
    pub done_hold_ms: u32,

    /// Menu rows that fit under the title line
    pub visible_lines: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            acquisition_window_us: 200_000,
            reset_pulse_us: 10,
            gate_settle_us: 5,
            debounce_ms: 200,
            done_hold_ms: 1_000,
            visible_lines: 3,
        }
    }
}
