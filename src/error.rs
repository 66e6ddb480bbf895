use thiserror::Error;

/// Errors raised by the key pipeline and its hardware seams
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Gate pulses must last at least one microsecond
    #[error("gate duration must be non-zero")]
    InvalidDuration,

    #[error("gpio access failed")]
    Gpio,

    #[error("motion sensor read failed")]
    Motion,

    #[error("display flush failed")]
    Display,

    /// Recovered pad byte was outside `1..=BLOCK_SIZE`
    #[error("invalid padding")]
    Padding,

    #[error("output buffer too small")]
    BufferTooSmall,
}
