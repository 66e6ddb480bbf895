//! External counter and gate lines.
//!
//! The counter is cleared by pulsing `reset`, counts oscillator edges while
//! `gate` is high, and exposes its low eight bits on a parallel bus.

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::{InputPin, OutputPin};

use crate::error::Error;

pub struct CounterGate<R, G, B, D> {
    reset: R,
    gate: G,
    bus: [B; 8],
    delay: D,
    reset_pulse_us: u32,
    settle_us: u32,
}

impl<R, G, B, D> CounterGate<R, G, B, D>
where
    R: OutputPin,
    G: OutputPin,
    B: InputPin,
    D: DelayUs<u32>,
{
    /// `bus[0]` is the least significant counter output.
    pub fn new(reset: R, gate: G, bus: [B; 8], delay: D, reset_pulse_us: u32, settle_us: u32) -> Self {
        CounterGate {
            reset,
            gate,
            bus,
            delay,
            reset_pulse_us,
            settle_us,
        }
    }

    pub fn reset_counter(&mut self) -> Result<(), Error> {
        self.reset.set_high().map_err(|_| Error::Gpio)?;
        self.delay.delay_us(self.reset_pulse_us);
        self.reset.set_low().map_err(|_| Error::Gpio)
    }

    /// Hold the gate open for `duration_us`, then close it and settle.
    pub fn open_gate_for(&mut self, duration_us: u32) -> Result<(), Error> {
        if duration_us == 0 {
            return Err(Error::InvalidDuration);
        }
        self.gate.set_high().map_err(|_| Error::Gpio)?;
        self.delay.delay_us(duration_us);
        self.gate.set_low().map_err(|_| Error::Gpio)?;
        self.delay.delay_us(self.settle_us);
        Ok(())
    }

    pub fn read_counter(&self) -> Result<u8, Error> {
        let mut value = 0u8;
        for (bit, line) in self.bus.iter().enumerate() {
            if line.is_high().map_err(|_| Error::Gpio)? {
                value |= 1 << bit;
            }
        }
        Ok(value)
    }
}
