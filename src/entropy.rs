//! Entropy sources.
//!
//! [`GatedSampler`] is the production source: motion energy sets how long the
//! counter gate stays open, and that repeats for a fixed acquisition window
//! before the counter byte is read back. [`NoiseSampler`] is the alternate
//! configuration that takes least significant bits from repeated ADC
//! conversions instead.

use core::marker::PhantomData;

use embedded_hal::adc::{Channel, OneShot};
use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::{InputPin, OutputPin};

use crate::counter::CounterGate;
use crate::error::Error;
use crate::motion::MotionSensor;
use crate::time::Monotonic;

pub trait EntropySource {
    /// Produce one byte; every call is independent of the previous ones.
    fn next_byte(&mut self) -> Result<u8, Error>;
}

impl<T: EntropySource> EntropySource for &mut T {
    fn next_byte(&mut self) -> Result<u8, Error> {
        (**self).next_byte()
    }
}

pub struct GatedSampler<R, G, B, D, M, C> {
    counter: CounterGate<R, G, B, D>,
    motion: M,
    clock: C,
    window_us: u32,
}

impl<R, G, B, D, M, C> GatedSampler<R, G, B, D, M, C>
where
    R: OutputPin,
    G: OutputPin,
    B: InputPin,
    D: DelayUs<u32>,
    M: MotionSensor,
    C: Monotonic,
{
    pub fn new(counter: CounterGate<R, G, B, D>, motion: M, clock: C, window_us: u32) -> Self {
        GatedSampler {
            counter,
            motion,
            clock,
            window_us,
        }
    }
}

impl<R, G, B, D, M, C> EntropySource for GatedSampler<R, G, B, D, M, C>
where
    R: OutputPin,
    G: OutputPin,
    B: InputPin,
    D: DelayUs<u32>,
    M: MotionSensor,
    C: Monotonic,
{
    fn next_byte(&mut self) -> Result<u8, Error> {
        self.counter.reset_counter()?;

        let start = self.clock.now();
        while self.clock.elapsed_us(start) < self.window_us {
            let sample = self.motion.read().map_err(|_| Error::Motion)?;
            self.counter.open_gate_for(sample.gate_time_us())?;
        }

        self.counter.read_counter()
    }
}

/// Builds bytes two bits at a time from the low bits of an ADC channel.
///
/// Repeated identical conversions are skipped, and a pair of bits is only
/// taken when it differs from the last pair taken. A channel that never
/// changes stops after `max_conversions` and yields whatever it has, which
/// the boot self-test reports as stuck.
pub struct NoiseSampler<ADC, A, P> {
    adc: A,
    pin: P,
    max_conversions: u32,
    _adc: PhantomData<ADC>,
}

impl<ADC, A, P> NoiseSampler<ADC, A, P>
where
    A: OneShot<ADC, u16, P>,
    P: Channel<ADC>,
{
    pub fn new(adc: A, pin: P, max_conversions: u32) -> Self {
        NoiseSampler {
            adc,
            pin,
            max_conversions,
            _adc: PhantomData,
        }
    }

    fn convert(&mut self) -> Result<u16, Error> {
        nb::block!(self.adc.read(&mut self.pin)).map_err(|_| Error::Gpio)
    }
}

impl<ADC, A, P> EntropySource for NoiseSampler<ADC, A, P>
where
    A: OneShot<ADC, u16, P>,
    P: Channel<ADC>,
{
    fn next_byte(&mut self) -> Result<u8, Error> {
        let mut byte = 0u8;
        let mut pairs = 0;
        let mut last = self.convert()?;
        let mut mix_last = last;
        let mut conversions = 1;

        while pairs < 4 && conversions < self.max_conversions {
            let sample = self.convert()?;
            conversions += 1;

            if sample == last {
                continue;
            }
            last = sample;

            if (mix_last ^ sample) & 0b11 != 0 {
                byte = (byte << 2) | (sample & 0b11) as u8;
                mix_last = sample;
                pairs += 1;
            }
        }

        Ok(byte)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::fake::{bus, RecordingPin};
    use crate::motion::fake::{Dead, Scripted};
    use crate::motion::MotionSample;
    use crate::time::sim::SimTime;
    use std::cell::Cell;
    use std::rc::Rc;

    fn sampler<M: MotionSensor>(
        motion: M,
        window_us: u32,
        bus_value: Rc<Cell<u8>>,
    ) -> (GatedSampler<RecordingPin, RecordingPin, crate::counter::fake::BusLine, SimTime, M, SimTime>, RecordingPin, RecordingPin) {
        let time = SimTime::default();
        let reset = RecordingPin::new(time.clone());
        let gate = RecordingPin::new(time.clone());
        let counter = CounterGate::new(reset.clone(), gate.clone(), bus(bus_value), time.clone(), 10, 5);
        (GatedSampler::new(counter, motion, time, window_us), reset, gate)
    }

    fn gate_pulses(gate: &RecordingPin) -> Vec<u32> {
        gate.writes()
            .chunks(2)
            .map(|pair| {
                assert!(pair[0].1 && !pair[1].1);
                pair[1].0 - pair[0].0
            })
            .collect()
    }

    #[test]
    fn resets_once_then_gates_for_whole_window() {
        let (mut s, reset, gate) = sampler(Scripted::still(), 1_000, Rc::new(Cell::new(0x5A)));
        assert_eq!(s.next_byte(), Ok(0x5A));

        assert_eq!(reset.writes().len(), 2);
        // still device: 10us open + 5us settle per cycle, first cycle after the 10us reset
        let pulses = gate_pulses(&gate);
        assert!(pulses.iter().all(|&p| p == 10));
        assert_eq!(pulses.len(), 67);
    }

    #[test]
    fn gate_time_follows_motion() {
        let samples = vec![
            MotionSample { accel: [50, 0, 0], gyro: [0; 3] },
            MotionSample { accel: [0, -199, 0], gyro: [0; 3] },
            MotionSample { accel: [0; 3], gyro: [1000, 0, 3] },
        ];
        let (mut s, _, gate) = sampler(Scripted::new(samples), 400, Rc::default());
        s.next_byte().unwrap();
        assert_eq!(&gate_pulses(&gate)[..3], &[60, 109, 13]);
    }

    #[test]
    fn gate_pulses_stay_within_window_bounds() {
        let (mut s, _, gate) = sampler(Scripted::still(), 200_000, Rc::default());
        s.next_byte().unwrap();
        let writes = gate.writes();
        let last_close = writes.last().unwrap().0;
        // the loop only starts a new pulse while the window is still open
        assert!(last_close < 200_000 + 10 + 110);
        assert!(writes.len() > 2 * 1000);
    }

    #[test]
    fn motion_failure_is_reported() {
        let (mut s, _, _) = sampler(Dead, 1_000, Rc::default());
        assert_eq!(s.next_byte(), Err(Error::Motion));
    }

    struct FakeAdc {
        samples: Vec<u16>,
        next: usize,
    }

    struct FakeChannel;

    impl Channel<FakeAdc> for FakeChannel {
        type ID = u8;

        fn channel() -> u8 {
            0
        }
    }

    impl OneShot<FakeAdc, u16, FakeChannel> for FakeAdc {
        type Error = ();

        fn read(&mut self, _pin: &mut FakeChannel) -> nb::Result<u16, ()> {
            let sample = self.samples[self.next % self.samples.len()];
            self.next += 1;
            Ok(sample)
        }
    }

    #[test]
    fn noise_sampler_takes_changing_bit_pairs() {
        // first conversion seeds `last`; repeats are skipped; 0b..00 -> 0b..01 etc
        let adc = FakeAdc {
            samples: vec![0x100, 0x100, 0x101, 0x101, 0x102, 0x103, 0x107, 0x100],
            next: 0,
        };
        let mut s = NoiseSampler::new(adc, FakeChannel, 100);
        // pairs taken: 01, 10, 11, then 0x107 & 3 = 11 equals mix_last pair 11 -> skipped, 0x100 -> 00
        assert_eq!(s.next_byte(), Ok(0b01_10_11_00));
    }

    #[test]
    fn noise_sampler_gives_up_on_flat_channel() {
        let adc = FakeAdc { samples: vec![0x200], next: 0 };
        let mut s = NoiseSampler::new(adc, FakeChannel, 50);
        assert_eq!(s.next_byte(), Ok(0));
        assert_eq!(s.adc.next, 50);
    }
}
