//! Motion sensor seam and the energy to gate time mapping.

/// One accelerometer plus gyroscope reading
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct MotionSample {
    pub accel: [i16; 3],
    pub gyro: [i16; 3],
}

impl MotionSample {
    /// Sum of the absolute values of all six axes.
    pub fn energy(&self) -> u32 {
        self.accel
            .iter()
            .chain(self.gyro.iter())
            .map(|axis| u32::from(axis.unsigned_abs()))
            .sum()
    }

    /// Gate open time derived from the reading, always in `10..=109` us.
    pub fn gate_time_us(&self) -> u32 {
        self.energy() % 100 + 10
    }
}

/// Six axis motion sensor, read on request.
pub trait MotionSensor {
    type Error;

    fn read(&mut self) -> Result<MotionSample, Self::Error>;
}


#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn energy_sums_absolute_values() {
        let sample = MotionSample {
            accel: [-100, 200, -3],
            gyro: [4, -5, 6],
        };
        assert_eq!(sample.energy(), 318);
        assert_eq!(sample.gate_time_us(), 28);
    }

    #[test]
    fn extreme_axes_do_not_overflow() {
        let sample = MotionSample {
            accel: [i16::MIN; 3],
            gyro: [i16::MIN; 3],
        };
        assert_eq!(sample.energy(), 6 * 32768);
    }

    #[test]
    fn still_device_still_gates() {
        assert_eq!(MotionSample::default().gate_time_us(), 10);
    }

    proptest! {
        #[test]
        fn gate_time_is_bounded(accel in any::<[i16; 3]>(), gyro in any::<[i16; 3]>()) {
            let t = MotionSample { accel, gyro }.gate_time_us();
            prop_assert!((10..=109).contains(&t));
        }
    }
}
