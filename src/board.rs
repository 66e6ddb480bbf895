//! STM32F411 glue: TIM2 timebase, shared I2C bus, MPU-6050 and the SSD1306
//! panel in terminal mode.

use core::cell::RefCell;
use core::fmt::Write as _;

use embedded_hal::blocking::delay::{DelayMs, DelayUs};
use embedded_hal::blocking::i2c;
use ssd1306::{mode::TerminalMode, prelude::*, I2CDisplayInterface, Ssd1306};
use stm32f4xx_hal::{rcc::Clocks, stm32};

use gatekey::display::{Display, Frame, COLS};
use gatekey::motion::{MotionSample, MotionSensor};
use gatekey::time::{Instant, Monotonic};
use gatekey::Error;

/// Free running 1 MHz counter on TIM2.
///
/// Copies are handles onto the same counter, so the menu clock, the
/// sampler window and the counter gate delays all agree.
#[derive(Copy, Clone)]
pub struct Timebase {
    _tim: (),
}

impl Timebase {
    /// TIM2 must already be clocked (`RCC.apb1enr.tim2en`).
    pub fn start(tim: stm32::TIM2, clocks: &Clocks) -> Self {
        let pclk1 = clocks.pclk1().0;
        // timers run at twice the bus clock when APB1 is divided
        let timer_clk = if clocks.ppre1() == 1 { pclk1 } else { pclk1 * 2 };
        let psc = timer_clk / 1_000_000 - 1;

        tim.cr1.modify(|_, w| w.cen().clear_bit());
        tim.psc.write(|w| w.psc().bits(psc as u16));
        tim.arr.write(|w| unsafe { w.bits(u32::MAX) });
        tim.egr.write(|w| w.ug().set_bit());
        tim.cr1.modify(|_, w| w.cen().set_bit());

        Timebase { _tim: () }
    }
}

impl Monotonic for Timebase {
    fn now(&self) -> Instant {
        // Read only; the counter was configured in `start`.
        Instant(unsafe { (*stm32::TIM2::ptr()).cnt.read().bits() })
    }
}

impl DelayUs<u32> for Timebase {
    fn delay_us(&mut self, us: u32) {
        let start = self.now();
        while self.elapsed_us(start) < us {}
    }
}

impl DelayMs<u32> for Timebase {
    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.delay_us(1_000);
        }
    }
}

/// Stop for good. Interrupts keep being served.
pub fn halt() -> ! {
    loop {
        cortex_m::asm::wfi();
    }
}

/// One I2C peripheral shared by the panel and the motion sensor. Both live
/// on the main loop, so a `RefCell` borrow per transaction is enough.
pub struct BusProxy<'a, I2C>(pub &'a RefCell<I2C>);

impl<I2C: i2c::Write> i2c::Write for BusProxy<'_, I2C> {
    type Error = I2C::Error;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        self.0.borrow_mut().write(address, bytes)
    }
}

impl<I2C: i2c::WriteRead> i2c::WriteRead for BusProxy<'_, I2C> {
    type Error = I2C::Error;

    fn write_read(&mut self, address: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.0.borrow_mut().write_read(address, bytes, buffer)
    }
}

const MPU_ADDR: u8 = 0x68;
const REG_ACCEL_XOUT_H: u8 = 0x3B;
const REG_PWR_MGMT_1: u8 = 0x6B;
const REG_WHO_AM_I: u8 = 0x75;

/// Raw register reads from an MPU-6050. No scaling or filtering; the gate
/// only cares about magnitudes.
pub struct Mpu6050<I2C> {
    i2c: I2C,
}

impl<I2C, E> Mpu6050<I2C>
where
    I2C: i2c::Write<Error = E> + i2c::WriteRead<Error = E>,
{
    /// Check the identity register and wake the part from sleep.
    pub fn new(mut i2c: I2C) -> Result<Self, Error> {
        let mut id = [0u8];
        i2c.write_read(MPU_ADDR, &[REG_WHO_AM_I], &mut id)
            .map_err(|_| Error::Motion)?;
        if id[0] != MPU_ADDR {
            return Err(Error::Motion);
        }
        i2c.write(MPU_ADDR, &[REG_PWR_MGMT_1, 0x00])
            .map_err(|_| Error::Motion)?;
        Ok(Mpu6050 { i2c })
    }
}

impl<I2C, E> MotionSensor for Mpu6050<I2C>
where
    I2C: i2c::Write<Error = E> + i2c::WriteRead<Error = E>,
{
    type Error = E;

    fn read(&mut self) -> Result<MotionSample, E> {
        // accel xyz, temperature, gyro xyz; big endian words
        let mut buf = [0u8; 14];
        self.i2c.write_read(MPU_ADDR, &[REG_ACCEL_XOUT_H], &mut buf)?;
        let word = |i: usize| i16::from_be_bytes([buf[i], buf[i + 1]]);
        Ok(MotionSample {
            accel: [word(0), word(2), word(4)],
            gyro: [word(8), word(10), word(12)],
        })
    }
}

/// 128x32 SSD1306 driven as a 16x4 text terminal.
pub struct Panel<DI> {
    oled: Ssd1306<DI, DisplaySize128x32, TerminalMode>,
}

impl<I2C> Panel<I2CInterface<I2C>>
where
    I2C: i2c::Write,
{
    pub fn new(i2c: I2C) -> Result<Self, Error> {
        let interface = I2CDisplayInterface::new(i2c);
        let mut oled = Ssd1306::new(interface, DisplaySize128x32, DisplayRotation::Rotate0)
            .into_terminal_mode();
        oled.init().map_err(|_| Error::Display)?;
        oled.clear().map_err(|_| Error::Display)?;
        Ok(Panel { oled })
    }
}

impl<I2C> Display for Panel<I2CInterface<I2C>>
where
    I2C: i2c::Write,
{
    fn show(&mut self, frame: &Frame) -> Result<(), Error> {
        for (row, text) in frame.rows().enumerate() {
            self.oled
                .set_position(0, row as u8)
                .map_err(|_| Error::Display)?;
            // pad so stale characters from the last frame are overwritten
            write!(self.oled, "{:<width$}", text, width = COLS).map_err(|_| Error::Display)?;
        }
        Ok(())
    }
}
