#![no_main]
#![no_std]

// Reset on panic
#[allow(unused_extern_crates)] // NOTE(allow) bug rust-lang/rust#53964
extern crate panic_reset; // panic handler

use core::cell::RefCell;

use crate::hal::{
    gpio::{Edge, ExtiPin},
    i2c::I2c,
    prelude::*,
    serial::{config::Config as SerialConfig, Serial},
    stm32::{self, interrupt},
};
use cortex_m::peripheral::NVIC;
use cortex_m_rt::entry;
use rtt_target::{rprintln, rtt_init_print};
use stm32f4xx_hal as hal;

use gatekey::display::{fatal_frame, Display};
use gatekey::edge::EdgeCounter;
use gatekey::input::Buttons;
use gatekey::{App, Config};

mod board;

use board::{halt, BusProxy, Panel, Timebase};

const PANEL_ADDR: u8 = 0x3C;
const SELF_TEST_SAMPLES: usize = 4;

/// Rising edges on the oscillator monitor line (PB12).
///
/// Every edge is an interrupt, so PB12 must carry a divided, low rate tap of
/// the oscillator (a few kHz at most), never the raw counter input. At full
/// rate the handler would starve the main loop and skew the gate timing.
static EDGES: EdgeCounter = EdgeCounter::new();

#[entry]
fn main() -> ! {
    rtt_init_print!();

    if let Some(dp) = stm32::Peripherals::take() {
        // TIM2 for the timebase, SYSCFG for the EXTI line mapping
        dp.RCC.apb1enr.modify(|_, w| w.tim2en().set_bit());
        dp.RCC.apb2enr.modify(|_, w| w.syscfgen().set_bit());

        let rcc = dp.RCC.constrain();
        let clocks = rcc
            .cfgr
            .use_hse(24.mhz())
            .sysclk(96.mhz())
            .hclk(96.mhz())
            .pclk1(48.mhz())
            .pclk2(96.mhz())
            .freeze();

        let time = Timebase::start(dp.TIM2, &clocks);
        let config = Config::default();

        let gpioa = dp.GPIOA.split();
        let gpiob = dp.GPIOB.split();

        // I2C1 on PB6/PB7: SSD1306 at 0x3C, MPU-6050 at 0x68
        let scl = gpiob.pb6.into_alternate_af4().set_open_drain();
        let sda = gpiob.pb7.into_alternate_af4().set_open_drain();
        let i2c = RefCell::new(I2c::i2c1(dp.I2C1, (scl, sda), 400.khz(), clocks));

        let mut panel = match Panel::new(BusProxy(&i2c)) {
            Ok(panel) => panel,
            Err(e) => {
                rprintln!("panel init failed: {}", e);
                halt();
            }
        };
        rprintln!("panel up at 0x{:02X}", PANEL_ADDR);

        // USART2 TX on PA2 to the host, 9600 8N1
        let tx = gpioa.pa2.into_alternate_af7();
        let rx = gpioa.pa3.into_alternate_af7();
        let serial_config = SerialConfig::default().baudrate(9600.bps());
        let (host, _) = match Serial::usart2(dp.USART2, (tx, rx), serial_config, clocks) {
            Ok(serial) => serial.split(),
            Err(_) => {
                rprintln!("usart2 config rejected");
                panel.show(&fatal_frame("serial config")).ok();
                halt();
            }
        };

        #[cfg(not(feature = "noise-entropy"))]
        let entropy = {
            use gatekey::counter::CounterGate;
            use gatekey::entropy::GatedSampler;

            let motion = match board::Mpu6050::new(BusProxy(&i2c)) {
                Ok(motion) => motion,
                Err(e) => {
                    rprintln!("motion sensor init failed: {}", e);
                    panel.show(&fatal_frame("no motion sensor")).ok();
                    halt();
                }
            };

            // counter outputs Q0..Q7 on PA5..PA12
            let bus = [
                gpioa.pa5.into_floating_input().downgrade(),
                gpioa.pa6.into_floating_input().downgrade(),
                gpioa.pa7.into_floating_input().downgrade(),
                gpioa.pa8.into_floating_input().downgrade(),
                gpioa.pa9.into_floating_input().downgrade(),
                gpioa.pa10.into_floating_input().downgrade(),
                gpioa.pa11.into_floating_input().downgrade(),
                gpioa.pa12.into_floating_input().downgrade(),
            ];
            let counter = CounterGate::new(
                gpiob.pb0.into_push_pull_output(),
                gpiob.pb1.into_push_pull_output(),
                bus,
                time,
                config.reset_pulse_us,
                config.gate_settle_us,
            );
            GatedSampler::new(counter, motion, time, config.acquisition_window_us)
        };

        #[cfg(feature = "noise-entropy")]
        let entropy = {
            use gatekey::entropy::NoiseSampler;
            use hal::adc::{
                config::{AdcConfig, Resolution},
                Adc, Temperature,
            };

            let mut adc = Adc::adc1(dp.ADC1, true, AdcConfig::default());
            adc.enable_temperature_and_vref();
            adc.set_resolution(Resolution::Twelve);
            NoiseSampler::new(adc, Temperature, 100_000)
        };

        // oscillator monitor, counted in the background
        let mut syscfg = dp.SYSCFG;
        let mut exti = dp.EXTI;
        let mut osc = gpiob.pb12.into_floating_input();
        osc.make_interrupt_source(&mut syscfg);
        osc.trigger_on_edge(&mut exti, Edge::RISING);
        osc.enable_interrupt(&mut exti);
        unsafe { NVIC::unmask(stm32::Interrupt::EXTI15_10) };

        let buttons = Buttons::new(
            gpioa.pa0.into_pull_up_input(),
            gpioa.pa1.into_pull_up_input(),
            gpioa.pa4.into_pull_up_input(),
        );

        let mut app = App::new(config, entropy, buttons, time, panel, host).with_edge_counter(&EDGES);

        rprintln!("self-test");
        match app.self_test(SELF_TEST_SAMPLES) {
            Ok(result) if result.passed() => rprintln!("self-test passed"),
            Ok(result) => rprintln!("self-test: {:?}", result),
            Err(e) => {
                rprintln!("self-test error: {}", e);
                app.show_fatal("sampler fault");
                halt();
            }
        }

        rprintln!("START");
        app.run();
    }

    halt();
}

#[interrupt]
fn EXTI15_10() {
    EDGES.record();
    // PR is write one to clear
    unsafe { (*stm32::EXTI::ptr()).pr.write(|w| w.bits(1 << 12)) };
}
