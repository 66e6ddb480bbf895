//! Device context and main loop.
//!
//! [`App`] owns the settings, menu state, debounce clock and every hardware
//! seam, and is passed around explicitly instead of living in globals.

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::serial;

use crate::config::{Config, DEVICE_KEY, KEY_LEN};
use crate::demo::{self, HexDump};
use crate::display::{fatal_frame, Display, Frame};
use crate::edge::EdgeCounter;
use crate::entropy::EntropySource;
use crate::error::Error;
use crate::input::{DebounceClock, Keypad};
use crate::key::{assemble_key, protect};
use crate::menu::{render_status, Action, Menu, MenuState, Status};
use crate::protocol;
use crate::settings::Settings;
use crate::time::Monotonic;

const SELF_TEST_TEXT: &[u8] = b"gatekey self-test";

/// Outcome of the boot checks
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SelfTest {
    /// Pad, encrypt, decrypt, unpad gave the text back
    pub cipher_ok: bool,
    /// Every sampled entropy byte had the same value
    pub entropy_stuck: bool,
}

impl SelfTest {
    pub fn passed(&self) -> bool {
        self.cipher_ok && !self.entropy_stuck
    }
}

pub struct App<E, K, C, D, W> {
    config: Config,
    device_key: [u8; KEY_LEN],
    settings: Settings,
    menu: Menu,
    debounce: DebounceClock,
    frame: Frame,
    dirty: bool,
    entropy: E,
    keypad: K,
    clock: C,
    display: D,
    serial: W,
    edges: Option<&'static EdgeCounter>,
}

impl<E, K, C, D, W> App<E, K, C, D, W>
where
    E: EntropySource,
    K: Keypad,
    C: Monotonic + DelayMs<u32>,
    D: Display,
    W: serial::Write<u8>,
{
    pub fn new(config: Config, entropy: E, keypad: K, clock: C, display: D, serial: W) -> Self {
        let debounce = DebounceClock::new(clock.now(), config.debounce_ms);
        App {
            config,
            device_key: DEVICE_KEY,
            settings: Settings::default(),
            menu: Menu::new(config.visible_lines),
            debounce,
            frame: Frame::new(),
            dirty: true,
            entropy,
            keypad,
            clock,
            display,
            serial,
            edges: None,
        }
    }

    /// Report oscillator edges seen during each generation.
    pub fn with_edge_counter(mut self, edges: &'static EdgeCounter) -> Self {
        self.edges = Some(edges);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn menu_state(&self) -> &MenuState {
        self.menu.state()
    }

    /// Check the cipher path and that the entropy source is not stuck.
    ///
    /// Failures are shown on the panel for `done_hold_ms` but the device
    /// stays usable. Errors are hardware faults and are returned.
    pub fn self_test(&mut self, samples: usize) -> Result<SelfTest, Error> {
        let cipher_ok = match demo::round_trip(SELF_TEST_TEXT, &self.device_key) {
            Ok(rt) => {
                trace!("self-test ciphertext: {}", HexDump(rt.ciphertext()));
                rt.plaintext() == SELF_TEST_TEXT
            }
            Err(e) => {
                trace!("self-test cipher error: {}", e);
                false
            }
        };

        let mut first = None;
        let mut entropy_stuck = samples > 1;
        for _ in 0..samples {
            let byte = self.entropy.next_byte()?;
            match first {
                None => first = Some(byte),
                Some(b) if b != byte => entropy_stuck = false,
                Some(_) => {}
            }
        }

        let result = SelfTest {
            cipher_ok,
            entropy_stuck,
        };
        trace!("self-test: cipher ok {}, entropy stuck {}", cipher_ok, entropy_stuck);

        if !result.passed() {
            self.frame = Frame::new();
            self.frame.line(0, "SELF-TEST FAIL");
            if !cipher_ok {
                self.frame.line(1, "cipher mismatch");
            }
            if entropy_stuck {
                self.frame.line(2, "entropy stuck");
            }
            self.display.show(&self.frame)?;
            self.clock.delay_ms(self.config.done_hold_ms);
            self.dirty = true;
        }

        Ok(result)
    }

    /// Put a fatal error on the panel. The caller halts afterwards.
    pub fn show_fatal(&mut self, reason: &str) {
        trace!("fatal: {}", reason);
        self.frame = fatal_frame(reason);
        if self.display.show(&self.frame).is_err() {
            trace!("display down too");
        }
    }

    /// One pass of the polling loop: read buttons, advance the menu, redraw
    /// if anything changed.
    pub fn step(&mut self) -> Result<(), Error> {
        if let Some(button) = self.keypad.poll()? {
            if self.debounce.accept(self.clock.now()) {
                if self.menu.handle(button, &mut self.settings) == Action::Generate {
                    self.generate();
                }
                self.dirty = true;
            }
        }

        if self.dirty {
            self.menu.render(&self.settings, &mut self.frame);
            self.display.show(&self.frame)?;
            self.dirty = false;
        }
        Ok(())
    }

    pub fn run(&mut self) -> ! {
        loop {
            if let Err(e) = self.step() {
                trace!("loop error: {}", e);
            }
        }
    }

    /// Build, wrap and send one key. Blocks for the whole acquisition and
    /// always ends back on the main menu, even if the panel stops responding.
    fn generate(&mut self) {
        self.menu.begin_generation();
        render_status(Status::Working, &mut self.frame);
        self.flush_status();

        let edges_before = self.edges.map(|e| e.count());
        let started = self.clock.now();

        let status = match assemble_key(&mut self.entropy) {
            Ok(raw) => {
                let key = protect(raw, &self.device_key);
                protocol::send(&mut self.serial, &self.settings, key);
                Status::Done
            }
            Err(e) => {
                trace!("generation failed: {}", e);
                Status::Failed
            }
        };

        trace!("generation took {} ms", self.clock.elapsed_us(started) / 1_000);
        if let (Some(edges), Some(before)) = (self.edges, edges_before) {
            trace!("oscillator edges: {}", edges.since(before));
        }

        render_status(status, &mut self.frame);
        self.flush_status();
        self.clock.delay_ms(self.config.done_hold_ms);

        self.menu.finish_generation();
    }

    fn flush_status(&mut self) {
        if let Err(e) = self.display.show(&self.frame) {
            trace!("status frame dropped: {}", e);
        }
    }
}
