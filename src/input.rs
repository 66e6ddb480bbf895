//! Buttons and debounce.

use embedded_hal::digital::v2::InputPin;

use crate::error::Error;
use crate::time::Instant;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Button {
    Up,
    Down,
    Select,
}

/// Source of button press edges, polled once per loop iteration.
pub trait Keypad {
    fn poll(&mut self) -> Result<Option<Button>, Error>;
}

/// Three active low buttons with pull-ups.
///
/// A press is reported on the released to pressed transition only; holding a
/// button reports nothing further. When several go down in the same poll the
/// first of Up, Down, Select wins.
pub struct Buttons<U, D, S> {
    up: U,
    down: D,
    select: S,
    held: [bool; 3],
}

impl<U, D, S> Buttons<U, D, S>
where
    U: InputPin,
    D: InputPin,
    S: InputPin,
{
    pub fn new(up: U, down: D, select: S) -> Self {
        Buttons {
            up,
            down,
            select,
            held: [false; 3],
        }
    }
}

impl<U, D, S> Keypad for Buttons<U, D, S>
where
    U: InputPin,
    D: InputPin,
    S: InputPin,
{
    fn poll(&mut self) -> Result<Option<Button>, Error> {
        let levels = [
            self.up.is_low().map_err(|_| Error::Gpio)?,
            self.down.is_low().map_err(|_| Error::Gpio)?,
            self.select.is_low().map_err(|_| Error::Gpio)?,
        ];

        let mut pressed = None;
        for (i, (&now, was)) in levels.iter().zip(self.held.iter()).enumerate() {
            if now && !was && pressed.is_none() {
                pressed = Some([Button::Up, Button::Down, Button::Select][i]);
            }
        }
        self.held = levels;
        Ok(pressed)
    }
}

/// Accepts an edge only once more than `interval_us` has passed since the
/// previously accepted one.
#[derive(Debug, Copy, Clone)]
pub struct DebounceClock {
    last_accepted: Instant,
    interval_us: u32,
}

impl DebounceClock {
    /// `boot` counts as the first accepted edge.
    pub fn new(boot: Instant, interval_ms: u32) -> Self {
        DebounceClock {
            last_accepted: boot,
            interval_us: interval_ms.saturating_mul(1_000),
        }
    }

    pub fn accept(&mut self, now: Instant) -> bool {
        if now.since(self.last_accepted) > self.interval_us {
            self.last_accepted = now;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::{Button, Keypad};
    use crate::error::Error;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    /// Hands out queued presses, one per poll, then `None`.
    #[derive(Clone, Default)]
    pub struct Script(pub Rc<RefCell<VecDeque<Option<Button>>>>);

    impl Script {
        pub fn push(&self, button: Button) {
            self.0.borrow_mut().push_back(Some(button));
        }

        pub fn idle(&self) {
            self.0.borrow_mut().push_back(None);
        }
    }

    impl Keypad for Script {
        fn poll(&mut self) -> Result<Option<Button>, Error> {
            Ok(self.0.borrow_mut().pop_front().flatten())
        }
    }
}
